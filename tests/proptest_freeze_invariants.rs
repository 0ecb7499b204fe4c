//! Property-based invariant tests for the freeze state machine.
//!
//! 1. Nothing frozen is emitted before unfreezing; afterwards every held value
//!    arrives in order.
//! 2. An always-true compaction predicate leaves only the last value.
//! 3. At most one terminal event is emitted, and it is the last emission.
//! 4. Held values are released before a terminal latched while frozen.
//! 5. A selector error drops everything held.
//! 6. Cancelling is idempotent and silences every later input.
//! 7. Emitted values are always a prefix of the accepted values.

use std::collections::VecDeque;

use proptest::prelude::*;
use rxferro::ops::freeze::{Cardinality, Emission, FreezeMachine, KeepAll, ReplaceWith};

type Out = VecDeque<Emission<i32, u8>>;

#[derive(Debug, Clone)]
enum Input {
  Value(i32),
  Error(u8),
  Complete,
  Frozen(bool),
  ForceError(u8),
  ForceComplete,
  Cancel,
}

fn input_strategy() -> impl Strategy<Value = Input> {
  prop_oneof![
    6 => any::<i32>().prop_map(Input::Value),
    1 => any::<u8>().prop_map(Input::Error),
    1 => Just(Input::Complete),
    4 => any::<bool>().prop_map(Input::Frozen),
    1 => any::<u8>().prop_map(Input::ForceError),
    1 => Just(Input::ForceComplete),
    1 => Just(Input::Cancel),
  ]
}

fn cardinality_strategy() -> impl Strategy<Value = Cardinality> {
  prop_oneof![
    Just(Cardinality::STREAM),
    Just(Cardinality::MAYBE),
    Just(Cardinality::SINGLE),
    Just(Cardinality::COMPLETABLE),
  ]
}

fn feed(machine: &mut FreezeMachine<i32, u8, KeepAll>, input: Input, out: &mut Out) {
  match input {
    Input::Value(v) => machine.on_value(v, out),
    Input::Error(e) => machine.on_error(e, out),
    Input::Complete => machine.on_complete(out),
    Input::Frozen(frozen) => {
      machine.set_frozen(frozen, out);
    }
    Input::ForceError(e) => machine.force_error(e, out),
    Input::ForceComplete => machine.force_complete(out),
    Input::Cancel => machine.cancel(),
  }
}

fn values(out: &Out) -> Vec<i32> {
  out
    .iter()
    .filter_map(|e| match e {
      Emission::Next(v) => Some(*v),
      _ => None,
    })
    .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Buffering
// ═════════════════════════════════════════════════════════════════════════

proptest! {
  #[test]
  fn frozen_values_wait_for_release(vs in proptest::collection::vec(any::<i32>(), 0..64)) {
    let mut machine = FreezeMachine::new(Cardinality::STREAM, KeepAll, None);
    let mut out = Out::new();
    for v in &vs {
      machine.on_value(*v, &mut out);
    }
    prop_assert!(out.is_empty());
    prop_assert_eq!(machine.held(), vs.len());

    let released = machine.set_frozen(false, &mut out);
    prop_assert_eq!(released, vs.len());
    prop_assert_eq!(values(&out), vs);
    prop_assert!(!machine.is_closed());
  }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Compaction
// ═════════════════════════════════════════════════════════════════════════

proptest! {
  #[test]
  fn replace_all_keeps_last(vs in proptest::collection::vec(any::<i32>(), 1..64)) {
    let mut machine: FreezeMachine<i32, u8, _> =
      FreezeMachine::new(Cardinality::STREAM, ReplaceWith(|_: &i32, _: &i32| true), None);
    let mut out = Out::new();
    for v in &vs {
      machine.on_value(*v, &mut out);
    }
    prop_assert_eq!(machine.held(), 1);

    machine.set_frozen(false, &mut out);
    prop_assert_eq!(values(&out), vec![*vs.last().unwrap()]);
  }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Terminal once, and last
// ═════════════════════════════════════════════════════════════════════════

proptest! {
  #[test]
  fn at_most_one_terminal(
    cardinality in cardinality_strategy(),
    inputs in proptest::collection::vec(input_strategy(), 0..96),
  ) {
    let mut machine = FreezeMachine::new(cardinality, KeepAll, None);
    let mut out = Out::new();
    for input in inputs {
      feed(&mut machine, input, &mut out);
    }
    let terminals = out.iter().filter(|e| e.is_terminal()).count();
    prop_assert!(terminals <= 1);
    if terminals == 1 {
      prop_assert!(out.back().is_some_and(Emission::is_terminal));
      prop_assert!(machine.is_closed());
    }
  }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Held values precede a latched terminal
// ═════════════════════════════════════════════════════════════════════════

proptest! {
  #[test]
  fn buffer_released_before_terminal(
    vs in proptest::collection::vec(any::<i32>(), 0..32),
    err in proptest::option::of(any::<u8>()),
  ) {
    let mut machine = FreezeMachine::new(Cardinality::STREAM, KeepAll, None);
    let mut out = Out::new();
    for v in &vs {
      machine.on_value(*v, &mut out);
    }
    match err {
      Some(e) => machine.on_error(e, &mut out),
      None => machine.on_complete(&mut out),
    }
    prop_assert!(out.is_empty());

    machine.set_frozen(false, &mut out);
    let terminal = out.pop_back();
    prop_assert_eq!(values(&out), vs);
    let expected = match err {
      Some(e) => Emission::Error(e),
      None => Emission::Complete,
    };
    prop_assert_eq!(terminal, Some(expected));
  }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Selector error supersedes the buffer
// ═════════════════════════════════════════════════════════════════════════

proptest! {
  #[test]
  fn selector_error_drops_held(
    vs in proptest::collection::vec(any::<i32>(), 1..32),
    err in any::<u8>(),
  ) {
    let mut machine = FreezeMachine::new(Cardinality::STREAM, KeepAll, None);
    let mut out = Out::new();
    for v in &vs {
      machine.on_value(*v, &mut out);
    }
    machine.force_error(err, &mut out);
    machine.set_frozen(false, &mut out);

    prop_assert_eq!(out.into_iter().collect::<Vec<_>>(), vec![Emission::Error(err)]);
    prop_assert_eq!(machine.held(), 0);
  }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Cancellation is idempotent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
  #[test]
  fn nothing_after_cancel(
    cardinality in cardinality_strategy(),
    before in proptest::collection::vec(input_strategy(), 0..32),
    after in proptest::collection::vec(input_strategy(), 0..32),
  ) {
    let mut machine = FreezeMachine::new(cardinality, KeepAll, None);
    let mut out = Out::new();
    for input in before {
      feed(&mut machine, input, &mut out);
    }
    machine.cancel();
    machine.cancel();
    prop_assert!(machine.is_closed());

    let emitted = out.len();
    for input in after {
      feed(&mut machine, input, &mut out);
    }
    prop_assert_eq!(out.len(), emitted);
    prop_assert_eq!(machine.held(), 0);
  }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Order is preserved without compaction
// ═════════════════════════════════════════════════════════════════════════

proptest! {
  #[test]
  fn emitted_values_prefix_accepted(inputs in proptest::collection::vec(input_strategy(), 0..96)) {
    let mut machine = FreezeMachine::new(Cardinality::STREAM, KeepAll, None);
    let mut out = Out::new();
    let mut accepted = vec![];
    for input in inputs {
      if let Input::Value(v) = input {
        if machine.accepts_input() {
          accepted.push(v);
        }
      }
      feed(&mut machine, input, &mut out);
    }
    let emitted = values(&out);
    prop_assert!(emitted.len() <= accepted.len());
    prop_assert_eq!(&accepted[..emitted.len()], &emitted[..]);
  }
}
