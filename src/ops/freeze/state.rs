use std::collections::VecDeque;

use super::{
  buffer::{FrozenBuffer, ReplaceFrozen},
  cardinality::{Arity, Cardinality},
};
use crate::error::FreezeError;

/// What the machine asks to be delivered downstream, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

impl<Item, Err> Emission<Item, Err> {
  pub fn is_terminal(&self) -> bool { !matches!(self, Emission::Next(_)) }
}

/// Terminal bookkeeping. Anything but `Open` means upstream input is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Latch<Item, Err> {
  Open,
  /// The single value of a `One` shape, held until release.
  Value(Item),
  Completed,
  Failed(Err),
  /// A terminal event has been emitted, or the subscription was cancelled.
  Closed,
}

/// The freeze state of one subscription.
///
/// Inputs come from the source (`on_value`, `on_error`, `on_complete`), from
/// the selector (`set_frozen`, `force_error`, `force_complete`) and from the
/// downstream handle (`cancel`). Outputs are appended to the caller's queue.
/// The machine does no locking and no delivery of its own.
///
/// Starts frozen: nothing is emitted before the first `set_frozen(false)`.
pub struct FreezeMachine<Item, Err, R> {
  frozen: bool,
  cardinality: Cardinality,
  latch: Latch<Item, Err>,
  buffer: FrozenBuffer<Item>,
  replace: R,
  abnormal: Option<fn(FreezeError) -> Err>,
}

impl<Item, Err, R> FreezeMachine<Item, Err, R> {
  /// `abnormal` converts the machine's own errors. Without it a `One` shape
  /// ends with a completion where it would otherwise raise a `FreezeError`.
  pub fn new(
    cardinality: Cardinality, replace: R, abnormal: Option<fn(FreezeError) -> Err>,
  ) -> Self {
    Self {
      frozen: true,
      cardinality,
      latch: Latch::Open,
      buffer: FrozenBuffer::new(),
      replace,
      abnormal,
    }
  }

  pub fn is_frozen(&self) -> bool { self.frozen }

  /// Whether a terminal event has been emitted or the machine was cancelled.
  pub fn is_closed(&self) -> bool { matches!(self.latch, Latch::Closed) }

  /// Whether source events are still taken into account.
  pub fn accepts_input(&self) -> bool { matches!(self.latch, Latch::Open) }

  /// Number of values held back, counting a latched single value.
  pub fn held(&self) -> usize {
    self.buffer.len() + usize::from(matches!(self.latch, Latch::Value(_)))
  }

  pub fn cardinality(&self) -> Cardinality { self.cardinality }

  pub fn on_error(&mut self, err: Err, out: &mut VecDeque<Emission<Item, Err>>) {
    if !self.accepts_input() {
      return;
    }
    self.latch = Latch::Failed(err);
    if !self.frozen {
      self.release(out);
    }
  }

  pub fn on_complete(&mut self, out: &mut VecDeque<Emission<Item, Err>>) {
    if !self.accepts_input() {
      return;
    }
    self.latch = match (self.cardinality.completes, self.abnormal) {
      (false, Some(abnormal)) => Latch::Failed(abnormal(FreezeError::EmptySource)),
      _ => Latch::Completed,
    };
    if !self.frozen {
      self.release(out);
    }
  }

  /// Apply a selector value. Unfreezing releases everything held, then the
  /// latched terminal event if any. Returns the number of values released.
  pub fn set_frozen(&mut self, frozen: bool, out: &mut VecDeque<Emission<Item, Err>>) -> usize {
    if self.is_closed() {
      return 0;
    }
    self.frozen = frozen;
    if frozen { 0 } else { self.release(out) }
  }

  /// End the stream with `err` now, dropping everything held.
  pub fn force_error(&mut self, err: Err, out: &mut VecDeque<Emission<Item, Err>>) {
    if self.is_closed() {
      return;
    }
    self.buffer.clear();
    self.latch = Latch::Closed;
    out.push_back(Emission::Error(err));
  }

  /// The selector completed. A shape that cannot complete (`SINGLE`) treats it
  /// as an error, the others complete now, dropping everything held.
  pub fn force_complete(&mut self, out: &mut VecDeque<Emission<Item, Err>>) {
    if self.is_closed() {
      return;
    }
    if let (false, Some(abnormal)) = (self.cardinality.completes, self.abnormal) {
      self.force_error(abnormal(FreezeError::SelectorCompleted), out);
      return;
    }
    self.buffer.clear();
    self.latch = Latch::Closed;
    out.push_back(Emission::Complete);
  }

  /// Forget everything. Nothing is emitted afterwards.
  pub fn cancel(&mut self) {
    self.buffer.clear();
    self.latch = Latch::Closed;
  }

  fn release(&mut self, out: &mut VecDeque<Emission<Item, Err>>) -> usize {
    let mut released = self.buffer.len();
    out.extend(self.buffer.drain().map(Emission::Next));
    match std::mem::replace(&mut self.latch, Latch::Closed) {
      Latch::Open => self.latch = Latch::Open,
      Latch::Value(value) => {
        released += 1;
        out.push_back(Emission::Next(value));
        out.push_back(Emission::Complete);
      }
      Latch::Completed => out.push_back(Emission::Complete),
      Latch::Failed(err) => out.push_back(Emission::Error(err)),
      Latch::Closed => {}
    }
    released
  }
}

impl<Item, Err, R> FreezeMachine<Item, Err, R>
where
  R: ReplaceFrozen<Item, Err>,
{
  pub fn on_value(&mut self, value: Item, out: &mut VecDeque<Emission<Item, Err>>) {
    if !self.accepts_input() {
      return;
    }
    match self.cardinality.arity {
      Arity::Empty => {}
      Arity::Many if self.frozen => {
        if let Err(err) = self.buffer.insert(value, &mut self.replace) {
          self.force_error(err, out);
        }
      }
      Arity::Many => out.push_back(Emission::Next(value)),
      Arity::One if self.frozen => self.latch = Latch::Value(value),
      Arity::One => {
        out.push_back(Emission::Next(value));
        out.push_back(Emission::Complete);
        self.latch = Latch::Closed;
      }
    }
  }
}
