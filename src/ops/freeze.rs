//! The freeze operator.
//!
//! `Freeze` holds back a source's events while a boolean selector says
//! frozen, and replays them in order once it says otherwise. Each
//! subscription owns a `FreezeCore`: the `FreezeMachine`, an outbox of
//! pending emissions, the downstream observer and the teardown handles of the
//! source and the selector.
//!
//! Inputs may arrive from any thread. Every input locks the core, runs the
//! machine, and unlocks. Delivery happens outside the lock through an emit
//! loop: the caller that finds emissions queued and nobody delivering takes
//! the downstream observer out and hands it one emission per lock round, so
//! the downstream never sees concurrent or re-entrant calls. Input arriving
//! during delivery (from another thread, or from the downstream callback
//! itself) is queued behind it.

mod buffer;
mod cardinality;
mod state;

use std::collections::VecDeque;

pub use buffer::*;
pub use cardinality::*;
pub use state::*;

use crate::{
  context::Context,
  error::FreezeError,
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  rc::RcDerefMut,
  subscription::{IntoBoxedSubscription, Subscription},
};

/// Error conversions a `Freeze` needs: the selector's error into the
/// source's, and optionally `FreezeError` into the source's.
pub struct FreezeErrors<SE, E> {
  selector: fn(SE) -> E,
  abnormal: Option<fn(FreezeError) -> E>,
}

impl<SE, E> FreezeErrors<SE, E> {
  pub fn new(selector: fn(SE) -> E) -> Self { Self { selector, abnormal: None } }

  /// Report abnormal endings of single-value shapes as errors.
  pub fn with_abnormal(mut self, abnormal: fn(FreezeError) -> E) -> Self {
    self.abnormal = Some(abnormal);
    self
  }
}

impl<SE, E> Clone for FreezeErrors<SE, E> {
  fn clone(&self) -> Self { *self }
}

impl<SE, E> Copy for FreezeErrors<SE, E> {}

/// Source `S` frozen by selector `Sel`, compacted by `R`.
#[derive(Clone)]
pub struct Freeze<S, Sel, R, M> {
  source: S,
  selector: Sel,
  replace: R,
  cardinality: Cardinality,
  errors: M,
}

impl<S, Sel, R, SE, E> Freeze<S, Sel, R, FreezeErrors<SE, E>> {
  pub fn new(
    source: S, selector: Sel, replace: R, cardinality: Cardinality, errors: FreezeErrors<SE, E>,
  ) -> Self {
    Self { source, selector, replace, cardinality, errors }
  }
}

impl<S: ObservableType, Sel, R, M> ObservableType for Freeze<S, Sel, R, M> {
  type Item = S::Item;
  type Err = S::Err;
}

/// The shared state of one frozen subscription in context `C`.
pub type FreezeCorePtr<C, Item, Err, R> = <C as Context>::RcMut<
  FreezeCore<<C as Context>::Inner, Item, Err, R, <C as Context>::BoxedSubscription>,
>;

impl<C, S, Sel, R, Item, SE, E> CoreObservable<C> for Freeze<S, Sel, R, FreezeErrors<SE, E>>
where
  C: Context,
  C::Inner: Observer<Item, E>,
  S: ObservableType<Item = Item, Err = E>
    + CoreObservable<C::With<FreezeSourceObserver<FreezeCorePtr<C, Item, E, R>>>>,
  Sel: ObservableType<Item = bool, Err = SE>
    + CoreObservable<C::With<FreezeSelectorObserver<FreezeCorePtr<C, Item, E, R>, SE, E>>>,
  R: ReplaceFrozen<Item, E>,
  S::Unsub: IntoBoxedSubscription<C::BoxedSubscription>,
  Sel::Unsub: IntoBoxedSubscription<C::BoxedSubscription>,
{
  type Unsub = FreezeSubscription<FreezeCorePtr<C, Item, E, R>>;

  fn subscribe(self, context: C) -> Self::Unsub {
    let Freeze { source, selector, replace, cardinality, errors } = self;
    let machine = FreezeMachine::new(cardinality, replace, errors.abnormal);
    let core: FreezeCorePtr<C, Item, E, R> = FreezeCore::new(machine, context.into_inner()).into();

    let selector_unsub = selector.subscribe(C::lift(FreezeSelectorObserver {
      core: core.clone(),
      convert: errors.selector,
    }));
    attach(&core, Slot::Selector, selector_unsub.into_boxed());

    let source_unsub = source.subscribe(C::lift(FreezeSourceObserver { core: core.clone() }));
    attach(&core, Slot::Source, source_unsub.into_boxed());

    FreezeSubscription { core }
  }
}

#[doc(hidden)]
pub struct FreezeCore<O, Item, Err, R, U> {
  machine: FreezeMachine<Item, Err, R>,
  outbox: VecDeque<Emission<Item, Err>>,
  /// `None` while an emit loop holds it, or once it is finished.
  observer: Option<O>,
  emitting: bool,
  cancelled: bool,
  /// A terminal event has been handed downstream.
  finished: bool,
  source: Teardown<U>,
  selector: Teardown<U>,
}

struct Teardown<U> {
  attached: bool,
  handle: Option<U>,
}

impl<U> Teardown<U> {
  fn new() -> Self { Self { attached: false, handle: None } }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
  Source,
  Selector,
}

impl<O, Item, Err, R, U> FreezeCore<O, Item, Err, R, U> {
  fn new(machine: FreezeMachine<Item, Err, R>, observer: O) -> Self {
    Self {
      machine,
      outbox: VecDeque::new(),
      observer: Some(observer),
      emitting: false,
      cancelled: false,
      finished: false,
      source: Teardown::new(),
      selector: Teardown::new(),
    }
  }

  fn take_handles(&mut self) -> [Option<U>; 2] {
    [self.selector.handle.take(), self.source.handle.take()]
  }

  fn is_closed(&self) -> bool { self.cancelled || self.finished }
}

fn attach<P, O, Item, Err, R, U>(core: &P, slot: Slot, handle: U)
where
  P: RcDerefMut<Target = FreezeCore<O, Item, Err, R, U>>,
  U: Subscription,
{
  let rejected = {
    let mut guard = core.rc_deref_mut();
    let core = &mut *guard;
    let closed = core.cancelled || core.machine.is_closed();
    let teardown = match slot {
      Slot::Source => &mut core.source,
      Slot::Selector => &mut core.selector,
    };
    if teardown.attached {
      tracing::warn!(slot = ?slot, "freeze subscription already attached, rejecting");
      Some(handle)
    } else {
      teardown.attached = true;
      if closed {
        Some(handle)
      } else {
        teardown.handle = Some(handle);
        None
      }
    }
  };
  rejected.unsubscribe();
}

/// Feed one input to the machine, tear down if it closed, then deliver.
fn dispatch<P, O, Item, Err, R, U, F>(core: &P, input: F)
where
  P: RcDerefMut<Target = FreezeCore<O, Item, Err, R, U>>,
  O: Observer<Item, Err>,
  U: Subscription,
  F: FnOnce(&mut FreezeMachine<Item, Err, R>, &mut VecDeque<Emission<Item, Err>>),
{
  let (handles, observer) = {
    let mut guard = core.rc_deref_mut();
    let core = &mut *guard;
    if core.cancelled {
      return;
    }
    input(&mut core.machine, &mut core.outbox);

    let handles = if core.machine.is_closed() { core.take_handles() } else { [None, None] };
    let observer = if !core.emitting && !core.outbox.is_empty() {
      core.observer.take()
    } else {
      None
    };
    core.emitting |= observer.is_some();
    (handles, observer)
  };

  handles.into_iter().for_each(Subscription::unsubscribe);
  if let Some(observer) = observer {
    drain(core, observer);
  }
}

enum Step<Item, Err> {
  Deliver(Emission<Item, Err>),
  Abandon,
}

// The emit loop. The caller has set `emitting` and owns the observer.
fn drain<P, O, Item, Err, R, U>(core: &P, mut observer: O)
where
  P: RcDerefMut<Target = FreezeCore<O, Item, Err, R, U>>,
  O: Observer<Item, Err>,
{
  loop {
    let step = {
      let mut guard = core.rc_deref_mut();
      if guard.cancelled {
        guard.emitting = false;
        Step::Abandon
      } else {
        match guard.outbox.pop_front() {
          Some(emission) => {
            if emission.is_terminal() {
              guard.finished = true;
            }
            Step::Deliver(emission)
          }
          None => {
            guard.emitting = false;
            guard.observer = Some(observer);
            return;
          }
        }
      }
    };

    match step {
      Step::Deliver(Emission::Next(value)) => observer.next(value),
      Step::Deliver(Emission::Error(err)) => {
        observer.error(err);
        return;
      }
      Step::Deliver(Emission::Complete) => {
        observer.complete();
        return;
      }
      // Dropped outside the lock.
      Step::Abandon => {
        drop(observer);
        return;
      }
    }
  }
}

/// Observer handed to the source.
pub struct FreezeSourceObserver<P> {
  core: P,
}

impl<P, O, Item, Err, R, U> Observer<Item, Err> for FreezeSourceObserver<P>
where
  P: RcDerefMut<Target = FreezeCore<O, Item, Err, R, U>>,
  O: Observer<Item, Err>,
  R: ReplaceFrozen<Item, Err>,
  U: Subscription,
{
  fn next(&mut self, value: Item) {
    dispatch(&self.core, |machine, out| machine.on_value(value, out));
  }

  fn error(self, err: Err) {
    dispatch(&self.core, |machine, out| {
      if machine.accepts_input() && machine.is_frozen() {
        tracing::debug!(held = machine.held(), "source failed while frozen, latching error");
      }
      machine.on_error(err, out)
    });
  }

  fn complete(self) { dispatch(&self.core, |machine, out| machine.on_complete(out)); }

  fn is_closed(&self) -> bool {
    let core = self.core.rc_deref();
    core.cancelled || !core.machine.accepts_input()
  }
}

/// Observer handed to the selector.
pub struct FreezeSelectorObserver<P, SE, E> {
  core: P,
  convert: fn(SE) -> E,
}

impl<P, O, Item, SE, E, R, U> Observer<bool, SE> for FreezeSelectorObserver<P, SE, E>
where
  P: RcDerefMut<Target = FreezeCore<O, Item, E, R, U>>,
  O: Observer<Item, E>,
  R: ReplaceFrozen<Item, E>,
  U: Subscription,
{
  fn next(&mut self, frozen: bool) {
    dispatch(&self.core, |machine, out| {
      let released = machine.set_frozen(frozen, out);
      if released > 0 {
        tracing::debug!(released, "freeze selector released held values");
      }
    });
  }

  fn error(self, err: SE) {
    let err = (self.convert)(err);
    dispatch(&self.core, |machine, out| {
      tracing::debug!(dropped = machine.held(), "freeze selector failed, forcing error");
      machine.force_error(err, out)
    });
  }

  fn complete(self) {
    dispatch(&self.core, |machine, out| {
      tracing::debug!(
        dropped = machine.held(),
        arity = ?machine.cardinality().arity,
        "freeze selector completed, forcing terminal event"
      );
      machine.force_complete(out)
    });
  }

  fn is_closed(&self) -> bool { self.core.rc_deref().machine.is_closed() }
}

/// Cancels a frozen subscription: both upstream subscriptions are cancelled
/// and nothing more reaches the downstream observer. Safe to call from any
/// thread, and from inside the downstream observer.
pub struct FreezeSubscription<P> {
  core: P,
}

impl<P: Clone> Clone for FreezeSubscription<P> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<P, O, Item, Err, R, U> Subscription for FreezeSubscription<P>
where
  P: RcDerefMut<Target = FreezeCore<O, Item, Err, R, U>>,
  U: Subscription,
{
  fn unsubscribe(self) {
    let (handles, observer, outbox) = {
      let mut guard = self.core.rc_deref_mut();
      let core = &mut *guard;
      if core.cancelled {
        return;
      }
      core.cancelled = true;
      core.machine.cancel();
      (core.take_handles(), core.observer.take(), std::mem::take(&mut core.outbox))
    };
    drop((observer, outbox));
    handles.into_iter().for_each(Subscription::unsubscribe);
  }

  fn is_closed(&self) -> bool { self.core.rc_deref().is_closed() }
}
