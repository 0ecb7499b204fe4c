//! The consumer side of a stream.
//!
//! An `Observer` receives any number of values followed by at most one
//! terminal event. Terminal methods take `self` so a finished observer cannot
//! be called again.

use std::convert::Infallible;

pub trait Observer<Item, Err> {
  fn next(&mut self, value: Item);

  /// Deliver the error and finish the stream.
  fn error(self, err: Err);

  /// Finish the stream normally.
  fn complete(self);

  /// Whether the observer no longer accepts values. Synchronous sources use
  /// this to stop emitting early.
  fn is_closed(&self) -> bool;
}

/// `&mut self` facade over an observer, handed to `create` closures as
/// `&mut dyn Emitter` so the producer never sees the concrete observer type.
pub trait Emitter<Item, Err> {
  fn next(&mut self, value: Item);
  fn error(&mut self, err: Err);
  fn complete(&mut self);
  fn is_closed(&self) -> bool;
}

/// Object-safe mirror of `Observer`, used to store heterogeneous observers in
/// subjects.
pub trait DynObserver<Item, Err> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: Err);
  fn box_complete(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: Err) { self.error(err); }
  fn box_complete(self: Box<Self>) { self.complete(); }
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

macro_rules! impl_observer_for_box {
  ($ty:ty) => {
    impl<'a, Item, Err> Observer<Item, Err> for $ty {
      #[inline]
      fn next(&mut self, value: Item) { (**self).box_next(value) }

      #[inline]
      fn error(self, err: Err) { self.box_error(err) }

      #[inline]
      fn complete(self) { self.box_complete() }

      #[inline]
      fn is_closed(&self) -> bool { (**self).box_is_closed() }
    }
  };
}

impl_observer_for_box!(Box<dyn DynObserver<Item, Err> + 'a>);
impl_observer_for_box!(Box<dyn DynObserver<Item, Err> + Send + 'a>);

/// Boxed observer for the `Local` context.
pub type BoxedObserver<'a, Item, Err> = Box<dyn DynObserver<Item, Err> + 'a>;

/// Boxed observer for the `Shared` context.
pub type BoxedObserverSend<'a, Item, Err> = Box<dyn DynObserver<Item, Err> + Send + 'a>;

/// Converts a concrete observer into the boxed form its context stores.
pub trait IntoBoxedObserver<O> {
  fn into_boxed(self) -> O;
}

impl<'a, Item, Err, O> IntoBoxedObserver<BoxedObserver<'a, Item, Err>> for O
where
  O: Observer<Item, Err> + 'a,
{
  fn into_boxed(self) -> BoxedObserver<'a, Item, Err> { Box::new(self) }
}

impl<'a, Item, Err, O> IntoBoxedObserver<BoxedObserverSend<'a, Item, Err>> for O
where
  O: Observer<Item, Err> + Send + 'a,
{
  fn into_boxed(self) -> BoxedObserverSend<'a, Item, Err> { Box::new(self) }
}

/// A closure receiving values of a stream that cannot fail. Completion is
/// ignored; attach `on_complete` upstream to observe it.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item> Observer<Item, Infallible> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }

  #[inline]
  fn error(self, err: Infallible) { match err {} }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Collect {
    values: Vec<i32>,
  }

  impl Observer<i32, ()> for Collect {
    fn next(&mut self, value: i32) { self.values.push(value); }

    fn error(self, _: ()) {}

    fn complete(self) {}

    fn is_closed(&self) -> bool { false }
  }

  #[rxferro_macro::test]
  fn closure_as_observer() {
    let mut count = 0;
    let mut closure_obs = FnMutObserver(|v: i32| count += v);

    closure_obs.next(10);
    closure_obs.next(20);
    assert_eq!(count, 30);
  }

  #[rxferro_macro::test]
  fn boxed_observer_delegates() {
    let mut boxed: BoxedObserver<'_, i32, ()> = Collect { values: vec![] }.into_boxed();
    boxed.next(1);
    assert!(!boxed.is_closed());
    boxed.complete();
  }
}
