//! Execution contexts.
//!
//! Every observable and observer travels wrapped in a context. The context
//! decides which shared pointer and which boxed types operators use:
//! `Local` for single-threaded pipelines, `Shared` when producers, the freeze
//! selector, or cancellation may run on different threads.
//!
//! ## Constructors
//! - `new`: wrap a value
//! - `lift<U>`: wrap a value in the same context family, producing `With<U>`
//!
//! ## Combinators
//! - `transform`: map the inner value
//! - `wrap<U>`: wrap a new value next to `self`
//! - `swap<U>`: exchange the inner value, returning the old one
//!
//! ## Destructors
//! - `into_inner`

pub use crate::rc::*;
use crate::{
  observer::{BoxedObserver, BoxedObserverSend, Observer},
  subscription::{BoxedSubscription, BoxedSubscriptionSend, Subscription},
};

pub trait Context: Sized {
  type Inner;

  type RcMut<T>: From<T> + Clone + RcDerefMut<Target = T>;
  type BoxedSubscription: Subscription;
  type BoxedObserver<'a, Item, Err>;

  type With<T>: Context<Inner = T>;

  fn new(inner: Self::Inner) -> Self;

  /// Lift a value into this context family.
  ///
  /// Operators use it to wrap the observers they hand to their upstreams.
  fn lift<U>(inner: U) -> Self::With<U>;

  fn transform<U, F>(self, f: F) -> Self::With<U>
  where
    F: FnOnce(Self::Inner) -> U;

  fn wrap<U>(&self, inner: U) -> Self::With<U>;

  /// Used at subscribe boundaries to exchange the observable for its observer.
  fn swap<U>(self, inner: U) -> (Self::Inner, Self::With<U>);

  fn inner(&self) -> &Self::Inner;

  fn inner_mut(&mut self) -> &mut Self::Inner;

  fn into_inner(self) -> Self::Inner;
}

/// Single-threaded context backed by `Rc<RefCell<_>>`.
#[derive(Clone, Default)]
pub struct Local<T> {
  pub inner: T,
}

/// Thread-safe context backed by `Arc<Mutex<_>>`. Observers and subscriptions
/// stored by operators must be `Send`.
#[derive(Clone, Default)]
pub struct Shared<T> {
  pub inner: T,
}

macro_rules! impl_context_for_container {
  ($Struct:ident, $RcMutType:ident, $BoxedObserver:ident, $BoxedSubscription:ty) => {
    impl<T> Context for $Struct<T> {
      type Inner = T;
      type RcMut<U> = $RcMutType<U>;
      type BoxedSubscription = $BoxedSubscription;
      type BoxedObserver<'a, Item, Err> = $BoxedObserver<'a, Item, Err>;
      type With<U> = $Struct<U>;

      fn new(inner: T) -> Self { $Struct { inner } }

      fn lift<U>(inner: U) -> $Struct<U> { $Struct { inner } }

      fn transform<U, F>(self, f: F) -> $Struct<U>
      where
        F: FnOnce(T) -> U,
      {
        $Struct { inner: f(self.inner) }
      }

      fn wrap<U>(&self, inner: U) -> $Struct<U> { $Struct { inner } }

      fn swap<U>(self, new_inner: U) -> (T, $Struct<U>) { (self.inner, $Struct { inner: new_inner }) }

      fn inner(&self) -> &T { &self.inner }

      fn inner_mut(&mut self) -> &mut T { &mut self.inner }

      fn into_inner(self) -> T { self.inner }
    }
  };
}

impl_context_for_container!(Local, MutRc, BoxedObserver, BoxedSubscription);
impl_context_for_container!(Shared, MutArc, BoxedObserverSend, BoxedSubscriptionSend);

// A context around an observer or a subscription behaves as the wrapped value,
// so `Local<Subject<..>>` can be emitted to and a `Local<U>` handle cancelled.
macro_rules! impl_observer_and_subscription {
  ($Struct:ident $(+ $Bound:ident)?) => {
    impl<Item, Err, Inner: Observer<Item, Err> $(+ $Bound)?> Observer<Item, Err> for $Struct<Inner> {
      fn next(&mut self, value: Item) { self.inner.next(value); }
      fn error(self, err: Err) { self.inner.error(err); }
      fn complete(self) { self.inner.complete(); }
      fn is_closed(&self) -> bool { self.inner.is_closed() }
    }

    impl<Inner: Subscription $(+ $Bound)?> Subscription for $Struct<Inner> {
      fn unsubscribe(self) { self.inner.unsubscribe(); }
      fn is_closed(&self) -> bool { self.inner.is_closed() }
    }
  };
}

impl_observer_and_subscription!(Local);
impl_observer_and_subscription!(Shared + Send);

impl<T: Send> Local<T> {
  /// Moves the value into a `Shared` context.
  pub fn into_shared(self) -> Shared<T> { Shared::new(self.inner) }
}

impl<T> Shared<T> {
  pub fn into_local(self) -> Local<T> { Local::new(self.inner) }
}
