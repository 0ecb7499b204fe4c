//! Cancellation handles.
//!
//! Subscribing returns a `Subscription`. Unsubscribing consumes the handle,
//! so a handle cannot be cancelled twice; shared handles such as
//! `CompositeSubscription` make repeated cancellation a no-op instead.

mod boxed;
mod composite;
mod dynamic;

pub use boxed::*;
pub use composite::*;
pub use dynamic::*;

pub trait Subscription {
  /// Cancel the work behind this handle. No events are delivered to the
  /// subscribed observer afterwards.
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;
}

/// A finished subscription: nothing to cancel.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<U: Subscription> Subscription for Option<U> {
  fn unsubscribe(self) {
    if let Some(inner) = self {
      inner.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().is_none_or(U::is_closed) }
}

/// Runs a closure on unsubscribe.
pub struct ClosureSubscription<F>(pub F);

impl<F: FnOnce()> Subscription for ClosureSubscription<F> {
  fn unsubscribe(self) { (self.0)() }

  fn is_closed(&self) -> bool { false }
}
