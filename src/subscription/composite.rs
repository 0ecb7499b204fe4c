use super::{DynamicSubscriptions, Subscription};
use crate::rc::{MutArc, MutRc, RcDerefMut};

#[doc(hidden)]
pub struct CompositeState<U> {
  subs: DynamicSubscriptions<U>,
  closed: bool,
}

impl<U> Default for CompositeState<U> {
  fn default() -> Self { Self { subs: DynamicSubscriptions::default(), closed: false } }
}

/// A shared bag of subscriptions cancelled together.
///
/// Clones share the same bag. Once the composite is unsubscribed, every
/// subscription added later is cancelled on the spot. Entries are always
/// cancelled outside the lock, so a cancelled subscription may call back into
/// the composite.
pub struct CompositeSubscription<P> {
  inner: P,
}

pub type LocalCompositeSubscription<U> = CompositeSubscription<MutRc<CompositeState<U>>>;
pub type SharedCompositeSubscription<U> = CompositeSubscription<MutArc<CompositeState<U>>>;

impl<P: Clone> Clone for CompositeSubscription<P> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<U: Subscription> Default for LocalCompositeSubscription<U> {
  fn default() -> Self { Self::new() }
}

impl<U: Subscription> Default for SharedCompositeSubscription<U> {
  fn default() -> Self { Self::new() }
}

impl<P, U> CompositeSubscription<P>
where
  P: RcDerefMut<Target = CompositeState<U>>,
  U: Subscription,
{
  pub fn new() -> Self
  where
    P: From<CompositeState<U>>,
  {
    Self { inner: P::from(CompositeState::default()) }
  }

  /// Track `sub`. Returns its id, or `None` when the composite is already
  /// closed and `sub` has been cancelled instead.
  pub fn add(&self, sub: U) -> Option<usize> {
    let rejected = {
      let mut state = self.inner.rc_deref_mut();
      if !state.closed {
        return Some(state.subs.add(sub));
      }
      sub
    };
    rejected.unsubscribe();
    None
  }

  /// Stop tracking `id` without cancelling it.
  pub fn remove(&self, id: usize) -> Option<U> { self.inner.rc_deref_mut().subs.remove(id) }

  /// Cancel and forget `id`. Returns whether it was still tracked.
  pub fn cancel(&self, id: usize) -> bool {
    let removed = self.remove(id);
    let found = removed.is_some();
    removed.unsubscribe();
    found
  }

  pub fn contains(&self, id: usize) -> bool { self.inner.rc_deref().subs.contains(id) }

  /// Whether the entry `id` is gone or its subscription has finished.
  pub fn is_entry_closed(&self, id: usize) -> bool {
    self.inner.rc_deref().subs.get(id).is_none_or(U::is_closed)
  }

  /// Forget the tracked subscriptions that have already finished. Returns how
  /// many were dropped.
  pub fn prune_closed(&self) -> usize {
    let finished = self.inner.rc_deref_mut().subs.remove_where(U::is_closed);
    finished.len()
  }

  pub fn len(&self) -> usize { self.inner.rc_deref().subs.len() }

  pub fn is_empty(&self) -> bool { self.inner.rc_deref().subs.is_empty() }

  /// Cancel every tracked subscription but keep accepting new ones.
  pub fn clear(&self) {
    let taken: Vec<U> = self.inner.rc_deref_mut().subs.drain().collect();
    taken.into_iter().for_each(Subscription::unsubscribe);
  }
}

impl<P, U> Subscription for CompositeSubscription<P>
where
  P: RcDerefMut<Target = CompositeState<U>>,
  U: Subscription,
{
  fn unsubscribe(self) {
    let taken: Vec<U> = {
      let mut state = self.inner.rc_deref_mut();
      state.closed = true;
      state.subs.drain().collect()
    };
    taken.into_iter().for_each(Subscription::unsubscribe);
  }

  fn is_closed(&self) -> bool { self.inner.rc_deref().closed }
}
