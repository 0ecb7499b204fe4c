use super::subscribers::Subscribers;
use crate::{rc::RcDerefMut, subscription::Subscription};

/// Handle removing one observer from a subject.
///
/// The removed observer is dropped after the subject's lock is released, so
/// dropping it may touch the subject again.
pub struct SubjectSubscription<P> {
  observers: P,
  id: Option<usize>,
}

impl<P> SubjectSubscription<P> {
  pub(crate) fn new(observers: P, id: Option<usize>) -> Self { Self { observers, id } }
}

impl<P, Ob, Item, Err> Subscription for SubjectSubscription<P>
where
  P: RcDerefMut<Target = Subscribers<Ob, Item, Err>>,
{
  fn unsubscribe(self) {
    if let Some(id) = self.id {
      let removed = self.observers.rc_deref_mut().remove(id);
      drop(removed);
    }
  }

  fn is_closed(&self) -> bool {
    match self.id {
      None => true,
      Some(id) => {
        let subscribers = self.observers.rc_deref();
        subscribers.is_stopped() || (!subscribers.is_emitting() && !subscribers.contains(id))
      }
    }
  }
}
