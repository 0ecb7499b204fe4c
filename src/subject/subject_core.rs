use super::{
  subject_subscription::SubjectSubscription,
  subscribers::{emit, join, Pending, Subscribers},
};
use crate::{
  context::{Context, MutArc, MutRc, RcDeref},
  observable::{CoreObservable, ObservableType},
  observer::{BoxedObserver, BoxedObserverSend, IntoBoxedObserver, Observer},
};

/// A hot source that multicasts whatever it receives.
///
/// `Subject` is both an `Observer` and an observable. Clones share one
/// observer list, so the usual pattern is to keep one clone for pushing and
/// subscribe through others.
///
/// ```rust
/// use std::{cell::RefCell, convert::Infallible, rc::Rc};
///
/// use rxferro::prelude::*;
///
/// let subject = Local::subject::<i32, Infallible>();
/// let results = Rc::new(RefCell::new(vec![]));
/// let sink = results.clone();
///
/// subject.clone().subscribe(move |v| sink.borrow_mut().push(v));
///
/// let mut input = subject.clone();
/// input.next(1);
/// input.next(2);
/// assert_eq!(*results.borrow(), vec![1, 2]);
/// ```
///
/// # Re-entrancy
///
/// Emitting from inside one of the subject's own callbacks, or from another
/// thread while an emission runs, does not deliver immediately: the event is
/// queued and delivered, in order, once the current emission finishes.
/// Observers subscribed during an emission do not receive it. Observers
/// unsubscribed during an emission may still receive it, but nothing after.
///
/// Once the subject errors or completes it ignores further events, and late
/// subscribers receive the terminal event right away.
pub struct Subject<P> {
  pub observers: P,
}

impl<P> Subject<P>
where
  P: RcDeref + From<P::Target>,
  P::Target: Default,
{
  pub fn new() -> Self { Self { observers: P::from(P::Target::default()) } }
}

impl<P> Default for Subject<P>
where
  P: RcDeref + From<P::Target>,
  P::Target: Default,
{
  fn default() -> Self { Self::new() }
}

impl<P: Clone> Clone for Subject<P> {
  fn clone(&self) -> Self { Self { observers: self.observers.clone() } }
}

impl<P, Ob, Item, Err> Subject<P>
where
  P: RcDeref<Target = Subscribers<Ob, Item, Err>>,
{
  /// Number of active observers, not counting ones mid-delivery.
  pub fn subscriber_count(&self) -> usize { self.observers.rc_deref().len() }

  pub fn is_empty(&self) -> bool { self.observers.rc_deref().is_empty() }

  /// Whether the subject has errored or completed.
  pub fn is_stopped(&self) -> bool { self.observers.rc_deref().is_stopped() }
}

macro_rules! impl_subject {
  ($ptr:ident, $obs:ident) => {
    impl<'a, Item, Err> Observer<Item, Err> for Subject<$ptr<Subscribers<$obs<'a, Item, Err>, Item, Err>>>
    where
      Item: Clone,
      Err: Clone,
    {
      fn next(&mut self, value: Item) { emit(&self.observers, Pending::Next(value)); }

      fn error(self, err: Err) { emit(&self.observers, Pending::Error(err)); }

      fn complete(self) { emit(&self.observers, Pending::Complete); }

      fn is_closed(&self) -> bool { self.observers.rc_deref().is_stopped() }
    }

    impl<'a, Item, Err> ObservableType
      for Subject<$ptr<Subscribers<$obs<'a, Item, Err>, Item, Err>>>
    {
      type Item = Item;
      type Err = Err;
    }

    impl<'a, Item, Err, C> CoreObservable<C>
      for Subject<$ptr<Subscribers<$obs<'a, Item, Err>, Item, Err>>>
    where
      C: Context,
      C::Inner: IntoBoxedObserver<$obs<'a, Item, Err>>,
      Item: Clone,
      Err: Clone,
    {
      type Unsub = SubjectSubscription<$ptr<Subscribers<$obs<'a, Item, Err>, Item, Err>>>;

      fn subscribe(self, context: C) -> Self::Unsub {
        let boxed = context.into_inner().into_boxed();
        let id = join(&self.observers, boxed);
        SubjectSubscription::new(self.observers, id)
      }
    }
  };
}

impl_subject!(MutRc, BoxedObserver);
impl_subject!(MutArc, BoxedObserverSend);
