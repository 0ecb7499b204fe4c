use super::{subscribers::Subscribers, Subject};
use crate::{
  context::{Context, RcDeref},
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// A `Subject` that holds a current value.
///
/// Every new subscriber receives the current value first, then whatever the
/// subject emits afterwards. The current value follows delivery order: it
/// changes when a value is handed to the observers, not when it is queued
/// behind an emission in progress.
///
/// ```rust
/// use std::{cell::RefCell, convert::Infallible, rc::Rc};
///
/// use rxferro::prelude::*;
///
/// let frozen = Local::behavior_subject::<bool, Infallible>(true);
/// frozen.clone().next(false);
///
/// let seen = Rc::new(RefCell::new(vec![]));
/// let sink = seen.clone();
/// frozen
///   .clone()
///   .subscribe(move |v| sink.borrow_mut().push(v));
/// assert_eq!(*seen.borrow(), vec![false]);
/// assert!(!frozen.inner.value());
/// ```
pub struct BehaviorSubject<P> {
  pub subject: Subject<P>,
}

impl<P: Clone> Clone for BehaviorSubject<P> {
  fn clone(&self) -> Self { Self { subject: self.subject.clone() } }
}

impl<P> BehaviorSubject<P> {
  pub fn new<Ob, Item, Err>(initial: Item) -> Self
  where
    P: RcDeref<Target = Subscribers<Ob, Item, Err>> + From<Subscribers<Ob, Item, Err>>,
  {
    Self { subject: Subject { observers: P::from(Subscribers::with_latest(initial)) } }
  }

  /// The value most recently delivered, or the initial one.
  pub fn value<Ob, Item, Err>(&self) -> Item
  where
    P: RcDeref<Target = Subscribers<Ob, Item, Err>>,
    Item: Clone,
  {
    self
      .subject
      .observers
      .rc_deref()
      .latest()
      .cloned()
      .expect("behavior subject always holds a value")
  }
}

impl<P, Item, Err> Observer<Item, Err> for BehaviorSubject<P>
where
  Subject<P>: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) { self.subject.next(value) }

  fn error(self, err: Err) { self.subject.error(err) }

  fn complete(self) { self.subject.complete() }

  fn is_closed(&self) -> bool { self.subject.is_closed() }
}

impl<P> ObservableType for BehaviorSubject<P>
where
  Subject<P>: ObservableType,
{
  type Item = <Subject<P> as ObservableType>::Item;
  type Err = <Subject<P> as ObservableType>::Err;
}

impl<P, C> CoreObservable<C> for BehaviorSubject<P>
where
  C: Context,
  Subject<P>: CoreObservable<C>,
{
  type Unsub = <Subject<P> as CoreObservable<C>>::Unsub;

  fn subscribe(self, context: C) -> Self::Unsub { self.subject.subscribe(context) }
}
