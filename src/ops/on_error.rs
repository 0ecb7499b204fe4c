use std::convert::Infallible;

use crate::{
  context::Context,
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Hands the error to `func` and turns the stream into one that cannot fail.
#[derive(Clone)]
pub struct OnError<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S: ObservableType, F> ObservableType for OnError<S, F> {
  type Item = S::Item;
  type Err = Infallible;
}

impl<C, S, F> CoreObservable<C> for OnError<S, F>
where
  C: Context,
  S: CoreObservable<C::With<OnErrorObserver<C::Inner, F>>>,
  F: FnOnce(S::Err),
{
  type Unsub = S::Unsub;

  fn subscribe(self, context: C) -> Self::Unsub {
    let func = self.func;
    self
      .source
      .subscribe(context.transform(|observer| OnErrorObserver { observer, func }))
  }
}

pub struct OnErrorObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for OnErrorObserver<O, F>
where
  O: Observer<Item, Infallible>,
  F: FnOnce(Err),
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  #[inline]
  fn error(self, err: Err) { (self.func)(err); }

  #[inline]
  fn complete(self) { self.observer.complete(); }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
