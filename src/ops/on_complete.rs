use crate::{
  context::Context,
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Runs `func` when the source completes, before passing completion on.
#[derive(Clone)]
pub struct OnComplete<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S: ObservableType, F> ObservableType for OnComplete<S, F> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<C, S, F> CoreObservable<C> for OnComplete<S, F>
where
  C: Context,
  S: CoreObservable<C::With<OnCompleteObserver<C::Inner, F>>>,
  F: FnOnce(),
{
  type Unsub = S::Unsub;

  fn subscribe(self, context: C) -> Self::Unsub {
    let func = self.func;
    self
      .source
      .subscribe(context.transform(|observer| OnCompleteObserver { observer, func }))
  }
}

pub struct OnCompleteObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for OnCompleteObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) {
    (self.func)();
    self.observer.complete();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[rxferro_macro::test]
  fn runs_before_downstream_completion() {
    let log = Rc::new(RefCell::new(vec![]));
    let (on_complete, on_next) = (log.clone(), log.clone());

    Local::from_iter([1, 2])
      .on_complete(move || on_complete.borrow_mut().push("complete"))
      .subscribe(move |_| on_next.borrow_mut().push("next"));

    assert_eq!(*log.borrow(), vec!["next", "next", "complete"]);
  }

  #[rxferro_macro::test]
  fn not_called_on_error() {
    let called = Rc::new(RefCell::new(false));
    let flag = called.clone();

    Local::throw_err::<i32, _>("oops")
      .on_complete(move || *flag.borrow_mut() = true)
      .on_error(|_| {})
      .subscribe(|_| {});

    assert!(!*called.borrow());
  }
}
