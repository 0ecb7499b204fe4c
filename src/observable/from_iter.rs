use std::convert::Infallible;

use crate::{
  context::Context,
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Emits every item of an iterator, then completes. Stops early once the
/// observer is closed.
#[derive(Clone)]
pub struct FromIter<I>(pub I);

impl<I: IntoIterator> ObservableType for FromIter<I> {
  type Item = I::Item;
  type Err = Infallible;
}

impl<C, I> CoreObservable<C> for FromIter<I>
where
  C: Context,
  I: IntoIterator,
  C::Inner: Observer<I::Item, Infallible>,
{
  type Unsub = ();

  fn subscribe(self, context: C) -> Self::Unsub {
    let mut observer = context.into_inner();
    for v in self.0 {
      if observer.is_closed() {
        return;
      }
      observer.next(v);
    }
    observer.complete();
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[rxferro_macro::test]
  fn emits_in_order() {
    let values = Rc::new(RefCell::new(vec![]));
    let sink = values.clone();

    Local::from_iter(0..4).subscribe(move |v| sink.borrow_mut().push(v));

    assert_eq!(*values.borrow(), vec![0, 1, 2, 3]);
  }
}
