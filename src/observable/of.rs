use std::convert::Infallible;

use crate::{
  context::Context,
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Emits one value, then completes.
#[derive(Clone)]
pub struct Of<T>(pub T);

impl<T> ObservableType for Of<T> {
  type Item = T;
  type Err = Infallible;
}

impl<C, T> CoreObservable<C> for Of<T>
where
  C: Context,
  C::Inner: Observer<T, Infallible>,
{
  type Unsub = ();

  fn subscribe(self, context: C) -> Self::Unsub {
    let mut observer = context.into_inner();
    observer.next(self.0);
    observer.complete();
  }
}
