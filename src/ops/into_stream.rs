//! Bridge from a push stream to `futures::Stream`.
//!
//! Values are queued as they arrive and handed out on poll, so an async task
//! can await a frozen stream:
//!
//! ```rust
//! use futures::StreamExt;
//! use rxferro::prelude::*;
//!
//! # async fn example() {
//! let mut stream = Local::of(1).into_stream();
//!
//! if let Some(Ok(value)) = stream.next().await {
//!   println!("Received: {}", value);
//! }
//! # }
//! ```

use std::{
  collections::VecDeque,
  pin::Pin,
  task::{Context as AsyncContext, Poll, Waker},
};

use futures::Stream;

use crate::{
  context::Context,
  observable::{CoreObservable, Observable},
  observer::Observer,
  rc::RcDerefMut,
  subscription::Subscription,
};

#[doc(hidden)]
pub struct IntoStreamState<T, E> {
  queue: VecDeque<Result<T, E>>,
  waker: Option<Waker>,
  is_closed: bool,
}

impl<T, E> Default for IntoStreamState<T, E> {
  fn default() -> Self { Self { queue: VecDeque::new(), waker: None, is_closed: false } }
}

/// The shared queue behind the stream returned by `into_stream`.
pub type StreamPtr<O> =
  <O as Context>::RcMut<IntoStreamState<<O as Observable>::Item, <O as Observable>::Err>>;

/// Yields `Ok(value)` per value, `Err(err)` once on error, and ends after
/// either terminal event. Dropping the stream cancels the subscription.
pub struct IntoStream<R, U: Subscription> {
  state: R,
  unsub: Option<U>,
}

// Neither field is ever pinned.
impl<R, U: Subscription> Unpin for IntoStream<R, U> {}

impl<R, U: Subscription> IntoStream<R, U> {
  pub fn new<O>(observable: O) -> Self
  where
    O: Observable,
    R: RcDerefMut<Target = IntoStreamState<O::Item, O::Err>>
      + From<IntoStreamState<O::Item, O::Err>>
      + Clone,
    O::Inner: CoreObservable<O::With<IntoStreamObserver<R>>, Unsub = U>,
  {
    let state = R::from(IntoStreamState::default());
    let observer = IntoStreamObserver { state: state.clone() };

    let (core, wrapped) = observable.swap(observer);
    let unsub = core.subscribe(wrapped);

    IntoStream { state, unsub: Some(unsub) }
  }
}

impl<T, E, R, U: Subscription> Stream for IntoStream<R, U>
where
  R: RcDerefMut<Target = IntoStreamState<T, E>>,
{
  type Item = Result<T, E>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut AsyncContext<'_>) -> Poll<Option<Self::Item>> {
    let this = self.get_mut();
    let mut state = this.state.rc_deref_mut();

    if let Some(item) = state.queue.pop_front() {
      return Poll::Ready(Some(item));
    }

    if state.is_closed {
      return Poll::Ready(None);
    }

    state.waker = Some(cx.waker().clone());
    Poll::Pending
  }
}

impl<R, U: Subscription> Drop for IntoStream<R, U> {
  fn drop(&mut self) {
    if let Some(unsub) = self.unsub.take() {
      unsub.unsubscribe();
    }
  }
}

#[doc(hidden)]
pub struct IntoStreamObserver<R> {
  state: R,
}

impl<R, Item, Err> Observer<Item, Err> for IntoStreamObserver<R>
where
  R: RcDerefMut<Target = IntoStreamState<Item, Err>>,
{
  fn next(&mut self, value: Item) {
    let mut state = self.state.rc_deref_mut();
    state.queue.push_back(Ok(value));
    if let Some(waker) = state.waker.take() {
      waker.wake();
    }
  }

  fn error(self, err: Err) {
    let mut state = self.state.rc_deref_mut();
    state.queue.push_back(Err(err));
    state.is_closed = true;
    if let Some(waker) = state.waker.take() {
      waker.wake();
    }
  }

  fn complete(self) {
    let mut state = self.state.rc_deref_mut();
    state.is_closed = true;
    if let Some(waker) = state.waker.take() {
      waker.wake();
    }
  }

  fn is_closed(&self) -> bool { self.state.rc_deref().is_closed }
}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use futures::StreamExt;

  use crate::prelude::*;

  #[rxferro_macro::test(local)]
  async fn receives_all_values() {
    let mut stream = Local::from_iter(vec![1, 2, 3]).into_stream();

    let mut values: Vec<i32> = vec![];
    while let Some(Ok(x)) = stream.next().await {
      values.push(x);
    }

    assert_eq!(vec![1, 2, 3], values);
  }

  #[rxferro_macro::test(local)]
  async fn error_ends_the_stream() {
    let mut stream = Local::throw_err::<i32, _>("error").into_stream();

    assert_eq!(stream.next().await, Some(Err("error")));
    assert_eq!(stream.next().await, None);
  }

  #[rxferro_macro::test(shared)]
  async fn awaits_values_released_from_another_thread() {
    let selector = Shared::subject::<bool, Infallible>();
    let mut source = Shared::subject::<i32, Infallible>();
    let mut stream = source
      .clone()
      .freeze(selector.clone())
      .into_stream();

    source.next(7);
    let mut control = selector.clone();
    std::thread::spawn(move || control.next(false));

    assert_eq!(stream.next().await, Some(Ok(7)));
  }
}
