//! Producers.
//!
//! A producer is split in two layers:
//!
//! - `CoreObservable<C>` is the raw subscribe logic of one source or operator,
//!   written against a context `C` that carries the downstream observer.
//! - `Observable` is the user-facing extension trait, implemented for every
//!   context (`Local<_>`, `Shared<_>`) whose inner value is an
//!   `ObservableType`. Operators wrap the inner value with
//!   `Context::transform`, so the context family flows down the chain.

mod create;
mod from_iter;
mod of;
mod trivial;

pub use create::*;
pub use from_iter::*;
pub use of::*;
pub use trivial::*;

use crate::{
  context::Context,
  error::FreezeError,
  observer::{FnMutObserver, Observer},
  ops::{
    freeze::{Cardinality, Freeze, FreezeErrors, KeepAll, ReplaceWith, TryReplaceWith},
    into_stream::{IntoStream, IntoStreamObserver, StreamPtr},
    on_complete::OnComplete,
    on_error::OnError,
  },
  subscription::Subscription,
};

/// The item and error types a producer emits.
pub trait ObservableType {
  type Item;
  type Err;
}

/// Subscribe logic of a single source or operator.
pub trait CoreObservable<C>: ObservableType {
  type Unsub: Subscription;

  fn subscribe(self, context: C) -> Self::Unsub;
}

pub trait Observable: Context {
  type Item;
  type Err;

  /// Subscribe a closure to a stream that cannot fail.
  fn subscribe<F>(
    self, f: F,
  ) -> <Self::Inner as CoreObservable<Self::With<FnMutObserver<F>>>>::Unsub
  where
    F: FnMut(Self::Item),
    Self::Inner: CoreObservable<Self::With<FnMutObserver<F>>>,
  {
    let (core, wrapped) = self.swap(FnMutObserver(f));
    core.subscribe(wrapped)
  }

  fn subscribe_with<O>(self, observer: O) -> <Self::Inner as CoreObservable<Self::With<O>>>::Unsub
  where
    O: Observer<Self::Item, Self::Err>,
    Self::Inner: CoreObservable<Self::With<O>>,
  {
    let (core, wrapped) = self.swap(observer);
    core.subscribe(wrapped)
  }

  /// Handle the error and turn the stream into one that cannot fail.
  fn on_error<F>(self, f: F) -> Self::With<OnError<Self::Inner, F>>
  where
    F: FnOnce(Self::Err),
  {
    self.transform(|source| OnError { source, func: f })
  }

  fn on_complete<F>(self, f: F) -> Self::With<OnComplete<Self::Inner, F>>
  where
    F: FnOnce(),
  {
    self.transform(|source| OnComplete { source, func: f })
  }

  /// Consume the stream as a `futures::Stream` of `Result<Item, Err>`.
  fn into_stream(
    self,
  ) -> IntoStream<
    StreamPtr<Self>,
    <Self::Inner as CoreObservable<Self::With<IntoStreamObserver<StreamPtr<Self>>>>>::Unsub,
  >
  where
    Self::Inner: CoreObservable<Self::With<IntoStreamObserver<StreamPtr<Self>>>>,
  {
    IntoStream::new(self)
  }

  /// Hold back every event while `selector` says frozen (`true`), replay the
  /// held events in order once it says `false`.
  ///
  /// Nothing is delivered before `selector` emits its first value. An error
  /// from `selector` replaces anything held and ends the stream; its
  /// completion ends the stream with a completion.
  ///
  /// ```rust
  /// use std::{cell::RefCell, convert::Infallible, rc::Rc};
  ///
  /// use rxferro::prelude::*;
  ///
  /// let seen = Rc::new(RefCell::new(vec![]));
  /// let sink = seen.clone();
  /// let mut selector = Local::subject::<bool, Infallible>();
  /// let mut source = Local::subject::<i32, Infallible>();
  ///
  /// source
  ///   .clone()
  ///   .freeze(selector.clone())
  ///   .subscribe(move |v| sink.borrow_mut().push(v));
  ///
  /// source.next(1);
  /// assert!(seen.borrow().is_empty());
  /// selector.next(false);
  /// assert_eq!(*seen.borrow(), vec![1]);
  /// ```
  fn freeze<Sel>(self, selector: Sel) -> FreezeOf<Self, Sel, KeepAll>
  where
    Sel: Observable<Item = bool>,
    Sel::Err: Into<Self::Err>,
  {
    freeze_op(self, selector, KeepAll, Cardinality::STREAM, None)
  }

  /// `freeze` that compacts the held values: before a value is held, every
  /// held value for which `replace(held, incoming)` returns `true` is dropped.
  fn freeze_with<Sel, F>(self, selector: Sel, replace: F) -> FreezeOf<Self, Sel, ReplaceWith<F>>
  where
    Sel: Observable<Item = bool>,
    Sel::Err: Into<Self::Err>,
    F: FnMut(&Self::Item, &Self::Item) -> bool,
  {
    freeze_op(self, selector, ReplaceWith(replace), Cardinality::STREAM, None)
  }

  /// `freeze_with` whose predicate may fail. A failure ends the stream with
  /// that error right away and drops everything held.
  fn try_freeze_with<Sel, F>(
    self, selector: Sel, replace: F,
  ) -> FreezeOf<Self, Sel, TryReplaceWith<F>>
  where
    Sel: Observable<Item = bool>,
    Sel::Err: Into<Self::Err>,
    F: FnMut(&Self::Item, &Self::Item) -> Result<bool, Self::Err>,
  {
    freeze_op(self, selector, TryReplaceWith(replace), Cardinality::STREAM, None)
  }

  /// Freeze a source that emits at most one value.
  ///
  /// The value, once released, is followed by completion. A source that
  /// completes without a value, or a selector that completes first, ends the
  /// stream with a completion.
  fn freeze_maybe<Sel>(self, selector: Sel) -> FreezeOf<Self, Sel, KeepAll>
  where
    Sel: Observable<Item = bool>,
    Sel::Err: Into<Self::Err>,
  {
    freeze_op(self, selector, KeepAll, Cardinality::MAYBE, None)
  }

  /// Freeze a source that must emit exactly one value.
  ///
  /// Completing without a value is an error (`FreezeError::EmptySource`), as
  /// is the selector completing first.
  fn freeze_single<Sel>(self, selector: Sel) -> FreezeOf<Self, Sel, KeepAll>
  where
    Sel: Observable<Item = bool>,
    Sel::Err: Into<Self::Err>,
    Self::Err: From<FreezeError>,
  {
    let abnormal: fn(FreezeError) -> Self::Err = From::from;
    freeze_op(self, selector, KeepAll, Cardinality::SINGLE, Some(abnormal))
  }

  /// Freeze a source that only signals completion or error. Values it emits
  /// are discarded.
  fn freeze_completable<Sel>(self, selector: Sel) -> FreezeOf<Self, Sel, KeepAll>
  where
    Sel: Observable<Item = bool>,
    Sel::Err: Into<Self::Err>,
  {
    freeze_op(self, selector, KeepAll, Cardinality::COMPLETABLE, None)
  }
}

/// The context-wrapped `Freeze` returned by the `freeze*` methods.
pub type FreezeOf<O, Sel, R> = <O as Context>::With<
  Freeze<
    <O as Context>::Inner,
    <Sel as Context>::Inner,
    R,
    FreezeErrors<<Sel as Observable>::Err, <O as Observable>::Err>,
  >,
>;

fn freeze_op<O, Sel, R>(
  source: O, selector: Sel, replace: R, cardinality: Cardinality,
  abnormal: Option<fn(FreezeError) -> O::Err>,
) -> FreezeOf<O, Sel, R>
where
  O: Observable,
  Sel: Observable<Item = bool>,
  Sel::Err: Into<O::Err>,
{
  let mut errors = FreezeErrors::new(<Sel::Err as Into<O::Err>>::into);
  if let Some(abnormal) = abnormal {
    errors = errors.with_abnormal(abnormal);
  }
  let selector = selector.into_inner();
  source.transform(|source| Freeze::new(source, selector, replace, cardinality, errors))
}

impl<T> Observable for T
where
  T: Context,
  T::Inner: ObservableType,
{
  type Item = <T::Inner as ObservableType>::Item;
  type Err = <T::Inner as ObservableType>::Err;
}
