//! Constructors for sources.
//!
//! `ObservableFactory` is implemented for every context whose inner type is
//! `()`, so sources are built as `Local::of(1)` or `Shared::subject()` and
//! carry their context family from the start.
//!
//! | Method | Values | Terminal |
//! |--------|--------|----------|
//! | `of(v)` | `v` | complete |
//! | `from_iter(it)` | each item | complete |
//! | `create(f)` | whatever `f` emits | whatever `f` emits |
//! | `empty()` | none | complete |
//! | `never()` | none | none |
//! | `throw_err(e)` | none | error `e` |
//!
//! ```rust
//! use rxferro::prelude::*;
//!
//! Local::of(42).subscribe(|v| println!("local: {}", v));
//! Shared::from_iter(["a", "b"]).subscribe(|v| println!("shared: {}", v));
//! ```

use crate::{
  context::Context,
  observable::{Create, Empty, FromIter, Never, Of, ThrowErr},
  observer::Emitter,
  subject::{BehaviorSubject, Subject, SubjectPtr},
  subscription::Subscription,
};

pub trait ObservableFactory: Context<Inner = ()> {
  fn of<T>(v: T) -> Self::With<Of<T>> { Self::lift(Of(v)) }

  fn from_iter<I: IntoIterator>(iter: I) -> Self::With<FromIter<I>> { Self::lift(FromIter(iter)) }

  /// Build a source from a closure. The closure gets an `Emitter` for the
  /// duration of the call and returns the teardown run on unsubscribe.
  fn create<F, Item, Err, U>(f: F) -> Self::With<Create<F, Item, Err>>
  where
    F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
    U: Subscription,
  {
    Self::lift(Create::new(f))
  }

  fn empty<Item>() -> Self::With<Empty<Item>> { Self::lift(Empty::new()) }

  fn never<Item>() -> Self::With<Never<Item>> { Self::lift(Never::new()) }

  fn throw_err<Item, Err>(err: Err) -> Self::With<ThrowErr<Item, Err>> {
    Self::lift(ThrowErr::new(err))
  }

  /// A multicast source: values pushed into it reach every current
  /// subscriber.
  fn subject<'a, Item, Err>() -> Self::With<Subject<SubjectPtr<'a, Self, Item, Err>>> {
    Self::lift(Subject::new())
  }

  /// A subject holding a current value, replayed to each new subscriber.
  fn behavior_subject<'a, Item, Err>(
    initial: Item,
  ) -> Self::With<BehaviorSubject<SubjectPtr<'a, Self, Item, Err>>> {
    Self::lift(BehaviorSubject::new(initial))
  }
}

impl<C: Context<Inner = ()>> ObservableFactory for C {}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use crate::prelude::*;

  #[rxferro_macro::test]
  fn factories_build_in_both_contexts() {
    let _local_of = Local::of(1);
    let _shared_of = Shared::of(2);
    let _local_subject = Local::subject::<i32, Infallible>();
    let _shared_behavior = Shared::behavior_subject::<bool, Infallible>(true);
  }
}
