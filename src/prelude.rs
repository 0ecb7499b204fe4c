//! Prelude module for convenient imports

pub use crate::{
  context::*,
  error::{FreezeError, ScopeError},
  factory::ObservableFactory,
  observable::{CoreObservable, Create, Empty, FromIter, Never, Observable, ObservableType, Of, ThrowErr},
  observer::{BoxedObserver, BoxedObserverSend, Emitter, FnMutObserver, IntoBoxedObserver, Observer},
  ops::{
    freeze::{
      Cardinality, Freeze, FreezeErrors, FreezeSubscription, KeepAll, ReplaceFrozen, ReplaceWith,
      TryReplaceWith,
    },
    into_stream::IntoStream,
  },
  presenter::{
    FreezePresenter, LocalPresenter, PresenterConfig, PresenterState, PresenterSubscription,
    SharedPresenter,
  },
  scope::{ListenerId, ObjectKey, ScopeRegistry, ScreenScope},
  subject::*,
  subscription::*,
};
