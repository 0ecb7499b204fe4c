//! Multicast sources.
//!
//! A `Subject` is both an observer and a source: whatever is pushed into it
//! reaches every current subscriber. A `BehaviorSubject` additionally keeps
//! the latest value and replays it to each new subscriber, which is what a
//! freeze selector needs: a late subscriber learns the current frozen state
//! at once.

mod behavior_subject;
mod subject_core;
mod subject_subscription;
mod subscribers;

pub use behavior_subject::*;
pub use subject_core::*;
pub use subject_subscription::*;
pub use subscribers::Subscribers;

use crate::context::Context;

/// The shared observer list of a subject living in context `C`.
pub type SubjectPtr<'a, C, Item, Err> =
  <C as Context>::RcMut<Subscribers<<C as Context>::BoxedObserver<'a, Item, Err>, Item, Err>>;
