//! # rxferro: lifecycle-aware freezing for reactive streams
//!
//! A screen whose view comes and goes (rotation, navigation, backgrounding)
//! should neither miss the events of its long-running work nor receive them
//! while it has nothing to show them on. `rxferro` solves this with one
//! operator, `freeze`: a boolean selector stream decides whether the
//! source's events pass through or are held back and replayed later, in
//! order.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::{cell::RefCell, convert::Infallible, rc::Rc};
//!
//! use rxferro::prelude::*;
//!
//! let seen = Rc::new(RefCell::new(vec![]));
//! let sink = seen.clone();
//! let mut screen_away = Local::behavior_subject::<bool, Infallible>(true);
//!
//! Local::from_iter(1..=3)
//!   .freeze(screen_away.clone())
//!   .subscribe(move |v| sink.borrow_mut().push(v));
//! assert!(seen.borrow().is_empty());
//!
//! screen_away.next(false);
//! assert_eq!(*seen.borrow(), vec![1, 2, 3]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Local`] / [`Shared`] | Execution contexts (single-thread vs thread-safe) |
//! | [`Observable`] | Subscribing, and the `freeze` family of operators |
//! | [`FreezeMachine`] | The pure state machine behind every frozen subscription |
//! | [`FreezePresenter`] | Drives a freeze selector from screen lifecycle calls |
//! | [`ScreenScope`] | Keeps objects alive across view recreation |
//!
//! [`Local`]: prelude::Local
//! [`Shared`]: prelude::Shared
//! [`Observable`]: observable::Observable
//! [`FreezeMachine`]: ops::freeze::FreezeMachine
//! [`FreezePresenter`]: presenter::FreezePresenter
//! [`ScreenScope`]: scope::ScreenScope

pub mod context;
pub mod error;
pub mod factory;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod presenter;
pub mod rc;
pub mod scope;
pub mod subject;
pub mod subscription;

pub use prelude::*;
