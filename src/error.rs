//! Errors raised by the crate itself.
//!
//! Stream errors travel through the observer's error channel. The freeze
//! operator adds its own abnormal terminations on top of the source's error
//! type, which is why `freeze_single` asks for `Err: From<FreezeError>`.

/// Abnormal endings of a frozen single-value stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FreezeError {
  #[error("freeze selector completed before the source emitted a terminal event")]
  SelectorCompleted,
  #[error("source completed without emitting its required value")]
  EmptySource,
}

/// Misuse of a `ScreenScope`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
  #[error("screen scope `{name}` is already destroyed")]
  Destroyed { name: String },
  #[error("object stored under `{key}` has a different type")]
  TypeMismatch { key: String },
}

