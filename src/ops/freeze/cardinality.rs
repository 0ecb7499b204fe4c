/// How many values a stream shape may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
  /// Only a terminal event. Values are discarded.
  Empty,
  /// At most one value, which ends the stream.
  One,
  /// Any number of values.
  Many,
}

/// The capability set one freeze variant runs the shared state machine with.
///
/// `completes` tells whether the shape has a bare completion signal. A shape
/// without one (`SINGLE`) turns a valueless completion into
/// `FreezeError::EmptySource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
  pub arity: Arity,
  pub completes: bool,
}

impl Cardinality {
  /// Zero or more values, then completion or error.
  pub const STREAM: Self = Self { arity: Arity::Many, completes: true };
  /// Zero or one value. A value is followed by completion.
  pub const MAYBE: Self = Self { arity: Arity::One, completes: true };
  /// Exactly one value or an error.
  pub const SINGLE: Self = Self { arity: Arity::One, completes: false };
  /// Completion or error only.
  pub const COMPLETABLE: Self = Self { arity: Arity::Empty, completes: true };
}
