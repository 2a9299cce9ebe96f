//! Violation kinds produced by the pipeline itself.
//!
//! Every other kind (`Size`, `Pattern`, cross-field rules, ...) comes from the
//! [`ConstraintEngine`](crate::engine::ConstraintEngine) and is passed through unchanged.

/// A slot was absent from the payload where presence is mandated.
pub const REQUIRED: &str = "Required";

/// A slot was null (or an unset lateinit-like property) where null is disallowed.
pub const NOT_NULL: &str = "NotNull";

/// A value was present but could not be coerced to the slot's declared type.
pub const INVALID_INPUT: &str = "InvalidInput";

pub(crate) const DEFAULT_REQUIRED_MESSAGE: &str = "is required";
pub(crate) const DEFAULT_NOT_NULL_MESSAGE: &str = "must not be null";
pub(crate) const DEFAULT_INVALID_INPUT_MESSAGE: &str = "invalid input";
