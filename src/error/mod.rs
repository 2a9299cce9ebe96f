//! Error types for deserialization.
//!
//! Data violations are never raised one by one: they are gathered into a single
//! [`Violations`] report per top-level call. Conditions outside the violation
//! taxonomy abort the call as a [`DeserializeError`].

mod deserialize_error;
mod violation;

pub use deserialize_error::DeserializeError;
pub use violation::{ConstraintViolation, InvalidValue, Violations};
