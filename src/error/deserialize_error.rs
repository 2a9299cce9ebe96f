//! The error returned by a top-level deserialization call.

use crate::descriptor::CreatorError;
use crate::engine::EngineError;
use crate::error::Violations;
use crate::path::ViolationPath;
use crate::registry::RegistryError;

/// Failure of a top-level deserialization call.
///
/// [`DeserializeError::Violations`] is the aggregate data-validity report. Every
/// other variant is a fatal condition that aborted the call without a report.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    /// The payload violated one or more constraints.
    #[error("{0}")]
    Violations(Violations),

    /// The payload text is not valid JSON.
    #[error("malformed JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    /// A value could not be coerced to its slot type inside a type that is not validated.
    #[error("{path}: expected {expected}, got {got}")]
    Mismatch {
        path: ViolationPath,
        expected: String,
        got: String,
    },

    /// A required value was absent inside a type that is not validated.
    #[error("{path}: missing required value")]
    MissingRequired { path: ViolationPath },

    /// The payload carried a key that matches no creator parameter or property.
    #[error("{path}: unrecognized property")]
    UnknownProperty { path: ViolationPath },

    /// A creator failed for reasons unrelated to validation.
    #[error("creator for '{type_name}' failed at '{path}': {source}")]
    Creator {
        type_name: String,
        path: ViolationPath,
        #[source]
        source: CreatorError,
    },

    /// The constraint engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A type could not be resolved.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Objects were nested deeper than the configured limit.
    #[error("maximum nesting depth {max_depth} exceeded at '{path}'")]
    DepthExceeded { path: ViolationPath, max_depth: usize },

    /// The validated value could not be converted into the requested Rust type.
    #[error("materialized '{type_name}' does not match its Rust type: {source}")]
    Materialize {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DeserializeError {
    /// Returns the violation report if this is a data-validity failure.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            DeserializeError::Violations(violations) => Some(violations),
            _ => None,
        }
    }

    /// Consumes the error, returning the violation report if there is one.
    pub fn into_violations(self) -> Option<Violations> {
        match self {
            DeserializeError::Violations(violations) => Some(violations),
            _ => None,
        }
    }
}

impl From<Violations> for DeserializeError {
    fn from(violations: Violations) -> Self {
        DeserializeError::Violations(violations)
    }
}
