//! The contract to the external constraint-evaluation engine.
//!
//! The pipeline owns presence and nullability (`Required`, `NotNull`,
//! `InvalidInput`); everything else is delegated to a [`ConstraintEngine`].
//! [`RuleEngine`] is the bundled implementation.
//!
//! # Example
//!
//! ```rust
//! use intake::{Constraint, ConstraintEngine, RuleEngine};
//! use serde_json::json;
//!
//! let engine = RuleEngine::new();
//! let found = engine
//!     .evaluate(&json!("ab"), &[Constraint::size(3, 10)], None)
//!     .unwrap();
//!
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].kind, "Size");
//! assert!(found[0].sub_path.is_root());
//! ```

mod constraint;
mod rules;

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::path::ViolationPath;

pub use constraint::Constraint;
pub use rules::{Rule, RuleEngine};

/// Cross-parameter data handed to whole-object constraints: creator parameter
/// name to the raw value supplied in the payload.
pub type ContextPayload = IndexMap<String, Value>;

/// One failure reported by a [`ConstraintEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineViolation {
    /// Location relative to the evaluated value; root for the value itself.
    pub sub_path: ViolationPath,
    /// The violated constraint kind.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

impl EngineViolation {
    /// Creates a violation at `sub_path`.
    pub fn new(sub_path: ViolationPath, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sub_path,
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Fatal engine failures. These abort the whole call.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No rule is registered for the constraint kind.
    #[error("no rule registered for constraint kind '{0}'")]
    UnknownConstraint(String),

    /// The constraint declaration itself is unusable.
    #[error("invalid '{kind}' constraint: {reason}")]
    InvalidConstraint { kind: String, reason: String },

    /// A rule failed while evaluating.
    #[error("rule '{kind}' failed: {message}")]
    Rule { kind: String, message: String },
}

/// Evaluates declared constraints against a value.
///
/// Implementations are shared by every concurrent deserialization call, so they
/// must be `Send + Sync` and keep no per-call state. Sub-paths in the result are
/// relative to `value`; the caller anchors them at the slot being validated.
pub trait ConstraintEngine: Send + Sync {
    /// Evaluates `constraints` in order against `value`.
    ///
    /// `payload` is only supplied for whole-object constraints of types built
    /// through a creator.
    fn evaluate(
        &self,
        value: &Value,
        constraints: &[Constraint],
        payload: Option<&ContextPayload>,
    ) -> Result<Vec<EngineViolation>, EngineError>;
}

impl<E: ConstraintEngine + ?Sized> ConstraintEngine for Arc<E> {
    fn evaluate(
        &self,
        value: &Value,
        constraints: &[Constraint],
        payload: Option<&ContextPayload>,
    ) -> Result<Vec<EngineViolation>, EngineError> {
        (**self).evaluate(value, constraints, payload)
    }
}
