//! # Intake
//!
//! Validated JSON deserialization: materialize typed objects and check their
//! constraints in one pass, producing one path-addressed violation report per
//! call instead of failing on the first problem.
//!
//! ## Overview
//!
//! A deserializer normally builds objects incrementally, sometimes through a
//! multi-argument constructor before the object exists at all, while a validator
//! expects an already built value. Intake fuses the two: creator parameters are
//! checked before the creator runs, settable properties after, and nested objects
//! and list elements recursively, all funnelling into a single collector owned by
//! the top-level call.
//!
//! ## Core Types
//!
//! - [`TypeDescriptor`]: the static declaration of a type (creator, properties, constraints)
//! - [`Describe`]: hands a Rust type's descriptor to the [`TypeRegistry`]
//! - [`ConstraintEngine`]: evaluates declared constraints; [`RuleEngine`] is bundled
//! - [`Deserializer`]: the entry point, owning registry, engine, and [`FeatureSet`]
//! - [`Violations`]: the aggregate report, a non-empty set of [`ConstraintViolation`]s
//!
//! ## Example
//!
//! ```rust
//! use intake::{Constraint, Creator, CreatorParameter, Deserializer, Describe, SlotType, TypeDescriptor};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Account {
//!     name: String,
//!     tags: Vec<String>,
//! }
//!
//! impl Describe for Account {
//!     const NAME: &'static str = "Account";
//!
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::validated(Self::NAME).creator(
//!             Creator::constructor()
//!                 .param(CreatorParameter::new("name", SlotType::String).constraint(Constraint::not_blank()))
//!                 .param(
//!                     CreatorParameter::new("tags", SlotType::list(SlotType::String))
//!                         .constraint(Constraint::unique()),
//!                 ),
//!         )
//!     }
//! }
//!
//! let deserializer = Deserializer::new();
//!
//! let account: Account = deserializer
//!     .from_str(r#"{"name": "ops", "tags": ["a", "b"]}"#)
//!     .unwrap();
//! assert_eq!(account.tags.len(), 2);
//!
//! // Every problem is reported at once
//! let err = deserializer
//!     .from_str::<Account>(r#"{"tags": ["a", 7, "a"]}"#)
//!     .unwrap_err();
//! let violations = err.violations().unwrap();
//! assert!(violations.contains("Required", "name"));
//! assert!(violations.contains("InvalidInput", "tags[1]"));
//! ```

pub mod descriptor;
pub mod deserializer;
pub mod engine;
pub mod error;
pub mod features;
pub mod kind;
pub mod path;
pub mod registry;
pub mod validation;

mod pipeline;

pub use descriptor::{
    Coercion, Creator, CreatorArgs, CreatorError, CreatorKind, CreatorParameter, Describe, Nullability,
    PropertyDescriptor, SlotSpec, SlotType, TypeDescriptor, TypeRef,
};
pub use deserializer::{Deserializer, DEFAULT_MAX_DEPTH};
pub use engine::{Constraint, ConstraintEngine, ContextPayload, EngineError, EngineViolation, Rule, RuleEngine};
pub use error::{ConstraintViolation, DeserializeError, InvalidValue, Violations};
pub use features::{Feature, FeatureError, FeatureSet};
pub use path::{PathSegment, PathTracker, ViolationPath};
pub use registry::{RegistryError, TypeRegistry};
pub use validation::{ValidationContext, ViolationCollector};

/// Type alias for validation results using Violations
pub type ValidationResult<T> = stillwater::Validation<T, Violations>;
