//! The top-level entry point.
//!
//! A [`Deserializer`] owns the shared, read-only collaborators of every call: the
//! type registry, the constraint engine, and the default feature flags. Each call
//! creates a fresh [`ValidationContext`], so one deserializer can serve any number
//! of concurrent calls.

use std::sync::Arc;

use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::Value;
use stillwater::Validation;

use crate::descriptor::{Describe, TypeDescriptor, TypeRef};
use crate::engine::{ConstraintEngine, RuleEngine};
use crate::error::DeserializeError;
use crate::features::{Feature, FeatureSet};
use crate::pipeline;
use crate::registry::{RegistryError, TypeRegistry};
use crate::validation::ValidationContext;
use crate::ValidationResult;

/// Default limit on object nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Deserializes JSON payloads into described types, validating them in the same pass.
///
/// # Example
///
/// ```rust
/// use intake::{Creator, CreatorParameter, Deserializer, Describe, SlotType, TypeDescriptor};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Pair {
///     left: String,
///     right: i64,
/// }
///
/// impl Describe for Pair {
///     const NAME: &'static str = "Pair";
///
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::validated(Self::NAME).creator(
///             Creator::constructor()
///                 .param(CreatorParameter::new("left", SlotType::String))
///                 .param(CreatorParameter::new("right", SlotType::Integer)),
///         )
///     }
/// }
///
/// let deserializer = Deserializer::new();
///
/// let pair: Pair = deserializer.from_str(r#"{"left": "a", "right": 42}"#).unwrap();
/// assert_eq!(pair.left, "a");
///
/// let err = deserializer.from_str::<Pair>(r#"{"left": null, "right": 42}"#).unwrap_err();
/// let violations = err.violations().unwrap();
/// assert_eq!(violations.len(), 1);
/// assert!(violations.contains("NotNull", "left"));
/// ```
#[derive(Clone)]
pub struct Deserializer {
    registry: TypeRegistry,
    engine: Arc<dyn ConstraintEngine>,
    features: FeatureSet,
    max_depth: usize,
}

impl Deserializer {
    /// Creates a deserializer with an empty registry, the bundled [`RuleEngine`],
    /// and default features.
    pub fn new() -> Self {
        Self::with_engine(RuleEngine::new())
    }

    /// Creates a deserializer backed by a custom constraint engine.
    pub fn with_engine<E>(engine: E) -> Self
    where
        E: ConstraintEngine + 'static,
    {
        Self {
            registry: TypeRegistry::new(),
            engine: Arc::new(engine),
            features: FeatureSet::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Uses `registry` for type resolution. Clones of a registry share storage.
    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the default feature flags.
    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    /// Enables a feature by default.
    pub fn enable(mut self, feature: Feature) -> Self {
        self.features = self.features.enable(feature);
        self
    }

    /// Disables a feature by default.
    pub fn disable(mut self, feature: Feature) -> Self {
        self.features = self.features.disable(feature);
        self
    }

    /// Sets the maximum object nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn features(&self) -> FeatureSet {
        self.features
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Registers a descriptor that is not tied to a Rust type.
    pub fn register(&self, descriptor: TypeDescriptor) -> Result<Arc<TypeDescriptor>, RegistryError> {
        self.registry.register(descriptor)
    }

    /// Parses `json` and deserializes it into `T`.
    ///
    /// # Errors
    ///
    /// `DeserializeError::Syntax` for malformed JSON, `DeserializeError::Violations`
    /// for an invalid payload, or another variant for a fatal condition.
    pub fn from_str<T>(&self, json: &str) -> Result<T, DeserializeError>
    where
        T: DeserializeOwned + Describe,
    {
        self.from_str_with(json, self.features)
    }

    /// Like [`from_str`](Self::from_str), with call-site feature flags.
    pub fn from_str_with<T>(&self, json: &str, features: FeatureSet) -> Result<T, DeserializeError>
    where
        T: DeserializeOwned + Describe,
    {
        let value: Value = serde_json::from_str(json).map_err(DeserializeError::Syntax)?;
        self.from_value_with(&value, features)
    }

    /// Deserializes an already parsed payload into `T`.
    pub fn from_value<T>(&self, value: &Value) -> Result<T, DeserializeError>
    where
        T: DeserializeOwned + Describe,
    {
        self.from_value_with(value, self.features)
    }

    /// Like [`from_value`](Self::from_value), with call-site feature flags.
    pub fn from_value_with<T>(&self, value: &Value, features: FeatureSet) -> Result<T, DeserializeError>
    where
        T: DeserializeOwned + Describe,
    {
        let materialized = self
            .run(&TypeRef::of::<T>(), value, features)?
            .into_result()
            .map_err(DeserializeError::Violations)?;

        serde_json::from_value(materialized).map_err(|source| DeserializeError::Materialize {
            type_name: T::NAME.to_string(),
            source,
        })
    }

    /// Materializes `value` as the registered type `type_name`, returning the
    /// constructed fields as JSON.
    pub fn materialize(&self, type_name: &str, value: &Value) -> Result<Value, DeserializeError> {
        self.materialize_with(type_name, value, self.features)
    }

    /// Like [`materialize`](Self::materialize), with call-site feature flags.
    pub fn materialize_with(
        &self,
        type_name: &str,
        value: &Value,
        features: FeatureSet,
    ) -> Result<Value, DeserializeError> {
        self.check_with(type_name, value, features)?
            .into_result()
            .map_err(DeserializeError::Violations)
    }

    /// Materializes `value`, returning the violation report as a [`ValidationResult`]
    /// instead of an error.
    ///
    /// The outer `Result` carries fatal conditions only.
    ///
    /// # Example
    ///
    /// ```rust
    /// use intake::{Creator, CreatorParameter, Deserializer, SlotType, TypeDescriptor};
    /// use serde_json::json;
    ///
    /// let deserializer = Deserializer::new();
    /// deserializer
    ///     .register(TypeDescriptor::validated("Pair").creator(
    ///         Creator::constructor().param(CreatorParameter::new("left", SlotType::String)),
    ///     ))
    ///     .unwrap();
    ///
    /// let result = deserializer.check("Pair", &json!({})).unwrap();
    /// assert!(result.is_failure());
    /// ```
    pub fn check(&self, type_name: &str, value: &Value) -> Result<ValidationResult<Value>, DeserializeError> {
        self.check_with(type_name, value, self.features)
    }

    /// Like [`check`](Self::check), with call-site feature flags.
    pub fn check_with(
        &self,
        type_name: &str,
        value: &Value,
        features: FeatureSet,
    ) -> Result<ValidationResult<Value>, DeserializeError> {
        self.run(&TypeRef::named(type_name), value, features)
    }

    /// Materializes many independent payloads in parallel.
    ///
    /// Each payload gets its own validation context; results are in input order.
    pub fn materialize_batch(&self, type_name: &str, values: &[Value]) -> Vec<Result<Value, DeserializeError>> {
        values
            .par_iter()
            .map(|value| self.materialize(type_name, value))
            .collect()
    }

    fn run(
        &self,
        type_ref: &TypeRef,
        value: &Value,
        features: FeatureSet,
    ) -> Result<ValidationResult<Value>, DeserializeError> {
        let span = tracing::debug_span!("deserialize", type_name = type_ref.name());
        let _enter = span.enter();

        let desc = self.registry.resolve(type_ref)?;
        let mut ctx = ValidationContext::new(&self.registry, &*self.engine, features, self.max_depth);

        let instance = match pipeline::materialize_root(&mut ctx, &desc, value) {
            Ok(instance) => instance,
            Err(err) => {
                tracing::debug!(error = %err, "deserialization aborted");
                return Err(err);
            }
        };

        let result = ctx.finish(instance);
        match &result {
            Validation::Success(_) => tracing::debug!("payload accepted"),
            Validation::Failure(violations) => {
                tracing::debug!(violations = violations.len(), "payload rejected")
            }
        }
        Ok(result)
    }
}

impl Default for Deserializer {
    fn default() -> Self {
        Self::new()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Deserializer>();
    assert_sync::<Deserializer>();
};
