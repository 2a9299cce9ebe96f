//! Creators: the constructor or factory that materializes an object from named parameters.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::engine::Constraint;
use crate::features::{Feature, FeatureSet};

use super::{Nullability, SlotSpec, SlotType};

/// A parameter of a [`Creator`].
///
/// # Example
///
/// ```rust
/// use intake::{Constraint, CreatorParameter, SlotType};
///
/// let name = CreatorParameter::new("name", SlotType::String)
///     .constraint(Constraint::not_blank());
/// let nickname = CreatorParameter::new("nickname", SlotType::String).nullable();
/// let retries = CreatorParameter::new("retries", SlotType::Integer).default_value(3);
/// ```
#[derive(Debug, Clone)]
pub struct CreatorParameter {
    pub(crate) spec: SlotSpec,
    pub(crate) required: bool,
    pub(crate) required_message: Option<String>,
}

impl CreatorParameter {
    /// Creates a non-null, not explicitly required parameter.
    pub fn new(name: impl Into<String>, slot_type: SlotType) -> Self {
        Self {
            spec: SlotSpec::new(name, slot_type),
            required: false,
            required_message: None,
        }
    }

    /// Marks the parameter as accepting null.
    pub fn nullable(mut self) -> Self {
        self.spec.nullability = Nullability::Nullable;
        self
    }

    /// Marks the parameter as required in the payload, independent of nullability.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Overrides the message of the `Required` violation.
    pub fn required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = Some(message.into());
        self
    }

    /// Adds a declared constraint.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.spec.add_constraint(constraint);
        self
    }

    /// Reads the parameter from payload key `name` instead of its member name.
    pub fn json_name(mut self, name: impl Into<String>) -> Self {
        self.spec.json_name = Some(name.into());
        self
    }

    /// Validates nested values even if their type is not validated.
    pub fn cascade(mut self) -> Self {
        self.spec.cascade = true;
        self
    }

    /// Sets the value passed to the creator when the payload omits the parameter.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.spec.default = Some(value.into());
        self
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// The slot declaration.
    pub fn spec(&self) -> &SlotSpec {
        &self.spec
    }

    /// Whether the parameter carries the explicit required marker.
    pub fn is_explicitly_required(&self) -> bool {
        self.required
    }

    /// Whether an absent value is a `Required` violation under `features`.
    ///
    /// Explicitly required parameters always are. A non-null parameter without a
    /// default is too, unless implicit non-null validation is disabled.
    pub fn is_required(&self, features: FeatureSet) -> bool {
        self.required
            || (self.spec.nullability.is_implicitly_non_null()
                && self.spec.default.is_none()
                && features.is_enabled(Feature::ValidateImplicitNonNullProperties))
    }
}

/// The values a creator is invoked with, keyed by parameter name in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatorArgs {
    values: IndexMap<String, Value>,
}

impl CreatorArgs {
    pub(crate) fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Returns the value for `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Iterates over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Converts the arguments into a field map.
    pub fn into_fields(self) -> Map<String, Value> {
        self.values.into_iter().collect()
    }
}

/// A creator failure unrelated to validation. Always fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct CreatorError {
    message: String,
}

impl CreatorError {
    /// Creates an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

type BuildFn = Arc<dyn Fn(&CreatorArgs) -> Result<Map<String, Value>, CreatorError> + Send + Sync>;

/// Whether a creator is a plain constructor or a factory function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatorKind {
    /// Each parameter becomes the same-named field.
    Constructor,
    /// A user function builds the fields from the arguments.
    Factory,
}

/// The multi-argument creator of a type.
///
/// # Example
///
/// ```rust
/// use intake::{Creator, CreatorParameter, SlotType};
/// use serde_json::{json, Map};
///
/// let constructor = Creator::constructor()
///     .param(CreatorParameter::new("left", SlotType::String))
///     .param(CreatorParameter::new("right", SlotType::Integer));
///
/// let factory = Creator::factory(|args| {
///     let mut fields = Map::new();
///     let width = args.get("width").and_then(|v| v.as_i64()).unwrap_or(0);
///     fields.insert("width".to_string(), json!(width));
///     fields.insert("area".to_string(), json!(width * width));
///     Ok(fields)
/// })
/// .param(CreatorParameter::new("width", SlotType::Integer));
/// ```
#[derive(Clone)]
pub struct Creator {
    kind: CreatorKind,
    params: Vec<CreatorParameter>,
    build: BuildFn,
}

impl Creator {
    /// A constructor: every argument becomes the same-named field.
    pub fn constructor() -> Self {
        Self {
            kind: CreatorKind::Constructor,
            params: Vec::new(),
            build: Arc::new(|args: &CreatorArgs| Ok(args.clone().into_fields())),
        }
    }

    /// A factory function building the fields from the arguments.
    pub fn factory<F>(build: F) -> Self
    where
        F: Fn(&CreatorArgs) -> Result<Map<String, Value>, CreatorError> + Send + Sync + 'static,
    {
        Self {
            kind: CreatorKind::Factory,
            params: Vec::new(),
            build: Arc::new(build),
        }
    }

    /// Appends a parameter.
    pub fn param(mut self, param: CreatorParameter) -> Self {
        self.params.push(param);
        self
    }

    /// The parameters in declaration order.
    pub fn params(&self) -> &[CreatorParameter] {
        &self.params
    }

    /// The creator kind.
    pub fn kind(&self) -> CreatorKind {
        self.kind
    }

    pub(crate) fn invoke(&self, args: &CreatorArgs) -> Result<Map<String, Value>, CreatorError> {
        (self.build)(args)
    }
}

impl fmt::Debug for Creator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Creator")
            .field("kind", &self.kind)
            .field("params", &self.params)
            .finish()
    }
}
