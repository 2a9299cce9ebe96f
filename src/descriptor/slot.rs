//! Slot types and the declaration shared by creator parameters and properties.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::engine::Constraint;
use crate::features::{Feature, FeatureSet};

use super::{Describe, Nullability, TypeDescriptor};

/// Converts a raw payload value into a slot's value.
///
/// A failed coercion is the malformed-input signal: an `InvalidInput` violation in
/// a validated type, a fatal mismatch otherwise.
pub trait Coercion: Send + Sync {
    /// Name of the produced type, used in messages.
    fn name(&self) -> &str;

    /// Coerces `raw`, returning a reason on failure.
    fn coerce(&self, raw: &Value) -> Result<Value, String>;
}

struct FnCoercion<F> {
    name: String,
    coerce: F,
}

impl<F> Coercion for FnCoercion<F>
where
    F: Fn(&Value) -> Result<Value, String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn coerce(&self, raw: &Value) -> Result<Value, String> {
        (self.coerce)(raw)
    }
}

/// A reference to another described type, resolved through the registry.
///
/// References created with [`TypeRef::of`] carry the type's `describe` function
/// so the registry can populate itself on first use.
#[derive(Clone)]
pub struct TypeRef {
    name: Cow<'static, str>,
    provider: Option<fn() -> TypeDescriptor>,
}

impl TypeRef {
    /// References a [`Describe`] type.
    pub fn of<T: Describe>() -> Self {
        Self {
            name: Cow::Borrowed(T::NAME),
            provider: Some(T::describe),
        }
    }

    /// References a type registered by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            provider: None,
        }
    }

    /// The referenced type's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn provider(&self) -> Option<fn() -> TypeDescriptor> {
        self.provider
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.name).finish()
    }
}

/// The declared type of a slot.
#[derive(Clone)]
pub enum SlotType {
    /// Any JSON value, taken as is.
    Any,
    /// A JSON boolean.
    Bool,
    /// A JSON integer. Floats are rejected.
    Integer,
    /// Any JSON number.
    Number,
    /// A JSON string.
    String,
    /// A nested described object.
    Object(TypeRef),
    /// A list whose elements have the given type.
    List(Box<SlotType>),
    /// A user-supplied coercion, e.g. a date parsed from a string.
    Custom(Arc<dyn Coercion>),
}

impl SlotType {
    /// A nested [`Describe`] type.
    pub fn object<T: Describe>() -> Self {
        SlotType::Object(TypeRef::of::<T>())
    }

    /// A nested type registered by name.
    pub fn object_named(name: impl Into<String>) -> Self {
        SlotType::Object(TypeRef::named(name))
    }

    /// A list of `element`.
    pub fn list(element: SlotType) -> Self {
        SlotType::List(Box::new(element))
    }

    /// A custom coercion from a closure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use intake::SlotType;
    /// use serde_json::Value;
    ///
    /// let port = SlotType::custom("port", |raw| match raw {
    ///     Value::String(s) => s.parse::<u16>().map(Value::from).map_err(|e| e.to_string()),
    ///     other => Err(format!("expected a port string, got {}", other)),
    /// });
    /// assert_eq!(port.name(), "port");
    /// ```
    pub fn custom<F>(name: impl Into<String>, coerce: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        SlotType::Custom(Arc::new(FnCoercion {
            name: name.into(),
            coerce,
        }))
    }

    /// A short name of the expected input, used in messages.
    pub fn name(&self) -> String {
        match self {
            SlotType::Any => "any".to_string(),
            SlotType::Bool => "boolean".to_string(),
            SlotType::Integer => "integer".to_string(),
            SlotType::Number => "number".to_string(),
            SlotType::String => "string".to_string(),
            SlotType::Object(type_ref) => type_ref.name().to_string(),
            SlotType::List(element) => format!("list of {}", element.name()),
            SlotType::Custom(coercion) => coercion.name().to_string(),
        }
    }
}

impl fmt::Debug for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotType::Object(type_ref) => f.debug_tuple("Object").field(type_ref).finish(),
            SlotType::List(element) => f.debug_tuple("List").field(element).finish(),
            other => f.write_str(&other.name()),
        }
    }
}

/// The declaration shared by creator parameters and properties.
#[derive(Debug, Clone)]
pub struct SlotSpec {
    pub(crate) name: String,
    pub(crate) json_name: Option<String>,
    pub(crate) slot_type: SlotType,
    pub(crate) nullability: Nullability,
    pub(crate) not_null: Option<Constraint>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) cascade: bool,
    pub(crate) default: Option<Value>,
}

impl SlotSpec {
    pub(crate) fn new(name: impl Into<String>, slot_type: SlotType) -> Self {
        Self {
            name: name.into(),
            json_name: None,
            slot_type,
            nullability: Nullability::default(),
            not_null: None,
            constraints: Vec::new(),
            cascade: false,
            default: None,
        }
    }

    /// `NotNull` is owned by the pipeline; everything else goes to the engine.
    pub(crate) fn add_constraint(&mut self, constraint: Constraint) {
        if constraint.is_not_null() {
            self.not_null = Some(constraint);
        } else {
            self.constraints.push(constraint);
        }
    }

    /// The member name, used for creator arguments and materialized fields.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key read from the payload. Defaults to the member name.
    pub fn json_name(&self) -> &str {
        self.json_name.as_deref().unwrap_or(&self.name)
    }

    /// The name reported in violation paths under `features`.
    pub fn path_name(&self, features: FeatureSet) -> &str {
        if features.is_enabled(Feature::ReportMemberPathsInViolations) {
            &self.name
        } else {
            self.json_name()
        }
    }

    /// The declared type.
    pub fn slot_type(&self) -> &SlotType {
        &self.slot_type
    }

    /// The declared nullability.
    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    /// The explicit `NotNull` constraint, if declared.
    pub fn not_null(&self) -> Option<&Constraint> {
        self.not_null.as_ref()
    }

    /// The constraints evaluated by the engine.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Whether nested values are validated even if their type is not.
    pub fn is_cascade(&self) -> bool {
        self.cascade
    }

    /// The value used when the payload omits the slot.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}
