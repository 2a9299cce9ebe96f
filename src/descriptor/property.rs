//! Settable properties, assigned after construction.

use serde_json::Value;

use crate::engine::Constraint;

use super::{Nullability, SlotSpec, SlotType};

/// A property assigned after the object exists.
///
/// Properties omitted from the payload keep their default (or null), except
/// lateinit-like ones, which stay unset.
///
/// # Example
///
/// ```rust
/// use intake::{Constraint, PropertyDescriptor, SlotType};
///
/// let value = PropertyDescriptor::new("value", SlotType::String).lateinit();
/// let note = PropertyDescriptor::new("note", SlotType::String)
///     .nullable()
///     .constraint(Constraint::size(0, 140));
/// ```
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub(crate) spec: SlotSpec,
}

impl PropertyDescriptor {
    /// Creates a non-null property with no default.
    pub fn new(name: impl Into<String>, slot_type: SlotType) -> Self {
        Self {
            spec: SlotSpec::new(name, slot_type),
        }
    }

    /// Marks the property as accepting null.
    pub fn nullable(mut self) -> Self {
        self.spec.nullability = Nullability::Nullable;
        self
    }

    /// Marks the property as unset until first assignment.
    pub fn lateinit(mut self) -> Self {
        self.spec.nullability = Nullability::Lateinit;
        self
    }

    /// Adds a declared constraint.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.spec.add_constraint(constraint);
        self
    }

    /// Reads the property from payload key `name` instead of its member name.
    pub fn json_name(mut self, name: impl Into<String>) -> Self {
        self.spec.json_name = Some(name.into());
        self
    }

    /// Validates nested values even if their type is not validated.
    pub fn cascade(mut self) -> Self {
        self.spec.cascade = true;
        self
    }

    /// Sets the initial value held when the payload omits the property.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.spec.default = Some(value.into());
        self
    }

    /// The property name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// The slot declaration.
    pub fn spec(&self) -> &SlotSpec {
        &self.spec
    }

    /// Whether the property carries an implicit not-null obligation.
    pub fn is_implicitly_non_null(&self) -> bool {
        self.spec.nullability.is_implicitly_non_null()
    }

    /// Whether the property is lateinit-like.
    pub fn is_lateinit_like(&self) -> bool {
        self.spec.nullability.is_lateinit_like()
    }
}
