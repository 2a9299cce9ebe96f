//! The per-type descriptor table.

use crate::engine::Constraint;

use super::{Creator, PropertyDescriptor};

/// Everything the pipeline knows about a type.
///
/// # Example
///
/// ```rust
/// use intake::{Constraint, Creator, CreatorParameter, PropertyDescriptor, SlotType, TypeDescriptor};
///
/// let range = TypeDescriptor::validated("Range")
///     .creator(
///         Creator::constructor()
///             .param(CreatorParameter::new("lower", SlotType::Integer))
///             .param(CreatorParameter::new("upper", SlotType::Integer)),
///     )
///     .property(PropertyDescriptor::new("label", SlotType::String).nullable())
///     .constraint(Constraint::assert_true().with("field", "ordered"));
///
/// assert!(range.is_validated());
/// assert!(range.has_slot("label"));
/// ```
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    validated: bool,
    creator: Option<Creator>,
    properties: Vec<PropertyDescriptor>,
    constraints: Vec<Constraint>,
    required_message: Option<String>,
    invalid_input_message: Option<String>,
}

impl TypeDescriptor {
    /// Creates a descriptor for a type that is not validated.
    ///
    /// Structural problems in such a type are fatal; its nested validated types
    /// are still validated.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validated: false,
            creator: None,
            properties: Vec::new(),
            constraints: Vec::new(),
            required_message: None,
            invalid_input_message: None,
        }
    }

    /// Creates a descriptor for a type opted into validated deserialization.
    pub fn validated(name: impl Into<String>) -> Self {
        Self {
            validated: true,
            ..Self::new(name)
        }
    }

    /// Sets the multi-argument creator. Without one, the object starts empty and
    /// is filled through its properties.
    pub fn creator(mut self, creator: Creator) -> Self {
        self.creator = Some(creator);
        self
    }

    /// Appends a settable property.
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds a whole-object constraint, evaluated after construction.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Overrides the default message of `Required` violations in this type.
    pub fn required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = Some(message.into());
        self
    }

    /// Overrides the default message of `InvalidInput` violations in this type.
    pub fn invalid_input_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_input_message = Some(message.into());
        self
    }

    /// Returns the type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the type participates in validation.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Returns the creator, if the type has one.
    pub fn creator_ref(&self) -> Option<&Creator> {
        self.creator.as_ref()
    }

    /// Returns the settable properties in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Returns the whole-object constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Returns the type-level `Required` message, if set.
    pub fn required_message_override(&self) -> Option<&str> {
        self.required_message.as_deref()
    }

    /// Returns the type-level `InvalidInput` message, if set.
    pub fn invalid_input_message_override(&self) -> Option<&str> {
        self.invalid_input_message.as_deref()
    }

    /// Names of all slots: creator parameters first, then properties.
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        let params = self
            .creator
            .iter()
            .flat_map(|creator| creator.params().iter().map(|p| p.name()));
        params.chain(self.properties.iter().map(|p| p.name()))
    }

    /// Returns true if a creator parameter or property is named `name`.
    pub fn has_slot(&self, name: &str) -> bool {
        self.slot_names().any(|slot| slot == name)
    }

    /// Payload keys of all slots, in the same order as [`slot_names`](Self::slot_names).
    pub fn payload_keys(&self) -> impl Iterator<Item = &str> {
        let params = self
            .creator
            .iter()
            .flat_map(|creator| creator.params().iter().map(|p| p.spec().json_name()));
        params.chain(self.properties.iter().map(|p| p.spec().json_name()))
    }

    /// Returns true if payload key `key` belongs to a creator parameter or property.
    pub fn accepts_key(&self, key: &str) -> bool {
        self.payload_keys().any(|slot| slot == key)
    }
}
