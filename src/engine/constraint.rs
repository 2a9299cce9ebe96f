//! Declared constraint specifications.

use serde_json::{Map, Value};

use crate::kind;

/// A declared constraint on a slot or on a whole object.
///
/// A constraint is data: a kind, ordered parameters and an optional message
/// template. The pipeline interprets only `NotNull`; every other kind is handed
/// to the [`ConstraintEngine`](super::ConstraintEngine) untouched.
///
/// # Example
///
/// ```rust
/// use intake::Constraint;
/// use serde_json::json;
///
/// let size = Constraint::size(1, 20).message("name must have {min} to {max} characters");
/// assert_eq!(size.kind(), "Size");
/// assert_eq!(size.param("max"), Some(&json!(20)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    kind: String,
    params: Map<String, Value>,
    message: Option<String>,
}

impl Constraint {
    /// Creates a constraint of an arbitrary kind with no parameters.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: Map::new(),
            message: None,
        }
    }

    /// The value must not be null.
    pub fn not_null() -> Self {
        Self::new(kind::NOT_NULL)
    }

    /// The string must contain at least one non-whitespace character.
    pub fn not_blank() -> Self {
        Self::new("NotBlank")
    }

    /// The string, list or object must not be empty.
    pub fn not_empty() -> Self {
        Self::new("NotEmpty")
    }

    /// The string length (in characters), list length or object size must be within `min..=max`.
    pub fn size(min: usize, max: usize) -> Self {
        Self::new("Size").with("min", min).with("max", max)
    }

    /// The number must be at least `value`.
    pub fn min(value: i64) -> Self {
        Self::new("Min").with("value", value)
    }

    /// The number must be at most `value`.
    pub fn max(value: i64) -> Self {
        Self::new("Max").with("value", value)
    }

    /// The string must match the regular expression `regexp`.
    pub fn pattern(regexp: impl Into<String>) -> Self {
        Self::new("Pattern").with("regexp", regexp.into())
    }

    /// The boolean value (or the boolean at `param("field")` of an object) must be true.
    pub fn assert_true() -> Self {
        Self::new("AssertTrue")
    }

    /// The list elements (or their `param("key")` field) must be distinct.
    pub fn unique() -> Self {
        Self::new("Unique")
    }

    /// Adds a parameter and returns self for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets the message template and returns self for chaining.
    ///
    /// `{name}` placeholders are replaced by the matching parameter.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The constraint kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the parameter `name`.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// All parameters in declaration order.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// The custom message template, if any.
    pub fn message_template(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub(crate) fn is_not_null(&self) -> bool {
        self.kind == kind::NOT_NULL
    }
}
