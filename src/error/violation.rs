//! Constraint violation types.
//!
//! This module provides [`ConstraintViolation`] for a single path-addressed failure
//! and [`Violations`], the non-empty aggregate report of one deserialization call.

use std::fmt::{self, Display};

use serde_json::Value;
use stillwater::prelude::*;

use crate::path::ViolationPath;

/// The offending value of a violation.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidValue {
    /// The slot was absent from the payload (or never assigned).
    Absent,
    /// The value that failed, `Value::Null` for explicit nulls.
    Value(Value),
}

impl InvalidValue {
    /// Returns the offending value, or None if the slot was absent.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            InvalidValue::Absent => None,
            InvalidValue::Value(value) => Some(value),
        }
    }
}

/// A single data-validity violation.
///
/// - **path**: where in the payload the violation occurred
/// - **kind**: identifier of the violated constraint (`Required`, `NotNull`,
///   `InvalidInput`, or a kind reported by the constraint engine)
/// - **message**: human-readable description
/// - **invalid_value**: the offending value, or [`InvalidValue::Absent`]
///
/// # Example
///
/// ```rust
/// use intake::{ConstraintViolation, InvalidValue, ViolationPath};
///
/// let violation = ConstraintViolation::new(
///     ViolationPath::root().push_field("left"),
///     "NotNull",
///     "must not be null",
/// )
/// .with_invalid_value(serde_json::Value::Null);
///
/// assert_eq!(violation.kind, "NotNull");
/// assert_eq!(violation.invalid_value, InvalidValue::Value(serde_json::Value::Null));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// The path to the slot that failed.
    pub path: ViolationPath,
    /// The violated constraint kind.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// The offending value.
    pub invalid_value: InvalidValue,
}

impl ConstraintViolation {
    /// Creates a new violation. The invalid value defaults to [`InvalidValue::Absent`].
    pub fn new(path: ViolationPath, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            kind: kind.into(),
            message: message.into(),
            invalid_value: InvalidValue::Absent,
        }
    }

    /// Sets the offending value and returns self for chaining.
    pub fn with_invalid_value(mut self, value: Value) -> Self {
        self.invalid_value = InvalidValue::Value(value);
        self
    }
}

impl Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };

        write!(f, "{}: {} [{}]", path_str, self.message, self.kind)?;

        if let InvalidValue::Value(ref value) = self.invalid_value {
            write!(f, " (got: {})", value)?;
        }

        Ok(())
    }
}

impl std::error::Error for ConstraintViolation {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ConstraintViolation>();
    assert_sync::<ConstraintViolation>();
};

/// The aggregate violation report of one top-level deserialization call.
///
/// `Violations` wraps a `NonEmptyVec<ConstraintViolation>`: a failed call always
/// carries at least one violation. Violations keep the deterministic traversal
/// order in which they were found; [`Violations::is_equivalent`] compares two
/// reports as sets.
///
/// # Combining Reports
///
/// ```rust
/// use intake::{ConstraintViolation, ViolationPath, Violations};
/// use stillwater::prelude::*;
///
/// let first = Violations::single(
///     ConstraintViolation::new(ViolationPath::from_field("left"), "NotNull", "must not be null")
/// );
/// let second = Violations::single(
///     ConstraintViolation::new(ViolationPath::from_field("right"), "Required", "is required")
/// );
///
/// assert_eq!(first.combine(second).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Violations(NonEmptyVec<ConstraintViolation>);

impl Violations {
    /// Creates a report containing a single violation.
    pub fn single(violation: ConstraintViolation) -> Self {
        Self(NonEmptyVec::singleton(violation))
    }

    /// Creates a report from a `Vec`, or None if the vec is empty.
    pub fn from_vec(violations: Vec<ConstraintViolation>) -> Option<Self> {
        NonEmptyVec::from_vec(violations).map(Self)
    }

    /// Returns the number of violations in this report.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a report is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the violations in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.0.iter()
    }

    /// Returns all violations whose rendered path equals `path` (e.g. `"nested[0].value"`).
    pub fn at(&self, path: &str) -> Vec<&ConstraintViolation> {
        self.0.iter().filter(|v| v.path.to_string() == path).collect()
    }

    /// Returns all violations at the specified path.
    pub fn at_path(&self, path: &ViolationPath) -> Vec<&ConstraintViolation> {
        self.0.iter().filter(|v| &v.path == path).collect()
    }

    /// Returns all violations of the specified kind.
    pub fn with_kind(&self, kind: &str) -> Vec<&ConstraintViolation> {
        self.0.iter().filter(|v| v.kind == kind).collect()
    }

    /// Returns true if a violation of `kind` exists at the rendered `path`.
    pub fn contains(&self, kind: &str, path: &str) -> bool {
        self.0
            .iter()
            .any(|v| v.kind == kind && v.path.to_string() == path)
    }

    /// Returns the first violation found.
    pub fn first(&self) -> &ConstraintViolation {
        self.0.head()
    }

    /// Compares two reports as sets, ignoring traversal order.
    pub fn is_equivalent(&self, other: &Violations) -> bool {
        self.len() == other.len()
            && self.iter().all(|v| other.iter().any(|o| o == v))
            && other.iter().all(|o| self.iter().any(|v| v == o))
    }

    /// Converts this report into a `Vec<ConstraintViolation>`.
    pub fn into_vec(self) -> Vec<ConstraintViolation> {
        self.0.into_vec()
    }
}

impl Semigroup for Violations {
    fn combine(self, other: Self) -> Self {
        Violations(self.0.combine(other.0))
    }
}

impl Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deserialization failed with {} violation(s):", self.len())?;
        for (i, violation) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl IntoIterator for Violations {
    type Item = ConstraintViolation;
    type IntoIter = std::vec::IntoIter<ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a ConstraintViolation;
    type IntoIter = Box<dyn Iterator<Item = &'a ConstraintViolation> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Violations>();
    assert_sync::<Violations>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violation(path: &str, kind: &str) -> ConstraintViolation {
        ConstraintViolation::new(ViolationPath::from_field(path), kind, "message")
    }

    #[test]
    fn test_violation_creation() {
        let v = ConstraintViolation::new(ViolationPath::from_field("left"), "Required", "is required");

        assert_eq!(v.path.to_string(), "left");
        assert_eq!(v.kind, "Required");
        assert_eq!(v.invalid_value, InvalidValue::Absent);
        assert!(v.invalid_value.as_value().is_none());
    }

    #[test]
    fn test_violation_display() {
        let v = ConstraintViolation::new(ViolationPath::from_field("age"), "Min", "must be at least 0")
            .with_invalid_value(json!(-5));

        let display = v.to_string();
        assert!(display.contains("age: must be at least 0 [Min]"));
        assert!(display.contains("got: -5"));
    }

    #[test]
    fn test_violation_display_root() {
        let v = ConstraintViolation::new(ViolationPath::root(), "LowerBelowUpper", "bad range");
        assert!(v.to_string().starts_with("(root): bad range"));
    }

    #[test]
    fn test_from_vec_rejects_empty() {
        assert!(Violations::from_vec(Vec::new()).is_none());
        let report = Violations::from_vec(vec![violation("a", "NotNull")]).unwrap();
        assert_eq!(report.len(), 1);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_queries() {
        let report = Violations::from_vec(vec![
            violation("a", "NotNull"),
            violation("a", "Size"),
            violation("b", "NotNull"),
        ])
        .unwrap();

        assert_eq!(report.at("a").len(), 2);
        assert_eq!(report.at_path(&ViolationPath::from_field("b")).len(), 1);
        assert_eq!(report.with_kind("NotNull").len(), 2);
        assert!(report.contains("Size", "a"));
        assert!(!report.contains("Size", "b"));
        assert_eq!(report.first().path.to_string(), "a");
    }

    #[test]
    fn test_duplicates_by_path_and_kind_are_kept() {
        let report = Violations::single(violation("a", "NotNull"))
            .combine(Violations::single(violation("a", "NotNull")));
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_is_equivalent_ignores_order() {
        let left = Violations::from_vec(vec![violation("a", "NotNull"), violation("b", "Required")])
            .unwrap();
        let right = Violations::from_vec(vec![violation("b", "Required"), violation("a", "NotNull")])
            .unwrap();
        let other = Violations::single(violation("a", "NotNull"));

        assert!(left.is_equivalent(&right));
        assert_ne!(left, right);
        assert!(!left.is_equivalent(&other));
    }

    #[test]
    fn test_display_lists_all() {
        let report = Violations::from_vec(vec![violation("left", "NotNull"), violation("right", "Required")])
            .unwrap();
        let display = report.to_string();

        assert!(display.contains("2 violation(s)"));
        assert!(display.contains("1. left"));
        assert!(display.contains("2. right"));
    }

    #[test]
    fn test_into_iter() {
        let report = Violations::single(violation("a", "NotNull"))
            .combine(Violations::single(violation("b", "NotNull")));
        let borrowed: Vec<_> = (&report).into_iter().map(|v| v.path.to_string()).collect();
        let owned: Vec<ConstraintViolation> = report.into_iter().collect();

        assert_eq!(borrowed, vec!["a", "b"]);
        assert_eq!(owned.len(), 2);
    }
}
