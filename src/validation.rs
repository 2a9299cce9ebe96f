//! Per-call validation state.
//!
//! This module provides the [`ValidationContext`] created for each top-level
//! deserialization call. It carries the current payload path, the ordered
//! collection of recorded violations, a snapshot of the feature flags, and depth
//! tracking for nested objects. A context is owned by a single call and never
//! shared between calls.

use serde_json::Value;
use stillwater::Validation;

use crate::engine::ConstraintEngine;
use crate::error::{ConstraintViolation, DeserializeError, Violations};
use crate::features::{Feature, FeatureSet};
use crate::path::{PathSegment, PathTracker, ViolationPath};
use crate::registry::TypeRegistry;
use crate::ValidationResult;

/// Ordered, append-only collection of the violations of one call.
#[derive(Debug, Default)]
pub struct ViolationCollector {
    violations: Vec<ConstraintViolation>,
}

impl ViolationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: ConstraintViolation) {
        self.violations.push(violation);
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.violations.iter()
    }

    /// Converts into the aggregate report, or `None` if nothing was recorded.
    pub fn into_violations(self) -> Option<Violations> {
        Violations::from_vec(self.violations)
    }
}

/// Validation state threaded through one deserialization call.
///
/// The path is maintained with enter/leave discipline: every scope pushed by
/// [`in_field`](Self::in_field) or [`in_index`](Self::in_index) is restored when
/// the closure returns, including on early `?` returns inside it.
pub struct ValidationContext<'a> {
    registry: &'a TypeRegistry,
    engine: &'a dyn ConstraintEngine,
    features: FeatureSet,
    tracker: PathTracker,
    collector: ViolationCollector,
    depth: usize,
    max_depth: usize,
}

impl<'a> ValidationContext<'a> {
    /// Creates a context at the root path with no violations.
    pub fn new(
        registry: &'a TypeRegistry,
        engine: &'a dyn ConstraintEngine,
        features: FeatureSet,
        max_depth: usize,
    ) -> Self {
        Self {
            registry,
            engine,
            features,
            tracker: PathTracker::new(),
            collector: ViolationCollector::new(),
            depth: 0,
            max_depth,
        }
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    pub fn engine(&self) -> &'a dyn ConstraintEngine {
        self.engine
    }

    pub fn features(&self) -> FeatureSet {
        self.features
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.features.is_enabled(feature)
    }

    /// The current payload path.
    pub fn path(&self) -> ViolationPath {
        self.tracker.snapshot()
    }

    /// The current object nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Runs `f` with `name` appended to the path.
    pub fn in_field<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.in_segment(PathSegment::field(name), f)
    }

    /// Runs `f` with `[index]` appended to the path.
    pub fn in_index<R>(&mut self, index: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        self.in_segment(PathSegment::index(index), f)
    }

    fn in_segment<R>(&mut self, segment: PathSegment, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.tracker.push(segment);
        let result = f(self);
        self.tracker.restore(depth);
        result
    }

    /// Runs `f` one object level deeper.
    ///
    /// # Errors
    ///
    /// Returns `DeserializeError::DepthExceeded` when the limit would be crossed.
    pub fn descend<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, DeserializeError>,
    ) -> Result<R, DeserializeError> {
        if self.depth >= self.max_depth {
            return Err(DeserializeError::DepthExceeded {
                path: self.path(),
                max_depth: self.max_depth,
            });
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Records a violation.
    pub fn record(&mut self, violation: ConstraintViolation) {
        tracing::trace!(
            path = %violation.path,
            kind = %violation.kind,
            message = %violation.message,
            "recorded violation"
        );
        self.collector.push(violation);
    }

    /// The number of violations recorded so far.
    ///
    /// Comparing counts before and after a phase tells whether the phase added any.
    pub fn violation_count(&self) -> usize {
        self.collector.len()
    }

    /// The violations recorded so far.
    pub fn violations(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.collector.iter()
    }

    /// Ends the call, yielding the value or the aggregate report.
    ///
    /// A value is withheld only after at least one violation was recorded, so a
    /// missing value with an empty collector does not occur.
    pub fn finish(self, value: Option<Value>) -> ValidationResult<Value> {
        match self.collector.into_violations() {
            Some(violations) => Validation::Failure(violations),
            None => Validation::Success(value.unwrap_or(Value::Null)),
        }
    }
}
