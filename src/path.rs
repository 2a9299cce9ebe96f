//! Violation paths and the per-call path tracker.
//!
//! This module provides [`ViolationPath`] and [`PathSegment`] for addressing a slot
//! inside a payload (e.g. `nested[0].value`), and [`PathTracker`], the mutable
//! segment stack a deserialization call pushes and pops while it descends.

use std::fmt::{self, Display};

use serde_json::Value;

/// A segment of a violation path.
///
/// Paths are built from segments that represent either field access or list indexing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A field, creator parameter or property (e.g. `left`, `nested`)
    Field(String),
    /// A zero-based list element (e.g. `[0]`, `[42]`)
    Index(usize),
}

impl PathSegment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// The fully-qualified address of a slot that failed a constraint.
///
/// A `ViolationPath` is immutable: every builder method returns a new path, so a
/// violation that captured a path never observes later traversal.
///
/// # Example
///
/// ```rust
/// use intake::ViolationPath;
///
/// let path = ViolationPath::root()
///     .push_field("nested")
///     .push_index(0)
///     .push_field("value");
///
/// assert_eq!(path.to_string(), "nested[0].value");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ViolationPath {
    segments: Vec<PathSegment>,
}

impl ViolationPath {
    /// Creates an empty path representing the top-level object.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a single field segment.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Creates a path from a single index segment.
    pub fn from_index(idx: usize) -> Self {
        Self {
            segments: vec![PathSegment::Index(idx)],
        }
    }

    /// Returns a new path with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Returns a new path with all segments of `relative` appended.
    ///
    /// Used to anchor the relative sub-paths reported by a constraint engine
    /// at the slot currently being validated.
    pub fn join(&self, relative: &ViolationPath) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + relative.segments.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(&relative.segments);
        Self { segments }
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the parent path, or None if this is root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Returns the last segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Follows this path inside `value`, returning the addressed value if it exists.
    pub fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.segments
            .iter()
            .try_fold(value, |current, segment| match segment {
                PathSegment::Field(name) => current.get(name.as_str()),
                PathSegment::Index(idx) => current.get(*idx),
            })
    }
}

impl From<Vec<PathSegment>> for ViolationPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }
}

impl Display for ViolationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// The live segment stack of one deserialization call.
///
/// The tracker is owned by a single [`ValidationContext`](crate::validation::ValidationContext)
/// and is never shared. Descents go through
/// [`ValidationContext::in_field`](crate::validation::ValidationContext::in_field) and
/// [`in_index`](crate::validation::ValidationContext::in_index), which pair each
/// [`push`](PathTracker::push) with a [`restore`](PathTracker::restore) whether the nested
/// work returned `Ok` or `Err`.
#[derive(Debug, Default)]
pub struct PathTracker {
    segments: Vec<PathSegment>,
}

impl PathTracker {
    /// Creates an empty tracker positioned at the top-level object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current stack depth.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Pushes a segment and returns the depth to restore afterwards.
    pub fn push(&mut self, segment: PathSegment) -> usize {
        let depth = self.segments.len();
        self.segments.push(segment);
        depth
    }

    /// Truncates the stack back to `depth`.
    pub fn restore(&mut self, depth: usize) {
        self.segments.truncate(depth);
    }

    /// Captures the current position as an immutable path.
    pub fn snapshot(&self) -> ViolationPath {
        ViolationPath::from(self.segments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_path_is_empty() {
        let path = ViolationPath::root();
        assert!(path.is_root());
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_field_with_index() {
        let path = ViolationPath::root().push_field("nested").push_index(0);
        assert_eq!(path.to_string(), "nested[0]");
    }

    #[test]
    fn test_complex_path() {
        let path = ViolationPath::root()
            .push_field("outer")
            .push_field("nested")
            .push_index(2)
            .push_field("value");
        assert_eq!(path.to_string(), "outer.nested[2].value");
    }

    #[test]
    fn test_leading_index() {
        let path = ViolationPath::from_index(1).push_field("value");
        assert_eq!(path.to_string(), "[1].value");
    }

    #[test]
    fn test_path_immutability() {
        let base = ViolationPath::root().push_field("nested");
        let path_a = base.push_index(0);
        let path_b = base.push_index(1);

        assert_eq!(base.to_string(), "nested");
        assert_eq!(path_a.to_string(), "nested[0]");
        assert_eq!(path_b.to_string(), "nested[1]");
    }

    #[test]
    fn test_join_relative_path() {
        let base = ViolationPath::from_field("nested");
        let relative = ViolationPath::from_index(1).push_field("value");

        assert_eq!(base.join(&relative).to_string(), "nested[1].value");
        assert_eq!(base.join(&ViolationPath::root()), base);
        assert_eq!(ViolationPath::root().join(&relative), relative);
    }

    #[test]
    fn test_parent_path() {
        let path = ViolationPath::root()
            .push_field("nested")
            .push_index(0)
            .push_field("value");

        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "nested[0]");
        assert_eq!(parent.last(), Some(&PathSegment::Index(0)));
        assert!(ViolationPath::root().parent().is_none());
    }

    #[test]
    fn test_lookup() {
        let value = json!({"nested": [{"value": "a"}, {"value": "b"}]});
        let path = ViolationPath::from_field("nested").push_index(1).push_field("value");

        assert_eq!(path.lookup(&value), Some(&json!("b")));
        assert_eq!(ViolationPath::root().lookup(&value), Some(&value));
        assert!(ViolationPath::from_field("missing").lookup(&value).is_none());
        assert!(ViolationPath::from_field("nested")
            .push_index(5)
            .lookup(&value)
            .is_none());
    }

    #[test]
    fn test_tracker_snapshot_is_detached() {
        let mut tracker = PathTracker::new();
        tracker.push(PathSegment::field("nested"));
        let snapshot = tracker.snapshot();
        tracker.push(PathSegment::index(3));

        assert_eq!(snapshot.to_string(), "nested");
        assert_eq!(tracker.snapshot().to_string(), "nested[3]");
    }

    #[test]
    fn test_tracker_restore_truncates_to_saved_depth() {
        let mut tracker = PathTracker::new();
        tracker.push(PathSegment::field("outer"));

        let saved = tracker.push(PathSegment::field("nested"));
        tracker.push(PathSegment::index(0));
        assert_eq!(tracker.snapshot().to_string(), "outer.nested[0]");

        tracker.restore(saved);
        assert_eq!(tracker.depth(), 1);
        assert_eq!(tracker.snapshot().to_string(), "outer");
    }
}
