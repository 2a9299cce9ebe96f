//! The bundled rule-based constraint engine.
//!
//! [`RuleEngine`] maps constraint kinds to [`Rule`]s. It ships with a small
//! catalog (NotBlank, NotEmpty, Size, Min, Max, Pattern, AssertTrue, Unique) and
//! accepts custom rules for cross-field and domain constraints.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use regex::Regex;
use serde_json::{Map, Value};

use crate::path::ViolationPath;

use super::{Constraint, ConstraintEngine, ContextPayload, EngineError, EngineViolation};

/// The check behind one constraint kind.
///
/// A rule returns the sub-paths (relative to the evaluated value) that failed;
/// an empty vec means the value satisfies the constraint. Rules are shared across
/// threads and must not keep per-call state.
pub trait Rule: Send + Sync {
    /// The message template used when the constraint carries none.
    fn default_message(&self) -> &str {
        "is invalid"
    }

    /// Checks `value` against `constraint`.
    fn check(
        &self,
        value: &Value,
        constraint: &Constraint,
        payload: Option<&ContextPayload>,
    ) -> Result<Vec<ViolationPath>, EngineError>;
}

impl<F> Rule for F
where
    F: Fn(&Value, &Constraint, Option<&ContextPayload>) -> Result<Vec<ViolationPath>, EngineError>
        + Send
        + Sync,
{
    fn check(
        &self,
        value: &Value,
        constraint: &Constraint,
        payload: Option<&ContextPayload>,
    ) -> Result<Vec<ViolationPath>, EngineError> {
        self(value, constraint, payload)
    }
}

/// A rule that passes or fails the evaluated value as a whole.
struct PredicateRule<F> {
    message: String,
    predicate: F,
}

impl<F> Rule for PredicateRule<F>
where
    F: Fn(&Value, Option<&ContextPayload>) -> bool + Send + Sync,
{
    fn default_message(&self) -> &str {
        &self.message
    }

    fn check(
        &self,
        value: &Value,
        _constraint: &Constraint,
        payload: Option<&ContextPayload>,
    ) -> Result<Vec<ViolationPath>, EngineError> {
        Ok(fail_unless((self.predicate)(value, payload)))
    }
}

/// A [`ConstraintEngine`] backed by a table of [`Rule`]s.
///
/// # Example
///
/// ```rust
/// use intake::{Constraint, ConstraintEngine, RuleEngine};
/// use serde_json::json;
///
/// let engine = RuleEngine::new().with_predicate(
///     "LowerBelowUpper",
///     "lower must be below upper",
///     |value, _payload| value["lower"].as_i64() < value["upper"].as_i64(),
/// );
///
/// let found = engine
///     .evaluate(
///         &json!({"lower": 3, "upper": 2}),
///         &[Constraint::new("LowerBelowUpper")],
///         None,
///     )
///     .unwrap();
/// assert_eq!(found[0].message, "lower must be below upper");
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: HashMap<String, Arc<dyn Rule>>,
}

impl RuleEngine {
    /// Creates an engine with the built-in catalog registered.
    pub fn new() -> Self {
        Self::empty()
            .with_rule("NotBlank", NotBlank)
            .with_rule("NotEmpty", NotEmpty)
            .with_rule("Size", Size)
            .with_rule("Min", Bound::Min)
            .with_rule("Max", Bound::Max)
            .with_rule("Pattern", Pattern::default())
            .with_rule("AssertTrue", AssertTrue)
            .with_rule("Unique", Unique)
    }

    /// Creates an engine with no rules at all.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Registers (or replaces) the rule for `kind`.
    pub fn with_rule<R>(mut self, kind: impl Into<String>, rule: R) -> Self
    where
        R: Rule + 'static,
    {
        self.rules.insert(kind.into(), Arc::new(rule));
        self
    }

    /// Registers a rule that fails the evaluated value as a whole when `predicate` is false.
    pub fn with_predicate<F>(self, kind: impl Into<String>, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value, Option<&ContextPayload>) -> bool + Send + Sync + 'static,
    {
        self.with_rule(
            kind,
            PredicateRule {
                message: message.into(),
                predicate,
            },
        )
    }

    /// Returns true if a rule is registered for `kind`.
    pub fn has_rule(&self, kind: &str) -> bool {
        self.rules.contains_key(kind)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintEngine for RuleEngine {
    fn evaluate(
        &self,
        value: &Value,
        constraints: &[Constraint],
        payload: Option<&ContextPayload>,
    ) -> Result<Vec<EngineViolation>, EngineError> {
        let mut found = Vec::new();

        for constraint in constraints {
            let rule = self
                .rules
                .get(constraint.kind())
                .ok_or_else(|| EngineError::UnknownConstraint(constraint.kind().to_string()))?;

            let failures = rule.check(value, constraint, payload)?;
            if failures.is_empty() {
                continue;
            }

            let template = constraint
                .message_template()
                .unwrap_or_else(|| rule.default_message());
            let message = interpolate(template, constraint.params());

            found.extend(
                failures
                    .into_iter()
                    .map(|sub_path| EngineViolation::new(sub_path, constraint.kind(), message.clone())),
            );
        }

        Ok(found)
    }
}

/// Replaces `{name}` placeholders with the matching constraint parameter.
///
/// Unknown placeholders are left as written.
pub(crate) fn interpolate(template: &str, params: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match params.get(name) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(other) => out.push_str(&other.to_string()),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn fail_unless(ok: bool) -> Vec<ViolationPath> {
    if ok {
        Vec::new()
    } else {
        vec![ViolationPath::root()]
    }
}

fn invalid(constraint: &Constraint, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidConstraint {
        kind: constraint.kind().to_string(),
        reason: reason.into(),
    }
}

struct NotBlank;

impl Rule for NotBlank {
    fn default_message(&self) -> &str {
        "must not be blank"
    }

    fn check(&self, value: &Value, _: &Constraint, _: Option<&ContextPayload>) -> Result<Vec<ViolationPath>, EngineError> {
        Ok(fail_unless(match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        }))
    }
}

struct NotEmpty;

impl Rule for NotEmpty {
    fn default_message(&self) -> &str {
        "must not be empty"
    }

    fn check(&self, value: &Value, _: &Constraint, _: Option<&ContextPayload>) -> Result<Vec<ViolationPath>, EngineError> {
        Ok(fail_unless(match value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(fields) => !fields.is_empty(),
            _ => true,
        }))
    }
}

struct Size;

impl Rule for Size {
    fn default_message(&self) -> &str {
        "size must be between {min} and {max}"
    }

    fn check(&self, value: &Value, constraint: &Constraint, _: Option<&ContextPayload>) -> Result<Vec<ViolationPath>, EngineError> {
        let len = match value {
            Value::Null => return Ok(Vec::new()),
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(fields) => fields.len(),
            _ => return Err(invalid(constraint, "only strings, lists and objects have a size")),
        };

        let min = usize_param(constraint, "min")?.unwrap_or(0);
        let max = usize_param(constraint, "max")?.unwrap_or(usize::MAX);
        Ok(fail_unless(len >= min && len <= max))
    }
}

fn usize_param(constraint: &Constraint, name: &str) -> Result<Option<usize>, EngineError> {
    match constraint.param(name) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| invalid(constraint, format!("'{}' must be a non-negative integer", name))),
    }
}

enum Bound {
    Min,
    Max,
}

impl Rule for Bound {
    fn default_message(&self) -> &str {
        match self {
            Bound::Min => "must be greater than or equal to {value}",
            Bound::Max => "must be less than or equal to {value}",
        }
    }

    fn check(&self, value: &Value, constraint: &Constraint, _: Option<&ContextPayload>) -> Result<Vec<ViolationPath>, EngineError> {
        let limit = constraint
            .param("value")
            .and_then(Value::as_f64)
            .ok_or_else(|| invalid(constraint, "'value' must be a number"))?;

        let actual = match value {
            Value::Null => return Ok(Vec::new()),
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            _ => return Err(invalid(constraint, "only numbers can be bounded")),
        };

        Ok(fail_unless(match self {
            Bound::Min => actual >= limit,
            Bound::Max => actual <= limit,
        }))
    }
}

/// Compiled patterns are cached per pattern string for the engine's lifetime.
#[derive(Default)]
struct Pattern {
    cache: RwLock<HashMap<String, Regex>>,
}

impl Pattern {
    fn is_match(&self, pattern: &str, text: &str) -> Result<bool, regex::Error> {
        if let Some(regex) = self.cache.read().get(pattern) {
            return Ok(regex.is_match(text));
        }

        // The whole string must match.
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        let matched = regex.is_match(text);
        self.cache.write().insert(pattern.to_string(), regex);
        Ok(matched)
    }
}

impl Rule for Pattern {
    fn default_message(&self) -> &str {
        "must match \"{regexp}\""
    }

    fn check(&self, value: &Value, constraint: &Constraint, _: Option<&ContextPayload>) -> Result<Vec<ViolationPath>, EngineError> {
        let pattern = constraint
            .param("regexp")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(constraint, "'regexp' must be a string"))?;

        match value {
            Value::Null => Ok(Vec::new()),
            Value::String(text) => {
                let matched = self
                    .is_match(pattern, text)
                    .map_err(|e| invalid(constraint, e.to_string()))?;
                Ok(fail_unless(matched))
            }
            _ => Err(invalid(constraint, "only strings can match a pattern")),
        }
    }
}

struct AssertTrue;

impl Rule for AssertTrue {
    fn default_message(&self) -> &str {
        "must be true"
    }

    fn check(&self, value: &Value, constraint: &Constraint, _: Option<&ContextPayload>) -> Result<Vec<ViolationPath>, EngineError> {
        match constraint.param("field").and_then(Value::as_str) {
            Some(field) => match value.get(field) {
                None | Some(Value::Null) | Some(Value::Bool(true)) => Ok(Vec::new()),
                Some(_) => Ok(vec![ViolationPath::from_field(field)]),
            },
            None => Ok(fail_unless(matches!(value, Value::Null | Value::Bool(true)))),
        }
    }
}

struct Unique;

impl Rule for Unique {
    fn default_message(&self) -> &str {
        "must be unique"
    }

    fn check(&self, value: &Value, constraint: &Constraint, _: Option<&ContextPayload>) -> Result<Vec<ViolationPath>, EngineError> {
        let items = match value {
            Value::Null => return Ok(Vec::new()),
            Value::Array(items) => items,
            _ => return Err(invalid(constraint, "only lists can be unique")),
        };
        let key = constraint.param("key").and_then(Value::as_str);

        let keyed: Vec<Option<&Value>> = items
            .iter()
            .map(|item| match key {
                Some(key) => item.get(key),
                None => Some(item),
            })
            .collect();

        let mut failures = Vec::new();
        for (index, current) in keyed.iter().enumerate() {
            let Some(current) = current else { continue };
            let repeated = keyed[..index]
                .iter()
                .any(|earlier| earlier.as_ref() == Some(current));
            if repeated {
                let path = ViolationPath::from_index(index);
                failures.push(match key {
                    Some(key) => path.push_field(key),
                    None => path,
                });
            }
        }
        Ok(failures)
    }
}
