//! The fused materialize-and-validate pass.
//!
//! One object is processed in a fixed order: unknown keys, creator parameters in
//! declaration order, then settable properties in declaration order, then
//! whole-object constraints. Nested objects and list elements are fully resolved
//! depth-first before the next sibling slot, so identical input always yields an
//! identical violation order.

mod creator;
mod nested;
mod property;
mod slot;

use serde_json::{Map, Value};

use crate::descriptor::TypeDescriptor;
use crate::engine::{ContextPayload, EngineViolation};
use crate::error::{ConstraintViolation, DeserializeError};
use crate::features::Feature;
use crate::kind;
use crate::path::ViolationPath;
use crate::validation::ValidationContext;

/// The object whose slots are being processed.
#[derive(Clone, Copy)]
pub(crate) struct Owner<'d> {
    desc: &'d TypeDescriptor,
    /// Whether violations in this object's own slots are recorded.
    validating: bool,
}

impl<'d> Owner<'d> {
    fn required_message(&self) -> &'d str {
        self.desc
            .required_message_override()
            .unwrap_or(kind::DEFAULT_REQUIRED_MESSAGE)
    }

    fn invalid_input_message(&self) -> &'d str {
        self.desc
            .invalid_input_message_override()
            .unwrap_or(kind::DEFAULT_INVALID_INPUT_MESSAGE)
    }
}

/// Materializes the top-level value of a call.
pub(crate) fn materialize_root(
    ctx: &mut ValidationContext<'_>,
    desc: &TypeDescriptor,
    raw: &Value,
) -> Result<Option<Value>, DeserializeError> {
    match raw {
        Value::Object(fields) => {
            let instance = ctx.descend(|ctx| materialize(ctx, desc, desc.is_validated(), fields))?;
            Ok(instance.map(Value::Object))
        }
        other => {
            let owner = Owner {
                desc,
                validating: desc.is_validated(),
            };
            nested::reject(ctx, owner, other, || desc.name().to_string())?;
            Ok(None)
        }
    }
}

/// Materializes one object, recording violations into `ctx`.
///
/// Returns `None` when the creator was not invoked. That only happens after a
/// violation was recorded (or a fatal error was returned) for this object.
pub(crate) fn materialize(
    ctx: &mut ValidationContext<'_>,
    desc: &TypeDescriptor,
    validating: bool,
    fields: &Map<String, Value>,
) -> Result<Option<Map<String, Value>>, DeserializeError> {
    let owner = Owner { desc, validating };

    check_unknown(ctx, desc, fields)?;

    let outcome = creator::run(ctx, owner, fields)?;
    let mut instance = outcome.instance;
    property::run(ctx, owner, fields, &mut instance)?;

    if let Some(object) = &instance {
        validate_whole_object(ctx, owner, object, outcome.payload.as_ref())?;
    }

    Ok(instance)
}

fn check_unknown(
    ctx: &mut ValidationContext<'_>,
    desc: &TypeDescriptor,
    fields: &Map<String, Value>,
) -> Result<(), DeserializeError> {
    for key in fields.keys().filter(|key| !desc.accepts_key(key)) {
        if ctx.is_enabled(Feature::FailOnUnknownProperties) {
            return Err(DeserializeError::UnknownProperty {
                path: ctx.path().push_field(key.as_str()),
            });
        }
        tracing::trace!(type_name = desc.name(), key = %key, "ignoring unknown property");
    }
    Ok(())
}

fn validate_whole_object(
    ctx: &mut ValidationContext<'_>,
    owner: Owner<'_>,
    object: &Map<String, Value>,
    payload: Option<&ContextPayload>,
) -> Result<(), DeserializeError> {
    if !owner.validating
        || !ctx.is_enabled(Feature::ValidateWholeObjectAfterConstruction)
        || owner.desc.constraints().is_empty()
    {
        return Ok(());
    }

    let value = Value::Object(object.clone());
    let found = ctx
        .engine()
        .evaluate(&value, owner.desc.constraints(), payload)?;
    record_engine_violations(ctx, found, &value);
    Ok(())
}

/// Records engine results, anchoring each relative sub-path at the current path.
fn record_engine_violations(
    ctx: &mut ValidationContext<'_>,
    found: Vec<EngineViolation>,
    value: &Value,
) {
    let base: ViolationPath = ctx.path();
    for violation in found {
        let invalid = violation.sub_path.lookup(value).unwrap_or(value).clone();
        ctx.record(
            ConstraintViolation::new(base.join(&violation.sub_path), violation.kind, violation.message)
                .with_invalid_value(invalid),
        );
    }
}

/// Name of a JSON value's type, for mismatch reports.
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
