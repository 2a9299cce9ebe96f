//! Coercion of raw values to slot types, including recursive descent into
//! nested objects and list elements.

use serde_json::{Map, Value};

use crate::descriptor::{SlotType, TypeRef};
use crate::error::{ConstraintViolation, DeserializeError};
use crate::kind;
use crate::validation::ValidationContext;

use super::{json_type, materialize, Owner};

/// Result of coercing one raw value.
pub(crate) enum Coerced {
    Value(Value),
    /// Coerced structurally, but a nested object was withheld after violations.
    Partial,
    /// Recorded as `InvalidInput` at the current path.
    Rejected,
}

/// Coerces `raw` to `ty`. Null list elements are kept as null.
///
/// A nested object is validated when its type is validated or the slot carries
/// the cascade marker. The decision is made per slot and is not inherited from
/// the enclosing object.
pub(crate) fn coerce(
    ctx: &mut ValidationContext<'_>,
    owner: Owner<'_>,
    ty: &SlotType,
    cascade: bool,
    raw: &Value,
) -> Result<Coerced, DeserializeError> {
    let accepted = match ty {
        SlotType::Any => true,
        SlotType::Bool => raw.is_boolean(),
        SlotType::Integer => raw.is_i64() || raw.is_u64(),
        SlotType::Number => raw.is_number(),
        SlotType::String => raw.is_string(),
        SlotType::Custom(coercion) => {
            return match coercion.coerce(raw) {
                Ok(value) => Ok(Coerced::Value(value)),
                Err(reason) => {
                    tracing::trace!(path = %ctx.path(), coercion = coercion.name(), %reason, "coercion failed");
                    reject(ctx, owner, raw, || ty.name())
                }
            };
        }
        SlotType::Object(type_ref) => {
            return match raw {
                Value::Object(fields) => descend(ctx, owner, type_ref, cascade, raw, fields),
                _ => reject(ctx, owner, raw, || ty.name()),
            };
        }
        SlotType::List(element) => {
            return match raw {
                Value::Array(items) => coerce_list(ctx, owner, element, cascade, items),
                _ => reject(ctx, owner, raw, || ty.name()),
            };
        }
    };

    if accepted {
        Ok(Coerced::Value(raw.clone()))
    } else {
        reject(ctx, owner, raw, || ty.name())
    }
}

/// Materializes a nested object.
///
/// When a validated owner holds an object of an unvalidated type, a structural
/// failure inside that object becomes one `InvalidInput` at the owner's slot
/// instead of aborting the call.
fn descend(
    ctx: &mut ValidationContext<'_>,
    owner: Owner<'_>,
    type_ref: &TypeRef,
    cascade: bool,
    raw: &Value,
    fields: &Map<String, Value>,
) -> Result<Coerced, DeserializeError> {
    let desc = ctx.registry().resolve(type_ref)?;
    let validating = desc.is_validated() || cascade;
    tracing::trace!(path = %ctx.path(), type_name = desc.name(), validating, "descending into nested object");

    let instance = match ctx.descend(|ctx| materialize(ctx, &desc, validating, fields)) {
        Ok(instance) => instance,
        Err(err @ (DeserializeError::Mismatch { .. } | DeserializeError::MissingRequired { .. }))
            if owner.validating && !validating =>
        {
            tracing::trace!(path = %ctx.path(), type_name = desc.name(), error = %err, "nested object rejected");
            return reject(ctx, owner, raw, || desc.name().to_string());
        }
        Err(err) => return Err(err),
    };

    Ok(match instance {
        Some(object) => Coerced::Value(Value::Object(object)),
        None => Coerced::Partial,
    })
}

fn coerce_list(
    ctx: &mut ValidationContext<'_>,
    owner: Owner<'_>,
    element: &SlotType,
    cascade: bool,
    items: &[Value],
) -> Result<Coerced, DeserializeError> {
    let mut values = Vec::with_capacity(items.len());
    let mut rejected = false;
    let mut partial = false;

    for (index, item) in items.iter().enumerate() {
        let coerced = ctx.in_index(index, |ctx| {
            if item.is_null() {
                Ok(Coerced::Value(Value::Null))
            } else {
                coerce(ctx, owner, element, cascade, item)
            }
        })?;

        match coerced {
            Coerced::Value(value) => values.push(value),
            Coerced::Partial => partial = true,
            Coerced::Rejected => rejected = true,
        }
    }

    Ok(if rejected {
        Coerced::Rejected
    } else if partial {
        Coerced::Partial
    } else {
        Coerced::Value(Value::Array(values))
    })
}

/// Reports a value that cannot be coerced: `InvalidInput` in a validated owner,
/// a fatal mismatch otherwise.
pub(super) fn reject(
    ctx: &mut ValidationContext<'_>,
    owner: Owner<'_>,
    raw: &Value,
    expected: impl FnOnce() -> String,
) -> Result<Coerced, DeserializeError> {
    let path = ctx.path();
    if !owner.validating {
        return Err(DeserializeError::Mismatch {
            path,
            expected: expected(),
            got: json_type(raw).to_string(),
        });
    }

    ctx.record(
        ConstraintViolation::new(path, kind::INVALID_INPUT, owner.invalid_input_message())
            .with_invalid_value(raw.clone()),
    );
    Ok(Coerced::Rejected)
}
