//! The evaluate-and-record routine shared by creator parameters and properties.

use serde_json::Value;

use crate::descriptor::{CreatorParameter, PropertyDescriptor, SlotSpec};
use crate::error::{ConstraintViolation, DeserializeError, InvalidValue};
use crate::features::Feature;
use crate::kind;
use crate::validation::ValidationContext;

use super::nested::{self, Coerced};
use super::{record_engine_violations, Owner};

/// Where a slot's value comes from.
#[derive(Clone, Copy)]
pub(crate) enum Slot<'d> {
    Creator(&'d CreatorParameter),
    Property(&'d PropertyDescriptor),
}

impl<'d> Slot<'d> {
    fn spec(self) -> &'d SlotSpec {
        match self {
            Slot::Creator(param) => param.spec(),
            Slot::Property(property) => property.spec(),
        }
    }

    fn origin(self) -> &'static str {
        match self {
            Slot::Creator(_) => "creator",
            Slot::Property(_) => "property",
        }
    }
}

/// What happened to a slot that the payload omitted.
pub(crate) enum Absent {
    /// A required creator parameter; the creator must not run.
    Missing,
    /// A lateinit-like property that stays unassigned.
    Unset,
    /// The slot takes its default, if it has one.
    Filled(Option<Value>),
}

/// Evaluates a value supplied in the payload. Must be called inside the slot's
/// field scope.
///
/// Returns the coerced value, or `None` if it was rejected or holds a nested
/// object that could not be materialized.
pub(crate) fn evaluate_present(
    ctx: &mut ValidationContext<'_>,
    owner: Owner<'_>,
    slot: Slot<'_>,
    raw: &Value,
) -> Result<Option<Value>, DeserializeError> {
    if raw.is_null() {
        check_value(ctx, owner, slot, raw, InvalidValue::Value(Value::Null))?;
        return Ok(Some(Value::Null));
    }

    let spec = slot.spec();
    match nested::coerce(ctx, owner, spec.slot_type(), spec.is_cascade(), raw)? {
        Coerced::Value(value) => {
            run_constraints(ctx, owner, spec, &value)?;
            Ok(Some(value))
        }
        Coerced::Partial => {
            run_constraints(ctx, owner, spec, raw)?;
            Ok(None)
        }
        Coerced::Rejected => Ok(None),
    }
}

/// Handles a slot the payload omitted. Must be called inside the slot's field scope.
///
/// `current` is the value a property already holds on the constructed instance.
pub(crate) fn evaluate_absent(
    ctx: &mut ValidationContext<'_>,
    owner: Owner<'_>,
    slot: Slot<'_>,
    current: Option<&Value>,
) -> Result<Absent, DeserializeError> {
    let spec = slot.spec();

    match slot {
        Slot::Creator(param) if param.is_required(ctx.features()) => {
            if !owner.validating {
                return Err(DeserializeError::MissingRequired { path: ctx.path() });
            }
            let violation = if ctx.is_enabled(Feature::ReportMissingRequiredAsNotNull) {
                ConstraintViolation::new(ctx.path(), kind::NOT_NULL, not_null_message(spec))
            } else {
                let message = param
                    .required_message
                    .as_deref()
                    .unwrap_or_else(|| owner.required_message());
                ConstraintViolation::new(ctx.path(), kind::REQUIRED, message)
            };
            ctx.record(violation);
            Ok(Absent::Missing)
        }
        Slot::Property(property) if property.is_lateinit_like() && current.is_none() => {
            if owner.validating && ctx.is_enabled(Feature::ValidateUnsetLateinitLikeProperties) {
                let violation = ConstraintViolation::new(ctx.path(), kind::NOT_NULL, not_null_message(spec));
                ctx.record(violation);
            }
            Ok(Absent::Unset)
        }
        _ => {
            let (value, invalid) = match current.or(spec.default()) {
                Some(value) => (value.clone(), InvalidValue::Value(value.clone())),
                None => (Value::Null, InvalidValue::Absent),
            };
            check_value(ctx, owner, slot, &value, invalid)?;
            Ok(Absent::Filled(spec.default().cloned()))
        }
    }
}

/// Checks nullability, then the declared constraints, of a final value.
fn check_value(
    ctx: &mut ValidationContext<'_>,
    owner: Owner<'_>,
    slot: Slot<'_>,
    value: &Value,
    invalid: InvalidValue,
) -> Result<(), DeserializeError> {
    if !owner.validating {
        return Ok(());
    }

    let spec = slot.spec();
    if value.is_null() && violates_not_null(ctx, spec) {
        tracing::trace!(slot = spec.name(), origin = slot.origin(), "null in non-null slot");
        let mut violation = ConstraintViolation::new(ctx.path(), kind::NOT_NULL, not_null_message(spec));
        violation.invalid_value = invalid;
        ctx.record(violation);
        return Ok(());
    }

    run_constraints(ctx, owner, spec, value)
}

fn run_constraints(
    ctx: &mut ValidationContext<'_>,
    owner: Owner<'_>,
    spec: &SlotSpec,
    value: &Value,
) -> Result<(), DeserializeError> {
    if !owner.validating || spec.constraints().is_empty() {
        return Ok(());
    }

    let found = ctx.engine().evaluate(value, spec.constraints(), None)?;
    record_engine_violations(ctx, found, value);
    Ok(())
}

fn violates_not_null(ctx: &ValidationContext<'_>, spec: &SlotSpec) -> bool {
    spec.not_null().is_some()
        || (spec.nullability().is_implicitly_non_null()
            && ctx.is_enabled(Feature::ValidateImplicitNonNullProperties))
}

fn not_null_message(spec: &SlotSpec) -> &str {
    spec.not_null()
        .and_then(|constraint| constraint.message_template())
        .unwrap_or(kind::DEFAULT_NOT_NULL_MESSAGE)
}
