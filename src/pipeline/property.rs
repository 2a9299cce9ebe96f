//! Post-construction property validation and assignment.

use serde_json::{Map, Value};

use crate::error::DeserializeError;
use crate::validation::ValidationContext;

use super::slot::{self, Absent, Slot};
use super::Owner;

/// Evaluates every settable property in declaration order, including ones the
/// payload omits, and assigns the results to `instance`.
///
/// When the creator was not invoked there is no instance: properties are still
/// validated so the report is complete, but nothing is assigned.
pub(super) fn run(
    ctx: &mut ValidationContext<'_>,
    owner: Owner<'_>,
    fields: &Map<String, Value>,
    instance: &mut Option<Map<String, Value>>,
) -> Result<(), DeserializeError> {
    let features = ctx.features();
    for property in owner.desc.properties() {
        let name = property.name();
        ctx.in_field(property.spec().path_name(features), |ctx| -> Result<(), DeserializeError> {
            let assigned = match fields.get(property.spec().json_name()) {
                Some(raw) => slot::evaluate_present(ctx, owner, Slot::Property(property), raw)?,
                None => {
                    let current = instance.as_ref().and_then(|object| object.get(name));
                    let held = current.is_some();
                    match slot::evaluate_absent(ctx, owner, Slot::Property(property), current)? {
                        Absent::Filled(default) if !held => default,
                        _ => None,
                    }
                }
            };

            if let (Some(object), Some(value)) = (instance.as_mut(), assigned) {
                object.insert(name.to_string(), value);
            }
            Ok(())
        })?;
    }
    Ok(())
}
