//! Creator-parameter interception: every parameter is evaluated before the
//! object exists, then the creator runs only if the values allow it.

use serde_json::{Map, Value};

use crate::descriptor::CreatorArgs;
use crate::engine::ContextPayload;
use crate::error::DeserializeError;
use crate::features::Feature;
use crate::validation::ValidationContext;

use super::slot::{self, Absent, Slot};
use super::Owner;

pub(super) struct CreatorOutcome {
    /// The constructed fields, or `None` if the creator was not invoked.
    pub instance: Option<Map<String, Value>>,
    /// Parameter name to raw supplied value. Only set for types with a creator.
    pub payload: Option<ContextPayload>,
}

/// Evaluates the creator parameters in declaration order and invokes the creator.
///
/// The creator is skipped when a required parameter is missing. It is also
/// skipped after any new violation, unless whole-object validation is enabled, in
/// which case it runs on best-effort values. A creator error is fatal unless the
/// arguments were already known to be invalid.
pub(super) fn run(
    ctx: &mut ValidationContext<'_>,
    owner: Owner<'_>,
    fields: &Map<String, Value>,
) -> Result<CreatorOutcome, DeserializeError> {
    let Some(creator) = owner.desc.creator_ref() else {
        return Ok(CreatorOutcome {
            instance: Some(Map::new()),
            payload: None,
        });
    };

    let before = ctx.violation_count();
    let mut args = CreatorArgs::default();
    let mut payload = ContextPayload::new();
    let mut missing = false;

    let features = ctx.features();
    for param in creator.params() {
        let name = param.name();
        ctx.in_field(param.spec().path_name(features), |ctx| -> Result<(), DeserializeError> {
            match fields.get(param.spec().json_name()) {
                Some(raw) => {
                    payload.insert(name.to_string(), raw.clone());
                    if let Some(value) = slot::evaluate_present(ctx, owner, Slot::Creator(param), raw)? {
                        args.insert(name, value);
                    }
                }
                None => match slot::evaluate_absent(ctx, owner, Slot::Creator(param), None)? {
                    Absent::Missing => missing = true,
                    Absent::Filled(Some(default)) => args.insert(name, default),
                    Absent::Filled(None) | Absent::Unset => {}
                },
            }
            Ok(())
        })?;
    }

    let failed = ctx.violation_count() > before;
    let best_effort = ctx.is_enabled(Feature::ValidateWholeObjectAfterConstruction);

    if missing || (failed && !best_effort) {
        tracing::debug!(
            type_name = owner.desc.name(),
            path = %ctx.path(),
            missing,
            "creator not invoked"
        );
        return Ok(CreatorOutcome {
            instance: None,
            payload: Some(payload),
        });
    }

    let instance = match creator.invoke(&args) {
        Ok(instance) => Some(instance),
        Err(source) if failed => {
            tracing::debug!(
                type_name = owner.desc.name(),
                path = %ctx.path(),
                error = %source,
                "creator rejected best-effort arguments"
            );
            None
        }
        Err(source) => {
            return Err(DeserializeError::Creator {
                type_name: owner.desc.name().to_string(),
                path: ctx.path(),
                source,
            })
        }
    };

    Ok(CreatorOutcome {
        instance,
        payload: Some(payload),
    })
}
