//! Server-side conditional choice pipeline.
//!
//! Runs once per validation or submission event: every enabled target is
//! resolved against the submitted values and, when a group matches, the
//! target field's choices are narrowed in place so the platform's own
//! validation only accepts allowed values.

use indexmap::IndexMap;
use serde::Serialize;

use crate::conditions::choices::filter_choices;
use crate::conditions::groups::{resolve_target, AllowedSet};
use crate::conditions::value::ValueSource;
use crate::config::FormConfig;
use crate::form::FormDefinition;
use crate::types::FieldId;

/// Why a target was not evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Disabled,
    NoGroups,
    MissingField,
    NoChoices,
}

/// Result of evaluating one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetStatus {
    /// A group matched; the field now offers `kept` of its `original` choices.
    Restricted { original: usize, kept: usize },
    /// No group matched; the field keeps its original choices.
    Unrestricted,
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub target_field_id: FieldId,
    #[serde(flatten)]
    pub status: TargetStatus,
}

/// Resolve the allowed set of every enabled target without touching any
/// field model.
///
/// `values` are used as given; pass [`FormDefinition::shaped`] to resolve
/// submitted values the way [`apply_conditions`] does.
pub fn resolve_all<S: ValueSource + ?Sized>(
    config: &FormConfig,
    values: &S,
) -> IndexMap<FieldId, Option<AllowedSet>> {
    config
        .enabled_targets()
        .map(|target| {
            (
                target.target_field_id.clone(),
                resolve_target(target, values, config.mode),
            )
        })
        .collect()
}

/// Apply a form's conditional choices to its field model.
///
/// Values are read through the form's field kinds, so a multi-valued field
/// missing from the submission resolves to an empty list. Targets are
/// independent: a missing field or empty choice list skips that target only.
/// Running the pipeline twice with the same values leaves the form unchanged
/// the second time.
pub fn apply_conditions<S: ValueSource + ?Sized>(
    form: &mut FormDefinition,
    config: &FormConfig,
    values: &S,
) -> Vec<TargetOutcome> {
    let form_id = form.id;
    // Resolved up front: sources are read from the form as it was submitted.
    let mut resolved = resolve_all(config, &form.shaped(values));
    let mut outcomes = Vec::with_capacity(config.targets.len());

    for target in config.targets.values() {
        let id = target.target_field_id.clone();
        let skipped = |reason| TargetOutcome {
            target_field_id: id.clone(),
            status: TargetStatus::Skipped { reason },
        };

        if !target.enabled {
            outcomes.push(skipped(SkipReason::Disabled));
            continue;
        }
        if target.groups.is_empty() {
            outcomes.push(skipped(SkipReason::NoGroups));
            continue;
        }
        let Some(field) = form.field_mut(&id) else {
            tracing::debug!(form_id, target_field_id = %id, "Target field missing");
            outcomes.push(skipped(SkipReason::MissingField));
            continue;
        };
        let Some(original) = field.choices.as_ref().filter(|c| !c.is_empty()) else {
            outcomes.push(skipped(SkipReason::NoChoices));
            continue;
        };

        let status = match resolved.shift_remove(&id).flatten() {
            Some(allowed) => {
                let filtered = filter_choices(original, Some(&allowed));
                let status = TargetStatus::Restricted {
                    original: original.len(),
                    kept: filtered.len(),
                };
                field.choices = Some(filtered);
                status
            }
            None => TargetStatus::Unrestricted,
        };

        tracing::debug!(target_field_id = %id, ?status, "Resolved conditional choices");
        outcomes.push(TargetOutcome {
            target_field_id: id,
            status,
        });
    }

    outcomes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
