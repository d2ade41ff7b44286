//! Submission checks against (possibly narrowed) choice lists.
//!
//! [`check_submission`] is the platform-side half of the server context: once
//! [`apply_conditions`] has narrowed the target fields, any submitted value
//! outside a field's choices is a violation. [`validate_submission`] runs both
//! steps on a copy of the form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::conditions::choices::Choice;
use crate::conditions::value::{resolve, ValueSource};
use crate::form::{FieldDefinition, FormDefinition};
use crate::pipeline::{apply_conditions, TargetOutcome};
use crate::types::FieldId;

/// Rule type reported for a value outside the field's choices.
pub const CHOICE_NOT_ALLOWED: &str = "choice_not_allowed";

/// Aggregated result of checking one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionCheck {
    pub is_valid: bool,
    pub errors: Vec<FieldViolation>,
}

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: FieldId,
    pub rule_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Check every submitted choice value against its field's current choices.
///
/// Fields without a choice list are not checked. Empty values are never
/// violations; required-ness is the platform's concern.
pub fn check_submission<S: ValueSource + ?Sized>(
    form: &FormDefinition,
    values: &S,
) -> SubmissionCheck {
    let mut errors = Vec::new();

    for field in &form.fields {
        let Some(choices) = field.choices.as_deref() else {
            continue;
        };
        let submitted = resolve(values, &field.id);
        for entry in submitted.entries() {
            if !choices.iter().any(|c| c.value == entry) {
                errors.push(FieldViolation {
                    field: field.id.clone(),
                    rule_type: CHOICE_NOT_ALLOWED.to_string(),
                    message: format!("'{entry}' is not an available choice for {}", label(field)),
                    value: Some(entry.to_string()),
                });
            }
        }
    }

    SubmissionCheck {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn label(field: &FieldDefinition) -> &str {
    if field.label.is_empty() {
        &field.id
    } else {
        &field.label
    }
}

// ---------------------------------------------------------------------------
// Full validation pass
// ---------------------------------------------------------------------------

/// Outcome of narrowing a form and checking a submission against it.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    pub is_valid: bool,
    pub outcomes: Vec<TargetOutcome>,
    pub errors: Vec<FieldViolation>,
    /// Effective choices of every target that exists on the form.
    pub fields: IndexMap<FieldId, Vec<Choice>>,
}

/// Apply the form's conditional choices to a copy of `form`, then check the
/// submission against the narrowed choices.
pub fn validate_submission<S: ValueSource + ?Sized>(
    form: &FormDefinition,
    values: &S,
) -> SubmissionReport {
    let shaped = form.shaped(values);
    let mut narrowed = form.clone();
    let outcomes = apply_conditions(&mut narrowed, &form.conditional_choices, &shaped);
    let check = check_submission(&narrowed, &shaped);

    let fields = form
        .conditional_choices
        .targets
        .keys()
        .filter_map(|id| {
            let field = narrowed.field(id)?;
            Some((id.clone(), field.choices.clone().unwrap_or_default()))
        })
        .collect();

    tracing::debug!(
        form_id = form.id,
        is_valid = check.is_valid,
        violations = check.errors.len(),
        "Checked submission",
    );

    SubmissionReport {
        is_valid: check.is_valid,
        outcomes,
        errors: check.errors,
        fields,
    }
}
