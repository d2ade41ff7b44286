//! Handlers for the `/forms` resource.
//!
//! Serves the resolved conditional-choice payload the client runtime binds
//! to, the normalised choices of a field, and the authoritative
//! pre-validation pass over submitted values.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use choicegate_core::conditions::{Choice, SubmittedValues};
use choicegate_core::config::ResolvedForm;
use choicegate_core::submission::{validate_submission, SubmissionReport};
use choicegate_core::types::FormId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/forms/{form_id}/conditional-choices
///
/// Enabled targets that exist on the form, each with its original choices.
pub async fn get_conditional_choices(
    State(state): State<AppState>,
    Path(form_id): Path<FormId>,
) -> AppResult<Json<DataResponse<ResolvedForm>>> {
    let form = state.forms.get(form_id)?;
    let resolved = form.conditional_choices.resolve(form);
    Ok(Json(DataResponse { data: resolved }))
}

/// GET /api/v1/forms/{form_id}/fields/{field_id}/choices
pub async fn get_field_choices(
    State(state): State<AppState>,
    Path((form_id, field_id)): Path<(FormId, String)>,
) -> AppResult<Json<DataResponse<Vec<Choice>>>> {
    let form = state.forms.get(form_id)?;
    let choices = form.field_choices(&field_id)?.to_vec();
    Ok(Json(DataResponse { data: choices }))
}

/// Request body for [`validate`].
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// `field id -> scalar | [checked values]`.
    #[serde(default)]
    pub values: serde_json::Map<String, serde_json::Value>,
}

/// POST /api/v1/forms/{form_id}/submissions/validate
///
/// Narrows a copy of the form's choice fields against the submitted values,
/// then checks every submitted choice. Always 200 for a known form and a
/// readable body; the verdict is in `is_valid`.
pub async fn validate(
    State(state): State<AppState>,
    Path(form_id): Path<FormId>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<SubmissionReport>>> {
    let form = state.forms.get(form_id)?;
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let values = SubmittedValues::from_json(&input.values);
    let report = validate_submission(form, &values);

    tracing::info!(
        form_id,
        is_valid = report.is_valid,
        violations = report.errors.len(),
        "Validated submission",
    );
    Ok(Json(DataResponse { data: report }))
}
