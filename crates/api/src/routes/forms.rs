//! Route definitions for the `/forms` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::forms;
use crate::state::AppState;

/// Routes mounted at `/forms`.
///
/// ```text
/// GET    /{form_id}/conditional-choices          -> get_conditional_choices
/// GET    /{form_id}/fields/{field_id}/choices    -> get_field_choices
/// POST   /{form_id}/submissions/validate         -> validate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{form_id}/conditional-choices",
            get(forms::get_conditional_choices),
        )
        .route(
            "/{form_id}/fields/{field_id}/choices",
            get(forms::get_field_choices),
        )
        .route("/{form_id}/submissions/validate", post(forms::validate))
}
