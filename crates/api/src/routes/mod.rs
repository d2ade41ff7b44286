pub mod forms;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /forms/{form_id}/conditional-choices             resolved client payload
/// /forms/{form_id}/fields/{field_id}/choices       normalised field choices
/// /forms/{form_id}/submissions/validate            pre-validation pass (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/forms", forms::router())
}
