use std::sync::Arc;

use crate::config::ServerConfig;
use crate::store::FormStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the form store is read-only once loaded.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Form definitions and their conditional-choice configurations.
    pub forms: Arc<FormStore>,
}
