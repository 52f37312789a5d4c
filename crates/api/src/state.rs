use std::sync::Arc;

use studio_db::Store;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: both fields are reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend (Postgres or in-memory).
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
}
