//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{project, project_status};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /               -> list (?phase, clientId, categoryId, responsavelId)
/// POST   /               -> create
/// PUT    /               -> batch_update
/// DELETE /               -> batch_delete
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// DELETE /{id}           -> delete
/// GET    /{id}/status    -> get_status
/// PUT    /{id}/status    -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(project::list)
                .post(project::create)
                .put(project::batch_update)
                .delete(project::batch_delete),
        )
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route(
            "/{id}/status",
            get(project_status::get_status).put(project_status::update_status),
        )
}
