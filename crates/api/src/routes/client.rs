//! Route definitions for the `/clients` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::client;
use crate::state::AppState;

/// Routes mounted at `/clients`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// PUT    /        -> batch_update
/// DELETE /        -> batch_delete
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(client::list)
                .post(client::create)
                .put(client::batch_update)
                .delete(client::batch_delete),
        )
        .route(
            "/{id}",
            get(client::get_by_id).put(client::update).delete(client::delete),
        )
}
