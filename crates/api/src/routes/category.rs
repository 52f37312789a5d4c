//! Route definitions for the `/categories` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::category;
use crate::state::AppState;

/// Routes mounted at `/categories`.
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
            get(category::list)
                .post(category::create)
                .put(category::batch_update)
                .delete(category::batch_delete),
        )
        .route(
            "/{id}",
            get(category::get_by_id).put(category::update).delete(category::delete),
        )
}
