pub mod auth;
pub mod category;
pub mod client;
pub mod health;
pub mod project;
pub mod report;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                     login (public)
/// /auth/me                        current user
///
/// /projects                       list, create, batch update, batch delete
/// /projects/{id}                  get, update, delete
/// /projects/{id}/status           status overview, status update
///
/// /clients                        list, create, batch update, batch delete
/// /clients/{id}                   get, update, delete
///
/// /categories                     list, create, batch update, batch delete
/// /categories/{id}                get, update, delete
///
/// /users                          list, create, batch update, batch delete
/// /users/{id}                     get, update, delete
///
/// /reports/summary                financial totals (canViewReports)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", project::router())
        .nest("/clients", client::router())
        .nest("/categories", category::router())
        .nest("/users", user::router())
        .nest("/reports", report::router())
}
