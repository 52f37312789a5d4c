//! Route definitions for `/reports`.

use axum::routing::get;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(report::summary))
}
