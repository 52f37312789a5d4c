use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use studio_core::error::CoreError;
use studio_db::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for persistence
/// errors. Every variant renders as `{ "success": false, "error", "code" }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error; the message is logged, never returned.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const GENERIC_INTERNAL: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::BAD_REQUEST, "CONFLICT", msg.clone()),
                CoreError::TransitionNotAllowed { .. } => (
                    StatusCode::BAD_REQUEST,
                    "TRANSITION_NOT_ALLOWED",
                    core.to_string(),
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        GENERIC_INTERNAL.to_string(),
                    )
                }
            },

            AppError::Store(err) => classify_store_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    GENERIC_INTERNAL.to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Business-rule violations reported by the store are client errors; any
/// other store failure is a 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Duplicate { .. } => (StatusCode::BAD_REQUEST, "DUPLICATE", err.to_string()),
        StoreError::InUse { .. } => (StatusCode::BAD_REQUEST, "IN_USE", err.to_string()),
        StoreError::MissingReference { .. } => {
            (StatusCode::BAD_REQUEST, "MISSING_REFERENCE", err.to_string())
        }
        StoreError::Stale { .. } => (StatusCode::CONFLICT, "STALE_WRITE", err.to_string()),
        StoreError::Decode(_) | StoreError::Database(_) => {
            tracing::error!(error = %err, "Store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                GENERIC_INTERNAL.to_string(),
            )
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Shorthand for a [`CoreError::NotFound`] wrapped in [`AppError`].
pub fn not_found(entity: &'static str, id: studio_core::types::DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

pub fn forbidden(message: impl Into<String>) -> AppError {
    AppError::Core(CoreError::Forbidden(message.into()))
}

impl AppError {
    /// Whether a batch operation should skip the offending item and carry on
    /// rather than fail the whole request.
    pub fn is_skippable_in_batch(&self) -> bool {
        matches!(
            self,
            AppError::Core(
                CoreError::Validation(_) | CoreError::Conflict(_) | CoreError::NotFound { .. }
            )
                | AppError::Store(
                    StoreError::Duplicate { .. }
                        | StoreError::InUse { .. }
                        | StoreError::MissingReference { .. }
                )
                | AppError::BadRequest(_)
        )
    }
}
