//! Shared response envelope types for API handlers.
//!
//! Successful responses are `{ "success": true, "data"?, "message"? }`; the
//! error counterpart is produced by [`AppError`](crate::error::AppError).

use serde::Serialize;
use studio_core::types::DbId;

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// A success envelope carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Outcome of a batch update: applied items and items skipped because they
/// were missing or violated a uniqueness rule.
#[derive(Debug, Default, Serialize)]
pub struct BatchUpdateResult {
    pub updated: u64,
    pub skipped: u64,
}

/// Outcome of a batch delete.
#[derive(Debug, Default, Serialize)]
pub struct BatchDeleteResult {
    pub deleted: u64,
    pub skipped: u64,
}

/// Request body for batch deletes: `{ "ids": [...] }`.
#[derive(Debug, serde::Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<DbId>,
}

/// Request body for batch updates: `{ "items": [...] }`.
#[derive(Debug, serde::Deserialize)]
pub struct BatchUpdateRequest<T> {
    pub items: Vec<T>,
}
