//! Handlers for `/projects/{id}/status`.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use studio_core::types::DbId;
use studio_db::models::project::ProjectView;

use crate::error::{forbidden, not_found, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::services::project_status::{
    update_project_status, StatusOverview, StatusUpdateRequest,
};
use crate::services::relations::project_view;
use crate::state::AppState;

/// Response of a successful status update.
#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub data: ProjectView,
    pub message: String,
    /// Project fields written by automations, in firing order.
    pub automations: Vec<&'static str>,
}

/// GET /api/projects/{id}/status
pub async fn get_status(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<StatusOverview>>> {
    let project = state
        .store
        .find_project(id)
        .await?
        .ok_or_else(|| not_found("Project", id))?;

    if !auth.policy().can_view(auth.user_id, &project.assignment()) {
        return Err(forbidden("Not allowed to view this project"));
    }

    Ok(Json(ApiResponse::ok(StatusOverview::of(&project))))
}

/// PUT /api/projects/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(request): AppJson<StatusUpdateRequest>,
) -> AppResult<Json<StatusUpdateResponse>> {
    let outcome = update_project_status(state.store.as_ref(), &auth, id, &request).await?;

    let mut message = format!("Status updated to {}", outcome.plan.target);
    if !outcome.plan.automations.is_empty() {
        let descriptions: Vec<&str> = outcome
            .plan
            .automations
            .iter()
            .map(|a| a.description())
            .collect();
        message.push_str(". ");
        message.push_str(&descriptions.join("; "));
    }
    let automations = outcome.plan.affected_fields();

    let data = project_view(state.store.as_ref(), outcome.project, &auth).await?;
    Ok(Json(StatusUpdateResponse {
        success: true,
        data,
        message,
        automations,
    }))
}
