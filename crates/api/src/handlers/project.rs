//! Handlers for the `/projects` resource.
//!
//! Listing and reads go through the caller's permission policy; responses
//! are [`ProjectView`]s, so finance fields never reach roles without finance
//! access.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use studio_core::types::DbId;
use studio_core::validation::{validate_batch_size, validate_name};
use studio_db::models::project::{
    CreateProject, ProjectBatchItem, ProjectFilter, ProjectView, UpdateProject,
};

use crate::error::{forbidden, not_found, AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProjectManager;
use crate::response::{
    ApiResponse, BatchDeleteRequest, BatchDeleteResult, BatchUpdateRequest, BatchUpdateResult,
};
use crate::services::relations::{project_view, RelationIndex};
use crate::state::AppState;

/// Reject changes the caller's role may not make through a plain update and
/// normalize the title the same way `create` does.
fn prepare_update(actor: &AuthUser, input: &mut UpdateProject) -> AppResult<()> {
    if input.touches_finance() && !actor.can_view_finance() {
        return Err(forbidden("Not allowed to change financial fields"));
    }
    if let Some(title) = input.title.as_mut() {
        validate_name("title", title)?;
        *title = title.trim().to_string();
    }
    Ok(())
}

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(filter): AppQuery<ProjectFilter>,
) -> AppResult<Json<ApiResponse<Vec<ProjectView>>>> {
    let policy = auth.policy();
    let projects = state.store.list_projects(&filter).await?;
    let index = RelationIndex::load(state.store.as_ref()).await?;

    let views: Vec<ProjectView> = projects
        .into_iter()
        .filter(|p| policy.can_view(auth.user_id, &p.assignment()))
        .map(|p| index.view(p, &auth))
        .collect();

    Ok(Json(ApiResponse::ok(views)))
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    RequireProjectManager(auth): RequireProjectManager,
    AppJson(mut input): AppJson<CreateProject>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProjectView>>)> {
    validate_name("title", &input.title)?;
    input.title = input.title.trim().to_string();

    let project = state.store.create_project(&input).await?;
    tracing::info!(project_id = project.id, client_id = project.client_id, "Project created");

    let view = project_view(state.store.as_ref(), project, &auth).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(view, "Project created")),
    ))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<ProjectView>>> {
    let project = state
        .store
        .find_project(id)
        .await?
        .ok_or_else(|| not_found("Project", id))?;

    if !auth.policy().can_view(auth.user_id, &project.assignment()) {
        return Err(forbidden("Not allowed to view this project"));
    }

    let view = project_view(state.store.as_ref(), project, &auth).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// PUT /api/projects/{id}
///
/// Phase and statuses are not accepted here; see the status endpoint.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(mut input): AppJson<UpdateProject>,
) -> AppResult<Json<ApiResponse<ProjectView>>> {
    let project = state
        .store
        .find_project(id)
        .await?
        .ok_or_else(|| not_found("Project", id))?;

    let policy = auth.policy();
    let assignment = project.assignment();
    if !policy.can_edit(auth.user_id, &assignment) {
        return Err(forbidden("Not allowed to edit this project"));
    }
    if input.touches_assignment() && !policy.can_assign(auth.user_id, &assignment) {
        return Err(forbidden("Not allowed to change project assignments"));
    }
    prepare_update(&auth, &mut input)?;

    let updated = state
        .store
        .update_project(id, &input)
        .await?
        .ok_or_else(|| not_found("Project", id))?;
    tracing::info!(project_id = id, user_id = auth.user_id, "Project updated");

    let view = project_view(state.store.as_ref(), updated, &auth).await?;
    Ok(Json(ApiResponse::with_message(view, "Project updated")))
}

/// DELETE /api/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireProjectManager(auth): RequireProjectManager,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !state.store.delete_project(id).await? {
        return Err(not_found("Project", id));
    }
    tracing::info!(project_id = id, user_id = auth.user_id, "Project deleted");
    Ok(Json(ApiResponse::message("Project deleted")))
}

/// PUT /api/projects
///
/// Items that are missing or invalid are skipped and counted.
pub async fn batch_update(
    State(state): State<AppState>,
    RequireProjectManager(auth): RequireProjectManager,
    AppJson(mut body): AppJson<BatchUpdateRequest<ProjectBatchItem>>,
) -> AppResult<Json<ApiResponse<BatchUpdateResult>>> {
    validate_batch_size(body.items.len())?;

    let mut result = BatchUpdateResult::default();
    for item in &mut body.items {
        let outcome = match prepare_update(&auth, &mut item.changes) {
            Ok(()) => state
                .store
                .update_project(item.id, &item.changes)
                .await
                .map_err(AppError::from)
                .and_then(|p| p.ok_or_else(|| not_found("Project", item.id))),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(_) => result.updated += 1,
            Err(err) if err.is_skippable_in_batch() => {
                tracing::debug!(project_id = item.id, error = %err, "Skipping batch item");
                result.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(updated = result.updated, skipped = result.skipped, "Project batch update");
    let message = format!("{} project(s) updated", result.updated);
    Ok(Json(ApiResponse::with_message(result, message)))
}

/// DELETE /api/projects
pub async fn batch_delete(
    State(state): State<AppState>,
    RequireProjectManager(_auth): RequireProjectManager,
    AppJson(body): AppJson<BatchDeleteRequest>,
) -> AppResult<Json<ApiResponse<BatchDeleteResult>>> {
    validate_batch_size(body.ids.len())?;

    let mut result = BatchDeleteResult::default();
    for id in body.ids {
        if state.store.delete_project(id).await? {
            result.deleted += 1;
        } else {
            result.skipped += 1;
        }
    }

    tracing::info!(deleted = result.deleted, skipped = result.skipped, "Project batch delete");
    let message = format!("{} project(s) deleted", result.deleted);
    Ok(Json(ApiResponse::with_message(result, message)))
}
