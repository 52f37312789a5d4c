//! Handlers for the `/users` resource (collaborator management).
//!
//! Any authenticated user may browse collaborators; creating, updating and
//! deleting them needs `canManageUsers`. Password hashes never leave the
//! server.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use studio_core::error::CoreError;
use studio_core::roles::Role;
use studio_core::types::DbId;
use studio_core::validation::{validate_batch_size, validate_email, validate_name};
use studio_db::models::project::{Project, ProjectFilter};
use studio_db::models::stats::{UserStats, WithStats};
use studio_db::models::user::{CreateUser, UpdateUser, User};

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{not_found, AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireUserManager;
use crate::response::{
    ApiResponse, BatchDeleteRequest, BatchDeleteResult, BatchUpdateRequest, BatchUpdateResult,
};
use crate::state::AppState;

type UserWithStats = WithStats<User, UserStats>;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Request body for `PUT /users/{id}`; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserBatchItem {
    pub id: DbId,
    #[serde(flatten)]
    pub changes: UpdateUserRequest,
}

fn hash(password: &str) -> AppResult<String> {
    validate_password_strength(password).map_err(CoreError::Validation)?;
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

impl UpdateUserRequest {
    /// Validate and normalize into the repository input, hashing any new
    /// password.
    fn into_update(self) -> AppResult<UpdateUser> {
        let name = match self.name {
            Some(name) => {
                validate_name("name", &name)?;
                Some(name.trim().to_string())
            }
            None => None,
        };
        let email = match self.email {
            Some(email) => {
                validate_email(email.trim())?;
                Some(email.trim().to_string())
            }
            None => None,
        };
        let password_hash = self.password.as_deref().map(hash).transpose()?;

        Ok(UpdateUser {
            name,
            email,
            role: self.role,
            is_active: self.is_active,
            password_hash,
        })
    }
}

fn with_stats(user: User, projects: &[Project], auth: &AuthUser) -> UserWithStats {
    WithStats {
        stats: UserStats::for_user(user.id, projects, auth.can_view_finance()),
        entity: user,
    }
}

async fn all_projects(state: &AppState) -> AppResult<Vec<Project>> {
    Ok(state.store.list_projects(&ProjectFilter::default()).await?)
}

/// Reject changes that would leave the caller unable to administer.
fn check_self_update(auth: &AuthUser, id: DbId, update: &UpdateUser) -> AppResult<()> {
    if id != auth.user_id {
        return Ok(());
    }
    if update.is_active == Some(false) {
        return Err(CoreError::Conflict("You cannot deactivate your own account".into()).into());
    }
    if update.role.is_some_and(|role| role != auth.role) {
        return Err(CoreError::Conflict("You cannot change your own role".into()).into());
    }
    Ok(())
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<UserWithStats>>>> {
    let users = state.store.list_users().await?;
    let projects = all_projects(&state).await?;
    let data = users
        .into_iter()
        .map(|u| with_stats(u, &projects, &auth))
        .collect();
    Ok(Json(ApiResponse::ok(data)))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    RequireUserManager(auth): RequireUserManager,
    AppJson(input): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserWithStats>>)> {
    validate_name("name", &input.name)?;
    validate_email(input.email.trim())?;
    let password_hash = hash(&input.password)?;

    let user = state
        .store
        .create_user(&CreateUser {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            role: input.role,
            password_hash,
        })
        .await?;
    tracing::info!(user_id = user.id, role = %user.role, created_by = auth.user_id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            with_stats(user, &[], &auth),
            "User created",
        )),
    ))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<UserWithStats>>> {
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    let projects = all_projects(&state).await?;
    Ok(Json(ApiResponse::ok(with_stats(user, &projects, &auth))))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireUserManager(auth): RequireUserManager,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<UserWithStats>>> {
    let update = input.into_update()?;
    check_self_update(&auth, id, &update)?;

    let user = state
        .store
        .update_user(id, &update)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    tracing::info!(user_id = id, updated_by = auth.user_id, "User updated");

    let projects = all_projects(&state).await?;
    Ok(Json(ApiResponse::with_message(
        with_stats(user, &projects, &auth),
        "User updated",
    )))
}

/// DELETE /api/users/{id}
///
/// Users still responsible for a project cannot be deleted.
pub async fn delete(
    State(state): State<AppState>,
    RequireUserManager(auth): RequireUserManager,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if id == auth.user_id {
        return Err(CoreError::Conflict("You cannot delete your own account".into()).into());
    }
    if !state.store.delete_user(id).await? {
        return Err(not_found("User", id));
    }
    tracing::info!(user_id = id, deleted_by = auth.user_id, "User deleted");
    Ok(Json(ApiResponse::message("User deleted")))
}

/// PUT /api/users
pub async fn batch_update(
    State(state): State<AppState>,
    RequireUserManager(auth): RequireUserManager,
    AppJson(body): AppJson<BatchUpdateRequest<UserBatchItem>>,
) -> AppResult<Json<ApiResponse<BatchUpdateResult>>> {
    validate_batch_size(body.items.len())?;

    let mut result = BatchUpdateResult::default();
    for item in body.items {
        let id = item.id;
        let outcome = match item
            .changes
            .into_update()
            .and_then(|u| check_self_update(&auth, id, &u).map(|()| u))
        {
            Ok(update) => state
                .store
                .update_user(id, &update)
                .await
                .map_err(AppError::from)
                .and_then(|u| u.ok_or_else(|| not_found("User", id))),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(_) => result.updated += 1,
            Err(err) if err.is_skippable_in_batch() => {
                tracing::debug!(user_id = id, error = %err, "Skipping batch item");
                result.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(updated = result.updated, skipped = result.skipped, "User batch update");
    let message = format!("{} user(s) updated", result.updated);
    Ok(Json(ApiResponse::with_message(result, message)))
}

/// DELETE /api/users
///
/// The caller's own account, unknown ids and users still responsible for a
/// project are skipped.
pub async fn batch_delete(
    State(state): State<AppState>,
    RequireUserManager(auth): RequireUserManager,
    AppJson(body): AppJson<BatchDeleteRequest>,
) -> AppResult<Json<ApiResponse<BatchDeleteResult>>> {
    validate_batch_size(body.ids.len())?;

    let mut result = BatchDeleteResult::default();
    for id in body.ids {
        if id == auth.user_id {
            result.skipped += 1;
            continue;
        }
        match state.store.delete_user(id).await.map_err(AppError::from) {
            Ok(true) => result.deleted += 1,
            Ok(false) => result.skipped += 1,
            Err(err) if err.is_skippable_in_batch() => {
                tracing::debug!(user_id = id, error = %err, "Skipping batch item");
                result.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(deleted = result.deleted, skipped = result.skipped, "User batch delete");
    let message = format!("{} user(s) deleted", result.deleted);
    Ok(Json(ApiResponse::with_message(result, message)))
}
