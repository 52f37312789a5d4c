//! Handlers for the `/categories` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use studio_core::types::DbId;
use studio_core::validation::{validate_batch_size, validate_color, validate_name};
use studio_db::models::category::{Category, CategoryBatchItem, CreateCategory, UpdateCategory};
use studio_db::models::project::ProjectFilter;
use studio_db::models::stats::{EntityStats, WithStats};

use crate::error::{not_found, AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireCategoryManager;
use crate::response::{
    ApiResponse, BatchDeleteRequest, BatchDeleteResult, BatchUpdateRequest, BatchUpdateResult,
};
use crate::state::AppState;

type CategoryWithStats = WithStats<Category, EntityStats>;

fn normalize_color(color: &mut Option<String>) -> AppResult<()> {
    if let Some(c) = color.as_mut() {
        let trimmed = c.trim();
        if trimmed.is_empty() {
            *color = None;
            return Ok(());
        }
        validate_color(trimmed)?;
        *c = trimmed.to_uppercase();
    }
    Ok(())
}

fn normalize_update(input: &mut UpdateCategory) -> AppResult<()> {
    if let Some(name) = input.name.as_mut() {
        validate_name("name", name)?;
        *name = name.trim().to_string();
    }
    normalize_color(&mut input.color)
}

async fn with_stats(
    state: &AppState,
    category: Category,
    auth: &AuthUser,
) -> AppResult<CategoryWithStats> {
    let filter = ProjectFilter {
        category_id: Some(category.id),
        ..ProjectFilter::default()
    };
    let projects = state.store.list_projects(&filter).await?;
    Ok(WithStats {
        stats: EntityStats::from_projects(&projects, auth.can_view_finance()),
        entity: category,
    })
}

/// GET /api/categories
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<CategoryWithStats>>>> {
    let categories = state.store.list_categories().await?;
    let projects = state.store.list_projects(&ProjectFilter::default()).await?;
    let include_finance = auth.can_view_finance();

    let data = categories
        .into_iter()
        .map(|category| WithStats {
            stats: EntityStats::from_projects(
                projects
                    .iter()
                    .filter(|p| p.category_id == Some(category.id)),
                include_finance,
            ),
            entity: category,
        })
        .collect();

    Ok(Json(ApiResponse::ok(data)))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    RequireCategoryManager(auth): RequireCategoryManager,
    AppJson(mut input): AppJson<CreateCategory>,
) -> AppResult<(StatusCode, Json<ApiResponse<CategoryWithStats>>)> {
    validate_name("name", &input.name)?;
    input.name = input.name.trim().to_string();
    normalize_color(&mut input.color)?;

    let category = state.store.create_category(&input).await?;
    tracing::info!(category_id = category.id, "Category created");

    let data = with_stats(&state, category, &auth).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(data, "Category created")),
    ))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<CategoryWithStats>>> {
    let category = state
        .store
        .find_category(id)
        .await?
        .ok_or_else(|| not_found("Category", id))?;
    let data = with_stats(&state, category, &auth).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// PUT /api/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireCategoryManager(auth): RequireCategoryManager,
    AppPath(id): AppPath<DbId>,
    AppJson(mut input): AppJson<UpdateCategory>,
) -> AppResult<Json<ApiResponse<CategoryWithStats>>> {
    normalize_update(&mut input)?;
    let category = state
        .store
        .update_category(id, &input)
        .await?
        .ok_or_else(|| not_found("Category", id))?;
    tracing::info!(category_id = id, "Category updated");

    let data = with_stats(&state, category, &auth).await?;
    Ok(Json(ApiResponse::with_message(data, "Category updated")))
}

/// DELETE /api/categories/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireCategoryManager(_auth): RequireCategoryManager,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !state.store.delete_category(id).await? {
        return Err(not_found("Category", id));
    }
    tracing::info!(category_id = id, "Category deleted");
    Ok(Json(ApiResponse::message("Category deleted")))
}

/// PUT /api/categories
pub async fn batch_update(
    State(state): State<AppState>,
    RequireCategoryManager(_auth): RequireCategoryManager,
    AppJson(body): AppJson<BatchUpdateRequest<CategoryBatchItem>>,
) -> AppResult<Json<ApiResponse<BatchUpdateResult>>> {
    validate_batch_size(body.items.len())?;

    let mut result = BatchUpdateResult::default();
    for mut item in body.items {
        let outcome = match normalize_update(&mut item.changes) {
            Ok(()) => state
                .store
                .update_category(item.id, &item.changes)
                .await
                .map_err(AppError::from)
                .and_then(|c| c.ok_or_else(|| not_found("Category", item.id))),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(_) => result.updated += 1,
            Err(err) if err.is_skippable_in_batch() => {
                tracing::debug!(category_id = item.id, error = %err, "Skipping batch item");
                result.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(updated = result.updated, skipped = result.skipped, "Category batch update");
    let message = format!("{} category(ies) updated", result.updated);
    Ok(Json(ApiResponse::with_message(result, message)))
}

/// DELETE /api/categories
pub async fn batch_delete(
    State(state): State<AppState>,
    RequireCategoryManager(_auth): RequireCategoryManager,
    AppJson(body): AppJson<BatchDeleteRequest>,
) -> AppResult<Json<ApiResponse<BatchDeleteResult>>> {
    validate_batch_size(body.ids.len())?;

    let mut result = BatchDeleteResult::default();
    for id in body.ids {
        match state.store.delete_category(id).await.map_err(AppError::from) {
            Ok(true) => result.deleted += 1,
            Ok(false) => result.skipped += 1,
            Err(err) if err.is_skippable_in_batch() => {
                tracing::debug!(category_id = id, error = %err, "Skipping batch item");
                result.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(deleted = result.deleted, skipped = result.skipped, "Category batch delete");
    let message = format!("{} category(ies) deleted", result.deleted);
    Ok(Json(ApiResponse::with_message(result, message)))
}
