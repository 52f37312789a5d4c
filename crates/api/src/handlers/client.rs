//! Handlers for the `/clients` resource.
//!
//! Reads are open to any authenticated user; mutations need
//! `canManageClients`. Each client is returned with statistics derived from
//! its projects.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use studio_core::types::DbId;
use studio_core::validation::{validate_batch_size, validate_email, validate_name};
use studio_db::models::client::{Client, ClientBatchItem, CreateClient, UpdateClient};
use studio_db::models::project::ProjectFilter;
use studio_db::models::stats::{EntityStats, WithStats};

use crate::error::{not_found, AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireClientManager;
use crate::response::{
    ApiResponse, BatchDeleteRequest, BatchDeleteResult, BatchUpdateRequest, BatchUpdateResult,
};
use crate::state::AppState;

type ClientWithStats = WithStats<Client, EntityStats>;

fn normalize_create(input: &mut CreateClient) -> AppResult<()> {
    validate_name("name", &input.name)?;
    validate_email(input.email.trim())?;
    input.name = input.name.trim().to_string();
    input.email = input.email.trim().to_string();
    Ok(())
}

fn normalize_update(input: &mut UpdateClient) -> AppResult<()> {
    if let Some(name) = input.name.as_mut() {
        validate_name("name", name)?;
        *name = name.trim().to_string();
    }
    if let Some(email) = input.email.as_mut() {
        validate_email(email.trim())?;
        *email = email.trim().to_string();
    }
    Ok(())
}

async fn with_stats(
    state: &AppState,
    client: Client,
    auth: &AuthUser,
) -> AppResult<ClientWithStats> {
    let filter = ProjectFilter {
        client_id: Some(client.id),
        ..ProjectFilter::default()
    };
    let projects = state.store.list_projects(&filter).await?;
    let stats = EntityStats::from_projects(&projects, auth.can_view_finance());
    Ok(WithStats {
        entity: client,
        stats,
    })
}

/// GET /api/clients
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<ClientWithStats>>>> {
    let clients = state.store.list_clients().await?;
    let projects = state.store.list_projects(&ProjectFilter::default()).await?;
    let include_finance = auth.can_view_finance();

    let data = clients
        .into_iter()
        .map(|client| {
            let stats = EntityStats::from_projects(
                projects.iter().filter(|p| p.client_id == client.id),
                include_finance,
            );
            WithStats {
                entity: client,
                stats,
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(data)))
}

/// POST /api/clients
pub async fn create(
    State(state): State<AppState>,
    RequireClientManager(auth): RequireClientManager,
    AppJson(mut input): AppJson<CreateClient>,
) -> AppResult<(StatusCode, Json<ApiResponse<ClientWithStats>>)> {
    normalize_create(&mut input)?;
    let client = state.store.create_client(&input).await?;
    tracing::info!(client_id = client.id, "Client created");

    let data = with_stats(&state, client, &auth).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(data, "Client created")),
    ))
}

/// GET /api/clients/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<ClientWithStats>>> {
    let client = state
        .store
        .find_client(id)
        .await?
        .ok_or_else(|| not_found("Client", id))?;
    let data = with_stats(&state, client, &auth).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// PUT /api/clients/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireClientManager(auth): RequireClientManager,
    AppPath(id): AppPath<DbId>,
    AppJson(mut input): AppJson<UpdateClient>,
) -> AppResult<Json<ApiResponse<ClientWithStats>>> {
    normalize_update(&mut input)?;
    let client = state
        .store
        .update_client(id, &input)
        .await?
        .ok_or_else(|| not_found("Client", id))?;
    tracing::info!(client_id = id, "Client updated");

    let data = with_stats(&state, client, &auth).await?;
    Ok(Json(ApiResponse::with_message(data, "Client updated")))
}

/// DELETE /api/clients/{id}
///
/// Fails with 400 while any project references the client.
pub async fn delete(
    State(state): State<AppState>,
    RequireClientManager(_auth): RequireClientManager,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !state.store.delete_client(id).await? {
        return Err(not_found("Client", id));
    }
    tracing::info!(client_id = id, "Client deleted");
    Ok(Json(ApiResponse::message("Client deleted")))
}

/// PUT /api/clients
///
/// Items that are missing, invalid or would duplicate an e-mail are skipped.
pub async fn batch_update(
    State(state): State<AppState>,
    RequireClientManager(_auth): RequireClientManager,
    AppJson(body): AppJson<BatchUpdateRequest<ClientBatchItem>>,
) -> AppResult<Json<ApiResponse<BatchUpdateResult>>> {
    validate_batch_size(body.items.len())?;

    let mut result = BatchUpdateResult::default();
    for mut item in body.items {
        let outcome = match normalize_update(&mut item.changes) {
            Ok(()) => state
                .store
                .update_client(item.id, &item.changes)
                .await
                .map_err(AppError::from)
                .and_then(|c| c.ok_or_else(|| not_found("Client", item.id))),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(_) => result.updated += 1,
            Err(err) if err.is_skippable_in_batch() => {
                tracing::debug!(client_id = item.id, error = %err, "Skipping batch item");
                result.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(updated = result.updated, skipped = result.skipped, "Client batch update");
    let message = format!("{} client(s) updated", result.updated);
    Ok(Json(ApiResponse::with_message(result, message)))
}

/// DELETE /api/clients
///
/// Clients that do not exist or still have projects are skipped.
pub async fn batch_delete(
    State(state): State<AppState>,
    RequireClientManager(_auth): RequireClientManager,
    AppJson(body): AppJson<BatchDeleteRequest>,
) -> AppResult<Json<ApiResponse<BatchDeleteResult>>> {
    validate_batch_size(body.ids.len())?;

    let mut result = BatchDeleteResult::default();
    for id in body.ids {
        match state.store.delete_client(id).await.map_err(AppError::from) {
            Ok(true) => result.deleted += 1,
            Ok(false) => result.skipped += 1,
            Err(err) if err.is_skippable_in_batch() => {
                tracing::debug!(client_id = id, error = %err, "Skipping batch item");
                result.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(deleted = result.deleted, skipped = result.skipped, "Client batch delete");
    let message = format!("{} client(s) deleted", result.deleted);
    Ok(Json(ApiResponse::with_message(result, message)))
}
