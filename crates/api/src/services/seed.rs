//! Bootstrap admin account.

use studio_core::roles::Role;
use studio_db::models::user::CreateUser;
use studio_db::Store;

use crate::auth::password::hash_password;
use crate::config::SeedAdmin;
use crate::error::{AppError, AppResult};

/// Create the configured admin unless a user with that e-mail exists.
///
/// Returns `true` when an account was created.
pub async fn ensure_admin(store: &dyn Store, seed: &SeedAdmin) -> AppResult<bool> {
    if store.find_user_by_email(&seed.email).await?.is_some() {
        tracing::debug!(email = %seed.email, "Seed admin already present");
        return Ok(false);
    }

    let password_hash = hash_password(&seed.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = store
        .create_user(&CreateUser {
            name: "Administrador".to_string(),
            email: seed.email.clone(),
            role: Role::Admin,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, email = %user.email, "Seed admin created");
    Ok(true)
}
