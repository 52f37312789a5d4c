//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects with 403 when the role lacks
//! the required capability. Per-project decisions are made in the handlers
//! through the role's permission policy.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use studio_core::roles::Capabilities;

use super::auth::AuthUser;
use crate::error::{forbidden, AppError};
use crate::state::AppState;

macro_rules! capability_extractor {
    ($(#[$doc:meta])* $name:ident, $check:expr, $message:literal) => {
        $(#[$doc])*
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = AuthUser::from_request_parts(parts, state).await?;
                let check: fn(&Capabilities) -> bool = $check;
                if !check(user.capabilities()) {
                    return Err(forbidden($message));
                }
                Ok($name(user))
            }
        }
    };
}

capability_extractor!(
    /// Requires `canManageClients`.
    RequireClientManager,
    |caps| caps.can_manage_clients,
    "Permission to manage clients required"
);

capability_extractor!(
    /// Requires `canManageCategories`.
    RequireCategoryManager,
    |caps| caps.can_manage_categories,
    "Permission to manage categories required"
);

capability_extractor!(
    /// Requires `canManageUsers`.
    RequireUserManager,
    |caps| caps.can_manage_users,
    "Permission to manage users required"
);

capability_extractor!(
    /// Requires `canViewReports`.
    RequireReportViewer,
    |caps| caps.can_view_reports,
    "Permission to view reports required"
);

capability_extractor!(
    /// Requires `canEditAllProjects` (project create, delete and batch
    /// operations).
    RequireProjectManager,
    |caps| caps.can_edit_all_projects,
    "Permission to manage projects required"
);
