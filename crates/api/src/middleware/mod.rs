//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireProjectManager`], [`rbac::RequireClientManager`],
//!   [`rbac::RequireCategoryManager`], [`rbac::RequireUserManager`] and
//!   [`rbac::RequireReportViewer`] -- require the matching role capability.

pub mod auth;
pub mod rbac;
