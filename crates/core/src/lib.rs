//! Domain core for the studio CRM.
//!
//! Pure logic with no I/O: the production workflow state machine, its
//! automations, financial helpers, and the role-based permission policy.
//! The `db` and `api` crates build on these types.

pub mod automation;
pub mod error;
pub mod finance;
pub mod permissions;
pub mod roles;
pub mod types;
pub mod validation;
pub mod workflow;
