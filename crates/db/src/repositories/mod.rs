//! Repository traits and the two store backends.
//!
//! Handlers talk to a `dyn Store`; [`PgStore`] backs production deployments
//! and [`MemoryStore`] backs tests and database-less runs. Both enforce the
//! same uniqueness and referential rules so callers see identical errors.

use async_trait::async_trait;
use studio_core::automation::{StatusChange, WorkflowState};
use studio_core::types::DbId;

use crate::models::category::{Category, CreateCategory, UpdateCategory};
use crate::models::client::{Client, CreateClient, UpdateClient};
use crate::models::project::{CreateProject, Project, ProjectFilter, UpdateProject};
use crate::models::user::{CreateUser, UpdateUser, User};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} with {field} '{value}' already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Cannot delete {entity} {id}: referenced by {projects} project(s)")]
    InUse {
        entity: &'static str,
        id: DbId,
        projects: u64,
    },

    #[error("Referenced {entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: DbId },

    #[error("{entity} {id} was modified concurrently; reload and retry")]
    Stale { entity: &'static str, id: DbId },

    #[error("Invalid stored value: {0}")]
    Decode(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ProjectRepo: Send + Sync {
    /// Insert a project. Fails with [`StoreError::MissingReference`] when the
    /// client, category or a responsible user does not exist.
    async fn create_project(&self, input: &CreateProject) -> StoreResult<Project>;

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>>;

    /// Projects matching `filter`, most recently created first.
    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>>;

    /// Apply the non-`None` fields of `input` and recompute the margin.
    ///
    /// Returns `None` if no project with `id` exists.
    async fn update_project(&self, id: DbId, input: &UpdateProject)
        -> StoreResult<Option<Project>>;

    /// Persist every write of a planned status update in a single operation.
    ///
    /// `expected` is the snapshot the change was planned from. Fails with
    /// [`StoreError::Stale`] if the stored project no longer occupies the
    /// same workflow position, and writes nothing in that case.
    async fn apply_status_change(
        &self,
        id: DbId,
        expected: &WorkflowState,
        change: &StatusChange,
    ) -> StoreResult<Option<Project>>;

    /// Returns `true` if a row was removed.
    async fn delete_project(&self, id: DbId) -> StoreResult<bool>;
}

#[async_trait]
pub trait ClientRepo: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] if the e-mail is taken
    /// (case-insensitive).
    async fn create_client(&self, input: &CreateClient) -> StoreResult<Client>;

    async fn find_client(&self, id: DbId) -> StoreResult<Option<Client>>;

    /// All clients ordered by name.
    async fn list_clients(&self) -> StoreResult<Vec<Client>>;

    async fn update_client(&self, id: DbId, input: &UpdateClient) -> StoreResult<Option<Client>>;

    /// Fails with [`StoreError::InUse`] while any project references the client.
    async fn delete_client(&self, id: DbId) -> StoreResult<bool>;
}

#[async_trait]
pub trait CategoryRepo: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] if the name is taken
    /// (case-insensitive).
    async fn create_category(&self, input: &CreateCategory) -> StoreResult<Category>;

    async fn find_category(&self, id: DbId) -> StoreResult<Option<Category>>;

    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    async fn update_category(
        &self,
        id: DbId,
        input: &UpdateCategory,
    ) -> StoreResult<Option<Category>>;

    /// Fails with [`StoreError::InUse`] while any project references the
    /// category.
    async fn delete_category(&self, id: DbId) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>>;

    /// Case-insensitive lookup, used by login.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn update_user(&self, id: DbId, input: &UpdateUser) -> StoreResult<Option<User>>;

    /// Fails with [`StoreError::InUse`] while the user is responsible for any
    /// project.
    async fn delete_user(&self, id: DbId) -> StoreResult<bool>;
}

/// The full persistence surface used by the API.
#[async_trait]
pub trait Store: ProjectRepo + ClientRepo + CategoryRepo + UserRepo {
    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> StoreResult<()>;
}
