//! In-process store used by tests and by servers started without
//! `DATABASE_URL`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use studio_core::automation::{StatusChange, WorkflowState};
use studio_core::types::DbId;
use tokio::sync::RwLock;

use super::{
    CategoryRepo, ClientRepo, ProjectRepo, Store, StoreError, StoreResult, UserRepo,
};
use crate::models::category::{Category, CreateCategory, UpdateCategory};
use crate::models::client::{Client, CreateClient, UpdateClient};
use crate::models::project::{CreateProject, Project, ProjectFilter, UpdateProject};
use crate::models::user::{CreateUser, UpdateUser, User};

/// Rows of one entity plus its id sequence.
struct Table<T> {
    rows: BTreeMap<DbId, T>,
    last_id: DbId,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    fn get(&self, id: DbId) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn contains(&self, id: DbId) -> bool {
        self.rows.contains_key(&id)
    }
}

#[derive(Default)]
struct Tables {
    projects: Table<Project>,
    clients: Table<Client>,
    categories: Table<Category>,
    users: Table<User>,
}

impl Tables {
    /// Verify every foreign key a project would carry.
    fn check_references(
        &self,
        client_id: DbId,
        category_id: Option<DbId>,
        responsible_ids: [Option<DbId>; 2],
    ) -> StoreResult<()> {
        if !self.clients.contains(client_id) {
            return Err(StoreError::MissingReference {
                entity: "client",
                id: client_id,
            });
        }
        if let Some(id) = category_id {
            if !self.categories.contains(id) {
                return Err(StoreError::MissingReference {
                    entity: "category",
                    id,
                });
            }
        }
        for id in responsible_ids.into_iter().flatten() {
            if !self.users.contains(id) {
                return Err(StoreError::MissingReference { entity: "user", id });
            }
        }
        Ok(())
    }

    fn count_projects(&self, pred: impl Fn(&Project) -> bool) -> u64 {
        self.projects.rows.values().filter(|p| pred(p)).count() as u64
    }

    fn client_email_taken(&self, email: &str, except: Option<DbId>) -> bool {
        self.clients
            .rows
            .values()
            .any(|c| Some(c.id) != except && same_folded(&c.email, email))
    }

    fn category_name_taken(&self, name: &str, except: Option<DbId>) -> bool {
        self.categories
            .rows
            .values()
            .any(|c| Some(c.id) != except && same_folded(&c.name, name))
    }

    fn user_email_taken(&self, email: &str, except: Option<DbId>) -> bool {
        self.users
            .rows
            .values()
            .any(|u| Some(u.id) != except && same_folded(&u.email, email))
    }
}

/// A [`Store`] keeping all rows in memory behind one lock, so every call is
/// atomic with respect to the others.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Case-insensitive equality with full Unicode lowercasing, matching the
/// `lower()` unique indexes of the Postgres schema.
fn same_folded(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn sorted_by_name<T>(mut rows: Vec<T>, name: impl Fn(&T) -> &str) -> Vec<T> {
    rows.sort_by_cached_key(|row| name(row).to_lowercase());
    rows
}

#[async_trait]
impl ProjectRepo for MemoryStore {
    async fn create_project(&self, input: &CreateProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        tables.check_references(
            input.client_id,
            input.category_id,
            [input.responsavel_captacao_id, input.responsavel_edicao_id],
        )?;

        let (phase, status_captacao, status_edicao) = input.initial_workflow();
        let now = Utc::now();
        let id = tables.projects.next_id();
        let project = Project {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            client_id: input.client_id,
            category_id: input.category_id,
            responsavel_captacao_id: input.responsavel_captacao_id,
            responsavel_edicao_id: input.responsavel_edicao_id,
            phase,
            status_captacao,
            status_edicao,
            shoot_date: input.shoot_date,
            delivery_date: input.delivery_date,
            finance: input.finance(),
            created_at: now,
            updated_at: now,
        };
        tables.projects.rows.insert(id, project.clone());
        Ok(project)
    }

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>> {
        Ok(self.tables.read().await.projects.get(id))
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .rows
            .values()
            .rev()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn update_project(
        &self,
        id: DbId,
        input: &UpdateProject,
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;
        let Some(mut project) = tables.projects.get(id) else {
            return Ok(None);
        };
        input.apply_to(&mut project);
        tables.check_references(
            project.client_id,
            input.category_id,
            [input.responsavel_captacao_id, input.responsavel_edicao_id],
        )?;
        project.updated_at = Utc::now();
        tables.projects.rows.insert(id, project.clone());
        Ok(Some(project))
    }

    async fn apply_status_change(
        &self,
        id: DbId,
        expected: &WorkflowState,
        change: &StatusChange,
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;
        if let Some(user_id) = change.responsavel_edicao_id {
            if !tables.users.contains(user_id) {
                return Err(StoreError::MissingReference {
                    entity: "user",
                    id: user_id,
                });
            }
        }
        let Some(project) = tables.projects.rows.get_mut(&id) else {
            return Ok(None);
        };

        let mut state = project.workflow_state();
        if !state.same_position(expected) {
            tracing::warn!(project_id = id, "Status change planned on a stale snapshot");
            return Err(StoreError::Stale {
                entity: "project",
                id,
            });
        }
        change.apply(&mut state);
        project.phase = state.phase;
        project.status_captacao = state.status_captacao;
        project.status_edicao = state.status_edicao;
        project.finance.payment_status = state.payment_status;
        project.responsavel_edicao_id = state.responsavel_edicao_id;
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.tables.write().await.projects.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl ClientRepo for MemoryStore {
    async fn create_client(&self, input: &CreateClient) -> StoreResult<Client> {
        let mut tables = self.tables.write().await;
        if tables.client_email_taken(&input.email, None) {
            return Err(StoreError::Duplicate {
                entity: "client",
                field: "email",
                value: input.email.clone(),
            });
        }
        let now = Utc::now();
        let id = tables.clients.next_id();
        let client = Client {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            company: input.company.clone(),
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.clients.rows.insert(id, client.clone());
        Ok(client)
    }

    async fn find_client(&self, id: DbId) -> StoreResult<Option<Client>> {
        Ok(self.tables.read().await.clients.get(id))
    }

    async fn list_clients(&self) -> StoreResult<Vec<Client>> {
        let rows = self.tables.read().await.clients.rows.values().cloned().collect();
        Ok(sorted_by_name(rows, |c: &Client| &c.name))
    }

    async fn update_client(&self, id: DbId, input: &UpdateClient) -> StoreResult<Option<Client>> {
        let mut tables = self.tables.write().await;
        let Some(mut client) = tables.clients.get(id) else {
            return Ok(None);
        };
        if let Some(email) = &input.email {
            if tables.client_email_taken(email, Some(id)) {
                return Err(StoreError::Duplicate {
                    entity: "client",
                    field: "email",
                    value: email.clone(),
                });
            }
        }
        input.apply_to(&mut client);
        client.updated_at = Utc::now();
        tables.clients.rows.insert(id, client.clone());
        Ok(Some(client))
    }

    async fn delete_client(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.clients.contains(id) {
            return Ok(false);
        }
        let projects = tables.count_projects(|p| p.client_id == id);
        if projects > 0 {
            return Err(StoreError::InUse {
                entity: "client",
                id,
                projects,
            });
        }
        Ok(tables.clients.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl CategoryRepo for MemoryStore {
    async fn create_category(&self, input: &CreateCategory) -> StoreResult<Category> {
        let mut tables = self.tables.write().await;
        if tables.category_name_taken(&input.name, None) {
            return Err(StoreError::Duplicate {
                entity: "category",
                field: "name",
                value: input.name.clone(),
            });
        }
        let now = Utc::now();
        let id = tables.categories.next_id();
        let category = Category {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            color: input.color.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.categories.rows.insert(id, category.clone());
        Ok(category)
    }

    async fn find_category(&self, id: DbId) -> StoreResult<Option<Category>> {
        Ok(self.tables.read().await.categories.get(id))
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = self
            .tables
            .read()
            .await
            .categories
            .rows
            .values()
            .cloned()
            .collect();
        Ok(sorted_by_name(rows, |c: &Category| &c.name))
    }

    async fn update_category(
        &self,
        id: DbId,
        input: &UpdateCategory,
    ) -> StoreResult<Option<Category>> {
        let mut tables = self.tables.write().await;
        let Some(mut category) = tables.categories.get(id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            if tables.category_name_taken(name, Some(id)) {
                return Err(StoreError::Duplicate {
                    entity: "category",
                    field: "name",
                    value: name.clone(),
                });
            }
        }
        input.apply_to(&mut category);
        category.updated_at = Utc::now();
        tables.categories.rows.insert(id, category.clone());
        Ok(Some(category))
    }

    async fn delete_category(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains(id) {
            return Ok(false);
        }
        let projects = tables.count_projects(|p| p.category_id == Some(id));
        if projects > 0 {
            return Err(StoreError::InUse {
                entity: "category",
                id,
                projects,
            });
        }
        Ok(tables.categories.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.user_email_taken(&input.email, None) {
            return Err(StoreError::Duplicate {
                entity: "user",
                field: "email",
                value: input.email.clone(),
            });
        }
        let now = Utc::now();
        let id = tables.users.next_id();
        let user = User {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            role: input.role,
            password_hash: input.password_hash.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.users.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| same_folded(&u.email, email))
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = self.tables.read().await.users.rows.values().cloned().collect();
        Ok(sorted_by_name(rows, |u: &User| &u.name))
    }

    async fn update_user(&self, id: DbId, input: &UpdateUser) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        let Some(mut user) = tables.users.get(id) else {
            return Ok(None);
        };
        if let Some(email) = &input.email {
            if tables.user_email_taken(email, Some(id)) {
                return Err(StoreError::Duplicate {
                    entity: "user",
                    field: "email",
                    value: email.clone(),
                });
            }
        }
        input.apply_to(&mut user);
        user.updated_at = Utc::now();
        tables.users.rows.insert(id, user.clone());
        Ok(Some(user))
    }

    async fn delete_user(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains(id) {
            return Ok(false);
        }
        let projects = tables.count_projects(|p| p.involves(id));
        if projects > 0 {
            return Err(StoreError::InUse {
                entity: "user",
                id,
                projects,
            });
        }
        Ok(tables.users.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
