//! PostgreSQL-backed store.
//!
//! Enumerations are stored as their string forms and parsed back through the
//! core `FromStr` impls; a row that fails to parse surfaces as
//! [`StoreError::Decode`].

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use studio_core::automation::{StatusChange, WorkflowState};
use studio_core::error::CoreError;
use studio_core::types::{Date, DbId, Timestamp};
use studio_core::workflow::Status;

use super::{
    CategoryRepo, ClientRepo, ProjectRepo, Store, StoreError, StoreResult, UserRepo,
};
use crate::models::category::{Category, CreateCategory, UpdateCategory};
use crate::models::client::{Client, CreateClient, UpdateClient};
use crate::models::project::{
    CreateProject, Project, ProjectFilter, ProjectFinance, UpdateProject,
};
use crate::models::user::{CreateUser, UpdateUser, User};

const PROJECT_COLUMNS: &str = "id, title, description, client_id, category_id, \
    responsavel_captacao_id, responsavel_edicao_id, phase, status_captacao, status_edicao, \
    shoot_date, delivery_date, client_price, captation_cost, edition_cost, margin, \
    payment_status, freelancer_payment_status, client_due_date, client_received_date, \
    freelancer_due_date, freelancer_paid_date, created_at, updated_at";

const CLIENT_COLUMNS: &str = "id, name, email, phone, company, notes, created_at, updated_at";

const CATEGORY_COLUMNS: &str = "id, name, description, color, created_at, updated_at";

const USER_COLUMNS: &str =
    "id, name, email, role, password_hash, is_active, created_at, updated_at";

/// A [`Store`] over a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete `id` from `table` unless `reference_sql` (a `COUNT(*)` over
    /// projects bound to `$1`) finds dependants. Runs in one transaction.
    async fn guarded_delete(
        &self,
        table: &str,
        entity: &'static str,
        id: DbId,
        reference_sql: &str,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let lock = format!("SELECT id FROM {table} WHERE id = $1 FOR UPDATE");
        let exists: Option<(DbId,)> = sqlx::query_as(&lock)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(false);
        }

        let (projects,): (i64,) = sqlx::query_as(reference_sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if projects > 0 {
            tracing::info!(entity, id, projects, "Delete refused: entity still referenced");
            return Err(StoreError::InUse {
                entity,
                id,
                projects: projects as u64,
            });
        }

        let delete = format!("DELETE FROM {table} WHERE id = $1");
        sqlx::query(&delete).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

fn decode<T: FromStr<Err = CoreError>>(raw: &str) -> StoreResult<T> {
    raw.parse().map_err(|e: CoreError| {
        tracing::error!(value = raw, error = %e, "Unreadable enum column");
        StoreError::Decode(e.to_string())
    })
}

fn decode_opt<T: FromStr<Err = CoreError>>(raw: Option<&str>) -> StoreResult<Option<T>> {
    raw.map(decode).transpose()
}

#[derive(FromRow)]
struct ProjectRow {
    id: DbId,
    title: String,
    description: Option<String>,
    client_id: DbId,
    category_id: Option<DbId>,
    responsavel_captacao_id: Option<DbId>,
    responsavel_edicao_id: Option<DbId>,
    phase: String,
    status_captacao: Option<String>,
    status_edicao: Option<String>,
    shoot_date: Option<Date>,
    delivery_date: Option<Date>,
    client_price: f64,
    captation_cost: f64,
    edition_cost: f64,
    margin: f64,
    payment_status: String,
    freelancer_payment_status: String,
    client_due_date: Option<Date>,
    client_received_date: Option<Date>,
    freelancer_due_date: Option<Date>,
    freelancer_paid_date: Option<Date>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl TryFrom<ProjectRow> for Project {
    type Error = StoreError;

    fn try_from(row: ProjectRow) -> StoreResult<Self> {
        Ok(Project {
            id: row.id,
            title: row.title,
            description: row.description,
            client_id: row.client_id,
            category_id: row.category_id,
            responsavel_captacao_id: row.responsavel_captacao_id,
            responsavel_edicao_id: row.responsavel_edicao_id,
            phase: decode(&row.phase)?,
            status_captacao: decode_opt(row.status_captacao.as_deref())?,
            status_edicao: decode_opt(row.status_edicao.as_deref())?,
            shoot_date: row.shoot_date,
            delivery_date: row.delivery_date,
            finance: ProjectFinance {
                client_price: row.client_price,
                captation_cost: row.captation_cost,
                edition_cost: row.edition_cost,
                margin: row.margin,
                payment_status: decode(&row.payment_status)?,
                freelancer_payment_status: decode(&row.freelancer_payment_status)?,
                client_due_date: row.client_due_date,
                client_received_date: row.client_received_date,
                freelancer_due_date: row.freelancer_due_date,
                freelancer_paid_date: row.freelancer_paid_date,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: DbId,
    name: String,
    email: String,
    role: String,
    password_hash: String,
    is_active: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: decode(&row.role)?,
            password_hash: row.password_hash,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ClientRow {
    id: DbId,
    name: String,
    email: String,
    phone: Option<String>,
    company: Option<String>,
    notes: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct CategoryRow {
    id: DbId,
    name: String,
    description: Option<String>,
    color: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            color: row.color,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Constraint mapping
// ---------------------------------------------------------------------------

/// Foreign keys a project write may carry, used to name the missing row when
/// Postgres reports a foreign-key violation.
#[derive(Default)]
struct ProjectRefs {
    client_id: Option<DbId>,
    category_id: Option<DbId>,
    captacao_id: Option<DbId>,
    edicao_id: Option<DbId>,
}

impl ProjectRefs {
    fn missing(&self, constraint: Option<&str>) -> StoreError {
        let (entity, id) = match constraint {
            Some("fk_projects_client") => ("client", self.client_id),
            Some("fk_projects_category") => ("category", self.category_id),
            Some("fk_projects_responsavel_captacao") => ("user", self.captacao_id),
            Some("fk_projects_responsavel_edicao") => ("user", self.edicao_id),
            _ => ("entity", None),
        };
        StoreError::MissingReference {
            entity,
            id: id.unwrap_or_default(),
        }
    }
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn is_violation(err: &sqlx::Error, code: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(code))
}

fn map_project_write(err: sqlx::Error, refs: &ProjectRefs) -> StoreError {
    if is_violation(&err, FOREIGN_KEY_VIOLATION) {
        if let sqlx::Error::Database(db) = &err {
            return refs.missing(db.constraint());
        }
    }
    StoreError::Database(err)
}

fn map_unique(err: sqlx::Error, entity: &'static str, field: &'static str, value: &str) -> StoreError {
    if is_violation(&err, UNIQUE_VIOLATION) {
        return StoreError::Duplicate {
            entity,
            field,
            value: value.to_string(),
        };
    }
    StoreError::Database(err)
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

#[async_trait]
impl ProjectRepo for PgStore {
    async fn create_project(&self, input: &CreateProject) -> StoreResult<Project> {
        let (phase, status_captacao, status_edicao) = input.initial_workflow();
        let finance = input.finance();
        let query = format!(
            "INSERT INTO projects (title, description, client_id, category_id,
                responsavel_captacao_id, responsavel_edicao_id, phase, status_captacao,
                status_edicao, shoot_date, delivery_date, client_price, captation_cost,
                edition_cost, margin, payment_status, freelancer_payment_status,
                client_due_date, client_received_date, freelancer_due_date, freelancer_paid_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21)
             RETURNING {PROJECT_COLUMNS}"
        );
        let refs = ProjectRefs {
            client_id: Some(input.client_id),
            category_id: input.category_id,
            captacao_id: input.responsavel_captacao_id,
            edicao_id: input.responsavel_edicao_id,
        };
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.client_id)
            .bind(input.category_id)
            .bind(input.responsavel_captacao_id)
            .bind(input.responsavel_edicao_id)
            .bind(phase.as_str())
            .bind(status_captacao.map(|s| s.as_str()))
            .bind(status_edicao.map(|s| s.as_str()))
            .bind(input.shoot_date)
            .bind(input.delivery_date)
            .bind(finance.client_price)
            .bind(finance.captation_cost)
            .bind(finance.edition_cost)
            .bind(finance.margin)
            .bind(finance.payment_status.as_str())
            .bind(finance.freelancer_payment_status.as_str())
            .bind(finance.client_due_date)
            .bind(finance.client_received_date)
            .bind(finance.freelancer_due_date)
            .bind(finance.freelancer_paid_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_project_write(e, &refs))?;
        row.try_into()
    }

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE ($1::text IS NULL OR phase = $1)
               AND ($2::bigint IS NULL OR client_id = $2)
               AND ($3::bigint IS NULL OR category_id = $3)
               AND ($4::bigint IS NULL
                    OR responsavel_captacao_id = $4 OR responsavel_edicao_id = $4)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(filter.phase.map(|p| p.as_str()))
            .bind(filter.client_id)
            .bind(filter.category_id)
            .bind(filter.responsavel_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Project::try_from)
            .collect()
    }

    async fn update_project(
        &self,
        id: DbId,
        input: &UpdateProject,
    ) -> StoreResult<Option<Project>> {
        // Right-hand sides read the pre-update row, so margin combines the
        // new amounts with whichever old ones are kept.
        let query = format!(
            "UPDATE projects SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                client_id = COALESCE($4, client_id),
                category_id = COALESCE($5, category_id),
                responsavel_captacao_id = COALESCE($6, responsavel_captacao_id),
                responsavel_edicao_id = COALESCE($7, responsavel_edicao_id),
                shoot_date = COALESCE($8, shoot_date),
                delivery_date = COALESCE($9, delivery_date),
                client_price = COALESCE($10, client_price),
                captation_cost = COALESCE($11, captation_cost),
                edition_cost = COALESCE($12, edition_cost),
                margin = COALESCE($10, client_price) - COALESCE($11, captation_cost)
                    - COALESCE($12, edition_cost),
                payment_status = COALESCE($13, payment_status),
                freelancer_payment_status = COALESCE($14, freelancer_payment_status),
                client_due_date = COALESCE($15, client_due_date),
                client_received_date = COALESCE($16, client_received_date),
                freelancer_due_date = COALESCE($17, freelancer_due_date),
                freelancer_paid_date = COALESCE($18, freelancer_paid_date),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {PROJECT_COLUMNS}"
        );
        let refs = ProjectRefs {
            client_id: input.client_id,
            category_id: input.category_id,
            captacao_id: input.responsavel_captacao_id,
            edicao_id: input.responsavel_edicao_id,
        };
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.client_id)
            .bind(input.category_id)
            .bind(input.responsavel_captacao_id)
            .bind(input.responsavel_edicao_id)
            .bind(input.shoot_date)
            .bind(input.delivery_date)
            .bind(input.client_price)
            .bind(input.captation_cost)
            .bind(input.edition_cost)
            .bind(input.payment_status.map(|s| s.as_str()))
            .bind(input.freelancer_payment_status.map(|s| s.as_str()))
            .bind(input.client_due_date)
            .bind(input.client_received_date)
            .bind(input.freelancer_due_date)
            .bind(input.freelancer_paid_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_project_write(e, &refs))?
            .map(Project::try_from)
            .transpose()
    }

    async fn apply_status_change(
        &self,
        id: DbId,
        expected: &WorkflowState,
        change: &StatusChange,
    ) -> StoreResult<Option<Project>> {
        // The WHERE clause re-checks the planned-from position so two racing
        // updates cannot both commit.
        let query = format!(
            "UPDATE projects SET
                phase = COALESCE($2, phase),
                status_captacao = COALESCE($3, status_captacao),
                status_edicao = COALESCE($4, status_edicao),
                payment_status = COALESCE($5, payment_status),
                responsavel_edicao_id = COALESCE($6, responsavel_edicao_id),
                updated_at = NOW()
             WHERE id = $1
               AND phase = $7
               AND status_captacao IS NOT DISTINCT FROM $8
               AND status_edicao IS NOT DISTINCT FROM $9
               AND responsavel_edicao_id IS NOT DISTINCT FROM $10
             RETURNING {PROJECT_COLUMNS}"
        );
        let refs = ProjectRefs {
            edicao_id: change.responsavel_edicao_id,
            ..ProjectRefs::default()
        };
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .bind(change.phase.map(|p| p.as_str()))
            .bind(change.status_captacao.map(|s| s.as_str()))
            .bind(change.status_edicao.map(|s| s.as_str()))
            .bind(change.payment_status.map(|s| s.as_str()))
            .bind(change.responsavel_edicao_id)
            .bind(expected.phase.as_str())
            .bind(expected.status_captacao.map(|s| s.as_str()))
            .bind(expected.status_edicao.map(|s| s.as_str()))
            .bind(expected.responsavel_edicao_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_project_write(e, &refs))?;

        if let Some(row) = row {
            return Project::try_from(row).map(Some);
        }

        let exists: Option<(DbId,)> = sqlx::query_as("SELECT id FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match exists {
            Some(_) => {
                tracing::warn!(project_id = id, "Status change planned on a stale snapshot");
                Err(StoreError::Stale {
                    entity: "project",
                    id,
                })
            }
            None => Ok(None),
        }
    }

    async fn delete_project(&self, id: DbId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ClientRepo for PgStore {
    async fn create_client(&self, input: &CreateClient) -> StoreResult<Client> {
        let query = format!(
            "INSERT INTO clients (name, email, phone, company, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CLIENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ClientRow>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, "client", "email", &input.email))?;
        Ok(row.into())
    }

    async fn find_client(&self, id: DbId) -> StoreResult<Option<Client>> {
        let query = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        let row = sqlx::query_as::<_, ClientRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Client::from))
    }

    async fn list_clients(&self) -> StoreResult<Vec<Client>> {
        let query = format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY lower(name), id");
        let rows = sqlx::query_as::<_, ClientRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    async fn update_client(&self, id: DbId, input: &UpdateClient) -> StoreResult<Option<Client>> {
        let query = format!(
            "UPDATE clients SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                company = COALESCE($5, company),
                notes = COALESCE($6, notes),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {CLIENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ClientRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.notes)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique(e, "client", "email", input.email.as_deref().unwrap_or("")))?;
        Ok(row.map(Client::from))
    }

    async fn delete_client(&self, id: DbId) -> StoreResult<bool> {
        self.guarded_delete(
            "clients",
            "client",
            id,
            "SELECT COUNT(*) FROM projects WHERE client_id = $1",
        )
        .await
    }
}

#[async_trait]
impl CategoryRepo for PgStore {
    async fn create_category(&self, input: &CreateCategory) -> StoreResult<Category> {
        let query = format!(
            "INSERT INTO categories (name, description, color)
             VALUES ($1, $2, $3)
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.color)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, "category", "name", &input.name))?;
        Ok(row.into())
    }

    async fn find_category(&self, id: DbId) -> StoreResult<Option<Category>> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        let row = sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Category::from))
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let query =
            format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY lower(name), id");
        let rows = sqlx::query_as::<_, CategoryRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn update_category(
        &self,
        id: DbId,
        input: &UpdateCategory,
    ) -> StoreResult<Option<Category>> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                color = COALESCE($4, color),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.color)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique(e, "category", "name", input.name.as_deref().unwrap_or("")))?;
        Ok(row.map(Category::from))
    }

    async fn delete_category(&self, id: DbId) -> StoreResult<bool> {
        self.guarded_delete(
            "categories",
            "category",
            id,
            "SELECT COUNT(*) FROM projects WHERE category_id = $1",
        )
        .await
    }
}

#[async_trait]
impl UserRepo for PgStore {
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let query = format!(
            "INSERT INTO users (name, email, role, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.role.as_str())
            .bind(&input.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, "user", "email", &input.email))?
            .try_into()
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY lower(name), id");
        sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn update_user(&self, id: DbId, input: &UpdateUser) -> StoreResult<Option<User>> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                is_active = COALESCE($5, is_active),
                password_hash = COALESCE($6, password_hash),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.role.map(|r| r.as_str()))
            .bind(input.is_active)
            .bind(&input.password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique(e, "user", "email", input.email.as_deref().unwrap_or("")))?
            .map(User::try_from)
            .transpose()
    }

    async fn delete_user(&self, id: DbId) -> StoreResult<bool> {
        self.guarded_delete(
            "users",
            "user",
            id,
            "SELECT COUNT(*) FROM projects
             WHERE responsavel_captacao_id = $1 OR responsavel_edicao_id = $1",
        )
        .await
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
