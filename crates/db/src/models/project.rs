//! Project entity model, DTOs, and the role-sanitized view.

use serde::{Deserialize, Serialize};
use studio_core::automation::WorkflowState;
use studio_core::finance::{compute_margin, FreelancerPaymentStatus, PaymentStatus, ProjectFigures};
use studio_core::permissions::{ProjectAssignment, ProjectPermissions};
use studio_core::roles::Role;
use studio_core::types::{Date, DbId, Timestamp};
use studio_core::workflow::{CaptacaoStatus, EdicaoStatus, Phase, Status};

/// Serialized keys of every financial field. None of them may appear in a
/// project payload for a viewer without finance access.
pub const FINANCE_FIELDS: &[&str] = &[
    "clientPrice",
    "captationCost",
    "editionCost",
    "margin",
    "paymentStatus",
    "freelancerPaymentStatus",
    "clientDueDate",
    "clientReceivedDate",
    "freelancerDueDate",
    "freelancerPaidDate",
];

/// A project row from the `projects` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub client_id: DbId,
    pub category_id: Option<DbId>,
    pub responsavel_captacao_id: Option<DbId>,
    pub responsavel_edicao_id: Option<DbId>,
    pub phase: Phase,
    pub status_captacao: Option<CaptacaoStatus>,
    pub status_edicao: Option<EdicaoStatus>,
    pub shoot_date: Option<Date>,
    pub delivery_date: Option<Date>,
    #[serde(flatten)]
    pub finance: ProjectFinance,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Money-related fields of a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFinance {
    pub client_price: f64,
    pub captation_cost: f64,
    pub edition_cost: f64,
    /// Always `client_price - captation_cost - edition_cost`.
    pub margin: f64,
    pub payment_status: PaymentStatus,
    pub freelancer_payment_status: FreelancerPaymentStatus,
    pub client_due_date: Option<Date>,
    pub client_received_date: Option<Date>,
    pub freelancer_due_date: Option<Date>,
    pub freelancer_paid_date: Option<Date>,
}

impl ProjectFinance {
    /// Recompute `margin` from the three amounts.
    pub fn recompute_margin(&mut self) {
        self.margin = compute_margin(self.client_price, self.captation_cost, self.edition_cost);
    }
}

impl Project {
    pub fn assignment(&self) -> ProjectAssignment {
        ProjectAssignment {
            phase: self.phase,
            responsavel_captacao_id: self.responsavel_captacao_id,
            responsavel_edicao_id: self.responsavel_edicao_id,
        }
    }

    pub fn workflow_state(&self) -> WorkflowState {
        WorkflowState {
            phase: self.phase,
            status_captacao: self.status_captacao,
            status_edicao: self.status_edicao,
            payment_status: self.finance.payment_status,
            responsavel_edicao_id: self.responsavel_edicao_id,
        }
    }

    pub fn figures(&self) -> ProjectFigures {
        ProjectFigures {
            phase: self.phase,
            client_price: self.finance.client_price,
            captation_cost: self.finance.captation_cost,
            edition_cost: self.finance.edition_cost,
            payment_status: self.finance.payment_status,
        }
    }

    /// Whether `user_id` is one of the project's responsible parties.
    pub fn involves(&self, user_id: DbId) -> bool {
        self.responsavel_captacao_id == Some(user_id) || self.responsavel_edicao_id == Some(user_id)
    }
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub title: String,
    pub description: Option<String>,
    pub client_id: DbId,
    pub category_id: Option<DbId>,
    pub responsavel_captacao_id: Option<DbId>,
    pub responsavel_edicao_id: Option<DbId>,
    pub shoot_date: Option<Date>,
    pub delivery_date: Option<Date>,
    #[serde(default)]
    pub client_price: f64,
    #[serde(default)]
    pub captation_cost: f64,
    #[serde(default)]
    pub edition_cost: f64,
    pub payment_status: Option<PaymentStatus>,
    pub freelancer_payment_status: Option<FreelancerPaymentStatus>,
    pub client_due_date: Option<Date>,
    pub client_received_date: Option<Date>,
    pub freelancer_due_date: Option<Date>,
    pub freelancer_paid_date: Option<Date>,
    /// Skip captação and start the project in edição.
    #[serde(default)]
    pub edition_only: bool,
}

impl CreateProject {
    /// Phase and statuses a new project starts with.
    pub fn initial_workflow(&self) -> (Phase, Option<CaptacaoStatus>, Option<EdicaoStatus>) {
        if self.edition_only {
            (Phase::Edicao, None, Some(EdicaoStatus::INITIAL))
        } else {
            (Phase::Captacao, Some(CaptacaoStatus::INITIAL), None)
        }
    }

    pub fn finance(&self) -> ProjectFinance {
        let mut finance = ProjectFinance {
            client_price: self.client_price,
            captation_cost: self.captation_cost,
            edition_cost: self.edition_cost,
            margin: 0.0,
            payment_status: self.payment_status.unwrap_or_default(),
            freelancer_payment_status: self.freelancer_payment_status.unwrap_or_default(),
            client_due_date: self.client_due_date,
            client_received_date: self.client_received_date,
            freelancer_due_date: self.freelancer_due_date,
            freelancer_paid_date: self.freelancer_paid_date,
        };
        finance.recompute_margin();
        finance
    }
}

/// DTO for updating an existing project. All fields are optional.
///
/// Phase and statuses are deliberately absent: they only change through the
/// status endpoint, which validates transitions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub client_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub responsavel_captacao_id: Option<DbId>,
    pub responsavel_edicao_id: Option<DbId>,
    pub shoot_date: Option<Date>,
    pub delivery_date: Option<Date>,
    pub client_price: Option<f64>,
    pub captation_cost: Option<f64>,
    pub edition_cost: Option<f64>,
    pub payment_status: Option<PaymentStatus>,
    pub freelancer_payment_status: Option<FreelancerPaymentStatus>,
    pub client_due_date: Option<Date>,
    pub client_received_date: Option<Date>,
    pub freelancer_due_date: Option<Date>,
    pub freelancer_paid_date: Option<Date>,
}

impl UpdateProject {
    pub fn touches_finance(&self) -> bool {
        self.client_price.is_some()
            || self.captation_cost.is_some()
            || self.edition_cost.is_some()
            || self.payment_status.is_some()
            || self.freelancer_payment_status.is_some()
            || self.client_due_date.is_some()
            || self.client_received_date.is_some()
            || self.freelancer_due_date.is_some()
            || self.freelancer_paid_date.is_some()
    }

    pub fn touches_assignment(&self) -> bool {
        self.responsavel_captacao_id.is_some() || self.responsavel_edicao_id.is_some()
    }

    /// Apply the non-`None` fields to `project`, recomputing the margin.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(description) = &self.description {
            project.description = Some(description.clone());
        }
        if let Some(client_id) = self.client_id {
            project.client_id = client_id;
        }
        if let Some(category_id) = self.category_id {
            project.category_id = Some(category_id);
        }
        if let Some(user_id) = self.responsavel_captacao_id {
            project.responsavel_captacao_id = Some(user_id);
        }
        if let Some(user_id) = self.responsavel_edicao_id {
            project.responsavel_edicao_id = Some(user_id);
        }
        if let Some(date) = self.shoot_date {
            project.shoot_date = Some(date);
        }
        if let Some(date) = self.delivery_date {
            project.delivery_date = Some(date);
        }

        let finance = &mut project.finance;
        if let Some(v) = self.client_price {
            finance.client_price = v;
        }
        if let Some(v) = self.captation_cost {
            finance.captation_cost = v;
        }
        if let Some(v) = self.edition_cost {
            finance.edition_cost = v;
        }
        if let Some(v) = self.payment_status {
            finance.payment_status = v;
        }
        if let Some(v) = self.freelancer_payment_status {
            finance.freelancer_payment_status = v;
        }
        if let Some(d) = self.client_due_date {
            finance.client_due_date = Some(d);
        }
        if let Some(d) = self.client_received_date {
            finance.client_received_date = Some(d);
        }
        if let Some(d) = self.freelancer_due_date {
            finance.freelancer_due_date = Some(d);
        }
        if let Some(d) = self.freelancer_paid_date {
            finance.freelancer_paid_date = Some(d);
        }
        finance.recompute_margin();
    }
}

/// One element of a batch update: the target id plus the fields to change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBatchItem {
    pub id: DbId,
    #[serde(flatten)]
    pub changes: UpdateProject,
}

/// Query filters for project listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilter {
    pub phase: Option<Phase>,
    pub client_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub responsavel_id: Option<DbId>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        self.phase.map_or(true, |p| project.phase == p)
            && self.client_id.map_or(true, |id| project.client_id == id)
            && self.category_id.map_or(true, |id| project.category_id == Some(id))
            && self.responsavel_id.map_or(true, |id| project.involves(id))
    }
}

/// Minimal reference to a related entity, embedded in [`ProjectView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedEntity {
    pub id: DbId,
    pub name: String,
}

/// Related entities resolved for a project response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRelations {
    pub client: Option<RelatedEntity>,
    pub category: Option<RelatedEntity>,
    pub responsavel_captacao: Option<RelatedEntity>,
    pub responsavel_edicao: Option<RelatedEntity>,
}

/// A project as shown to a particular viewer.
///
/// Financial fields are omitted entirely (not nulled) when the viewer's role
/// cannot see finance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub client_id: DbId,
    pub category_id: Option<DbId>,
    pub responsavel_captacao_id: Option<DbId>,
    pub responsavel_edicao_id: Option<DbId>,
    pub phase: Phase,
    pub status_captacao: Option<CaptacaoStatus>,
    pub status_edicao: Option<EdicaoStatus>,
    pub shoot_date: Option<Date>,
    pub delivery_date: Option<Date>,
    #[serde(flatten)]
    pub finance: Option<ProjectFinance>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(flatten)]
    pub relations: ProjectRelations,
    pub permissions: ProjectPermissions,
}

impl ProjectView {
    /// Build the view of `project` for user `user_id` acting as `role`.
    pub fn for_viewer(
        project: Project,
        role: Role,
        user_id: DbId,
        relations: ProjectRelations,
    ) -> Self {
        let permissions = role
            .policy()
            .project_permissions(user_id, &project.assignment());
        let finance = permissions.can_view_finance.then_some(project.finance);

        Self {
            id: project.id,
            title: project.title,
            description: project.description,
            client_id: project.client_id,
            category_id: project.category_id,
            responsavel_captacao_id: project.responsavel_captacao_id,
            responsavel_edicao_id: project.responsavel_edicao_id,
            phase: project.phase,
            status_captacao: project.status_captacao,
            status_edicao: project.status_edicao,
            shoot_date: project.shoot_date,
            delivery_date: project.delivery_date,
            finance,
            created_at: project.created_at,
            updated_at: project.updated_at,
            relations,
            permissions,
        }
    }
}
