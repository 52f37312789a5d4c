//! Read-time statistics derived from the project collection.
//!
//! Nothing here is stored; every value is recomputed from the projects
//! returned by the store for the request being served.

use serde::Serialize;
use studio_core::finance::{FinancialSummary, FreelancerPaymentStatus};
use studio_core::types::DbId;
use studio_core::workflow::Phase;

use crate::models::project::Project;

/// Project counts and, for finance viewers, money totals of a client or
/// category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStats {
    pub project_count: u64,
    pub active_projects: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_margin: Option<f64>,
}

impl EntityStats {
    pub fn from_projects<'a>(
        projects: impl IntoIterator<Item = &'a Project>,
        include_finance: bool,
    ) -> Self {
        let summary: FinancialSummary = projects.into_iter().map(Project::figures).collect();
        Self {
            project_count: summary.project_count,
            active_projects: summary.active_projects,
            total_revenue: include_finance.then_some(summary.total_revenue),
            total_margin: include_finance.then_some(summary.total_margin),
        }
    }
}

/// Workload and earnings of a collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub captacao_projects: u64,
    pub edicao_projects: u64,
    pub active_projects: u64,
    /// Captation cost of shoots plus edition cost of edits the user is
    /// responsible for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_earnings: Option<f64>,
    /// The part of `total_earnings` not yet paid out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_payments: Option<f64>,
}

impl UserStats {
    pub fn for_user<'a>(
        user_id: DbId,
        projects: impl IntoIterator<Item = &'a Project>,
        include_finance: bool,
    ) -> Self {
        let mut stats = UserStats::default();
        let mut earnings = 0.0;
        let mut pending = 0.0;

        for project in projects {
            let mut owed = 0.0;
            if project.responsavel_captacao_id == Some(user_id) {
                stats.captacao_projects += 1;
                owed += project.finance.captation_cost;
            }
            if project.responsavel_edicao_id == Some(user_id) {
                stats.edicao_projects += 1;
                owed += project.finance.edition_cost;
            }
            if project.involves(user_id) && project.phase != Phase::Finalizados {
                stats.active_projects += 1;
            }
            earnings += owed;
            if project.finance.freelancer_payment_status == FreelancerPaymentStatus::APagar {
                pending += owed;
            }
        }

        if include_finance {
            stats.total_earnings = Some(earnings);
            stats.pending_payments = Some(pending);
        }
        stats
    }
}

/// An entity together with its derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithStats<T, S> {
    #[serde(flatten)]
    pub entity: T,
    pub stats: S,
}
