//! Handlers for `/reports`.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use studio_core::finance::{FinancialSummary, PaymentStatus, ProjectFigures};
use studio_core::workflow::Phase;
use studio_db::models::project::ProjectFilter;

use crate::error::AppResult;
use crate::middleware::rbac::RequireReportViewer;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Totals for one phase.
#[derive(Debug, Serialize)]
pub struct PhaseTotals {
    pub phase: Phase,
    #[serde(flatten)]
    pub summary: FinancialSummary,
}

/// Totals for one client payment status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusTotals {
    pub payment_status: PaymentStatus,
    #[serde(flatten)]
    pub summary: FinancialSummary,
}

/// Body of `GET /reports/summary`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub totals: FinancialSummary,
    /// One entry per phase, in pipeline order, including empty phases.
    pub by_phase: Vec<PhaseTotals>,
    pub by_payment_status: Vec<PaymentStatusTotals>,
}

impl ReportSummary {
    pub fn from_figures(figures: &[ProjectFigures]) -> Self {
        let totals = figures.iter().collect();
        let by_phase = Phase::ALL
            .into_iter()
            .map(|phase| PhaseTotals {
                phase,
                summary: figures.iter().filter(|f| f.phase == phase).collect(),
            })
            .collect();
        let by_payment_status = PaymentStatus::ALL
            .into_iter()
            .map(|payment_status| PaymentStatusTotals {
                payment_status,
                summary: figures
                    .iter()
                    .filter(|f| f.payment_status == payment_status)
                    .collect(),
            })
            .collect();

        Self {
            totals,
            by_phase,
            by_payment_status,
        }
    }
}

/// GET /api/reports/summary
pub async fn summary(
    State(state): State<AppState>,
    RequireReportViewer(auth): RequireReportViewer,
) -> AppResult<Json<ApiResponse<ReportSummary>>> {
    let projects = state.store.list_projects(&ProjectFilter::default()).await?;
    let figures: Vec<ProjectFigures> = projects.iter().map(|p| p.figures()).collect();

    tracing::debug!(user_id = auth.user_id, projects = figures.len(), "Building report summary");
    Ok(Json(ApiResponse::ok(ReportSummary::from_figures(&figures))))
}
