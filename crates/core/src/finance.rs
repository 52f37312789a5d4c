//! Payment statuses, margin computation, and financial aggregates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::workflow::Phase;

/// Client-side billing state of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentStatus {
    #[default]
    AFaturar,
    AReceber,
    Recebido,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::AFaturar,
        PaymentStatus::AReceber,
        PaymentStatus::Recebido,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::AFaturar => "a-faturar",
            PaymentStatus::AReceber => "a-receber",
            PaymentStatus::Recebido => "recebido",
        }
    }
}

/// Whether the collaborators of a project have been paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreelancerPaymentStatus {
    #[default]
    APagar,
    Pago,
}

impl FreelancerPaymentStatus {
    pub const ALL: [FreelancerPaymentStatus; 2] =
        [FreelancerPaymentStatus::APagar, FreelancerPaymentStatus::Pago];

    pub const fn as_str(self) -> &'static str {
        match self {
            FreelancerPaymentStatus::APagar => "a-pagar",
            FreelancerPaymentStatus::Pago => "pago",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FreelancerPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid payment status '{s}'. Must be one of: a-faturar, a-receber, recebido"
                ))
            })
    }
}

impl FromStr for FreelancerPaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FreelancerPaymentStatus::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid freelancer payment status '{s}'. Must be one of: a-pagar, pago"
                ))
            })
    }
}

/// Margin of a project: what the client pays minus both production costs.
pub fn compute_margin(client_price: f64, captation_cost: f64, edition_cost: f64) -> f64 {
    client_price - captation_cost - edition_cost
}

/// The money-related figures of one project, as fed into [`FinancialSummary`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectFigures {
    pub phase: Phase,
    pub client_price: f64,
    pub captation_cost: f64,
    pub edition_cost: f64,
    pub payment_status: PaymentStatus,
}

/// Aggregate totals over a set of projects, computed at read time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub project_count: u64,
    pub active_projects: u64,
    pub finished_projects: u64,
    pub total_revenue: f64,
    pub total_costs: f64,
    pub total_margin: f64,
    /// Revenue already received from clients.
    pub amount_received: f64,
    /// Revenue invoiced or still to invoice.
    pub amount_pending: f64,
}

impl FinancialSummary {
    pub fn add(&mut self, figures: &ProjectFigures) {
        let costs = figures.captation_cost + figures.edition_cost;

        self.project_count += 1;
        if figures.phase == Phase::Finalizados {
            self.finished_projects += 1;
        } else {
            self.active_projects += 1;
        }
        self.total_revenue += figures.client_price;
        self.total_costs += costs;
        self.total_margin += compute_margin(
            figures.client_price,
            figures.captation_cost,
            figures.edition_cost,
        );
        match figures.payment_status {
            PaymentStatus::Recebido => self.amount_received += figures.client_price,
            PaymentStatus::AFaturar | PaymentStatus::AReceber => {
                self.amount_pending += figures.client_price
            }
        }
    }
}

impl<'a> FromIterator<&'a ProjectFigures> for FinancialSummary {
    fn from_iter<I: IntoIterator<Item = &'a ProjectFigures>>(iter: I) -> Self {
        let mut summary = FinancialSummary::default();
        for figures in iter {
            summary.add(figures);
        }
        summary
    }
}

impl FromIterator<ProjectFigures> for FinancialSummary {
    fn from_iter<I: IntoIterator<Item = ProjectFigures>>(iter: I) -> Self {
        let mut summary = FinancialSummary::default();
        for figures in iter {
            summary.add(&figures);
        }
        summary
    }
}
