//! User roles and their static capability records.
//!
//! Role names must match the values stored in `users.role`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::workflow::Phase;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_FREELANCER_CAPTACAO: &str = "freelancer_captacao";
pub const ROLE_EDITOR_EDICAO: &str = "editor_edicao";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    FreelancerCaptacao,
    EditorEdicao,
}

/// What a role may do, independent of any particular project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_view_finance: bool,
    pub can_edit_all_projects: bool,
    pub can_view_all_projects: bool,
    pub can_manage_users: bool,
    pub can_manage_clients: bool,
    pub can_manage_categories: bool,
    pub can_view_reports: bool,
    /// Phases whose statuses the role works on.
    pub phases: &'static [Phase],
}

const ADMIN: Capabilities = Capabilities {
    can_view_finance: true,
    can_edit_all_projects: true,
    can_view_all_projects: true,
    can_manage_users: true,
    can_manage_clients: true,
    can_manage_categories: true,
    can_view_reports: true,
    phases: &[Phase::Captacao, Phase::Edicao],
};

const FREELANCER_CAPTACAO: Capabilities = Capabilities {
    can_view_finance: false,
    can_edit_all_projects: false,
    can_view_all_projects: false,
    can_manage_users: false,
    can_manage_clients: false,
    can_manage_categories: false,
    can_view_reports: false,
    phases: &[Phase::Captacao],
};

const EDITOR_EDICAO: Capabilities = Capabilities {
    can_view_finance: false,
    can_edit_all_projects: false,
    // Editors browse the whole board to pick up unassigned work.
    can_view_all_projects: true,
    can_manage_users: false,
    can_manage_clients: false,
    can_manage_categories: false,
    can_view_reports: false,
    phases: &[Phase::Edicao],
};

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::FreelancerCaptacao, Role::EditorEdicao];

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::FreelancerCaptacao => ROLE_FREELANCER_CAPTACAO,
            Role::EditorEdicao => ROLE_EDITOR_EDICAO,
        }
    }

    pub const fn capabilities(self) -> &'static Capabilities {
        match self {
            Role::Admin => &ADMIN,
            Role::FreelancerCaptacao => &FREELANCER_CAPTACAO,
            Role::EditorEdicao => &EDITOR_EDICAO,
        }
    }

    pub fn works_on(self, phase: Phase) -> bool {
        self.capabilities().phases.contains(&phase)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid role '{s}'. Must be one of: {ROLE_ADMIN}, {ROLE_FREELANCER_CAPTACAO}, {ROLE_EDITOR_EDICAO}"
                ))
            })
    }
}
