//! Per-project permission policy.
//!
//! [`Role::capabilities`] answers role-wide questions ("may this role see
//! finance?"). The [`PermissionPolicy`] implementations refine those answers
//! for a single project using its phase and assignment fields. Each role has
//! exactly one policy, obtained through [`Role::policy`].

use serde::Serialize;

use crate::roles::{Capabilities, Role};
use crate::types::DbId;
use crate::workflow::Phase;

/// The project fields that permission decisions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectAssignment {
    pub phase: Phase,
    pub responsavel_captacao_id: Option<DbId>,
    pub responsavel_edicao_id: Option<DbId>,
}

impl ProjectAssignment {
    pub fn is_captacao_responsible(&self, user_id: DbId) -> bool {
        self.responsavel_captacao_id == Some(user_id)
    }

    pub fn is_edicao_responsible(&self, user_id: DbId) -> bool {
        self.responsavel_edicao_id == Some(user_id)
    }
}

/// Everything a given user may do with a given project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPermissions {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_assign: bool,
    pub can_self_assign: bool,
    pub can_view_finance: bool,
    pub can_change_captacao_status: bool,
    pub can_change_edicao_status: bool,
}

pub trait PermissionPolicy: Send + Sync {
    fn role(&self) -> Role;

    fn capabilities(&self) -> &'static Capabilities {
        self.role().capabilities()
    }

    fn can_view(&self, user_id: DbId, project: &ProjectAssignment) -> bool;

    fn can_edit(&self, user_id: DbId, project: &ProjectAssignment) -> bool;

    /// Whether the user may move the project's status within `phase`.
    fn can_change_status(&self, user_id: DbId, project: &ProjectAssignment, phase: Phase) -> bool {
        self.role().works_on(phase) && self.can_edit(user_id, project)
    }

    /// Whether the user may set the responsible parties of the project.
    fn can_assign(&self, _user_id: DbId, _project: &ProjectAssignment) -> bool {
        false
    }

    /// Whether the user may take an unassigned edição slot for themselves.
    fn can_self_assign(&self, _user_id: DbId, _project: &ProjectAssignment) -> bool {
        false
    }

    fn project_permissions(&self, user_id: DbId, project: &ProjectAssignment) -> ProjectPermissions {
        let caps = self.capabilities();
        ProjectPermissions {
            can_view: self.can_view(user_id, project),
            can_edit: self.can_edit(user_id, project),
            can_delete: caps.can_edit_all_projects,
            can_assign: self.can_assign(user_id, project),
            can_self_assign: self.can_self_assign(user_id, project),
            can_view_finance: caps.can_view_finance,
            can_change_captacao_status: self.can_change_status(user_id, project, Phase::Captacao),
            can_change_edicao_status: self.can_change_status(user_id, project, Phase::Edicao),
        }
    }
}

pub struct AdminPolicy;

impl PermissionPolicy for AdminPolicy {
    fn role(&self) -> Role {
        Role::Admin
    }

    fn can_view(&self, _user_id: DbId, _project: &ProjectAssignment) -> bool {
        true
    }

    fn can_edit(&self, _user_id: DbId, _project: &ProjectAssignment) -> bool {
        true
    }

    fn can_assign(&self, _user_id: DbId, _project: &ProjectAssignment) -> bool {
        true
    }

    fn can_self_assign(&self, _user_id: DbId, _project: &ProjectAssignment) -> bool {
        true
    }
}

/// Captação freelancers only see the shoots assigned to them, and only while
/// the project is still in captação.
pub struct FreelancerCaptacaoPolicy;

impl PermissionPolicy for FreelancerCaptacaoPolicy {
    fn role(&self) -> Role {
        Role::FreelancerCaptacao
    }

    fn can_view(&self, user_id: DbId, project: &ProjectAssignment) -> bool {
        project.phase == Phase::Captacao && project.is_captacao_responsible(user_id)
    }

    fn can_edit(&self, user_id: DbId, project: &ProjectAssignment) -> bool {
        self.can_view(user_id, project)
    }
}

/// Editors see everything in edição plus anything assigned to them.
pub struct EditorEdicaoPolicy;

impl PermissionPolicy for EditorEdicaoPolicy {
    fn role(&self) -> Role {
        Role::EditorEdicao
    }

    fn can_view(&self, user_id: DbId, project: &ProjectAssignment) -> bool {
        project.phase == Phase::Edicao || project.is_edicao_responsible(user_id)
    }

    fn can_edit(&self, user_id: DbId, project: &ProjectAssignment) -> bool {
        self.can_view(user_id, project)
    }

    fn can_self_assign(&self, _user_id: DbId, project: &ProjectAssignment) -> bool {
        project.phase == Phase::Edicao && project.responsavel_edicao_id.is_none()
    }
}

static ADMIN_POLICY: AdminPolicy = AdminPolicy;
static FREELANCER_CAPTACAO_POLICY: FreelancerCaptacaoPolicy = FreelancerCaptacaoPolicy;
static EDITOR_EDICAO_POLICY: EditorEdicaoPolicy = EditorEdicaoPolicy;

impl Role {
    /// The permission policy for this role.
    pub fn policy(self) -> &'static dyn PermissionPolicy {
        match self {
            Role::Admin => &ADMIN_POLICY,
            Role::FreelancerCaptacao => &FREELANCER_CAPTACAO_POLICY,
            Role::EditorEdicao => &EDITOR_EDICAO_POLICY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: DbId = 7;
    const OTHER: DbId = 8;

    fn project(phase: Phase, captacao: Option<DbId>, edicao: Option<DbId>) -> ProjectAssignment {
        ProjectAssignment {
            phase,
            responsavel_captacao_id: captacao,
            responsavel_edicao_id: edicao,
        }
    }

    #[test]
    fn admin_can_do_everything() {
        let policy = Role::Admin.policy();
        let p = project(Phase::Finalizados, Some(OTHER), Some(OTHER));
        let perms = policy.project_permissions(ME, &p);
        assert!(perms.can_view);
        assert!(perms.can_edit);
        assert!(perms.can_delete);
        assert!(perms.can_assign);
        assert!(perms.can_view_finance);
        assert!(perms.can_change_captacao_status);
        assert!(perms.can_change_edicao_status);
    }

    #[test]
    fn freelancer_sees_only_own_captacao_work() {
        let policy = Role::FreelancerCaptacao.policy();
        assert!(policy.can_view(ME, &project(Phase::Captacao, Some(ME), None)));
        assert!(!policy.can_view(ME, &project(Phase::Captacao, Some(OTHER), None)));
        assert!(!policy.can_view(ME, &project(Phase::Captacao, None, None)));
        assert!(!policy.can_view(ME, &project(Phase::Edicao, Some(ME), None)));
    }

    #[test]
    fn freelancer_changes_only_captacao_statuses() {
        let policy = Role::FreelancerCaptacao.policy();
        let p = project(Phase::Captacao, Some(ME), None);
        assert!(policy.can_change_status(ME, &p, Phase::Captacao));
        assert!(!policy.can_change_status(ME, &p, Phase::Edicao));
        let perms = policy.project_permissions(ME, &p);
        assert!(!perms.can_assign);
        assert!(!perms.can_delete);
        assert!(!perms.can_view_finance);
    }

    #[test]
    fn editor_sees_edicao_phase_or_own_assignments() {
        let policy = Role::EditorEdicao.policy();
        assert!(policy.can_view(ME, &project(Phase::Edicao, None, Some(OTHER))));
        assert!(policy.can_view(ME, &project(Phase::Finalizados, None, Some(ME))));
        assert!(!policy.can_view(ME, &project(Phase::Captacao, Some(OTHER), None)));
        assert!(!policy.can_view(ME, &project(Phase::Finalizados, None, Some(OTHER))));
    }

    #[test]
    fn editor_may_self_assign_only_open_edicao_slots() {
        let policy = Role::EditorEdicao.policy();
        assert!(policy.can_self_assign(ME, &project(Phase::Edicao, None, None)));
        assert!(!policy.can_self_assign(ME, &project(Phase::Edicao, None, Some(OTHER))));
        assert!(!policy.can_self_assign(ME, &project(Phase::Captacao, None, None)));
        assert!(!policy.can_assign(ME, &project(Phase::Edicao, None, None)));
    }

    #[test]
    fn editor_cannot_touch_captacao_statuses() {
        let policy = Role::EditorEdicao.policy();
        let p = project(Phase::Edicao, None, Some(ME));
        assert!(policy.can_change_status(ME, &p, Phase::Edicao));
        assert!(!policy.can_change_status(ME, &p, Phase::Captacao));
    }

    #[test]
    fn policy_reports_its_role() {
        for role in Role::ALL {
            assert_eq!(role.policy().role(), role);
        }
    }
}
