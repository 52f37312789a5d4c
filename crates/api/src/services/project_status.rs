//! Project status updates: permission check, transition validation,
//! automations, and a single persisted write.

use serde::{Deserialize, Serialize};
use studio_core::automation::{plan_status_update, StatusUpdatePlan};
use studio_core::error::CoreError;
use studio_core::types::DbId;
use studio_core::workflow::{
    available_transitions, CaptacaoStatus, EdicaoStatus, Phase, WorkflowStatus,
};
use studio_db::models::project::Project;
use studio_db::Store;

use crate::error::{forbidden, not_found, AppResult};
use crate::middleware::auth::AuthUser;

/// Body of `PUT /projects/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub phase: String,
    pub new_status: String,
    /// User to record as edição responsible when the slot is empty.
    pub user_id: Option<DbId>,
}

/// A persisted status update and the plan it came from.
#[derive(Debug, Clone)]
pub struct StatusUpdateOutcome {
    pub project: Project,
    pub plan: StatusUpdatePlan,
}

/// Current statuses of a project and where each may go next.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOverview {
    pub project_id: DbId,
    pub phase: Phase,
    pub status_captacao: Option<CaptacaoStatus>,
    pub status_edicao: Option<EdicaoStatus>,
    pub available_transitions: AvailableTransitions,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableTransitions {
    pub captacao: &'static [CaptacaoStatus],
    pub edicao: &'static [EdicaoStatus],
}

impl AvailableTransitions {
    /// Only the active phase's status can move; the other list stays empty.
    fn of(project: &Project) -> Self {
        Self {
            captacao: match project.phase {
                Phase::Captacao => available_transitions(project.status_captacao),
                _ => &[],
            },
            edicao: match project.phase {
                Phase::Edicao => available_transitions(project.status_edicao),
                _ => &[],
            },
        }
    }
}

impl StatusOverview {
    pub fn of(project: &Project) -> Self {
        Self {
            project_id: project.id,
            phase: project.phase,
            status_captacao: project.status_captacao,
            status_edicao: project.status_edicao,
            available_transitions: AvailableTransitions::of(project),
        }
    }
}

/// Move a project to `request.new_status` within `request.phase`.
///
/// Nothing is written unless the phase and status parse, the project exists
/// and currently sits in that phase, the caller may change statuses of that
/// phase on this project, and the transition table allows the move. All
/// resulting writes (the status plus any automation) go to the store in one
/// call, which fails with a conflict if the project moved in the meantime.
pub async fn update_project_status(
    store: &dyn Store,
    actor: &AuthUser,
    project_id: DbId,
    request: &StatusUpdateRequest,
) -> AppResult<StatusUpdateOutcome> {
    let phase: Phase = request.phase.parse()?;
    let target = WorkflowStatus::parse(phase, &request.new_status)?;

    let project = store
        .find_project(project_id)
        .await?
        .ok_or_else(|| not_found("Project", project_id))?;

    let policy = actor.policy();
    let assignment = project.assignment();
    if !policy.can_change_status(actor.user_id, &assignment, phase) {
        return Err(forbidden(format!(
            "Not allowed to change {phase} status of this project"
        )));
    }
    if let Some(user_id) = request.user_id {
        if user_id != actor.user_id && !policy.can_assign(actor.user_id, &assignment) {
            return Err(forbidden("Only administrators may assign other users"));
        }
    }

    let state = project.workflow_state();
    let plan = plan_status_update(&state, target, request.user_id)
        .inspect_err(|err| match err {
            CoreError::TransitionNotAllowed { from, to } => {
                tracing::warn!(project_id, %phase, %from, %to, "Rejected status transition");
            }
            CoreError::Validation(reason) => {
                tracing::warn!(project_id, %phase, %reason, "Rejected status update");
            }
            _ => {}
        })?;

    let updated = store
        .apply_status_change(project_id, &state, &plan.change)
        .await?
        .ok_or_else(|| not_found("Project", project_id))?;

    tracing::info!(
        project_id,
        %phase,
        status = %target,
        actor_id = actor.user_id,
        "Project status updated"
    );
    for automation in &plan.automations {
        tracing::info!(
            project_id,
            automation = ?automation,
            fields = ?automation.affected_fields(),
            "{}",
            automation.description()
        );
    }

    Ok(StatusUpdateOutcome {
        project: updated,
        plan,
    })
}
