//! Status-update planning: transition validation plus automations.
//!
//! [`plan_status_update`] is the only producer of [`StatusChange`] values,
//! and it validates the requested transition before any rule runs. An
//! automation therefore cannot fire without a legal transition.
//!
//! Only the status of the project's current phase can move. The other
//! phase's status is kept as history and never drives a transition, so a
//! finalized project accepts no status update at all.
//!
//! Rules, keyed on the requested `(phase, status)`:
//!
//! | Trigger                     | Effect                                                       |
//! |-----------------------------|--------------------------------------------------------------|
//! | `captacao` / `concluido`    | phase → `edicao`, edição → `receber-ficheiros`, payment → `a-faturar` |
//! | `edicao` / `revisao-cliente`| payment → `a-receber`                                        |
//! | `edicao` / `entregue`       | payment → `recebido`, phase → `finalizados`                  |
//!
//! Independently, a caller working in `edicao` on a project with no edição
//! responsible becomes that responsible. At most one transition rule applies
//! per call and its outputs are not fed back into the table.

use serde::Serialize;

use crate::error::CoreError;
use crate::finance::PaymentStatus;
use crate::types::DbId;
use crate::workflow::{
    validate_transition, CaptacaoStatus, EdicaoStatus, Phase, Status, WorkflowStatus,
};

/// Workflow-relevant fields of a project before the update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowState {
    pub phase: Phase,
    pub status_captacao: Option<CaptacaoStatus>,
    pub status_edicao: Option<EdicaoStatus>,
    pub payment_status: PaymentStatus,
    pub responsavel_edicao_id: Option<DbId>,
}

impl WorkflowState {
    /// Current status of the requested phase.
    pub fn status_in(&self, phase: Phase) -> Option<WorkflowStatus> {
        match phase {
            Phase::Captacao => self.status_captacao.map(WorkflowStatus::Captacao),
            Phase::Edicao => self.status_edicao.map(WorkflowStatus::Edicao),
            Phase::Finalizados => None,
        }
    }

    /// Whether both snapshots agree on every field a plan is validated
    /// against. Payment status is left out: plans only overwrite it.
    pub fn same_position(&self, other: &WorkflowState) -> bool {
        self.phase == other.phase
            && self.status_captacao == other.status_captacao
            && self.status_edicao == other.status_edicao
            && self.responsavel_edicao_id == other.responsavel_edicao_id
    }
}

/// Field writes of one status update. `None` leaves the field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusChange {
    pub phase: Option<Phase>,
    pub status_captacao: Option<CaptacaoStatus>,
    pub status_edicao: Option<EdicaoStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub responsavel_edicao_id: Option<DbId>,
}

impl StatusChange {
    /// Apply the writes to a workflow snapshot.
    pub fn apply(&self, state: &mut WorkflowState) {
        if let Some(phase) = self.phase {
            state.phase = phase;
        }
        if let Some(status) = self.status_captacao {
            state.status_captacao = Some(status);
        }
        if let Some(status) = self.status_edicao {
            state.status_edicao = Some(status);
        }
        if let Some(payment) = self.payment_status {
            state.payment_status = payment;
        }
        if let Some(user_id) = self.responsavel_edicao_id {
            state.responsavel_edicao_id = Some(user_id);
        }
    }
}

/// A side effect fired by a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Automation {
    /// Captação finished: the project moves into edição.
    CaptacaoToEdicao,
    /// Cut sent to the client: invoice is due.
    ClientReviewInvoiced,
    /// Delivered: payment received and project finished.
    DeliveredFinalized,
    /// The caller took the empty edição slot.
    EditorAutoAssigned,
}

impl Automation {
    /// Names of the project fields (as serialized) this automation writes.
    pub const fn affected_fields(self) -> &'static [&'static str] {
        match self {
            Automation::CaptacaoToEdicao => &["phase", "statusEdicao", "paymentStatus"],
            Automation::ClientReviewInvoiced => &["paymentStatus"],
            Automation::DeliveredFinalized => &["paymentStatus", "phase"],
            Automation::EditorAutoAssigned => &["responsavelEdicaoId"],
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Automation::CaptacaoToEdicao => "Project moved to edição (receber-ficheiros)",
            Automation::ClientReviewInvoiced => "Payment status set to a-receber",
            Automation::DeliveredFinalized => "Payment received and project finalized",
            Automation::EditorAutoAssigned => "Caller assigned as edição responsible",
        }
    }
}

/// Validated outcome of a status-update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdatePlan {
    pub target: WorkflowStatus,
    pub change: StatusChange,
    pub automations: Vec<Automation>,
}

impl StatusUpdatePlan {
    /// Distinct field names written by the automations, in firing order.
    pub fn affected_fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        for field in self.automations.iter().flat_map(|a| a.affected_fields()) {
            if !fields.contains(field) {
                fields.push(field);
            }
        }
        fields
    }
}

/// Validate `target` against the current state and collect every write the
/// update implies.
///
/// Fails with [`CoreError::Validation`] when `target` belongs to a phase the
/// project is not in, and with [`CoreError::TransitionNotAllowed`] when the
/// table forbids the move. On error nothing must be persisted.
pub fn plan_status_update(
    state: &WorkflowState,
    target: WorkflowStatus,
    user_id: Option<DbId>,
) -> Result<StatusUpdatePlan, CoreError> {
    if target.phase() != state.phase {
        return Err(CoreError::Validation(format!(
            "Project is in {} phase; its {} status can no longer change",
            state.phase,
            target.phase()
        )));
    }

    let mut change = StatusChange::default();
    let mut automations = Vec::new();

    match target {
        WorkflowStatus::Captacao(next) => {
            validate_transition(state.status_captacao, next)?;
            change.status_captacao = Some(next);

            if next == CaptacaoStatus::Concluido {
                change.phase = Some(Phase::Edicao);
                change.status_edicao = Some(EdicaoStatus::INITIAL);
                change.payment_status = Some(PaymentStatus::AFaturar);
                automations.push(Automation::CaptacaoToEdicao);
            }
        }
        WorkflowStatus::Edicao(next) => {
            validate_transition(state.status_edicao, next)?;
            change.status_edicao = Some(next);

            match next {
                EdicaoStatus::RevisaoCliente => {
                    change.payment_status = Some(PaymentStatus::AReceber);
                    automations.push(Automation::ClientReviewInvoiced);
                }
                EdicaoStatus::Entregue => {
                    change.payment_status = Some(PaymentStatus::Recebido);
                    change.phase = Some(Phase::Finalizados);
                    automations.push(Automation::DeliveredFinalized);
                }
                _ => {}
            }
        }
    }

    if let Some(user_id) = user_id {
        if target.phase() == Phase::Edicao && state.responsavel_edicao_id.is_none() {
            change.responsavel_edicao_id = Some(user_id);
            automations.push(Automation::EditorAutoAssigned);
        }
    }

    Ok(StatusUpdatePlan {
        target,
        change,
        automations,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn captacao(status: CaptacaoStatus) -> WorkflowState {
        WorkflowState {
            phase: Phase::Captacao,
            status_captacao: Some(status),
            status_edicao: None,
            payment_status: PaymentStatus::AFaturar,
            responsavel_edicao_id: None,
        }
    }

    fn edicao(status: EdicaoStatus) -> WorkflowState {
        WorkflowState {
            phase: Phase::Edicao,
            status_captacao: Some(CaptacaoStatus::Concluido),
            status_edicao: Some(status),
            payment_status: PaymentStatus::AFaturar,
            responsavel_edicao_id: Some(3),
        }
    }

    fn run(state: &WorkflowState, target: WorkflowStatus, user: Option<DbId>) -> WorkflowState {
        let plan = plan_status_update(state, target, user).expect("transition should be legal");
        let mut next = *state;
        plan.change.apply(&mut next);
        next
    }

    #[test]
    fn plain_transition_only_sets_status() {
        let state = captacao(CaptacaoStatus::Agendado);
        let plan = plan_status_update(
            &state,
            WorkflowStatus::Captacao(CaptacaoStatus::EmGravacao),
            None,
        )
        .unwrap();
        assert!(plan.automations.is_empty());
        assert_eq!(
            plan.change,
            StatusChange {
                status_captacao: Some(CaptacaoStatus::EmGravacao),
                ..StatusChange::default()
            }
        );
    }

    #[test]
    fn concluido_moves_project_into_edicao() {
        for payment in PaymentStatus::ALL {
            let mut state = captacao(CaptacaoStatus::UploadNas);
            state.payment_status = payment;
            state.status_edicao = Some(EdicaoStatus::Feedback);

            let next = run(
                &state,
                WorkflowStatus::Captacao(CaptacaoStatus::Concluido),
                None,
            );
            assert_eq!(next.phase, Phase::Edicao);
            assert_eq!(next.status_captacao, Some(CaptacaoStatus::Concluido));
            assert_eq!(next.status_edicao, Some(EdicaoStatus::ReceberFicheiros));
            assert_eq!(next.payment_status, PaymentStatus::AFaturar);
        }
    }

    #[test]
    fn revisao_cliente_sets_a_receber() {
        let next = run(
            &edicao(EdicaoStatus::Feedback),
            WorkflowStatus::Edicao(EdicaoStatus::RevisaoCliente),
            None,
        );
        assert_eq!(next.payment_status, PaymentStatus::AReceber);
        assert_eq!(next.phase, Phase::Edicao);
    }

    #[test]
    fn entregue_finalizes_and_marks_received() {
        let next = run(
            &edicao(EdicaoStatus::RevisaoCliente),
            WorkflowStatus::Edicao(EdicaoStatus::Entregue),
            None,
        );
        assert_eq!(next.payment_status, PaymentStatus::Recebido);
        assert_eq!(next.phase, Phase::Finalizados);
    }

    #[test]
    fn illegal_transition_produces_no_plan() {
        let state = captacao(CaptacaoStatus::EmGravacao);
        assert_matches!(
            plan_status_update(
                &state,
                WorkflowStatus::Captacao(CaptacaoStatus::Concluido),
                Some(1)
            ),
            Err(CoreError::TransitionNotAllowed { .. })
        );
    }

    #[test]
    fn edicao_call_assigns_caller_when_slot_is_empty() {
        let mut state = edicao(EdicaoStatus::ReceberFicheiros);
        state.responsavel_edicao_id = None;
        let plan = plan_status_update(
            &state,
            WorkflowStatus::Edicao(EdicaoStatus::Decupagem),
            Some(42),
        )
        .unwrap();
        assert_eq!(plan.change.responsavel_edicao_id, Some(42));
        assert_eq!(plan.automations, vec![Automation::EditorAutoAssigned]);
        assert_eq!(plan.affected_fields(), vec!["responsavelEdicaoId"]);
    }

    #[test]
    fn existing_edicao_responsible_is_kept() {
        let plan = plan_status_update(
            &edicao(EdicaoStatus::ReceberFicheiros),
            WorkflowStatus::Edicao(EdicaoStatus::Decupagem),
            Some(42),
        )
        .unwrap();
        assert_eq!(plan.change.responsavel_edicao_id, None);
    }

    #[test]
    fn captacao_call_never_assigns_editor() {
        let plan = plan_status_update(
            &captacao(CaptacaoStatus::UploadNas),
            WorkflowStatus::Captacao(CaptacaoStatus::Concluido),
            Some(42),
        )
        .unwrap();
        assert_eq!(plan.change.responsavel_edicao_id, None);
        assert_eq!(plan.automations, vec![Automation::CaptacaoToEdicao]);
        assert_eq!(
            plan.affected_fields(),
            vec!["phase", "statusEdicao", "paymentStatus"]
        );
    }

    #[test]
    fn rules_do_not_chain() {
        // Entering edição through the captação rule must not also trigger the
        // edição auto-assignment or any edição status rule.
        let plan = plan_status_update(
            &captacao(CaptacaoStatus::UploadNas),
            WorkflowStatus::Captacao(CaptacaoStatus::Concluido),
            None,
        )
        .unwrap();
        assert_eq!(plan.automations.len(), 1);
    }

    #[test]
    fn delivered_fields_are_deduplicated_with_assignment() {
        let mut state = edicao(EdicaoStatus::RevisaoCliente);
        state.responsavel_edicao_id = None;
        let plan = plan_status_update(
            &state,
            WorkflowStatus::Edicao(EdicaoStatus::Entregue),
            Some(9),
        )
        .unwrap();
        assert_eq!(
            plan.affected_fields(),
            vec!["paymentStatus", "phase", "responsavelEdicaoId"]
        );
    }

    #[test]
    fn inactive_phase_status_cannot_move() {
        // Back out of concluido after the edição automation fired.
        let state = edicao(EdicaoStatus::ReceberFicheiros);
        assert_matches!(
            plan_status_update(
                &state,
                WorkflowStatus::Captacao(CaptacaoStatus::UploadNas),
                None
            ),
            Err(CoreError::Validation(_))
        );

        let state = captacao(CaptacaoStatus::EmGravacao);
        assert_matches!(
            plan_status_update(
                &state,
                WorkflowStatus::Edicao(EdicaoStatus::ReceberFicheiros),
                Some(1)
            ),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn finalized_project_accepts_no_status_update() {
        let mut state = edicao(EdicaoStatus::Entregue);
        state.phase = Phase::Finalizados;
        state.payment_status = PaymentStatus::Recebido;

        assert_matches!(
            plan_status_update(
                &state,
                WorkflowStatus::Edicao(EdicaoStatus::RevisaoCliente),
                None
            ),
            Err(CoreError::Validation(_))
        );
        // A captação rewind would otherwise reset payment to a-faturar.
        assert_matches!(
            plan_status_update(
                &state,
                WorkflowStatus::Captacao(CaptacaoStatus::UploadNas),
                None
            ),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn same_position_ignores_payment_status() {
        let state = edicao(EdicaoStatus::Feedback);
        let mut paid = state;
        paid.payment_status = PaymentStatus::Recebido;
        assert!(state.same_position(&paid));

        let mut reassigned = state;
        reassigned.responsavel_edicao_id = Some(4);
        assert!(!state.same_position(&reassigned));

        let mut moved = state;
        moved.status_edicao = Some(EdicaoStatus::RevisaoCliente);
        assert!(!state.same_position(&moved));
    }

    #[test]
    fn status_in_reads_the_requested_phase() {
        let state = edicao(EdicaoStatus::Feedback);
        assert_eq!(
            state.status_in(Phase::Captacao),
            Some(WorkflowStatus::Captacao(CaptacaoStatus::Concluido))
        );
        assert_eq!(state.status_in(Phase::Finalizados), None);
    }
}
