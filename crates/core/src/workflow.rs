//! Production workflow: phases, per-phase statuses, and the transition table.
//!
//! A project moves through three phases (`captacao` → `edicao` →
//! `finalizados`). The two working phases each carry their own status
//! machine. Transitions are encoded as exhaustive `match` arms on the status
//! enums, so a status without a table entry does not compile.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Coarse pipeline stage of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Captacao,
    Edicao,
    Finalizados,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Captacao, Phase::Edicao, Phase::Finalizados];

    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Captacao => "captacao",
            Phase::Edicao => "edicao",
            Phase::Finalizados => "finalizados",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid phase '{s}'. Must be one of: captacao, edicao, finalizados"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Status trait
// ---------------------------------------------------------------------------

/// Behaviour shared by the per-phase status enums.
pub trait Status: Copy + Eq + fmt::Display + 'static {
    /// The phase whose status machine this enum describes.
    const PHASE: Phase;

    /// Status a project enters when the phase starts.
    const INITIAL: Self;

    /// Every status of the phase, in board order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Legal destinations from `self`.
    fn next_states(self) -> &'static [Self];

    fn can_transition_to(self, next: Self) -> bool {
        self.next_states().contains(&next)
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == raw)
    }
}

// ---------------------------------------------------------------------------
// Captação statuses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptacaoStatus {
    Agendado,
    EmGravacao,
    UploadNas,
    Concluido,
}

impl Status for CaptacaoStatus {
    const PHASE: Phase = Phase::Captacao;
    const INITIAL: Self = CaptacaoStatus::Agendado;
    const ALL: &'static [Self] = &[
        CaptacaoStatus::Agendado,
        CaptacaoStatus::EmGravacao,
        CaptacaoStatus::UploadNas,
        CaptacaoStatus::Concluido,
    ];

    fn as_str(self) -> &'static str {
        match self {
            CaptacaoStatus::Agendado => "agendado",
            CaptacaoStatus::EmGravacao => "em-gravacao",
            CaptacaoStatus::UploadNas => "upload-nas",
            CaptacaoStatus::Concluido => "concluido",
        }
    }

    fn next_states(self) -> &'static [Self] {
        use CaptacaoStatus::*;
        match self {
            Agendado => &[EmGravacao],
            EmGravacao => &[Agendado, UploadNas],
            UploadNas => &[EmGravacao, Concluido],
            Concluido => &[UploadNas],
        }
    }
}

// ---------------------------------------------------------------------------
// Edição statuses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdicaoStatus {
    ReceberFicheiros,
    Decupagem,
    EmEdicao,
    Feedback,
    RevisaoCliente,
    Entregue,
}

impl Status for EdicaoStatus {
    const PHASE: Phase = Phase::Edicao;
    const INITIAL: Self = EdicaoStatus::ReceberFicheiros;
    const ALL: &'static [Self] = &[
        EdicaoStatus::ReceberFicheiros,
        EdicaoStatus::Decupagem,
        EdicaoStatus::EmEdicao,
        EdicaoStatus::Feedback,
        EdicaoStatus::RevisaoCliente,
        EdicaoStatus::Entregue,
    ];

    fn as_str(self) -> &'static str {
        match self {
            EdicaoStatus::ReceberFicheiros => "receber-ficheiros",
            EdicaoStatus::Decupagem => "decupagem",
            EdicaoStatus::EmEdicao => "em-edicao",
            EdicaoStatus::Feedback => "feedback",
            EdicaoStatus::RevisaoCliente => "revisao-cliente",
            EdicaoStatus::Entregue => "entregue",
        }
    }

    fn next_states(self) -> &'static [Self] {
        use EdicaoStatus::*;
        match self {
            ReceberFicheiros => &[Decupagem],
            Decupagem => &[ReceberFicheiros, EmEdicao],
            EmEdicao => &[Decupagem, Feedback],
            Feedback => &[EmEdicao, RevisaoCliente],
            RevisaoCliente => &[Feedback, Entregue, EmEdicao],
            Entregue => &[RevisaoCliente],
        }
    }
}

macro_rules! status_string_impls {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(Status::as_str(*self))
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as Status>::parse(s).ok_or_else(|| invalid_status(<$ty as Status>::PHASE, s))
            }
        }
    };
}

status_string_impls!(CaptacaoStatus);
status_string_impls!(EdicaoStatus);

fn invalid_status(phase: Phase, raw: &str) -> CoreError {
    let allowed: Vec<&str> = match phase {
        Phase::Captacao => CaptacaoStatus::ALL.iter().map(|s| s.as_str()).collect(),
        Phase::Edicao => EdicaoStatus::ALL.iter().map(|s| s.as_str()).collect(),
        Phase::Finalizados => Vec::new(),
    };
    CoreError::Validation(format!(
        "Invalid {phase} status '{raw}'. Must be one of: {}",
        allowed.join(", ")
    ))
}

// ---------------------------------------------------------------------------
// Phase-tagged status
// ---------------------------------------------------------------------------

/// A status together with the phase it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStatus {
    Captacao(CaptacaoStatus),
    Edicao(EdicaoStatus),
}

impl WorkflowStatus {
    /// Parse a raw status string in the context of `phase`.
    ///
    /// Only the two working phases accept statuses; `finalizados` has none.
    pub fn parse(phase: Phase, raw: &str) -> Result<Self, CoreError> {
        match phase {
            Phase::Captacao => raw.parse().map(WorkflowStatus::Captacao),
            Phase::Edicao => raw.parse().map(WorkflowStatus::Edicao),
            Phase::Finalizados => Err(CoreError::Validation(
                "Phase must be 'captacao' or 'edicao'".to_string(),
            )),
        }
    }

    pub const fn phase(self) -> Phase {
        match self {
            WorkflowStatus::Captacao(_) => Phase::Captacao,
            WorkflowStatus::Edicao(_) => Phase::Edicao,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStatus::Captacao(s) => s.as_str(),
            WorkflowStatus::Edicao(s) => s.as_str(),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transition validation
// ---------------------------------------------------------------------------

/// Legal destinations from `current`.
///
/// An unset status may only enter the phase's initial status.
pub fn available_transitions<S: Status>(current: Option<S>) -> &'static [S] {
    match current {
        Some(status) => status.next_states(),
        None => {
            let idx = S::ALL.iter().position(|s| *s == S::INITIAL).unwrap_or(0);
            &S::ALL[idx..=idx]
        }
    }
}

/// Validate that moving from `current` to `next` is allowed.
pub fn validate_transition<S: Status>(current: Option<S>, next: S) -> Result<(), CoreError> {
    if available_transitions(current).contains(&next) {
        Ok(())
    } else {
        Err(CoreError::TransitionNotAllowed {
            from: current.map_or_else(|| "(unset)".to_string(), |s| s.to_string()),
            to: next.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn captacao_table_matches_board_rules() {
        use CaptacaoStatus::*;
        assert_eq!(Agendado.next_states(), &[EmGravacao]);
        assert_eq!(EmGravacao.next_states(), &[Agendado, UploadNas]);
        assert_eq!(UploadNas.next_states(), &[EmGravacao, Concluido]);
        assert_eq!(Concluido.next_states(), &[UploadNas]);
    }

    #[test]
    fn edicao_table_matches_board_rules() {
        use EdicaoStatus::*;
        assert_eq!(ReceberFicheiros.next_states(), &[Decupagem]);
        assert_eq!(Decupagem.next_states(), &[ReceberFicheiros, EmEdicao]);
        assert_eq!(EmEdicao.next_states(), &[Decupagem, Feedback]);
        assert_eq!(Feedback.next_states(), &[EmEdicao, RevisaoCliente]);
        assert_eq!(
            RevisaoCliente.next_states(),
            &[Feedback, Entregue, EmEdicao]
        );
        assert_eq!(Entregue.next_states(), &[RevisaoCliente]);
    }

    #[test]
    fn every_pair_outside_the_table_is_rejected() {
        for &from in CaptacaoStatus::ALL {
            for &to in CaptacaoStatus::ALL {
                let ok = validate_transition(Some(from), to).is_ok();
                assert_eq!(ok, from.next_states().contains(&to), "{from} -> {to}");
            }
        }
        for &from in EdicaoStatus::ALL {
            for &to in EdicaoStatus::ALL {
                let ok = validate_transition(Some(from), to).is_ok();
                assert_eq!(ok, from.next_states().contains(&to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn self_transition_is_rejected() {
        assert_matches!(
            validate_transition(Some(EdicaoStatus::Feedback), EdicaoStatus::Feedback),
            Err(CoreError::TransitionNotAllowed { .. })
        );
    }

    #[test]
    fn entregue_cannot_skip_back() {
        assert!(validate_transition(Some(EdicaoStatus::Entregue), EdicaoStatus::EmEdicao).is_err());
        assert!(
            validate_transition(Some(EdicaoStatus::Entregue), EdicaoStatus::RevisaoCliente).is_ok()
        );
    }

    #[test]
    fn unset_status_only_enters_initial() {
        assert!(validate_transition(None, CaptacaoStatus::Agendado).is_ok());
        assert!(validate_transition(None, CaptacaoStatus::Concluido).is_err());
        assert!(validate_transition(None, EdicaoStatus::ReceberFicheiros).is_ok());
        assert!(validate_transition(None, EdicaoStatus::Entregue).is_err());
    }

    #[test]
    fn rejection_names_both_ends() {
        let err = validate_transition(Some(CaptacaoStatus::EmGravacao), CaptacaoStatus::Concluido)
            .unwrap_err();
        assert_matches!(
            err,
            CoreError::TransitionNotAllowed { ref from, ref to }
                if from == "em-gravacao" && to == "concluido"
        );
    }

    #[test]
    fn status_strings_round_trip_through_serde() {
        let json = serde_json::to_string(&EdicaoStatus::RevisaoCliente).unwrap();
        assert_eq!(json, "\"revisao-cliente\"");
        let parsed: CaptacaoStatus = serde_json::from_str("\"upload-nas\"").unwrap();
        assert_eq!(parsed, CaptacaoStatus::UploadNas);
    }

    #[test]
    fn workflow_status_is_parsed_per_phase() {
        assert_eq!(
            WorkflowStatus::parse(Phase::Captacao, "concluido").unwrap(),
            WorkflowStatus::Captacao(CaptacaoStatus::Concluido)
        );
        assert_matches!(
            WorkflowStatus::parse(Phase::Captacao, "entregue"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            WorkflowStatus::parse(Phase::Finalizados, "entregue"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn phase_parses_known_names_only() {
        assert_eq!("edicao".parse::<Phase>().unwrap(), Phase::Edicao);
        assert!("edição".parse::<Phase>().is_err());
    }
}
