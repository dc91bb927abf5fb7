use shared::{domain::OperationKind, protocol::LedgerPage};

use crate::view::ViewPhase;

/// Published by the orchestrator after each state transition.
#[derive(Debug, Clone)]
pub enum LedgerEvent {
    PhaseChanged(ViewPhase),
    PageLoaded(LedgerPage),
    SubmittingChanged(bool),
    OperationCompleted(OperationKind),
    Error(String),
}
