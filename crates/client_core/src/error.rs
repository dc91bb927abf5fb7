use shared::domain::{AccountId, OperationKind};
use thiserror::Error;

use crate::{validation::Violation, view::ViewPhase};

/// Failure of a single ledger exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("account {0} not found")]
    NotFound(AccountId),
    #[error("rejected by ledger: {}", .message.as_deref().unwrap_or("no reason given"))]
    Rejected { message: Option<String> },
    #[error("ledger unavailable: {0}")]
    Transient(String),
}

/// Structured outcome of a failed orchestrator action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("an account id is required")]
    AccountRequired,
    #[error("no account selected")]
    NoAccountSelected,
    #[error("cannot change page while {0:?}")]
    FetchNotReady(ViewPhase),
    #[error("invalid operation: {}", describe_violations(.0))]
    Validation(Vec<Violation>),
    #[error("account {0} not found")]
    NotFound(AccountId),
    #[error("{kind} rejected: {}", .message.as_deref().unwrap_or("no reason given"))]
    Rejected {
        kind: OperationKind,
        message: Option<String>,
    },
    #[error("ledger unavailable: {0}")]
    Transient(String),
    #[error("an operation is already being submitted")]
    SubmissionInFlight,
    #[error("{0} cancelled by operator")]
    Cancelled(OperationKind),
}

impl ActionError {
    pub(crate) fn from_fetch(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(account) => Self::NotFound(account),
            GatewayError::Transient(reason) => Self::Transient(reason),
            // Reads are never refused for business reasons; treat as infrastructure noise.
            GatewayError::Rejected { message } => {
                Self::Transient(message.unwrap_or_else(|| "fetch rejected".to_string()))
            }
        }
    }

    pub(crate) fn from_mutation(kind: OperationKind, err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { message } => Self::Rejected { kind, message },
            GatewayError::Transient(reason) => Self::Transient(reason),
            GatewayError::NotFound(account) => Self::Rejected {
                kind,
                message: Some(format!("account {account} not found")),
            },
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Validation(violations) => violations,
            _ => &[],
        }
    }
}

fn describe_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
