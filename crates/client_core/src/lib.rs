use tracing::info;

pub mod error;
pub mod events;
pub mod gateway;
pub mod orchestrator;
pub mod validation;
pub mod view;

pub use error::{ActionError, GatewayError};
pub use events::LedgerEvent;
pub use gateway::{HttpLedgerGateway, LedgerGateway};
pub use orchestrator::{AccountOrchestrator, FetchOutcome, OrchestratorOptions, SubmitReport};
pub use validation::{validate_operation, FormField, OperationForm, OperationRequest, Violation};
pub use view::{Pagination, ViewPhase, ViewState};

/// Operator-facing notification surface injected into the orchestrator.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
    /// Asks the operator to approve `message`. Implementations may block the
    /// calling thread until an answer arrives.
    fn confirm(&self, message: &str) -> bool;
}

/// Routes notices to the log and approves every prompt.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!(notice = message, "ledger notice");
    }

    fn confirm(&self, message: &str) -> bool {
        info!(prompt = message, "auto-confirming ledger prompt");
        true
    }
}
