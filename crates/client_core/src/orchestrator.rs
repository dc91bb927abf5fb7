//! Account screen state machine: select an account, page through its history,
//! submit mutations and reconcile the view with a fresh read afterwards.

use std::sync::Arc;

use shared::{
    domain::{AccountId, OperationKind},
    protocol::LedgerPage,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::{ActionError, GatewayError},
    events::LedgerEvent,
    gateway::LedgerGateway,
    validation::{validate_operation, OperationForm, OperationRequest},
    view::{Pagination, ViewPhase, ViewState, DEFAULT_PAGE_SIZE},
    LogNotifier, Notifier,
};

pub const FETCH_FAILED_NOTICE: &str = "Account not found or error occurred!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    pub page_size: u32,
    /// Ask the notifier for confirmation before dispatching a validated mutation.
    pub confirm_mutations: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            confirm_mutations: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied(LedgerPage),
    /// A newer fetch was issued while this one was in flight; its response was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReport {
    pub kind: OperationKind,
    /// Result of the re-fetch that follows every successful mutation.
    pub reconciliation: Result<FetchOutcome, ActionError>,
}

struct FetchTicket {
    seq: u64,
    account: AccountId,
    pagination: Pagination,
}

struct OrchestratorState {
    view: ViewState,
    fetch_seq: u64,
}

impl OrchestratorState {
    fn issue_fetch(&mut self, account: AccountId) -> FetchTicket {
        self.fetch_seq += 1;
        self.view.phase = ViewPhase::Loading;
        FetchTicket {
            seq: self.fetch_seq,
            account,
            pagination: self.view.pagination,
        }
    }
}

pub struct AccountOrchestrator {
    gateway: Arc<dyn LedgerGateway>,
    notifier: Arc<dyn Notifier>,
    options: OrchestratorOptions,
    inner: Mutex<OrchestratorState>,
    events: broadcast::Sender<LedgerEvent>,
}

impl AccountOrchestrator {
    pub fn new(gateway: Arc<dyn LedgerGateway>) -> Arc<Self> {
        Self::new_with_dependencies(
            gateway,
            Arc::new(LogNotifier),
            OrchestratorOptions::default(),
        )
    }

    pub fn new_with_dependencies(
        gateway: Arc<dyn LedgerGateway>,
        notifier: Arc<dyn Notifier>,
        options: OrchestratorOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            gateway,
            notifier,
            options,
            inner: Mutex::new(OrchestratorState {
                view: ViewState::with_page_size(options.page_size),
                fetch_seq: 0,
            }),
            events,
        })
    }

    pub async fn view(&self) -> ViewState {
        self.inner.lock().await.view.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Selects `raw_account` and loads the first page of its history.
    pub async fn select_account(&self, raw_account: &str) -> Result<FetchOutcome, ActionError> {
        let Some(account) = AccountId::parse(raw_account) else {
            return Err(self.fail_locally(ActionError::AccountRequired).await);
        };
        let ticket = {
            let mut guard = self.inner.lock().await;
            guard.view.selected_account = Some(account.clone());
            guard.view.pagination.page = 0;
            guard.issue_fetch(account)
        };
        self.emit(LedgerEvent::PhaseChanged(ViewPhase::Loading));
        self.run_fetch(ticket).await
    }

    /// Moves to page `page` of the selected account.
    pub async fn change_page(&self, page: u32) -> Result<FetchOutcome, ActionError> {
        let ticket = {
            let mut guard = self.inner.lock().await;
            match (guard.view.selected_account.clone(), guard.view.phase) {
                (None, _) => Err(ActionError::NoAccountSelected),
                (Some(account), ViewPhase::Loaded | ViewPhase::Error) => {
                    guard.view.pagination.page = page;
                    Ok(guard.issue_fetch(account))
                }
                (Some(_), phase) => Err(ActionError::FetchNotReady(phase)),
            }
        };
        match ticket {
            Ok(ticket) => {
                self.emit(LedgerEvent::PhaseChanged(ViewPhase::Loading));
                self.run_fetch(ticket).await
            }
            Err(err) => Err(self.fail_locally(err).await),
        }
    }

    /// Re-reads the current account and page without touching the selection.
    pub async fn refresh(&self) -> Result<FetchOutcome, ActionError> {
        let ticket = {
            let mut guard = self.inner.lock().await;
            guard
                .view
                .selected_account
                .clone()
                .map(|account| guard.issue_fetch(account))
        };
        match ticket {
            Some(ticket) => {
                self.emit(LedgerEvent::PhaseChanged(ViewPhase::Loading));
                self.run_fetch(ticket).await
            }
            None => Err(self.fail_locally(ActionError::NoAccountSelected).await),
        }
    }

    /// Validates `form`, dispatches the resulting mutation and, on success,
    /// re-fetches the current page so the view reflects the server's state.
    pub async fn submit_operation(&self, form: OperationForm) -> Result<SubmitReport, ActionError> {
        let prepared = {
            let mut guard = self.inner.lock().await;
            if guard.view.submitting {
                Err(ActionError::SubmissionInFlight)
            } else {
                guard.view.form = form.clone();
                match validate_operation(guard.view.selected_account.as_ref(), &form) {
                    Ok(request) => {
                        guard.view.submitting = true;
                        Ok(request)
                    }
                    Err(violations) => Err(ActionError::Validation(violations)),
                }
            }
        };
        let request = match prepared {
            Ok(prepared) => prepared,
            Err(err) => return Err(self.fail_locally(err).await),
        };
        let kind = request.kind();
        self.emit(LedgerEvent::SubmittingChanged(true));

        if self.options.confirm_mutations && !self.notifier.confirm(&format!("{}?", request.summary()))
        {
            self.inner.lock().await.view.submitting = false;
            self.emit(LedgerEvent::SubmittingChanged(false));
            info!(%kind, "operation cancelled by operator");
            self.notifier
                .notify(&format!("{} operation cancelled.", kind.label()));
            return Err(ActionError::Cancelled(kind));
        }

        info!(%kind, account = %request.source(), amount = %request.amount(), "dispatching operation");
        let result = self.dispatch(&request).await;

        match result {
            Ok(()) => {
                let ticket = {
                    let mut guard = self.inner.lock().await;
                    guard.view.submitting = false;
                    guard.view.form = OperationForm::default();
                    guard.view.last_error = None;
                    let account = guard
                        .view
                        .selected_account
                        .clone()
                        .unwrap_or_else(|| request.source().clone());
                    guard.issue_fetch(account)
                };
                info!(%kind, "operation accepted by ledger");
                self.emit(LedgerEvent::SubmittingChanged(false));
                self.emit(LedgerEvent::OperationCompleted(kind));
                self.emit(LedgerEvent::PhaseChanged(ViewPhase::Loading));
                self.notifier
                    .notify(&format!("{} operation successful!", kind.label()));

                let reconciliation = self.run_fetch(ticket).await;
                Ok(SubmitReport {
                    kind,
                    reconciliation,
                })
            }
            Err(err) => {
                let err = ActionError::from_mutation(kind, err);
                {
                    let mut guard = self.inner.lock().await;
                    guard.view.submitting = false;
                    guard.view.phase = ViewPhase::Error;
                    guard.view.last_error = Some(err.clone());
                }
                warn!(%kind, error = %err, "operation failed");
                self.emit(LedgerEvent::SubmittingChanged(false));
                self.emit(LedgerEvent::PhaseChanged(ViewPhase::Error));
                self.emit(LedgerEvent::Error(err.to_string()));
                self.notifier.notify(&mutation_failure_notice(kind, &err));
                Err(err)
            }
        }
    }

    async fn dispatch(&self, request: &OperationRequest) -> Result<(), GatewayError> {
        match request {
            OperationRequest::Debit {
                account,
                amount,
                description,
            } => self.gateway.debit(account, *amount, description).await,
            OperationRequest::Credit {
                account,
                amount,
                description,
            } => self.gateway.credit(account, *amount, description).await,
            OperationRequest::Transfer {
                source,
                destination,
                amount,
                description,
            } => {
                self.gateway
                    .transfer(source, destination, *amount, description)
                    .await
            }
        }
    }

    async fn run_fetch(&self, ticket: FetchTicket) -> Result<FetchOutcome, ActionError> {
        let FetchTicket {
            seq,
            account,
            pagination,
        } = ticket;
        let result = self
            .gateway
            .fetch_page(&account, pagination.page, pagination.size)
            .await;

        let mut guard = self.inner.lock().await;
        if guard.fetch_seq != seq {
            debug!(
                seq,
                latest = guard.fetch_seq,
                %account,
                "discarding superseded ledger page response"
            );
            return Ok(FetchOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                guard.view.phase = ViewPhase::Loaded;
                guard.view.last_page = Some(page.clone());
                guard.view.last_error = None;
                drop(guard);
                info!(
                    seq,
                    %account,
                    page = page.current_page,
                    total_pages = page.total_pages,
                    balance = %page.balance,
                    "ledger page applied"
                );
                self.emit(LedgerEvent::PhaseChanged(ViewPhase::Loaded));
                self.emit(LedgerEvent::PageLoaded(page.clone()));
                Ok(FetchOutcome::Applied(page))
            }
            Err(err) => {
                let err = ActionError::from_fetch(err);
                guard.view.phase = ViewPhase::Error;
                guard.view.last_error = Some(err.clone());
                drop(guard);
                warn!(seq, %account, page = pagination.page, error = %err, "ledger page fetch failed");
                self.emit(LedgerEvent::PhaseChanged(ViewPhase::Error));
                self.emit(LedgerEvent::Error(err.to_string()));
                self.notifier.notify(FETCH_FAILED_NOTICE);
                Err(err)
            }
        }
    }

    /// Records an error that never reached the gateway and tells the operator.
    async fn fail_locally(&self, err: ActionError) -> ActionError {
        self.inner.lock().await.view.last_error = Some(err.clone());
        warn!(error = %err, "action refused");
        self.emit(LedgerEvent::Error(err.to_string()));
        self.notifier.notify(&err.to_string());
        err
    }

    fn emit(&self, event: LedgerEvent) {
        let _ = self.events.send(event);
    }
}

fn mutation_failure_notice(kind: OperationKind, err: &ActionError) -> String {
    match err {
        ActionError::Rejected {
            message: Some(message),
            ..
        } => format!("Error: {message}"),
        _ => format!("{} operation failed!", kind.label()),
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
