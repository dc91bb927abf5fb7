use shared::{domain::AccountId, protocol::LedgerPage};

use crate::{error::ActionError, validation::OperationForm};

pub const DEFAULT_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPhase {
    /// No account selected yet.
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Pagination {
    pub fn new(size: u32) -> Self {
        Self {
            page: 0,
            size: size.max(1),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Everything the presentation layer needs to render the account screen.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub phase: ViewPhase,
    pub selected_account: Option<AccountId>,
    pub pagination: Pagination,
    pub last_page: Option<LedgerPage>,
    pub last_error: Option<ActionError>,
    /// Mutation form as last submitted; reset to defaults after a successful operation.
    pub form: OperationForm,
    pub submitting: bool,
}

impl ViewState {
    pub(crate) fn with_page_size(size: u32) -> Self {
        Self {
            pagination: Pagination::new(size),
            ..Self::default()
        }
    }
}
