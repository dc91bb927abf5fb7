use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the ledger service on non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            error: None,
            message: Some(message.into()),
        }
    }

    /// Human readable reason, preferring `message` over the generic `error` title.
    pub fn reason(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .or_else(|| self.error.as_deref().map(str::trim).filter(|e| !e.is_empty()))
    }

    /// Only the business `message`; the `error` title is the HTTP reason phrase.
    pub fn business_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageInvariantError {
    #[error("page size must be positive")]
    ZeroPageSize,
    #[error("current page {current} is out of range for {total} pages")]
    PageOutOfRange { current: u32, total: u32 },
    #[error("page holds {len} operations but page size is {size}")]
    TooManyOperations { len: usize, size: u32 },
}
