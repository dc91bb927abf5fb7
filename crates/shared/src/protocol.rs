use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{AccountId, OperationType},
    error::PageInvariantError,
};

/// One window into an account's operation history, as served by
/// `GET /accounts/{id}/pageOperations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerPage {
    pub account_id: AccountId,
    pub balance: Decimal,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    #[serde(default, alias = "accountOperationDTOs")]
    pub operations: Vec<OperationRecord>,
}

impl LedgerPage {
    pub fn check_invariants(&self) -> Result<(), PageInvariantError> {
        if self.page_size == 0 {
            return Err(PageInvariantError::ZeroPageSize);
        }
        if self.total_pages != 0 && self.current_page >= self.total_pages {
            return Err(PageInvariantError::PageOutOfRange {
                current: self.current_page,
                total: self.total_pages,
            });
        }
        if self.operations.len() > self.page_size as usize {
            return Err(PageInvariantError::TooManyOperations {
                len: self.operations.len(),
                size: self.page_size,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type", alias = "operationType")]
    pub operation_type: OperationType,
    pub amount: Decimal,
    #[serde(alias = "operationDate")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

/// Body of `POST /accounts/debit` and `POST /accounts/credit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMutationRequest {
    pub account_id: AccountId,
    pub amount: Decimal,
    pub description: String,
}

/// Body of `POST /accounts/transfer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: Decimal,
    pub description: String,
}
