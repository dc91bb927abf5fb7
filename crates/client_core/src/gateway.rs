use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    domain::AccountId,
    error::ApiError,
    protocol::{AccountMutationRequest, LedgerPage, TransferRequest},
};
use tracing::debug;
use url::Url;

use crate::error::GatewayError;

/// One network exchange per ledger operation. Implementations never retry.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn fetch_page(
        &self,
        account: &AccountId,
        page: u32,
        size: u32,
    ) -> Result<LedgerPage, GatewayError>;
    async fn debit(
        &self,
        account: &AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<(), GatewayError>;
    async fn credit(
        &self,
        account: &AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<(), GatewayError>;
    async fn transfer(
        &self,
        source: &AccountId,
        destination: &AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<(), GatewayError>;
}

pub struct HttpLedgerGateway {
    http: Client,
    base_url: Url,
}

impl HttpLedgerGateway {
    pub fn new(backend_host: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(backend_host)
            .with_context(|| format!("invalid ledger backend host '{backend_host}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("ledger backend host '{backend_host}' cannot carry a path"));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build ledger http client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_mutation<B>(&self, operation: &str, body: &B) -> Result<(), GatewayError>
    where
        B: Serialize + Sync,
    {
        let url = self.endpoint(&["accounts", operation]);
        debug!(%url, operation, "posting ledger mutation");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = read_error_body(response).await;
        Err(classify_mutation_failure(status, &body))
    }
}

#[async_trait]
impl LedgerGateway for HttpLedgerGateway {
    async fn fetch_page(
        &self,
        account: &AccountId,
        page: u32,
        size: u32,
    ) -> Result<LedgerPage, GatewayError> {
        let url = self.endpoint(&["accounts", account.as_str(), "pageOperations"]);
        debug!(%url, page, size, "fetching ledger page");
        let response = self
            .http
            .get(url)
            .query(&[("page", page), ("size", size)])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(classify_fetch_failure(account, status, &body));
        }

        let ledger_page: LedgerPage = response
            .json()
            .await
            .map_err(|e| GatewayError::Transient(format!("malformed ledger page: {e}")))?;
        ledger_page
            .check_invariants()
            .map_err(|e| GatewayError::Transient(format!("malformed ledger page: {e}")))?;
        if &ledger_page.account_id != account {
            return Err(GatewayError::Transient(format!(
                "ledger returned page for account {} instead of {account}",
                ledger_page.account_id
            )));
        }
        Ok(ledger_page)
    }

    async fn debit(
        &self,
        account: &AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<(), GatewayError> {
        self.post_mutation(
            "debit",
            &AccountMutationRequest {
                account_id: account.clone(),
                amount,
                description: description.to_string(),
            },
        )
        .await
    }

    async fn credit(
        &self,
        account: &AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<(), GatewayError> {
        self.post_mutation(
            "credit",
            &AccountMutationRequest {
                account_id: account.clone(),
                amount,
                description: description.to_string(),
            },
        )
        .await
    }

    async fn transfer(
        &self,
        source: &AccountId,
        destination: &AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<(), GatewayError> {
        self.post_mutation(
            "transfer",
            &TransferRequest {
                source_account_id: source.clone(),
                destination_account_id: destination.clone(),
                amount,
                description: description.to_string(),
            },
        )
        .await
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Transient("ledger request timed out".to_string())
    } else if err.is_connect() {
        GatewayError::Transient(format!("failed to connect to ledger: {err}"))
    } else {
        GatewayError::Transient(err.to_string())
    }
}

async fn read_error_body(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let Ok(text) = response.text().await else {
        return ApiError::default();
    };
    if let Ok(body) = serde_json::from_str::<ApiError>(&text) {
        return body;
    }
    let text = text.trim();
    if text.is_empty() || text.starts_with('<') {
        ApiError::default()
    } else {
        ApiError::new(status, text)
    }
}

fn is_not_found_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains("not found")
}

pub(crate) fn classify_fetch_failure(
    account: &AccountId,
    status: StatusCode,
    body: &ApiError,
) -> GatewayError {
    if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
        return GatewayError::NotFound(account.clone());
    }
    // The backend reports a missing account as a 500 carrying the exception message.
    if status.is_server_error() && body.business_message().is_some_and(is_not_found_message) {
        return GatewayError::NotFound(account.clone());
    }
    GatewayError::Transient(match body.reason() {
        Some(reason) => format!("ledger returned {status}: {reason}"),
        None => format!("ledger returned {status}"),
    })
}

pub(crate) fn classify_mutation_failure(status: StatusCode, body: &ApiError) -> GatewayError {
    let message = body.business_message().map(str::to_string);
    if status.is_client_error() {
        return GatewayError::Rejected { message };
    }
    // Business exceptions (insufficient balance, unknown account) surface as 500s with a message.
    if status.is_server_error() && message.is_some() {
        return GatewayError::Rejected { message };
    }
    GatewayError::Transient(format!("ledger returned {status}"))
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
