//! Pure validation of the mutation form before anything reaches the wire.

use std::str::FromStr;

use rust_decimal::Decimal;
use shared::domain::{AccountId, OperationKind};
use thiserror::Error;

/// Raw, unvalidated values as typed by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationForm {
    pub kind: OperationKind,
    pub amount: String,
    pub description: String,
    pub destination: String,
}

impl OperationForm {
    pub fn new(kind: OperationKind, amount: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            amount: amount.into(),
            description: description.into(),
            destination: String::new(),
        }
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Account,
    Amount,
    Description,
    Destination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Violation {
    #[error("an account must be selected")]
    AccountRequired,
    #[error("amount must be a number greater than zero")]
    AmountMustBePositive,
    #[error("description is required")]
    DescriptionRequired,
    #[error("a destination account is required for transfers")]
    DestinationRequiredForTransfer,
}

impl Violation {
    pub fn field(self) -> FormField {
        match self {
            Self::AccountRequired => FormField::Account,
            Self::AmountMustBePositive => FormField::Amount,
            Self::DescriptionRequired => FormField::Description,
            Self::DestinationRequiredForTransfer => FormField::Destination,
        }
    }
}

/// A mutation that passed validation. Built fresh per submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    Debit {
        account: AccountId,
        amount: Decimal,
        description: String,
    },
    Credit {
        account: AccountId,
        amount: Decimal,
        description: String,
    },
    Transfer {
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        description: String,
    },
}

impl OperationRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Debit { .. } => OperationKind::Debit,
            Self::Credit { .. } => OperationKind::Credit,
            Self::Transfer { .. } => OperationKind::Transfer,
        }
    }

    /// Account whose balance the operation is charged against.
    pub fn source(&self) -> &AccountId {
        match self {
            Self::Debit { account, .. } | Self::Credit { account, .. } => account,
            Self::Transfer { source, .. } => source,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Self::Debit { amount, .. } | Self::Credit { amount, .. } | Self::Transfer { amount, .. } => {
                *amount
            }
        }
    }

    /// Short operator-facing description used in confirmation prompts.
    pub fn summary(&self) -> String {
        match self {
            Self::Debit {
                account,
                amount,
                description,
            } => format!("Debit {amount} from {account} ({description})"),
            Self::Credit {
                account,
                amount,
                description,
            } => format!("Credit {amount} to {account} ({description})"),
            Self::Transfer {
                source,
                destination,
                amount,
                description,
            } => format!("Transfer {amount} from {source} to {destination} ({description})"),
        }
    }
}

/// Checks `form` against the selected `source` account. Every violation is
/// reported, not only the first one.
pub fn validate_operation(
    source: Option<&AccountId>,
    form: &OperationForm,
) -> Result<OperationRequest, Vec<Violation>> {
    let mut violations = Vec::new();

    let source = source.and_then(|id| AccountId::parse(id.as_str()));
    if source.is_none() {
        violations.push(Violation::AccountRequired);
    }

    let amount = parse_positive_amount(&form.amount);
    if amount.is_none() {
        violations.push(Violation::AmountMustBePositive);
    }

    let description = form.description.trim();
    if description.is_empty() {
        violations.push(Violation::DescriptionRequired);
    }

    let destination = match form.kind {
        OperationKind::Transfer => {
            let destination = AccountId::parse(&form.destination);
            if destination.is_none() {
                violations.push(Violation::DestinationRequiredForTransfer);
            }
            destination
        }
        OperationKind::Debit | OperationKind::Credit => None,
    };

    let (Some(source), Some(amount), true) = (source, amount, violations.is_empty()) else {
        return Err(violations);
    };
    let description = description.to_string();

    Ok(match form.kind {
        OperationKind::Debit => OperationRequest::Debit {
            account: source,
            amount,
            description,
        },
        OperationKind::Credit => OperationRequest::Credit {
            account: source,
            amount,
            description,
        },
        OperationKind::Transfer => {
            let Some(destination) = destination else {
                return Err(vec![Violation::DestinationRequiredForTransfer]);
            };
            OperationRequest::Transfer {
                source,
                destination,
                amount,
                description,
            }
        }
    })
}

fn parse_positive_amount(raw: &str) -> Option<Decimal> {
    let amount = Decimal::from_str(raw.trim()).ok()?;
    (amount > Decimal::ZERO).then_some(amount)
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
