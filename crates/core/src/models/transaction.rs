use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Display format used on receipts, history tables and exports.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdraw,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "Deposit"),
            TransactionType::Withdraw => write!(f, "Withdraw"),
        }
    }
}

/// A single deposit or withdrawal attached to a student account.
///
/// Stored in append order; the owning account keeps at most
/// [`crate::services::transaction_service::MAX_TRANSACTIONS`] of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Always positive; the direction comes from `kind`.
    pub amount: f64,

    pub date: NaiveDateTime,

    #[serde(default)]
    pub reason: Option<String>,
}

impl Transaction {
    pub fn new(kind: TransactionType, amount: f64, date: NaiveDateTime) -> Self {
        Self {
            kind,
            amount,
            date,
            reason: None,
        }
    }

    pub fn with_reason(
        kind: TransactionType,
        amount: f64,
        date: NaiveDateTime,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            date,
            reason: Some(reason.into()),
        }
    }

    /// Amount with sign applied: deposits positive, withdrawals negative.
    #[must_use]
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Deposit => self.amount,
            TransactionType::Withdraw => -self.amount,
        }
    }

    #[must_use]
    pub fn display_date(&self) -> String {
        self.date.format(DISPLAY_DATE_FORMAT).to_string()
    }
}
