use chrono::NaiveDateTime;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::account::StudentAccount;
use crate::models::transaction::{Transaction, TransactionType};

/// Per-account history limit; older entries are dropped on append so the
/// `students` value stays well inside the storage quota.
pub const MAX_TRANSACTIONS: usize = 100;

/// Deposits and withdrawals. Pure business logic, no I/O.
pub struct TransactionService;

impl TransactionService {
    pub fn new() -> Self {
        Self
    }

    pub fn deposit(
        &self,
        account: &mut StudentAccount,
        amount: f64,
        reason: Option<String>,
        at: NaiveDateTime,
    ) -> Result<Transaction, CoreError> {
        self.apply(account, TransactionType::Deposit, amount, reason, at)
    }

    /// Rejected without side effects when `amount` exceeds the balance.
    pub fn withdraw(
        &self,
        account: &mut StudentAccount,
        amount: f64,
        reason: Option<String>,
        at: NaiveDateTime,
    ) -> Result<Transaction, CoreError> {
        self.apply(account, TransactionType::Withdraw, amount, reason, at)
    }

    /// Validate, move the balance, append and cap the history. Rejected when
    /// the resulting balance would not be finite.
    pub fn apply(
        &self,
        account: &mut StudentAccount,
        kind: TransactionType,
        amount: f64,
        reason: Option<String>,
        at: NaiveDateTime,
    ) -> Result<Transaction, CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::InvalidAmount);
        }
        if kind == TransactionType::Withdraw && amount > account.balance {
            return Err(CoreError::InsufficientBalance {
                requested: amount,
                available: account.balance,
            });
        }

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let tx = Transaction {
            kind,
            amount,
            date: at,
            reason,
        };

        // JSON has no infinity; a non-finite balance would not survive a reload.
        let balance = account.balance + tx.signed_amount();
        if !balance.is_finite() {
            return Err(CoreError::InvalidAmount);
        }

        account.balance = balance;
        account.transactions.push(tx.clone());
        let dropped = Self::cap_history(&mut account.transactions);
        debug!(
            username = %account.username,
            %kind,
            amount,
            balance = account.balance,
            dropped,
            "transaction applied"
        );
        Ok(tx)
    }

    /// Keep only the newest [`MAX_TRANSACTIONS`]. Returns how many were dropped.
    pub fn cap_history(transactions: &mut Vec<Transaction>) -> usize {
        let excess = transactions.len().saturating_sub(MAX_TRANSACTIONS);
        if excess > 0 {
            transactions.drain(..excess);
        }
        excess
    }

    /// Newest first.
    #[must_use]
    pub fn history<'a>(&self, account: &'a StudentAccount) -> Vec<&'a Transaction> {
        account.transactions.iter().rev().collect()
    }

    /// Newest first, filtered by direction.
    #[must_use]
    pub fn history_by_type<'a>(
        &self,
        account: &'a StudentAccount,
        kind: TransactionType,
    ) -> Vec<&'a Transaction> {
        account
            .transactions
            .iter()
            .rev()
            .filter(|t| t.kind == kind)
            .collect()
    }
}

impl Default for TransactionService {
    fn default() -> Self {
        Self::new()
    }
}
