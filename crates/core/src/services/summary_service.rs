use crate::models::account::StudentAccount;
use crate::models::summary::{BankTotals, LeaderboardEntry};
use crate::models::transaction::TransactionType;

/// Dashboard aggregates. Always a full rescan; nothing is cached.
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn totals(&self, students: &[StudentAccount]) -> BankTotals {
        let mut totals = BankTotals {
            account_count: students.len(),
            ..BankTotals::default()
        };
        for student in students {
            totals.total_balance += student.balance;
            totals.transaction_count += student.transactions.len();
            for tx in &student.transactions {
                match tx.kind {
                    TransactionType::Deposit => totals.total_deposited += tx.amount,
                    TransactionType::Withdraw => totals.total_withdrawn += tx.amount,
                }
            }
        }
        totals
    }

    /// Richest first; equal balances ordered by name. `limit = None` ranks everyone.
    #[must_use]
    pub fn leaderboard(
        &self,
        students: &[StudentAccount],
        limit: Option<usize>,
    ) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<&StudentAccount> = students.iter().collect();
        ranked.sort_by(|a, b| {
            b.balance
                .partial_cmp(&a.balance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });

        ranked
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .enumerate()
            .map(|(i, s)| LeaderboardEntry {
                rank: i + 1,
                name: s.name.clone(),
                username: s.username.clone(),
                balance: s.balance,
                transaction_count: s.transactions.len(),
            })
            .collect()
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}
