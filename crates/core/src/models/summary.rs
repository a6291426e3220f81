use serde::{Deserialize, Serialize};

/// Dashboard header figures, recomputed from scratch after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankTotals {
    pub account_count: usize,
    pub transaction_count: usize,
    pub total_balance: f64,
    pub total_deposited: f64,
    pub total_withdrawn: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based
    pub rank: usize,
    pub name: String,
    pub username: String,
    pub balance: f64,
    pub transaction_count: usize,
}
