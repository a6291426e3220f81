use serde::{Deserialize, Serialize};

use super::account::{CustomAccount, StudentAccount};
use super::session::Session;
use super::support::SupportTicket;

/// Everything the dashboard keeps in its key/value store.
///
/// Loaded key by key at startup and written back key by key after every
/// mutation. The whole struct is also what an encrypted backup contains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankState {
    pub students: Vec<StudentAccount>,
    pub custom_accounts: Vec<CustomAccount>,
    pub session: Session,
    #[serde(default)]
    pub tickets: Vec<SupportTicket>,
}

impl BankState {
    #[must_use]
    pub fn find_student(&self, username: &str) -> Option<&StudentAccount> {
        self.students.iter().find(|s| s.has_username(username))
    }
}
