use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::Role;
use super::transaction::Transaction;

/// A student's bank account, persisted under the `students` key.
///
/// The password is kept in plaintext because the dashboard's login list
/// (`customAccounts`) compares it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAccount {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub password: String,

    #[serde(default)]
    pub mobile: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// `data:image/...;base64,...` URL produced by the profile image reader.
    #[serde(default)]
    pub profile_image: Option<String>,

    pub balance: f64,

    /// Oldest first.
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    pub created_at: NaiveDateTime,
}

impl StudentAccount {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            username: username.into(),
            password: password.into(),
            mobile: None,
            email: None,
            profile_image: None,
            balance: 0.0,
            transactions: Vec::new(),
            created_at,
        }
    }

    /// Usernames are unique and matched ignoring ASCII case.
    #[must_use]
    pub fn has_username(&self, username: &str) -> bool {
        same_username(&self.username, username)
    }

    /// Most recent transactions first, limited to `n`.
    #[must_use]
    pub fn recent_transactions(&self, n: usize) -> Vec<&Transaction> {
        self.transactions.iter().rev().take(n).collect()
    }
}

/// The one username comparison used for uniqueness, lookup and login.
#[must_use]
pub fn same_username(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Input of the "create account" form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountForm {
    pub name: String,
    pub username: String,
    pub password: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub profile_image: Option<String>,
    /// Recorded as an "Opening balance" deposit when positive.
    pub opening_balance: f64,
}

/// Partial edit of an account. `None` leaves a field untouched; for the
/// optional contact fields, `Some("")` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub profile_image: Option<String>,
}

/// Login entry mirrored under the `customAccounts` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAccount {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl CustomAccount {
    pub fn for_student(account: &StudentAccount) -> Self {
        Self {
            name: account.name.clone(),
            username: account.username.clone(),
            password: account.password.clone(),
            role: Role::Student,
        }
    }
}
