use serde::{Deserialize, Serialize};

/// Role stored under the `userRole` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Student => write!(f, "student"),
        }
    }
}

/// Client-side login flags (`isAdminAuthenticated`, `userRole`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub is_admin_authenticated: bool,
    pub user_role: Option<Role>,
    /// Username of a logged-in student, if any.
    #[serde(default)]
    pub username: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin_authenticated && self.user_role == Some(Role::Admin)
    }
}
