use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::account::{same_username, CustomAccount};
use crate::models::session::{Role, Session};
use crate::models::settings::Settings;
use crate::storage::encryption;

/// Client-side login flags. This is a gate for the dashboard UI, not a
/// security boundary.
pub struct AuthService;

impl AuthService {
    pub fn new() -> Self {
        Self
    }

    /// Check the configured admin first, then the `customAccounts` list.
    /// Returns the role that was granted.
    pub fn login(
        &self,
        session: &mut Session,
        settings: &Settings,
        custom_accounts: &[CustomAccount],
        username: &str,
        password: &str,
    ) -> Result<Role, CoreError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(CoreError::InvalidCredentials);
        }

        let is_configured_admin = username == settings.admin_username
            && !settings.admin_password_hash.is_empty()
            && verify_password(password, &settings.admin_password_hash);

        let role = if is_configured_admin {
            Role::Admin
        } else {
            match custom_accounts
                .iter()
                .find(|c| same_username(&c.username, username) && c.password == password)
            {
                Some(account) => account.role,
                None => {
                    warn!(username, "login rejected");
                    return Err(CoreError::InvalidCredentials);
                }
            }
        };

        *session = Session {
            is_admin_authenticated: role == Role::Admin,
            user_role: Some(role),
            username: Some(username.to_string()),
        };
        info!(username, %role, "logged in");
        Ok(role)
    }

    pub fn logout(&self, session: &mut Session) {
        *session = Session::default();
    }

    pub fn require_admin(&self, session: &Session) -> Result<(), CoreError> {
        if session.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Unauthorized)
        }
    }
}

impl Default for AuthService {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a password into an Argon2 PHC string (for `Settings::admin_password_hash`).
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt_bytes = encryption::random_bytes::<16>()?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| CoreError::Encryption(format!("Bad salt: {e}")))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::Encryption(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// `false` on mismatch or an unparseable hash.
#[must_use]
pub fn verify_password(password: &str, phc: &str) -> bool {
    PasswordHash::new(phc)
        .and_then(|hash| Argon2::default().verify_password(password.as_bytes(), &hash))
        .is_ok()
}
