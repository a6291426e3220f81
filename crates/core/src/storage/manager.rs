use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::account::{CustomAccount, StudentAccount};
use crate::models::bank::BankState;
use crate::models::session::{Role, Session};
use crate::models::support::SupportTicket;

use super::encryption::{self, KdfParams, SALT_LEN};
use super::format::{self, BackupHeader};
use super::store::KeyValueStore;

pub const STUDENTS_KEY: &str = "students";
pub const CUSTOM_ACCOUNTS_KEY: &str = "customAccounts";
pub const ADMIN_FLAG_KEY: &str = "isAdminAuthenticated";
pub const USER_ROLE_KEY: &str = "userRole";
pub const CURRENT_USER_KEY: &str = "currentUser";
pub const TICKETS_KEY: &str = "supportTickets";

/// Typed access to the dashboard's keys, plus encrypted backups of the
/// whole state.
pub struct StorageManager;

impl StorageManager {
    /// Read every key into a [`BankState`]. Missing keys load as empty.
    pub fn load_state(store: &dyn KeyValueStore) -> Result<BankState, CoreError> {
        let state = BankState {
            students: Self::load_json(store, STUDENTS_KEY)?,
            custom_accounts: Self::load_json(store, CUSTOM_ACCOUNTS_KEY)?,
            session: Self::load_session(store)?,
            tickets: Self::load_json(store, TICKETS_KEY)?,
        };
        debug!(
            students = state.students.len(),
            custom_accounts = state.custom_accounts.len(),
            "loaded bank state"
        );
        Ok(state)
    }

    /// Write every key.
    pub fn save_state(store: &mut dyn KeyValueStore, state: &BankState) -> Result<(), CoreError> {
        Self::save_students(store, &state.students)?;
        Self::save_custom_accounts(store, &state.custom_accounts)?;
        Self::save_session(store, &state.session)?;
        Self::save_tickets(store, &state.tickets)
    }

    pub fn save_students(
        store: &mut dyn KeyValueStore,
        students: &[StudentAccount],
    ) -> Result<(), CoreError> {
        Self::save_json(store, STUDENTS_KEY, students)
    }

    pub fn save_custom_accounts(
        store: &mut dyn KeyValueStore,
        accounts: &[CustomAccount],
    ) -> Result<(), CoreError> {
        Self::save_json(store, CUSTOM_ACCOUNTS_KEY, accounts)
    }

    pub fn save_tickets(
        store: &mut dyn KeyValueStore,
        tickets: &[SupportTicket],
    ) -> Result<(), CoreError> {
        Self::save_json(store, TICKETS_KEY, tickets)
    }

    /// The flag and role are plain strings (`"true"`, `"admin"`), not JSON.
    /// A logged-out session removes the keys instead of writing `false`.
    pub fn save_session(store: &mut dyn KeyValueStore, session: &Session) -> Result<(), CoreError> {
        if session.is_admin_authenticated {
            store.set(ADMIN_FLAG_KEY, "true")?;
        } else {
            store.remove(ADMIN_FLAG_KEY)?;
        }
        match session.user_role {
            Some(role) => store.set(USER_ROLE_KEY, &role.to_string())?,
            None => {
                store.remove(USER_ROLE_KEY)?;
            }
        }
        match &session.username {
            Some(username) => store.set(CURRENT_USER_KEY, username)?,
            None => {
                store.remove(CURRENT_USER_KEY)?;
            }
        }
        Ok(())
    }

    pub fn load_session(store: &dyn KeyValueStore) -> Result<Session, CoreError> {
        let is_admin_authenticated = store.get(ADMIN_FLAG_KEY)?.as_deref() == Some("true");
        let user_role = match store.get(USER_ROLE_KEY)?.as_deref() {
            Some("admin") => Some(Role::Admin),
            Some("student") => Some(Role::Student),
            Some(other) => {
                warn!(role = other, "ignoring unknown userRole");
                None
            }
            None => None,
        };
        Ok(Session {
            is_admin_authenticated,
            user_role,
            username: store.get(CURRENT_USER_KEY)?,
        })
    }

    /// Deserialize a JSON value; an absent key yields `T::default()`.
    pub fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<T, CoreError>
    where
        T: DeserializeOwned + Default,
    {
        match store.get(key)? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw).map_err(|e| {
                CoreError::Deserialization(format!("Stored value '{key}' is corrupt: {e}"))
            }),
            _ => Ok(T::default()),
        }
    }

    pub fn save_json<T>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<(), CoreError>
    where
        T: Serialize + ?Sized,
    {
        let raw = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize '{key}': {e}")))?;
        store.set(key, &raw)
    }

    // ── Encrypted backups ───────────────────────────────────────────

    /// BankState → bincode → AES-256-GCM(Argon2id(password)) → JDSB bytes.
    pub fn backup_to_bytes(state: &BankState, password: &str) -> Result<Vec<u8>, CoreError> {
        Self::backup_to_bytes_with_params(state, password, KdfParams::default())
    }

    pub fn backup_to_bytes_with_params(
        state: &BankState,
        password: &str,
        kdf_params: KdfParams,
    ) -> Result<Vec<u8>, CoreError> {
        kdf_params.check_bounds()?;
        let plaintext = bincode::serialize(state)?;
        let salt = encryption::random_bytes::<SALT_LEN>()?;
        let key = encryption::derive_key(password, &salt, &kdf_params)?;
        let (nonce, ciphertext) = encryption::seal(&plaintext, &key)?;

        let header = BackupHeader {
            version: format::CURRENT_VERSION,
            kdf_params,
            salt,
            nonce,
        };
        Ok(format::encode(&header, &ciphertext))
    }

    /// Reverse of [`Self::backup_to_bytes`].
    pub fn restore_from_bytes(data: &[u8], password: &str) -> Result<BankState, CoreError> {
        let (header, ciphertext) = format::decode(data)?;
        let key = encryption::derive_key(password, &header.salt, &header.kdf_params)?;
        let plaintext = encryption::open(ciphertext, &key, &header.nonce)?;
        bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Backup payload is corrupt: {e}")))
    }
}
