use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDateTime;
use tracing::info;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::account::{AccountForm, AccountUpdate, CustomAccount, StudentAccount};
use crate::models::bank::BankState;
use crate::models::session::Role;
use crate::models::transaction::TransactionType;

use super::transaction_service::TransactionService;

/// Largest profile picture accepted by the image reader.
pub const MAX_PROFILE_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Reason recorded on the deposit that seeds a new account.
pub const OPENING_BALANCE_REASON: &str = "Opening balance";

/// Student account CRUD over the in-memory [`BankState`].
///
/// Keeps `students` and the mirrored `customAccounts` login list in step.
/// No I/O here; the facade persists after a successful call.
pub struct AccountService {
    transaction_service: TransactionService,
}

impl AccountService {
    pub fn new() -> Self {
        Self {
            transaction_service: TransactionService::new(),
        }
    }

    /// Validate the form, append the account and its login mirror entry.
    pub fn create_account(
        &self,
        state: &mut BankState,
        form: AccountForm,
        now: NaiveDateTime,
    ) -> Result<Uuid, CoreError> {
        let name = required(&form.name, "Name")?;
        let username = required(&form.username, "Username")?;
        let password = required(&form.password, "Password")?;
        let email = optional(form.email.as_deref());
        if let Some(email) = &email {
            validate_email(email)?;
        }
        if !form.opening_balance.is_finite() || form.opening_balance < 0.0 {
            return Err(CoreError::InvalidAmount);
        }
        if self.username_taken(state, &username, None) {
            return Err(CoreError::DuplicateUsername(username));
        }

        let mut account = StudentAccount::new(name, username, password, now);
        account.mobile = optional(form.mobile.as_deref());
        account.email = email;
        account.profile_image = optional(form.profile_image.as_deref());

        if form.opening_balance > 0.0 {
            self.transaction_service.apply(
                &mut account,
                TransactionType::Deposit,
                form.opening_balance,
                Some(OPENING_BALANCE_REASON.to_string()),
                now,
            )?;
        }

        let id = account.id;
        info!(username = %account.username, balance = account.balance, "account created");
        state.custom_accounts.push(CustomAccount::for_student(&account));
        state.students.push(account);
        Ok(id)
    }

    /// Apply an edit in place. A username change must stay unique.
    pub fn update_account(
        &self,
        state: &mut BankState,
        id: Uuid,
        update: AccountUpdate,
    ) -> Result<(), CoreError> {
        let idx = self.index_of(state, id)?;

        let new_username = match update.username.as_deref() {
            Some(u) => Some(required(u, "Username")?),
            None => None,
        };
        if let Some(u) = &new_username {
            if self.username_taken(state, u, Some(id)) {
                return Err(CoreError::DuplicateUsername(u.clone()));
            }
        }
        let new_name = match update.name.as_deref() {
            Some(n) => Some(required(n, "Name")?),
            None => None,
        };
        let new_password = match update.password.as_deref() {
            Some(p) => Some(required(p, "Password")?),
            None => None,
        };
        if let Some(email) = update.email.as_deref().and_then(|e| optional(Some(e))) {
            validate_email(&email)?;
        }

        let account = &mut state.students[idx];
        let old_username = account.username.clone();
        if let Some(name) = new_name {
            account.name = name;
        }
        if let Some(username) = new_username {
            account.username = username;
        }
        if let Some(password) = new_password {
            account.password = password;
        }
        if let Some(mobile) = update.mobile.as_deref() {
            account.mobile = optional(Some(mobile));
        }
        if let Some(email) = update.email.as_deref() {
            account.email = optional(Some(email));
        }
        if let Some(image) = update.profile_image.as_deref() {
            account.profile_image = optional(Some(image));
        }

        let mirror = CustomAccount::for_student(account);
        match state
            .custom_accounts
            .iter_mut()
            .find(|c| c.username == old_username && c.role == Role::Student)
        {
            Some(entry) => *entry = mirror,
            None => state.custom_accounts.push(mirror),
        }
        Ok(())
    }

    /// Remove the account and its login mirror entry.
    pub fn delete_account(
        &self,
        state: &mut BankState,
        id: Uuid,
    ) -> Result<StudentAccount, CoreError> {
        let idx = self.index_of(state, id)?;
        let removed = state.students.remove(idx);
        state
            .custom_accounts
            .retain(|c| !(c.username == removed.username && c.role == Role::Student));
        info!(username = %removed.username, "account deleted");
        Ok(removed)
    }

    #[must_use]
    pub fn find<'a>(&self, state: &'a BankState, id: Uuid) -> Option<&'a StudentAccount> {
        state.students.iter().find(|s| s.id == id)
    }

    /// Case-insensitive match on name, username and email.
    #[must_use]
    pub fn search<'a>(&self, state: &'a BankState, query: &str) -> Vec<&'a StudentAccount> {
        let q = query.trim().to_lowercase();
        state
            .students
            .iter()
            .filter(|s| {
                q.is_empty()
                    || s.name.to_lowercase().contains(&q)
                    || s.username.to_lowercase().contains(&q)
                    || s.email.as_deref().unwrap_or("").to_lowercase().contains(&q)
            })
            .collect()
    }

    pub(crate) fn index_of(&self, state: &BankState, id: Uuid) -> Result<usize, CoreError> {
        state
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CoreError::AccountNotFound(id.to_string()))
    }

    fn username_taken(&self, state: &BankState, username: &str, except: Option<Uuid>) -> bool {
        state
            .students
            .iter()
            .any(|s| s.has_username(username) && Some(s.id) != except)
    }
}

impl Default for AccountService {
    fn default() -> Self {
        Self::new()
    }
}

/// Read an uploaded picture into a `data:` URL for the account record.
pub fn encode_profile_image(bytes: &[u8], mime: &str) -> Result<String, CoreError> {
    let mime = mime.trim().to_lowercase();
    if !mime.starts_with("image/") || mime.len() <= "image/".len() {
        return Err(CoreError::Validation(format!(
            "Unsupported file type '{mime}': please choose an image"
        )));
    }
    if bytes.is_empty() {
        return Err(CoreError::Validation("Image file is empty".into()));
    }
    if bytes.len() > MAX_PROFILE_IMAGE_BYTES {
        return Err(CoreError::Validation(format!(
            "Image is too large ({} KiB, max {} KiB)",
            bytes.len() / 1024,
            MAX_PROFILE_IMAGE_BYTES / 1024
        )));
    }
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

fn required(value: &str, field: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn validate_email(email: &str) -> Result<(), CoreError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(CoreError::Validation(format!("Invalid email address '{email}'"))),
    }
}
