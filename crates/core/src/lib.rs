pub mod clients;
pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use clients::chat::HttpChatClient;
use clients::status::HttpStatusSource;
use clients::traits::{ChatClient, StatusSource};
use errors::CoreError;
use models::{
    account::{AccountForm, AccountUpdate, CustomAccount, StudentAccount},
    bank::BankState,
    calendar::CalendarMonth,
    chat::ChatMessage,
    report::{ExportFormat, Report, ReportKind},
    session::{Role, Session},
    settings::Settings,
    status::SystemStatus,
    summary::{BankTotals, LeaderboardEntry},
    support::{SupportTicket, TicketForm},
    toast::Toast,
    transaction::{Transaction, TransactionType},
};
use services::{
    account_service::{self, AccountService},
    auth_service::AuthService,
    calculator::Calculator,
    calendar_service::CalendarService,
    chat_service::{ChatContext, ChatService},
    export_service::{ExportService, ExportedFile},
    notification_service::NotificationCenter,
    report_service::ReportService,
    status_service::{StatusService, StorageGauge},
    summary_service::SummaryService,
    support_service::SupportService,
    transaction_service::TransactionService,
};
use storage::encryption::KdfParams;
use storage::manager::StorageManager;
use storage::store::KeyValueStore;

/// Main entry point for the student bank dashboard core.
///
/// Holds the state loaded from a [`KeyValueStore`] plus every service that
/// operates on it. Each successful mutation is written back to the store
/// immediately and announced with a success toast; failures leave state and
/// store untouched and raise an error toast.
#[must_use]
pub struct StudentBank<S: KeyValueStore> {
    store: S,
    state: BankState,
    settings: Settings,
    account_service: AccountService,
    transaction_service: TransactionService,
    summary_service: SummaryService,
    report_service: ReportService,
    export_service: ExportService,
    calendar_service: CalendarService,
    support_service: SupportService,
    auth_service: AuthService,
    chat_service: ChatService,
    status_service: StatusService,
    notifications: NotificationCenter,
    calculator: Calculator,
    gauge: StorageGauge,
}

impl<S: KeyValueStore> std::fmt::Debug for StudentBank<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentBank")
            .field("students", &self.state.students.len())
            .field("custom_accounts", &self.state.custom_accounts.len())
            .field("tickets", &self.state.tickets.len())
            .field("session", &self.state.session)
            .field("storage_bytes", &self.gauge.get())
            .finish()
    }
}

impl<S: KeyValueStore> StudentBank<S> {
    /// Load state from `store`, talking to the HTTP endpoints in `settings`.
    pub fn open(store: S, settings: Settings) -> Result<Self, CoreError> {
        let chat: Box<dyn ChatClient> = Box::new(HttpChatClient::from_settings(&settings));
        let status: Arc<dyn StatusSource> =
            Arc::new(HttpStatusSource::new(settings.status_endpoint.clone()));
        Self::open_with_clients(store, settings, chat, status)
    }

    /// Like [`Self::open`] with caller-provided network clients.
    pub fn open_with_clients(
        store: S,
        settings: Settings,
        chat_client: Box<dyn ChatClient>,
        status_source: Arc<dyn StatusSource>,
    ) -> Result<Self, CoreError> {
        let state = StorageManager::load_state(&store)?;
        let gauge = StorageGauge::new();
        gauge.set(store.bytes_used()?);
        info!(students = state.students.len(), "student bank opened");

        Ok(Self {
            store,
            state,
            notifications: NotificationCenter::new(settings.toast_duration_ms),
            settings,
            account_service: AccountService::new(),
            transaction_service: TransactionService::new(),
            summary_service: SummaryService::new(),
            report_service: ReportService::new(),
            export_service: ExportService::new(),
            calendar_service: CalendarService::new(),
            support_service: SupportService::new(),
            auth_service: AuthService::new(),
            chat_service: ChatService::new(chat_client),
            status_service: StatusService::new(status_source),
            calculator: Calculator::new(),
            gauge,
        })
    }

    /// Re-read every key, e.g. after another tab wrote to the same store.
    pub fn reload(&mut self) -> Result<(), CoreError> {
        self.state = StorageManager::load_state(&self.store)?;
        self.gauge.set(self.store.bytes_used()?);
        Ok(())
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn state(&self) -> &BankState {
        &self.state
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Log in as the configured admin or as any `customAccounts` entry.
    pub fn login(&mut self, username: &str, password: &str) -> Result<Role, CoreError> {
        self.mutate(
            |bank, state| {
                bank.auth_service.login(
                    &mut state.session,
                    &bank.settings,
                    &state.custom_accounts,
                    username,
                    password,
                )
            },
            |role| format!("Welcome! Logged in as {role}"),
        )
    }

    pub fn logout(&mut self) -> Result<(), CoreError> {
        self.mutate(
            |bank, state| {
                bank.auth_service.logout(&mut state.session);
                Ok(())
            },
            |_| "Logged out".to_string(),
        )
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.state.session
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.session.is_admin()
    }

    // ── Accounts ────────────────────────────────────────────────────

    pub fn create_account(&mut self, form: AccountForm) -> Result<Uuid, CoreError> {
        self.require_admin()?;
        let now = now();
        let name = form.name.trim().to_string();
        self.mutate(
            |bank, state| bank.account_service.create_account(state, form, now),
            |_| format!("Account created for {name}"),
        )
    }

    pub fn update_account(&mut self, id: Uuid, update: AccountUpdate) -> Result<(), CoreError> {
        self.require_admin()?;
        self.mutate(
            |bank, state| bank.account_service.update_account(state, id, update),
            |_| "Account updated".to_string(),
        )
    }

    /// Read an uploaded picture and store it on the account.
    pub fn set_profile_image(&mut self, id: Uuid, bytes: &[u8], mime: &str) -> Result<(), CoreError> {
        let data_url = match account_service::encode_profile_image(bytes, mime) {
            Ok(url) => url,
            Err(e) => return Err(self.report_failure(e)),
        };
        self.update_account(
            id,
            AccountUpdate {
                profile_image: Some(data_url),
                ..AccountUpdate::default()
            },
        )
    }

    /// Removes the account from `students` and from `customAccounts`.
    pub fn delete_account(&mut self, id: Uuid) -> Result<StudentAccount, CoreError> {
        self.require_admin()?;
        self.mutate(
            |bank, state| bank.account_service.delete_account(state, id),
            |removed| format!("Account of {} deleted", removed.name),
        )
    }

    #[must_use]
    pub fn students(&self) -> &[StudentAccount] {
        &self.state.students
    }

    #[must_use]
    pub fn custom_accounts(&self) -> &[CustomAccount] {
        &self.state.custom_accounts
    }

    #[must_use]
    pub fn get_account(&self, id: Uuid) -> Option<&StudentAccount> {
        self.account_service.find(&self.state, id)
    }

    #[must_use]
    pub fn find_account(&self, username: &str) -> Option<&StudentAccount> {
        self.state.find_student(username)
    }

    #[must_use]
    pub fn search_accounts(&self, query: &str) -> Vec<&StudentAccount> {
        self.account_service.search(&self.state, query)
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Deposit into the selected student's account, timestamped now.
    pub fn deposit(
        &mut self,
        selected: Option<Uuid>,
        amount: f64,
        reason: Option<&str>,
    ) -> Result<Transaction, CoreError> {
        self.transact(selected, TransactionType::Deposit, amount, reason, now())
    }

    /// Withdraw from the selected student's account, timestamped now.
    pub fn withdraw(
        &mut self,
        selected: Option<Uuid>,
        amount: f64,
        reason: Option<&str>,
    ) -> Result<Transaction, CoreError> {
        self.transact(selected, TransactionType::Withdraw, amount, reason, now())
    }

    /// Record a transaction with an explicit timestamp (imports, back-dating).
    pub fn transact(
        &mut self,
        selected: Option<Uuid>,
        kind: TransactionType,
        amount: f64,
        reason: Option<&str>,
        at: NaiveDateTime,
    ) -> Result<Transaction, CoreError> {
        self.require_admin()?;
        let id = match selected {
            Some(id) => id,
            None => return Err(self.report_failure(CoreError::NoStudentSelected)),
        };
        let symbol = self.settings.currency_symbol.clone();
        let reason = reason.map(str::to_string);
        self.mutate(
            |bank, state| {
                let idx = bank.account_service.index_of(state, id)?;
                bank.transaction_service
                    .apply(&mut state.students[idx], kind, amount, reason, at)
            },
            |tx| match tx.kind {
                TransactionType::Deposit => format!("Deposited {symbol}{:.2} successfully", tx.amount),
                TransactionType::Withdraw => format!("Withdrew {symbol}{:.2} successfully", tx.amount),
            },
        )
    }

    /// Newest first.
    pub fn transaction_history(&self, id: Uuid) -> Result<Vec<&Transaction>, CoreError> {
        let account = self
            .get_account(id)
            .ok_or_else(|| CoreError::AccountNotFound(id.to_string()))?;
        Ok(self.transaction_service.history(account))
    }

    // ── Dashboard aggregates ────────────────────────────────────────

    #[must_use]
    pub fn totals(&self) -> BankTotals {
        self.summary_service.totals(&self.state.students)
    }

    #[must_use]
    pub fn leaderboard(&self, limit: Option<usize>) -> Vec<LeaderboardEntry> {
        self.summary_service.leaderboard(&self.state.students, limit)
    }

    // ── Reports ─────────────────────────────────────────────────────

    pub fn generate_report(&mut self, kind: ReportKind) -> Result<Report, CoreError> {
        match self.report_service.generate(&self.state.students, kind, now()) {
            Ok(report) => Ok(report),
            Err(e) => Err(self.report_failure(e)),
        }
    }

    /// Generate and render a report as a downloadable file.
    pub fn export_report(
        &mut self,
        kind: ReportKind,
        format: ExportFormat,
    ) -> Result<ExportedFile, CoreError> {
        let report = self.generate_report(kind)?;
        match self.export_service.export(&report, format) {
            Ok(file) => {
                self.notifications
                    .success(format!("Report downloaded: {}", file.file_name));
                Ok(file)
            }
            Err(e) => Err(self.report_failure(e)),
        }
    }

    // ── Widgets ─────────────────────────────────────────────────────

    /// Month grid with days that saw any transaction marked.
    pub fn calendar(&self, year: i32, month: u32) -> Result<CalendarMonth, CoreError> {
        let activity = self.calendar_service.activity_days(&self.state.students);
        self.calendar_service
            .month(year, month, now().date(), &activity)
    }

    pub fn current_calendar(&self) -> Result<CalendarMonth, CoreError> {
        let today = now().date();
        self.calendar(today.year(), today.month())
    }

    pub fn calculator(&mut self) -> &mut Calculator {
        &mut self.calculator
    }

    // ── Support ─────────────────────────────────────────────────────

    /// Open to everyone, logged in or not.
    pub fn submit_ticket(&mut self, form: TicketForm) -> Result<Uuid, CoreError> {
        let now = now();
        self.mutate(
            |bank, state| bank.support_service.submit(&mut state.tickets, form, now),
            |_| "Support ticket submitted. We'll get back to you soon!".to_string(),
        )
    }

    pub fn resolve_ticket(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.require_admin()?;
        self.mutate(
            |bank, state| bank.support_service.resolve(&mut state.tickets, id),
            |_| "Ticket resolved".to_string(),
        )
    }

    #[must_use]
    pub fn tickets(&self) -> &[SupportTicket] {
        &self.state.tickets
    }

    #[must_use]
    pub fn open_tickets(&self) -> Vec<&SupportTicket> {
        self.support_service.open_tickets(&self.state.tickets)
    }

    // ── Chat assistant ──────────────────────────────────────────────

    pub async fn chat(&mut self, message: &str) -> Result<ChatMessage, CoreError> {
        let totals = self.totals();
        let ctx = ChatContext {
            student_count: totals.account_count,
            total_balance: totals.total_balance,
            currency_symbol: self.settings.currency_symbol.clone(),
        };
        match self.chat_service.send(message, &ctx).await {
            Ok(reply) => Ok(reply),
            Err(e) => Err(self.report_failure(e)),
        }
    }

    #[must_use]
    pub fn chat_history(&self) -> &[ChatMessage] {
        self.chat_service.history()
    }

    pub fn clear_chat(&mut self) {
        self.chat_service.clear();
    }

    // ── System status ───────────────────────────────────────────────

    /// Poll the status endpoint once.
    pub async fn check_status(&self) -> SystemStatus {
        self.status_service.check(self.gauge.get()).await
    }

    /// Start polling every `status_poll_secs` in the background.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn_status_monitor(&self) -> services::status_service::StatusMonitor {
        services::status_service::StatusMonitor::spawn(
            self.status_service.source(),
            std::time::Duration::from_secs(self.settings.status_poll_secs.max(1)),
            self.gauge.clone(),
        )
    }

    #[must_use]
    pub fn storage_bytes(&self) -> usize {
        self.gauge.get()
    }

    // ── Notifications ───────────────────────────────────────────────

    /// Live toasts; expired ones are pruned.
    pub fn active_toasts(&mut self) -> &[Toast] {
        self.notifications.active(Utc::now())
    }

    pub fn notifications(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    // ── Backup ──────────────────────────────────────────────────────

    /// Encrypted snapshot of every key.
    pub fn backup(&mut self, password: &str) -> Result<Vec<u8>, CoreError> {
        self.backup_with_params(password, KdfParams::default())
    }

    pub fn backup_with_params(
        &mut self,
        password: &str,
        params: KdfParams,
    ) -> Result<Vec<u8>, CoreError> {
        self.require_admin()?;
        match StorageManager::backup_to_bytes_with_params(&self.state, password, params) {
            Ok(bytes) => {
                self.notifications.success("Backup created");
                Ok(bytes)
            }
            Err(e) => Err(self.report_failure(e)),
        }
    }

    /// Replace all data with a backup. The current session is kept.
    pub fn restore(&mut self, data: &[u8], password: &str) -> Result<(), CoreError> {
        self.require_admin()?;
        let restored = match StorageManager::restore_from_bytes(data, password) {
            Ok(state) => state,
            Err(e) => return Err(self.report_failure(e)),
        };
        self.mutate(
            move |_, state| {
                let session = std::mem::take(&mut state.session);
                *state = BankState { session, ..restored };
                Ok(())
            },
            |_| "Backup restored".to_string(),
        )
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Run `op` on a copy of the state; commit and persist only on success.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&Self, &mut BankState) -> Result<T, CoreError>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<T, CoreError> {
        let mut next = self.state.clone();
        let value = match op(self, &mut next) {
            Ok(value) => value,
            Err(e) => return Err(self.report_failure(e)),
        };
        if let Err(e) = self.persist(&next) {
            // Put back whatever part of the old state made it to the store.
            if let Err(restore_err) = StorageManager::save_state(&mut self.store, &self.state) {
                warn!(error = %restore_err, "failed to restore store after write error");
            }
            return Err(self.report_failure(e));
        }
        self.state = next;
        self.notifications.success(success(&value));
        Ok(value)
    }

    fn persist(&mut self, state: &BankState) -> Result<(), CoreError> {
        StorageManager::save_state(&mut self.store, state)?;
        self.gauge.set(self.store.bytes_used()?);
        Ok(())
    }

    fn require_admin(&mut self) -> Result<(), CoreError> {
        match self.auth_service.require_admin(&self.state.session) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.report_failure(e)),
        }
    }

    fn report_failure(&mut self, error: CoreError) -> CoreError {
        warn!(error = %error, "operation failed");
        self.notifications.error(error.to_string());
        error
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
