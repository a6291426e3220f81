use thiserror::Error;

/// Unified error type for the entire student-bank-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// Validation messages are user-facing: the facade forwards `to_string()`
/// verbatim into an error toast.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage / Backup file ───────────────────────────────────────
    #[error("Invalid backup format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported backup version: {0}")]
    UnsupportedVersion(u16),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed — wrong password or corrupted backup")]
    Decryption,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // ── Export ──────────────────────────────────────────────────────
    #[error("Export failed: {0}")]
    Export(String),

    // ── Network ─────────────────────────────────────────────────────
    #[error("Service error ({service}): {message}")]
    Api { service: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("{0}")]
    Validation(String),

    #[error("Please enter a valid amount")]
    InvalidAmount,

    #[error("Insufficient balance: requested {requested:.2}, available {available:.2}")]
    InsufficientBalance { requested: f64, available: f64 },

    #[error("Please select a student")]
    NoStudentSelected,

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Admin login required")]
    Unauthorized,
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Chat endpoints may carry keys in the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}

impl From<rust_xlsxwriter::XlsxError> for CoreError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        CoreError::Export(e.to_string())
    }
}

impl From<printpdf::Error> for CoreError {
    fn from(e: printpdf::Error) -> Self {
        CoreError::Export(e.to_string())
    }
}
