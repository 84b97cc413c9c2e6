//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Import failed: {0}")]
    Import(String),

    /// The import has no column named "phone" (any case). Aborts the whole import.
    #[error("The \"phone\" column is required")]
    MissingPhoneColumn,

    #[error("Unsupported file type: {0}. Please use CSV or XLSX files.")]
    UnsupportedFile(String),

    #[error("Template error: {0}")]
    Template(String),

    /// Gateway rejected the credentials. Aborts a whole dispatch batch.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("SMS gateway error: {0}")]
    Gateway(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("UI error: {0}")]
    Ui(String),

    /// The session was reset (cancel or re-import) while the call was in flight.
    #[error("The session changed while the request was in flight; results were discarded")]
    Discarded,
}

impl DomainError {
    /// True for the global credential failure that must abort a batch.
    pub fn is_auth(&self) -> bool {
        matches!(self, DomainError::Auth(_))
    }
}
