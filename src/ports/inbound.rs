//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: UI/CLI drives the session until the user quits.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive loop (import, template, send, refresh, cancel).
    async fn run(&self) -> Result<(), DomainError>;
}
