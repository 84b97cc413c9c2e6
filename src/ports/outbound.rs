//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, RawTable, SessionState};
use std::path::Path;

/// One entry of the gateway's per-recipient send result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: String,
    pub mobile_no: String,
    pub status: String,
    pub error_code: String,
    pub error_description: String,
}

/// Gateway answer to a send request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReceipt {
    pub response_code: i64,
    pub response_description: String,
    pub response_message: String,
    pub sms: Vec<SentMessage>,
}

impl SendReceipt {
    /// Message id of the first result entry, when present and non-empty.
    pub fn message_id(&self) -> Option<&str> {
        self.sms
            .first()
            .map(|s| s.message_id.trim())
            .filter(|id| !id.is_empty())
    }
}

/// Delivery receipt (DLR) for a previously sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: String,
    pub mobile_no: String,
    pub status: String,
}

/// SMS gateway. Send one message, query delivery receipts.
#[async_trait::async_trait]
pub trait SmsGateway: Send + Sync {
    /// Send `body` to a national number (the adapter adds the country code).
    ///
    /// Returns `DomainError::Auth` when the gateway rejects the credentials;
    /// any other failure is `DomainError::Gateway`.
    async fn send_sms(&self, national_number: &str, body: &str)
    -> Result<SendReceipt, DomainError>;

    /// Delivery receipts between `start` and `end` (`YYYY-MM-DD HH:MM:SS`, gateway-local).
    async fn filter_dlr(&self, start: &str, end: &str)
    -> Result<Vec<DeliveryReceipt>, DomainError>;
}

/// Snapshot port. Durable copy of the whole session.
#[async_trait::async_trait]
pub trait SnapshotPort: Send + Sync {
    /// Read the snapshot. `Ok(None)` when nothing (or an empty record) is stored;
    /// `Err` when the record exists but cannot be parsed.
    async fn load(&self) -> Result<Option<SessionState>, DomainError>;

    async fn save(&self, state: &SessionState) -> Result<(), DomainError>;

    async fn clear(&self) -> Result<(), DomainError>;
}

/// Contact source port. Reads an import file into a header row plus data rows.
#[async_trait::async_trait]
pub trait ContactSourcePort: Send + Sync {
    async fn read_table(&self, path: &Path) -> Result<RawTable, DomainError>;
}
