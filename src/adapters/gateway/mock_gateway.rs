//! Mock SMS gateway for running without credentials.
//!
//! Issues sequential message ids and reports every sent message as delivered
//! on the next receipt query. Each receipt is reported once.

use crate::domain::DomainError;
use crate::ports::{DeliveryReceipt, SendReceipt, SentMessage, SmsGateway};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

/// Mock gateway. No network calls.
pub struct MockSmsGateway {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
    next_id: AtomicU64,
    sent: Mutex<Vec<(String, String)>>,
}

impl MockSmsGateway {
    /// Create a mock gateway with default delay (100ms).
    pub fn new() -> Self {
        Self::with_delay(100)
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            next_id: AtomicU64::new(1),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MockSmsGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SmsGateway for MockSmsGateway {
    async fn send_sms(
        &self,
        national_number: &str,
        body: &str,
    ) -> Result<SendReceipt, DomainError> {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        let id = format!("mock-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        info!(to = national_number, len = body.len(), id = %id, "[MOCK] SMS accepted");
        self.sent
            .lock()
            .await
            .push((id.clone(), national_number.to_string()));

        Ok(SendReceipt {
            response_code: 1,
            response_description: "success".to_string(),
            response_message: "success".to_string(),
            sms: vec![SentMessage {
                message_id: id,
                mobile_no: national_number.to_string(),
                status: "success".to_string(),
                error_code: "000".to_string(),
                error_description: "success".to_string(),
            }],
        })
    }

    async fn filter_dlr(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<DeliveryReceipt>, DomainError> {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        let delivered: Vec<(String, String)> = self.sent.lock().await.drain(..).collect();
        info!(start, end, receipts = delivered.len(), "[MOCK] delivery receipts");
        Ok(delivered
            .into_iter()
            .map(|(message_id, mobile_no)| DeliveryReceipt {
                message_id,
                mobile_no,
                status: "DELIVRD".to_string(),
            })
            .collect())
    }
}
