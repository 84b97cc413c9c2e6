//! Delivery-receipt polling.
//!
//! Two states: Idle (no task) and Polling (a periodic task that queries the
//! gateway). The session controller starts the task when a contact becomes
//! Pending; the task ends itself once a tick reports nothing left pending.
//! Tick failures are reported by the tick and never stop the timer.

use crate::domain::{Contact, ContactStatus};
use crate::ports::DeliveryReceipt;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Gateway date format for receipt windows.
const DLR_DAY_FORMAT: &str = "%Y-%m-%d";

/// What a tick found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Contacts are still pending; keep the timer armed.
    Continue,
    /// Nothing pending (or the session is gone); stop polling.
    Idle,
}

/// Receipt query window in gateway-local time: from the start of the day
/// `lookback` before `now` to the end of the current day.
pub fn dlr_window(
    now: DateTime<Utc>,
    lookback: ChronoDuration,
    gateway_offset: FixedOffset,
) -> (String, String) {
    let first_day = (now - lookback).with_timezone(&gateway_offset).date_naive();
    let today = now.with_timezone(&gateway_offset).date_naive();
    (
        format!("{} 00:00:00", first_day.format(DLR_DAY_FORMAT)),
        format!("{} 23:59:59", today.format(DLR_DAY_FORMAT)),
    )
}

/// Overwrite the status of every contact whose message id appears in `receipts`.
/// Contacts without a matching receipt keep their status. Returns the number updated.
pub fn apply_receipts(contacts: &mut [Contact], receipts: &[DeliveryReceipt]) -> usize {
    let mut by_id: HashMap<&str, &str> = HashMap::with_capacity(receipts.len());
    for r in receipts {
        by_id
            .entry(r.message_id.as_str())
            .or_insert(r.status.as_str());
    }

    let mut updated = 0;
    for contact in contacts.iter_mut() {
        let Some(id) = contact.message_id.as_deref() else {
            continue;
        };
        if let Some(status) = by_id.get(id) {
            contact.status = ContactStatus::from(*status);
            updated += 1;
        }
    }
    updated
}

/// Task handle plus a re-arm request raised by `start` while a loop is
/// already running. The loop only exits on `Idle` when no request is pending.
#[derive(Default)]
struct TaskSlot {
    handle: Option<JoinHandle<()>>,
    rearm: bool,
}

fn lock_slot(slot: &Mutex<TaskSlot>) -> MutexGuard<'_, TaskSlot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cancellable periodic task. At most one tick loop runs at a time; dropping
/// the poller aborts it.
pub struct StatusPoller {
    interval: Duration,
    slot: Arc<Mutex<TaskSlot>>,
}

impl StatusPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            slot: Arc::new(Mutex::new(TaskSlot::default())),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_polling(&self) -> bool {
        lock_slot(&self.slot)
            .handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Arm the timer (Idle → Polling). While a loop is running this only asks
    /// it to keep going, so a tick that just saw nothing pending does not stop it.
    /// The first tick fires one interval from now. Must run inside a tokio runtime.
    pub fn start<F, Fut>(&self, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = PollOutcome> + Send + 'static,
    {
        let mut slot = lock_slot(&self.slot);
        if slot.handle.as_ref().is_some_and(|h| !h.is_finished()) {
            slot.rearm = true;
            return;
        }
        slot.rearm = false;
        let period = self.interval;
        let shared = Arc::clone(&self.slot);
        info!(interval_secs = period.as_secs(), "status polling started");
        slot.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tick().await == PollOutcome::Continue {
                    continue;
                }
                let mut slot = lock_slot(&shared);
                if std::mem::take(&mut slot.rearm) {
                    continue;
                }
                // Detach our own handle so the next `start` spawns a fresh loop.
                slot.handle = None;
                break;
            }
            info!("status polling stopped: nothing pending");
        }));
    }

    /// Disarm the timer (→ Idle).
    pub fn stop(&self) {
        let mut slot = lock_slot(&self.slot);
        slot.rearm = false;
        if let Some(handle) = slot.handle.take() {
            if !handle.is_finished() {
                debug!("status polling cancelled");
            }
            handle.abort();
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
