//! Bulk send: render one message per eligible contact and submit them all
//! concurrently to the gateway.
//!
//! - Eligible: operator matches the filter and the number validated
//! - Per-contact failures mark only that contact `Failed`
//! - An authentication failure aborts the batch; nothing is applied
//! - No concurrency cap: every send is in flight at once

use crate::domain::{Contact, ContactStatus, DispatchRun, DomainError, OperatorFilter, template};
use crate::ports::{ProgressPort, SmsGateway};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of sending to one contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Queued { message_id: String },
    Failed { reason: String },
}

/// Outcome of a completed batch. `outcomes` index into the contact slice given to `dispatch`.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub run: DispatchRun,
    pub outcomes: Vec<(usize, SendOutcome)>,
}

impl DispatchReport {
    /// Write statuses and message ids back. Contacts outside the batch are untouched.
    pub fn apply(&self, contacts: &mut [Contact]) {
        for (idx, outcome) in &self.outcomes {
            let Some(contact) = contacts.get_mut(*idx) else {
                continue;
            };
            match outcome {
                SendOutcome::Queued { message_id } => {
                    contact.status = ContactStatus::Pending;
                    contact.message_id = Some(message_id.clone());
                }
                SendOutcome::Failed { .. } => contact.status = ContactStatus::Failed,
            }
        }
    }
}

/// Contacts a run with `filter` would send to.
pub fn eligible_indices(contacts: &[Contact], filter: OperatorFilter) -> Vec<usize> {
    contacts
        .iter()
        .enumerate()
        .filter(|(_, c)| filter.matches(c.operator) && c.is_valid())
        .map(|(i, _)| i)
        .collect()
}

/// Dispatch service. Fans a batch out to the gateway and joins on all of it.
pub struct DispatchService {
    gateway: Arc<dyn SmsGateway>,
}

impl DispatchService {
    pub fn new(gateway: Arc<dyn SmsGateway>) -> Self {
        Self { gateway }
    }

    pub async fn dispatch(
        &self,
        contacts: &[Contact],
        filter: OperatorFilter,
        message_template: &str,
        progress: &dyn ProgressPort,
    ) -> Result<DispatchReport, DomainError> {
        let targets = eligible_indices(contacts, filter);
        let mut run = DispatchRun {
            total_count: targets.len(),
            ..Default::default()
        };
        info!(filter = %filter, total = run.total_count, "dispatch started");
        progress.on_start(run.total_count);

        let mut in_flight: FuturesUnordered<_> = targets
            .into_iter()
            .map(|idx| {
                let contact = &contacts[idx];
                let body = template::render(message_template, contact);
                let gateway = Arc::clone(&self.gateway);
                async move {
                    let result = gateway.send_sms(&contact.formatted_phone, &body).await;
                    (idx, result)
                }
            })
            .collect();

        let mut outcomes = Vec::with_capacity(run.total_count);
        while let Some((idx, result)) = in_flight.next().await {
            let contact = &contacts[idx];
            let outcome = match result {
                Ok(receipt) => match receipt.message_id() {
                    Some(id) => SendOutcome::Queued {
                        message_id: id.to_string(),
                    },
                    None => {
                        warn!(to = %contact.formatted_phone, "gateway response has no message id");
                        SendOutcome::Failed {
                            reason: "Invalid response format: missing message id".to_string(),
                        }
                    }
                },
                Err(e) if e.is_auth() => {
                    warn!(error = %e, processed = run.sent_count, "authentication failed, aborting batch");
                    progress.on_abort(&run);
                    // Dropping `in_flight` discards every unsettled send.
                    return Err(e);
                }
                Err(e) => {
                    warn!(to = %contact.formatted_phone, error = %e, "failed to send SMS");
                    SendOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            run.sent_count += 1;
            if matches!(outcome, SendOutcome::Queued { .. }) {
                run.success_count += 1;
            }
            outcomes.push((idx, outcome));
            progress.on_progress(&run);
        }

        info!(
            total = run.total_count,
            queued = run.success_count,
            failed = run.sent_count - run.success_count,
            "dispatch finished"
        );
        progress.on_finish(&run);
        Ok(DispatchReport { run, outcomes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Operator;
    use crate::ports::{DeliveryReceipt, NoProgress, SendReceipt, SentMessage};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted gateway: per-number behaviour, records message bodies.
    struct ScriptedGateway {
        script: HashMap<String, Script>,
        bodies: Mutex<Vec<(String, String)>>,
        calls: AtomicUsize,
    }

    #[derive(Clone)]
    enum Script {
        Ok(&'static str),
        NoId,
        Fail,
        Auth,
    }

    impl ScriptedGateway {
        fn new(script: &[(&str, Script)]) -> Self {
            Self {
                script: script
                    .iter()
                    .map(|(n, s)| (n.to_string(), s.clone()))
                    .collect(),
                bodies: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl SmsGateway for ScriptedGateway {
        async fn send_sms(&self, number: &str, body: &str) -> Result<SendReceipt, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies
                .lock()
                .unwrap()
                .push((number.to_string(), body.to_string()));
            let entry = |id: &str| SendReceipt {
                sms: vec![SentMessage {
                    message_id: id.to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            };
            match self.script.get(number).cloned().unwrap_or(Script::Fail) {
                Script::Ok(id) => Ok(entry(id)),
                Script::NoId => Ok(entry("")),
                Script::Fail => Err(DomainError::Gateway("HTTP error! status: 500".into())),
                Script::Auth => Err(DomainError::Auth("Invalid Username or Password".into())),
            }
        }

        async fn filter_dlr(&self, _: &str, _: &str) -> Result<Vec<DeliveryReceipt>, DomainError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct Recorder {
        runs: Mutex<Vec<DispatchRun>>,
        finished: Mutex<Option<DispatchRun>>,
        aborted: Mutex<Option<DispatchRun>>,
    }

    impl ProgressPort for Recorder {
        fn on_start(&self, _total: usize) {}
        fn on_progress(&self, run: &DispatchRun) {
            self.runs.lock().unwrap().push(*run);
        }
        fn on_finish(&self, run: &DispatchRun) {
            *self.finished.lock().unwrap() = Some(*run);
        }
        fn on_abort(&self, run: &DispatchRun) {
            *self.aborted.lock().unwrap() = Some(*run);
        }
    }

    fn contact(phone: &str, operator: Operator, name: &str) -> Contact {
        let valid = operator != Operator::Unknown;
        Contact {
            phone: phone.into(),
            formatted_phone: if valid {
                phone.into()
            } else {
                format!("Invalid: {}", phone)
            },
            operator,
            status: ContactStatus::NotSent,
            message_id: None,
            fields: BTreeMap::from([("Name".to_string(), name.to_string())]),
        }
    }

    #[tokio::test]
    async fn two_of_three_queued() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            ("699112233", Script::Ok("m-1")),
            ("677123456", Script::Fail),
            ("661234567", Script::Ok("m-3")),
        ]));
        let service = DispatchService::new(gateway.clone());
        let mut contacts = vec![
            contact("699112233", Operator::Orange, "Ama"),
            contact("677123456", Operator::Mtn, "Kofi"),
            contact("661234567", Operator::Nexttel, "Esi"),
        ];
        let recorder = Recorder::default();

        let report = service
            .dispatch(&contacts, OperatorFilter::All, "Hi [Name]", &recorder)
            .await
            .unwrap();
        report.apply(&mut contacts);

        assert_eq!(report.run.success_count, 2);
        assert_eq!(report.run.total_count, 3);
        assert_eq!(contacts[0].status, ContactStatus::Pending);
        assert_eq!(contacts[0].message_id.as_deref(), Some("m-1"));
        assert_eq!(contacts[1].status, ContactStatus::Failed);
        assert_eq!(contacts[1].message_id, None);
        assert_eq!(contacts[2].status, ContactStatus::Pending);

        assert!(recorder.aborted.lock().unwrap().is_none());
        assert_eq!(*recorder.finished.lock().unwrap(), Some(report.run));
        let progress = recorder.runs.lock().unwrap();
        assert_eq!(progress.len(), 3);
        assert_eq!(progress.last().map(|r| r.percent()), Some(100));

        let bodies = gateway.bodies.lock().unwrap();
        assert!(bodies.contains(&("699112233".to_string(), "Hi Ama".to_string())));
    }

    #[tokio::test]
    async fn auth_failure_aborts_without_changes() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            ("699112233", Script::Auth),
            ("677123456", Script::Ok("m-2")),
        ]));
        let service = DispatchService::new(gateway);
        let contacts = vec![
            contact("699112233", Operator::Orange, "Ama"),
            contact("677123456", Operator::Mtn, "Kofi"),
        ];

        let recorder = Recorder::default();

        let err = service
            .dispatch(&contacts, OperatorFilter::All, "Hi", &recorder)
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert!(contacts.iter().all(|c| c.status == ContactStatus::NotSent));
        let aborted = (*recorder.aborted.lock().unwrap()).expect("abort reported");
        assert_eq!(aborted.total_count, 2);
        assert!(recorder.finished.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_message_id_is_failure() {
        let gateway = Arc::new(ScriptedGateway::new(&[("699112233", Script::NoId)]));
        let service = DispatchService::new(gateway);
        let mut contacts = vec![contact("699112233", Operator::Orange, "Ama")];

        let report = service
            .dispatch(&contacts, OperatorFilter::All, "Hi", &NoProgress)
            .await
            .unwrap();
        report.apply(&mut contacts);
        assert_eq!(report.run.success_count, 0);
        assert_eq!(contacts[0].status, ContactStatus::Failed);
    }

    #[tokio::test]
    async fn filter_and_invalid_numbers_limit_the_batch() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            ("699112233", Script::Ok("m-1")),
            ("655123456", Script::Ok("m-2")),
        ]));
        let service = DispatchService::new(gateway.clone());
        let mut contacts = vec![
            contact("699112233", Operator::Orange, "Ama"),
            contact("677123456", Operator::Mtn, "Kofi"),
            contact("12345", Operator::Unknown, "Nobody"),
            contact("655123456", Operator::Orange, "Esi"),
        ];

        let report = service
            .dispatch(
                &contacts,
                OperatorFilter::Only(Operator::Orange),
                "Hi",
                &NoProgress,
            )
            .await
            .unwrap();
        report.apply(&mut contacts);

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.run.total_count, 2);
        assert_eq!(contacts[1].status, ContactStatus::NotSent);
        assert_eq!(contacts[2].status, ContactStatus::NotSent);
        assert_eq!(contacts[3].status, ContactStatus::Pending);
    }

    #[tokio::test]
    async fn empty_batch_completes() {
        let service = DispatchService::new(Arc::new(ScriptedGateway::new(&[])));
        let report = service
            .dispatch(&[], OperatorFilter::All, "Hi", &NoProgress)
            .await
            .unwrap();
        assert_eq!(report.run, DispatchRun::default());
        assert!(report.outcomes.is_empty());
    }
}
