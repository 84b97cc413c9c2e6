//! Session controller. Sole owner of the mutable session state.
//!
//! - Every mutation is followed by a snapshot write (failures become warnings)
//! - Gateway calls run without holding the state lock
//! - A generation counter discards results of calls that outlive an import or cancel
//! - Polling is armed while any contact is Pending and disarmed otherwise

use crate::domain::{
    DispatchRun, DomainError, ImportResult, OperatorFilter, SessionState, TemplateIssue, template,
};
use crate::ports::{ProgressPort, SmsGateway, SnapshotPort};
use crate::usecases::dispatch_service::{DispatchService, eligible_indices};
use crate::usecases::import_service::ImportService;
use crate::usecases::status_poller::{PollOutcome, StatusPoller, apply_receipts, dlr_window};
use chrono::{Duration as ChronoDuration, FixedOffset, Offset, Utc};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

const LOAD_FAILED: &str = "Error loading saved state. Please try importing your file again.";
const SAVE_FAILED: &str = "Error saving application state. Your progress may not be saved.";
const AUTH_FAILED: &str = "Authentication failed. Please check your SMS API credentials (user, password) and try again.";

/// Knobs for polling and templates, resolved from configuration in `main`.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    pub dlr_lookback: ChronoDuration,
    pub gateway_offset: FixedOffset,
    pub default_template: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            dlr_lookback: ChronoDuration::hours(1),
            gateway_offset: Utc.fix(),
            default_template: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Warning,
}

/// Dismissible user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Error => write!(f, "Error: {}", self.message),
            NoticeLevel::Warning => write!(f, "Warning: {}", self.message),
        }
    }
}

#[derive(Default)]
struct Inner {
    state: SessionState,
    generation: u64,
    sending: bool,
    notices: Vec<Notice>,
    import_errors: Vec<String>,
    template_issues: Vec<TemplateIssue>,
    last_run: Option<DispatchRun>,
}

impl Inner {
    fn notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    fn revalidate_template(&mut self) {
        self.template_issues =
            template::validate(&self.state.custom_template, &self.state.available_params);
    }
}

pub struct SessionService {
    inner: Mutex<Inner>,
    imports: ImportService,
    dispatcher: DispatchService,
    gateway: Arc<dyn SmsGateway>,
    snapshot: Arc<dyn SnapshotPort>,
    poller: StatusPoller,
    settings: SessionSettings,
    me: Weak<SessionService>,
}

impl SessionService {
    pub fn new(
        imports: ImportService,
        gateway: Arc<dyn SmsGateway>,
        snapshot: Arc<dyn SnapshotPort>,
        settings: SessionSettings,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            inner: Mutex::new(Inner::default()),
            imports,
            dispatcher: DispatchService::new(Arc::clone(&gateway)),
            gateway,
            snapshot,
            poller: StatusPoller::new(settings.poll_interval),
            settings,
            me: me.clone(),
        })
    }

    /// Load the persisted session. A corrupt snapshot leaves an empty session
    /// and a notice; it never fails.
    pub async fn restore(&self) {
        let loaded = self.snapshot.load().await;
        let mut inner = self.inner.lock().await;
        match loaded {
            Ok(Some(state)) => {
                info!(
                    contacts = state.contacts.len(),
                    file = state.file_name.as_deref().unwrap_or("-"),
                    "restored saved session"
                );
                inner.state = state;
            }
            Ok(None) => inner.state = SessionState::default(),
            Err(e) => {
                warn!(error = %e, "could not load saved session");
                inner.state = SessionState::default();
                inner.notice(NoticeLevel::Error, LOAD_FAILED);
            }
        }
        if inner.state.custom_template.is_empty() {
            inner.state.custom_template = self.settings.default_template.clone();
        }
        inner.revalidate_template();
        let pending = inner.state.has_pending();
        drop(inner);
        self.sync_poller(pending);
    }

    /// Replace the contact list with the content of `path`. On failure the
    /// current session is left untouched.
    pub async fn import_file(&self, path: &Path) -> Result<ImportResult, DomainError> {
        let result = match self.imports.import_file(path).await {
            Ok(r) => r,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "import failed");
                self.inner
                    .lock()
                    .await
                    .notice(NoticeLevel::Error, format!("Error importing file: {}", e));
                return Err(e);
            }
        };

        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.state.contacts = result.contacts.clone();
        inner.state.available_params = result.headers.clone();
        inner.state.file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        inner.state.last_update_time = None;
        inner.import_errors = result.errors.clone();
        inner.last_run = None;
        if !result.errors.is_empty() {
            inner.notice(
                NoticeLevel::Warning,
                format!(
                    "{} row(s) were skipped: {}",
                    result.errors.len(),
                    result.errors.join("; ")
                ),
            );
        }
        inner.revalidate_template();
        self.persist(&mut inner).await;
        drop(inner);
        self.sync_poller(false);
        Ok(result)
    }

    /// Update the template and return its validation issues. Editing is never blocked.
    pub async fn set_template(&self, text: &str) -> Vec<TemplateIssue> {
        let mut inner = self.inner.lock().await;
        inner.state.custom_template = text.to_string();
        inner.revalidate_template();
        self.persist(&mut inner).await;
        inner.template_issues.clone()
    }

    /// Send the current template to every eligible contact. Fails with
    /// `Discarded` when the session was reset before the batch settled.
    pub async fn send(
        &self,
        filter: OperatorFilter,
        progress: &dyn ProgressPort,
    ) -> Result<DispatchRun, DomainError> {
        let (contacts, message_template, generation) = {
            let mut inner = self.inner.lock().await;
            if inner.sending {
                return Err(DomainError::Ui("a send is already in progress".to_string()));
            }
            if inner.state.contacts.is_empty() {
                let err = DomainError::Import("no contacts imported".to_string());
                inner.notice(NoticeLevel::Error, err.to_string());
                return Err(err);
            }
            if !inner.template_issues.is_empty() {
                let joined = inner
                    .template_issues
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                let err = DomainError::Template(joined);
                inner.notice(NoticeLevel::Error, err.to_string());
                return Err(err);
            }
            inner.sending = true;
            (
                inner.state.contacts.clone(),
                inner.state.custom_template.clone(),
                inner.generation,
            )
        };

        let result = self
            .dispatcher
            .dispatch(&contacts, filter, &message_template, progress)
            .await;

        let mut inner = self.inner.lock().await;
        inner.sending = false;
        if inner.generation != generation {
            info!("session changed while sending; results discarded");
            return Err(DomainError::Discarded);
        }

        match result {
            Ok(report) => {
                report.apply(&mut inner.state.contacts);
                inner.state.last_update_time = Some(Utc::now());
                inner.last_run = Some(report.run);
                let failed = report.run.sent_count - report.run.success_count;
                if failed > 0 {
                    inner.notice(
                        NoticeLevel::Warning,
                        format!(
                            "{} of {} messages could not be sent",
                            failed, report.run.total_count
                        ),
                    );
                }
                self.persist(&mut inner).await;
                let pending = inner.state.has_pending();
                drop(inner);
                self.sync_poller(pending);
                Ok(report.run)
            }
            Err(e) if e.is_auth() => {
                inner.notice(NoticeLevel::Error, AUTH_FAILED);
                Err(e)
            }
            Err(e) => {
                inner.notice(NoticeLevel::Error, format!("Failed to send SMS: {}", e));
                Err(e)
            }
        }
    }

    /// Query delivery receipts now, regardless of the polling state.
    /// Returns the number of contacts whose status was updated, or
    /// `Discarded` when the session was reset while the query ran.
    pub async fn refresh_status(&self) -> Result<usize, DomainError> {
        let result = self.refresh_receipts().await;
        let pending = self.inner.lock().await.state.has_pending();
        self.sync_poller(pending);
        result
    }

    /// Discard the session and its snapshot. In-flight calls are not
    /// cancelled; their results are ignored when they land.
    pub async fn cancel(&self) {
        let mut inner = self.inner.lock().await;
        let generation = inner.generation + 1;
        *inner = Inner {
            generation,
            sending: inner.sending,
            ..Inner::default()
        };
        inner.state.custom_template = self.settings.default_template.clone();
        inner.revalidate_template();
        self.poller.stop();
        if let Err(e) = self.snapshot.clear().await {
            warn!(error = %e, "could not clear saved session");
            inner.notice(NoticeLevel::Warning, SAVE_FAILED);
        }
        info!("session cancelled");
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.inner.lock().await.notices.clone()
    }

    pub async fn dismiss_notices(&self) {
        self.inner.lock().await.notices.clear();
    }

    pub async fn dismiss_notice(&self, index: usize) {
        let mut inner = self.inner.lock().await;
        if index < inner.notices.len() {
            inner.notices.remove(index);
        }
    }

    pub async fn template_issues(&self) -> Vec<TemplateIssue> {
        self.inner.lock().await.template_issues.clone()
    }

    pub async fn import_errors(&self) -> Vec<String> {
        self.inner.lock().await.import_errors.clone()
    }

    pub async fn last_run(&self) -> Option<DispatchRun> {
        self.inner.lock().await.last_run
    }

    pub async fn eligible_count(&self, filter: OperatorFilter) -> usize {
        eligible_indices(&self.inner.lock().await.state.contacts, filter).len()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_polling()
    }

    /// Fetch receipts and merge them. Does not touch the poller.
    async fn refresh_receipts(&self) -> Result<usize, DomainError> {
        let generation = {
            let inner = self.inner.lock().await;
            if inner.state.contacts.is_empty() {
                return Ok(0);
            }
            inner.generation
        };

        let (start, end) = dlr_window(
            Utc::now(),
            self.settings.dlr_lookback,
            self.settings.gateway_offset,
        );
        let receipts = match self.gateway.filter_dlr(&start, &end).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "status check failed");
                self.inner.lock().await.notice(
                    NoticeLevel::Error,
                    format!("Failed to check message statuses: {}", e),
                );
                return Err(e);
            }
        };

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            info!("session changed while checking statuses; receipts discarded");
            return Err(DomainError::Discarded);
        }
        let updated = apply_receipts(&mut inner.state.contacts, &receipts);
        inner.state.last_update_time = Some(Utc::now());
        info!(
            receipts = receipts.len(),
            updated,
            pending = inner.state.contacts.iter().filter(|c| c.status.is_pending()).count(),
            "delivery statuses refreshed"
        );
        self.persist(&mut inner).await;
        Ok(updated)
    }

    async fn poll_tick(&self) -> PollOutcome {
        // Failures are already surfaced as notices; the timer keeps running.
        let _ = self.refresh_receipts().await;
        if self.inner.lock().await.state.has_pending() {
            PollOutcome::Continue
        } else {
            PollOutcome::Idle
        }
    }

    fn sync_poller(&self, has_pending: bool) {
        if !has_pending {
            self.poller.stop();
            return;
        }
        let me = self.me.clone();
        self.poller.start(move || {
            let me = me.clone();
            async move {
                match me.upgrade() {
                    Some(session) => session.poll_tick().await,
                    None => PollOutcome::Idle,
                }
            }
        });
    }

    async fn persist(&self, inner: &mut Inner) {
        if let Err(e) = self.snapshot.save(&inner.state).await {
            warn!(error = %e, "could not save session");
            inner.notice(NoticeLevel::Warning, SAVE_FAILED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::MockSmsGateway;
    use crate::domain::{ContactStatus, Operator, PhoneValidator, RawTable};
    use crate::ports::{ContactSourcePort, DeliveryReceipt, NoProgress, SendReceipt};

    struct FixedSource(RawTable);

    #[async_trait::async_trait]
    impl ContactSourcePort for FixedSource {
        async fn read_table(&self, path: &Path) -> Result<RawTable, DomainError> {
            match path.extension().and_then(|e| e.to_str()) {
                Some("csv") => Ok(self.0.clone()),
                other => Err(DomainError::UnsupportedFile(other.unwrap_or("").to_string())),
            }
        }
    }

    /// In-memory snapshot holding raw JSON text.
    #[derive(Default)]
    struct MemorySnapshot(std::sync::Mutex<Option<String>>);

    impl MemorySnapshot {
        fn raw(text: &str) -> Self {
            Self(std::sync::Mutex::new(Some(text.to_string())))
        }

        fn stored(&self) -> Option<SessionState> {
            self.0
                .lock()
                .unwrap()
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok())
        }
    }

    #[async_trait::async_trait]
    impl SnapshotPort for MemorySnapshot {
        async fn load(&self) -> Result<Option<SessionState>, DomainError> {
            match self.0.lock().unwrap().as_deref() {
                None => Ok(None),
                Some(s) if s.trim().is_empty() => Ok(None),
                Some(s) => serde_json::from_str(s)
                    .map(Some)
                    .map_err(|e| DomainError::Snapshot(e.to_string())),
            }
        }

        async fn save(&self, state: &SessionState) -> Result<(), DomainError> {
            *self.0.lock().unwrap() = Some(serde_json::to_string(state).unwrap());
            Ok(())
        }

        async fn clear(&self) -> Result<(), DomainError> {
            *self.0.lock().unwrap() = None;
            Ok(())
        }
    }

    /// Gateway whose sends fail authentication and whose receipt queries fail.
    struct BrokenGateway;

    #[async_trait::async_trait]
    impl SmsGateway for BrokenGateway {
        async fn send_sms(&self, _: &str, _: &str) -> Result<SendReceipt, DomainError> {
            Err(DomainError::Auth("Invalid Username or Password".into()))
        }

        async fn filter_dlr(&self, _: &str, _: &str) -> Result<Vec<DeliveryReceipt>, DomainError> {
            Err(DomainError::Gateway("HTTP error! status: 503".into()))
        }
    }

    fn contacts_table() -> RawTable {
        RawTable {
            headers: vec!["Name".into(), "phone".into()],
            rows: vec![
                vec!["Ama".into(), "699112233".into()],
                vec!["Kofi".into(), "677123456".into()],
                vec!["Nobody".into(), "12345".into()],
            ],
        }
    }

    fn session(
        gateway: Arc<dyn SmsGateway>,
        snapshot: Arc<MemorySnapshot>,
    ) -> Arc<SessionService> {
        let imports = ImportService::new(
            Arc::new(FixedSource(contacts_table())),
            PhoneValidator::default(),
        );
        SessionService::new(
            imports,
            gateway,
            snapshot,
            SessionSettings {
                default_template: "Hi [Name]".into(),
                ..SessionSettings::default()
            },
        )
    }

    #[tokio::test]
    async fn corrupt_snapshot_starts_empty_with_notice() {
        let snapshot = Arc::new(MemorySnapshot::raw("{broken"));
        let s = session(Arc::new(MockSmsGateway::with_delay(0)), snapshot);
        s.restore().await;

        let state = s.state().await;
        assert!(state.contacts.is_empty());
        assert_eq!(state.custom_template, "Hi [Name]");
        let notices = s.notices().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);

        s.dismiss_notice(0).await;
        assert!(s.notices().await.is_empty());
    }

    #[tokio::test]
    async fn empty_snapshot_starts_clean() {
        let snapshot = Arc::new(MemorySnapshot::raw(""));
        let s = session(Arc::new(MockSmsGateway::with_delay(0)), snapshot);
        s.restore().await;
        assert!(s.state().await.contacts.is_empty());
        assert!(s.notices().await.is_empty());
        assert!(!s.is_polling());
    }

    #[tokio::test]
    async fn import_send_and_refresh() {
        let snapshot = Arc::new(MemorySnapshot::default());
        let s = session(Arc::new(MockSmsGateway::with_delay(0)), snapshot.clone());
        s.restore().await;

        let result = s.import_file(Path::new("/tmp/contacts.csv")).await.unwrap();
        assert_eq!(result.contacts.len(), 3);
        assert_eq!(
            snapshot.stored().and_then(|st| st.file_name),
            Some("contacts.csv".to_string())
        );
        assert_eq!(s.eligible_count(OperatorFilter::All).await, 2);

        let run = s.send(OperatorFilter::All, &NoProgress).await.unwrap();
        assert_eq!((run.success_count, run.total_count), (2, 2));
        let state = s.state().await;
        assert_eq!(state.contacts[0].status, ContactStatus::Pending);
        assert_eq!(state.contacts[2].status, ContactStatus::NotSent);
        assert!(state.last_update_time.is_some());
        assert!(s.is_polling());

        let updated = s.refresh_status().await.unwrap();
        assert_eq!(updated, 2);
        assert_eq!(s.state().await.contacts[1].status, ContactStatus::Delivered);
        assert!(!s.is_polling());
        assert!(snapshot.stored().unwrap().contacts.iter().all(|c| !c.status.is_pending()));
    }

    #[tokio::test(start_paused = true)]
    async fn poller_resolves_pending_contacts() {
        let snapshot = Arc::new(MemorySnapshot::default());
        let s = session(Arc::new(MockSmsGateway::with_delay(0)), snapshot);
        s.restore().await;
        s.import_file(Path::new("contacts.csv")).await.unwrap();
        s.send(OperatorFilter::Only(Operator::Orange), &NoProgress)
            .await
            .unwrap();
        assert!(s.is_polling());

        tokio::time::sleep(Duration::from_secs(11)).await;
        let state = s.state().await;
        assert_eq!(state.contacts[0].status, ContactStatus::Delivered);
        assert_eq!(state.contacts[1].status, ContactStatus::NotSent);
        assert!(!s.is_polling());
    }

    #[tokio::test]
    async fn invalid_template_blocks_send() {
        let gateway = Arc::new(MockSmsGateway::with_delay(0));
        let s = session(gateway.clone(), Arc::new(MemorySnapshot::default()));
        s.restore().await;
        s.import_file(Path::new("contacts.csv")).await.unwrap();

        let issues = s.set_template("Hi [[Name]]").await;
        assert_eq!(issues.len(), 1);
        let err = s.send(OperatorFilter::All, &NoProgress).await.unwrap_err();
        assert!(matches!(err, DomainError::Template(_)));
        assert!(gateway.filter_dlr("", "").await.unwrap().is_empty());

        assert!(s.set_template("Hi [Name]").await.is_empty());
        assert!(s.send(OperatorFilter::All, &NoProgress).await.is_ok());
    }

    #[tokio::test]
    async fn auth_failure_surfaces_single_error() {
        let s = session(Arc::new(BrokenGateway), Arc::new(MemorySnapshot::default()));
        s.restore().await;
        s.import_file(Path::new("contacts.csv")).await.unwrap();

        let err = s.send(OperatorFilter::All, &NoProgress).await.unwrap_err();
        assert!(err.is_auth());
        let notices = s.notices().await;
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("Authentication failed"));
        assert!(
            s.state()
                .await
                .contacts
                .iter()
                .all(|c| c.status == ContactStatus::NotSent)
        );
        assert!(!s.is_polling());
    }

    #[tokio::test]
    async fn refresh_failure_is_reported_not_fatal() {
        let s = session(Arc::new(BrokenGateway), Arc::new(MemorySnapshot::default()));
        s.restore().await;
        s.import_file(Path::new("contacts.csv")).await.unwrap();

        assert!(s.refresh_status().await.is_err());
        assert!(s.notices().await[0].message.contains("Failed to check"));
        assert_eq!(s.state().await.contacts.len(), 3);
    }

    #[tokio::test]
    async fn cancel_clears_session_and_snapshot() {
        let snapshot = Arc::new(MemorySnapshot::default());
        let s = session(Arc::new(MockSmsGateway::with_delay(0)), snapshot.clone());
        s.restore().await;
        s.import_file(Path::new("contacts.csv")).await.unwrap();
        s.send(OperatorFilter::All, &NoProgress).await.unwrap();
        assert!(s.is_polling());

        s.cancel().await;
        let state = s.state().await;
        assert!(state.contacts.is_empty());
        assert_eq!(state.file_name, None);
        assert_eq!(state.custom_template, "Hi [Name]");
        assert!(snapshot.stored().is_none());
        assert!(!s.is_polling());
        assert_eq!(s.last_run().await, None);
    }

    #[tokio::test]
    async fn failed_import_keeps_previous_session() {
        let snapshot = Arc::new(MemorySnapshot::default());
        let s = session(Arc::new(MockSmsGateway::with_delay(0)), snapshot.clone());
        s.restore().await;
        s.import_file(Path::new("contacts.csv")).await.unwrap();

        let err = s.import_file(Path::new("contacts.pdf")).await.unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedFile(_)));
        let state = s.state().await;
        assert_eq!(state.contacts.len(), 3);
        assert_eq!(state.file_name.as_deref(), Some("contacts.csv"));
        assert_eq!(snapshot.stored().map(|st| st.contacts.len()), Some(3));
        assert!(s.notices().await[0].message.starts_with("Error importing file"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_send_discards_results() {
        let snapshot = Arc::new(MemorySnapshot::default());
        let s = session(Arc::new(MockSmsGateway::with_delay(200)), snapshot.clone());
        s.restore().await;
        s.import_file(Path::new("contacts.csv")).await.unwrap();

        let sending = Arc::clone(&s);
        let handle =
            tokio::spawn(async move { sending.send(OperatorFilter::All, &NoProgress).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        s.cancel().await;

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, DomainError::Discarded));
        assert!(s.state().await.contacts.is_empty());
        assert!(snapshot.stored().is_none());
        assert!(!s.is_polling());
        assert_eq!(s.last_run().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_refresh_discards_receipts() {
        let snapshot = Arc::new(MemorySnapshot::default());
        let s = session(Arc::new(MockSmsGateway::with_delay(200)), snapshot.clone());
        s.restore().await;
        s.import_file(Path::new("contacts.csv")).await.unwrap();
        s.send(OperatorFilter::All, &NoProgress).await.unwrap();
        assert!(s.is_polling());

        let refreshing = Arc::clone(&s);
        let handle = tokio::spawn(async move { refreshing.refresh_status().await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        s.cancel().await;

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, DomainError::Discarded));
        assert!(s.state().await.contacts.is_empty());
        assert!(snapshot.stored().is_none());
        assert!(!s.is_polling());
        assert!(s.notices().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reimport_during_send_keeps_new_contacts_untouched() {
        let s = session(
            Arc::new(MockSmsGateway::with_delay(200)),
            Arc::new(MemorySnapshot::default()),
        );
        s.restore().await;
        s.import_file(Path::new("contacts.csv")).await.unwrap();

        let sending = Arc::clone(&s);
        let handle =
            tokio::spawn(async move { sending.send(OperatorFilter::All, &NoProgress).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        s.import_file(Path::new("contacts.csv")).await.unwrap();

        assert!(matches!(
            handle.await.unwrap(),
            Err(DomainError::Discarded)
        ));
        let state = s.state().await;
        assert_eq!(state.contacts.len(), 3);
        assert!(state.contacts.iter().all(|c| c.status == ContactStatus::NotSent));
        assert!(!s.is_polling());
    }
}
