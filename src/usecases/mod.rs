//! Application use cases. Orchestrate domain logic via ports.

pub mod dispatch_service;
pub mod import_service;
pub mod session_service;
pub mod status_poller;

pub use dispatch_service::{DispatchReport, DispatchService, SendOutcome};
pub use import_service::ImportService;
pub use session_service::{Notice, NoticeLevel, SessionService, SessionSettings};
pub use status_poller::{PollOutcome, StatusPoller};
