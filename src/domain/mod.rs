//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod importer;
pub mod phone;
pub mod template;

pub use entities::{
    Contact, ContactStatus, DispatchRun, INVALID_TAG, ImportResult, Operator, OperatorFilter,
    RawTable, SessionState,
};
pub use errors::DomainError;
pub use phone::{CarrierRule, CarrierTable, PhoneCheck, PhoneValidator};
pub use template::TemplateIssue;
