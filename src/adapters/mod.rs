//! Infrastructure adapters. Implement outbound ports.
//!
//! SMS gateway, contact files, session snapshot, terminal UI. Map errors to DomainError.

pub mod gateway;
pub mod import;
pub mod persistence;
pub mod ui;
