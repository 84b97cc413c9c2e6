//! bulk-sms: Import a contact list, classify numbers by carrier, send templated SMS
//! through a gateway and track delivery receipts. Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
