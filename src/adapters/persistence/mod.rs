//! Persistence adapters.

pub mod snapshot_json;

pub use snapshot_json::SnapshotJson;
