//! SMS gateway adapters. Implement SmsGateway.
//!
//! HTTP client for the real gateway and a mock for offline use.

pub mod http_gateway;
pub mod mock_gateway;

pub use http_gateway::{GatewayCredentials, HttpSmsGateway};
pub use mock_gateway::MockSmsGateway;
