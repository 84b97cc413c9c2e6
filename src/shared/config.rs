//! Application configuration. Gateway credentials, paths, polling, carrier table.

use crate::domain::{CarrierTable, DomainError, PhoneValidator, phone::DEFAULT_COUNTRY_CODE};
use serde::Deserialize;

/// Default delay between delivery-receipt polls while messages are pending.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default template offered before the user edits one.
pub const DEFAULT_TEMPLATE: &str =
    "Hello [Name], thank you for being with us. Reply STOP to opt out.";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Gateway base URL (endpoints `/sendsms` and `/filterDLR`). Read from BULK_SMS_API_URL or SMS_API_URL.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,

    /// Country code prepended to national numbers (default 237).
    #[serde(default)]
    pub country_code: Option<String>,

    #[serde(default)]
    pub data_dir: Option<String>,

    /// Status poll interval in seconds (default 10). Read from BULK_SMS_POLL_INTERVAL_SECS.
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,

    /// How far back the delivery-receipt window starts, in minutes (default 60).
    #[serde(default)]
    pub dlr_lookback_minutes: Option<i64>,

    /// Gateway clock offset from UTC in hours (default 0).
    #[serde(default)]
    pub gateway_utc_offset_hours: Option<i32>,

    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub default_template: Option<String>,

    /// Force the offline mock gateway even when credentials are set.
    #[serde(default)]
    pub use_mock_gateway: Option<bool>,

    /// Replaces the built-in carrier table. Only practical from a config file.
    #[serde(default)]
    pub carriers: Option<CarrierTable>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("BULK_SMS"));
        if let Ok(path) = std::env::var("BULK_SMS_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Gateway base URL from config or SMS_API_URL env, without trailing slash.
    pub fn api_url(&self) -> Option<String> {
        self.api_url
            .clone()
            .or_else(|| std::env::var("SMS_API_URL").ok())
            .map(|u| u.trim_end_matches('/').to_string())
    }

    pub fn user(&self) -> Option<String> {
        self.user.clone().or_else(|| std::env::var("SMS_USER").ok())
    }

    pub fn password(&self) -> Option<String> {
        self.password
            .clone()
            .or_else(|| std::env::var("SMS_PASSWORD").ok())
    }

    pub fn sender_id(&self) -> Option<String> {
        self.sender_id
            .clone()
            .or_else(|| std::env::var("SMS_SENDER_ID").ok())
    }

    /// Returns true if the real gateway can be used (URL and credentials present).
    pub fn is_gateway_configured(&self) -> bool {
        !self.use_mock_gateway.unwrap_or(false)
            && self.api_url().is_some()
            && self.user().is_some()
            && self.password().is_some()
    }

    pub fn country_code_or_default(&self) -> String {
        self.country_code
            .clone()
            .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string())
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    pub fn poll_interval_secs_or_default(&self) -> u64 {
        self.poll_interval_secs
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
    }

    pub fn dlr_lookback_minutes_or_default(&self) -> i64 {
        self.dlr_lookback_minutes.unwrap_or(60)
    }

    pub fn gateway_utc_offset_hours_or_default(&self) -> i32 {
        self.gateway_utc_offset_hours.unwrap_or(0)
    }

    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(30)
    }

    pub fn default_template_or_default(&self) -> String {
        self.default_template
            .clone()
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string())
    }

    /// Compile the configured (or built-in) carrier table.
    pub fn phone_validator(&self) -> Result<PhoneValidator, DomainError> {
        let table = self.carriers.clone().unwrap_or_default();
        PhoneValidator::new(&table, &self.country_code_or_default())
    }
}
