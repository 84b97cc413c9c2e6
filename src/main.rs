//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use bulk_sms::adapters::gateway::{GatewayCredentials, HttpSmsGateway, MockSmsGateway};
use bulk_sms::adapters::import::FileContactSource;
use bulk_sms::adapters::persistence::SnapshotJson;
use bulk_sms::adapters::ui::tui::TuiInputPort;
use bulk_sms::ports::{ContactSourcePort, InputPort, SmsGateway, SnapshotPort};
use bulk_sms::shared::config::AppConfig;
use bulk_sms::usecases::{ImportService, SessionService, SessionSettings};
use chrono::FixedOffset;
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Snapshot file name inside the data directory.
const SNAPSHOT_FILE: &str = "bulk_sms_state.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    bulk_sms::adapters::ui::init_ui();

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "invalid configuration, using defaults");
            AppConfig::default()
        }
    };
    let validator = cfg
        .phone_validator()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(country_code = %validator.country_code(), "phone validator ready");

    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let snapshot_path = data_path.join(SNAPSHOT_FILE);
    info!(path = %snapshot_path.display(), "session snapshot");

    // --- Gateway ---
    let gateway: Arc<dyn SmsGateway> = if cfg.is_gateway_configured() {
        let base_url = cfg.api_url().unwrap_or_default();
        info!(url = %base_url, "using HTTP SMS gateway");
        Arc::new(
            HttpSmsGateway::new(
                base_url,
                GatewayCredentials {
                    user: cfg.user().unwrap_or_default(),
                    password: cfg.password().unwrap_or_default(),
                    sender_id: cfg.sender_id().unwrap_or_default(),
                },
                cfg.country_code_or_default(),
                Duration::from_secs(cfg.request_timeout_secs_or_default()),
            )
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        )
    } else {
        warn!("SMS gateway credentials not set (SMS_API_URL, SMS_USER, SMS_PASSWORD), using mock gateway");
        Arc::new(MockSmsGateway::new())
    };

    // --- Polling / receipt window ---
    let offset_hours = cfg.gateway_utc_offset_hours_or_default();
    let gateway_offset = FixedOffset::east_opt(offset_hours * 3600)
        .ok_or_else(|| anyhow::anyhow!("gateway_utc_offset_hours out of range: {}", offset_hours))?;
    let poll_interval_secs = cfg.poll_interval_secs_or_default();
    info!(
        poll_interval_secs,
        lookback_minutes = cfg.dlr_lookback_minutes_or_default(),
        "delivery status polling"
    );
    let settings = SessionSettings {
        poll_interval: Duration::from_secs(poll_interval_secs),
        dlr_lookback: chrono::Duration::minutes(cfg.dlr_lookback_minutes_or_default()),
        gateway_offset,
        default_template: cfg.default_template_or_default(),
    };

    // --- Services ---
    let source: Arc<dyn ContactSourcePort> = Arc::new(FileContactSource::new());
    let snapshot: Arc<dyn SnapshotPort> = Arc::new(SnapshotJson::new(&snapshot_path));
    let session = SessionService::new(
        ImportService::new(source, validator),
        gateway,
        snapshot,
        settings,
    );
    session.restore().await;

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(Arc::clone(&session)));
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("bye");
    Ok(())
}
