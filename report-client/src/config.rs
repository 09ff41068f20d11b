use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;
use serde::Deserialize;

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000/caption";

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// Full URL of the relay's caption route.
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_relay_url() -> String {
    DEFAULT_RELAY_URL.to_string()
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Read `REPORT_CLIENT_*` variables, e.g. `REPORT_CLIENT_RELAY_URL`.
pub fn get_configuration() -> Result<ClientSettings, config::ConfigError> {
    dotenvy::dotenv().ok();

    config::Config::builder()
        .add_source(
            config::Environment::with_prefix("REPORT_CLIENT")
                .prefix_separator("_")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<ClientSettings>()
}
