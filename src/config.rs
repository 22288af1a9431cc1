//! Configuration loader for the `skycast` dashboard service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional `u16` environment variable with a default value.
macro_rules! parse_env_u16 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional URL environment variable, dropping any trailing slash.
macro_rules! env_url_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .unwrap_or_else(|_| $default.to_string())
            .trim_end_matches('/')
            .to_string()
    };
}

pub const DEFAULT_PREDICTION_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ARCHIVE_API_URL: &str = "https://archive-api.open-meteo.com";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Base URL of the prediction service (`/predict`, `/feature-importance`).
    pub prediction_api_url: String,

    /// Base URL of the daily weather archive (`/v1/archive`).
    pub archive_api_url: String,

    /// Port the dashboard API listens on.
    pub bind_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `PREDICTION_API_URL` – prediction service (default: `http://127.0.0.1:8000`)
/// - `ARCHIVE_API_URL` – weather archive (default: `https://archive-api.open-meteo.com`)
/// - `BIND_PORT` – listening port (default: 8080)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let prediction_api_url = env_url_or!("PREDICTION_API_URL", DEFAULT_PREDICTION_API_URL);
    let archive_api_url = env_url_or!("ARCHIVE_API_URL", DEFAULT_ARCHIVE_API_URL);
    let bind_port = parse_env_u16!("BIND_PORT", 8080);

    if prediction_api_url.is_empty() || archive_api_url.is_empty() {
        return Err(anyhow!(
            "PREDICTION_API_URL and ARCHIVE_API_URL must not be empty"
        ));
    }

    Ok(Config {
        prediction_api_url,
        archive_api_url,
        bind_port,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  PREDICTION_API_URL : {}", self.prediction_api_url);
        tracing::info!("  ARCHIVE_API_URL    : {}", self.archive_api_url);
        tracing::info!("  BIND_PORT          : {}", self.bind_port);
    }
}
