//! Runtime configuration.
//!
//! Values come from an optional `settings.toml` with environment variables
//! layered on top, so deployments configure everything through
//! `DATABASE_URL`, `PORT`, `JWT_SECRET`, `CORS_ORIGINS` (comma-separated)
//! and `RATE_API_URL`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address; defaults to all interfaces.
    #[serde(default)]
    pub bind: Option<String>,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
    /// Comma-separated allowed origins.
    #[serde(default)]
    pub cors_origins: Option<String>,
    #[serde(default = "default_rate_api_url")]
    pub rate_api_url: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database_url() -> String {
    "sqlite:./bilancio.db?mode=rwc".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_jwt_secret() -> String {
    "change-me-to-a-random-32-char-string".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    7 * 24 * 60
}

fn default_rate_api_url() -> String {
    engine::DEFAULT_RATE_API.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or("http://localhost:5173,http://127.0.0.1:5173")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    }
}
