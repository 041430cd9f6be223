//! Process configuration, read once from the environment at startup.
//!
//! | Variable               | Default    |
//! |------------------------|------------|
//! | `BACKEND_HOST`         | `0.0.0.0`  |
//! | `BACKEND_PORT`         | `3001`     |
//! | `REDIS_URL`            | unset: in-memory store |
//! | `STORE_TIMEOUT_MS`     | `2000`     |
//! | `CORS_ALLOWED_ORIGINS` | local dev origins |

use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::middleware::cors::parse_origins;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub store_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store: StoreBackend::Memory,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var("BACKEND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match var("BACKEND_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                AppError::config(format!("BACKEND_PORT must be a valid port number, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        let store = match var("REDIS_URL") {
            Some(url) => StoreBackend::Redis { url },
            None => StoreBackend::Memory,
        };

        let timeout_ms = match var("STORE_TIMEOUT_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(AppError::config(format!(
                        "STORE_TIMEOUT_MS must be a positive integer, got '{raw}'"
                    )))
                }
            },
            None => DEFAULT_STORE_TIMEOUT_MS,
        };

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            store,
            store_timeout: Duration::from_millis(timeout_ms),
            cors_allowed_origins,
        })
    }
}
