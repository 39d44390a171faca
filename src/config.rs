//! Service configuration.
//!
//! Loaded from environment variables (after `.env` is applied by `main`) with
//! fallback to defaults. Only `DATABASE_URL` is mandatory.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::db::RetryPolicy;
use crate::domain::render::{DEFAULT_LINE_WIDTH, MAX_LINE_WIDTH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Write receipt text below a local directory.
    Local {
        dir: PathBuf,
        public_base_url: String,
    },
    /// PUT receipt text to an HTTP object store.
    Http {
        endpoint: String,
        bucket: String,
        public_base_url: String,
        api_token: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_retry: RetryPolicy,
    pub receipt_line_width: usize,
    /// Overrides the merchant name printed at the top of receipts.
    pub merchant_name: Option<String>,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url =
            get("DATABASE_URL").ok_or_else(|| ConfigError::MissingRequired("DATABASE_URL".into()))?;

        let default_retry = RetryPolicy::default();
        let db_retry = RetryPolicy {
            max_attempts: parse_or(&get, "DB_CONNECT_MAX_RETRIES", default_retry.max_attempts)?,
            initial_backoff: Duration::from_millis(parse_or(
                &get,
                "DB_CONNECT_INITIAL_BACKOFF_MS",
                default_retry.initial_backoff.as_millis() as u64,
            )?),
            ..default_retry
        };

        let receipt_line_width = parse_or(&get, "RECEIPT_LINE_WIDTH", DEFAULT_LINE_WIDTH)?;
        if receipt_line_width == 0 || receipt_line_width > MAX_LINE_WIDTH {
            return Err(ConfigError::InvalidValue("RECEIPT_LINE_WIDTH".into()));
        }

        let public_base_url = get("STORAGE_PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8080/files".to_string());
        let storage = match get("STORAGE_BACKEND").as_deref().unwrap_or("local") {
            "local" => StorageConfig::Local {
                dir: get("STORAGE_LOCAL_DIR")
                    .unwrap_or_else(|| "./receipts-storage".to_string())
                    .into(),
                public_base_url,
            },
            "http" => StorageConfig::Http {
                endpoint: get("STORAGE_ENDPOINT")
                    .ok_or_else(|| ConfigError::MissingRequired("STORAGE_ENDPOINT".into()))?,
                bucket: get("STORAGE_BUCKET")
                    .ok_or_else(|| ConfigError::MissingRequired("STORAGE_BUCKET".into()))?,
                public_base_url,
                api_token: get("STORAGE_API_TOKEN"),
            },
            _ => return Err(ConfigError::InvalidValue("STORAGE_BACKEND".into())),
        };

        Ok(AppConfig {
            database_url,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 8080)?,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10)?,
            db_retry,
            receipt_line_width,
            merchant_name: get("RECEIPT_MERCHANT_NAME"),
            storage,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
