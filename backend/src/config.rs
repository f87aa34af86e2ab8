//! Environment-driven configuration.

use crate::pipeline::MAX_UPLOAD_BYTES;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_PATH: &str = "sites.sqlite";
pub const DEFAULT_JOB_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be greater than 0")]
    Zero { key: &'static str },

    #[error("SITES_MAX_UPLOAD_BYTES cannot exceed 10 MiB")]
    UploadLimitTooHigh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Upload ceiling in bytes. Can be lowered, never raised above 10 MiB.
    pub max_upload_bytes: usize,
    pub job_channel_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            job_channel_capacity: DEFAULT_JOB_CHANNEL_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads `SITES_*` variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            host: lookup("SITES_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "SITES_PORT", defaults.port)?,
            database_path: lookup("SITES_DATABASE_PATH").unwrap_or(defaults.database_path),
            max_upload_bytes: parse_or(&lookup, "SITES_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            job_channel_capacity: parse_or(
                &lookup,
                "SITES_JOB_CHANNEL_CAPACITY",
                defaults.job_channel_capacity,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Zero { key: "SITES_PORT" });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Zero {
                key: "SITES_MAX_UPLOAD_BYTES",
            });
        }
        if self.max_upload_bytes > MAX_UPLOAD_BYTES {
            return Err(ConfigError::UploadLimitTooHigh);
        }
        if self.job_channel_capacity == 0 {
            return Err(ConfigError::Zero {
                key: "SITES_JOB_CHANNEL_CAPACITY",
            });
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
