use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::errors::{ClientError, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub state_dir: PathBuf,

    // Query cache
    pub stale_time: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,

    pub display_precision: usize,
    pub export_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let api_base = env::var("PAYROLL_API_BASE")
            .map_err(|_| ClientError::Config("PAYROLL_API_BASE must be set".to_string()))?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            state_dir: env::var("PAYROLL_STATE_DIR")
                .unwrap_or_else(|_| ".payroll-console".to_string())
                .into(),
            stale_time: Duration::from_secs(parse_var("PAYROLL_STALE_SECS", 30)?),
            cache_ttl: Duration::from_secs(parse_var("PAYROLL_CACHE_TTL_SECS", 300)?),
            cache_capacity: parse_var("PAYROLL_CACHE_CAPACITY", 1_000)?,
            display_precision: parse_var("PAYROLL_DISPLAY_PRECISION", 1)?,
            export_dir: env::var("PAYROLL_EXPORT_DIR")
                .unwrap_or_else(|_| ".".to_string())
                .into(),
            log_dir: env::var("PAYROLL_LOG_DIR")
                .unwrap_or_else(|_| "logs".to_string())
                .into(),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Defaults for everything but the backend address.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            state_dir: ".payroll-console".into(),
            stale_time: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1_000,
            display_precision: 1,
            export_dir: ".".into(),
            log_dir: "logs".into(),
            log_level: "info".to_string(),
        }
    }

    pub fn tracing_level(&self) -> tracing::Level {
        tracing::Level::from_str(&self.log_level).unwrap_or(tracing::Level::INFO)
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ClientError::Config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::with_api_base("http://localhost:8080");
        assert_eq!(config.stale_time, Duration::from_secs(30));
        assert_eq!(config.display_precision, 1);
        assert_eq!(config.tracing_level(), tracing::Level::INFO);
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let mut config = Config::with_api_base("http://localhost:8080");
        config.log_level = "chatty".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::INFO);

        config.log_level = "debug".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::DEBUG);
    }
}
