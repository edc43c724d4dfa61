//! Configuration module
//!
//! This module provides configuration structures for the worker and services,
//! including database settings and scheduling trigger cadence.

use std::env;

use crate::error::AppError;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SCHEDULER_TICK_INTERVAL_SECS: u64 = 3600;
const SCHEDULER_MAX_CONFLICT_RETRIES: u32 = 3;
const DEFAULT_PLATFORM: &str = "instagram";

/// Base configuration shared by all components
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

impl BaseConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::InvalidInput("DATABASE_URL must be set".to_string()))?;

        Ok(Self {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", MAX_CONNECTIONS)?,
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS)?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }
}

/// Worker configuration (recurring scheduling trigger)
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub base: BaseConfig,
    /// Interval in seconds between scheduling sweeps over users with pending posts.
    pub scheduler_tick_interval_secs: u64,
    /// Maximum retries per user when a run hits a transaction conflict.
    pub scheduler_max_conflict_retries: u32,
    /// Platform tag stamped on posts created from groupings.
    pub default_platform: String,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            base: BaseConfig::from_env()?,
            scheduler_tick_interval_secs: env_parse(
                "SCHEDULER_TICK_INTERVAL_SECS",
                SCHEDULER_TICK_INTERVAL_SECS,
            )?,
            scheduler_max_conflict_retries: env_parse(
                "SCHEDULER_MAX_CONFLICT_RETRIES",
                SCHEDULER_MAX_CONFLICT_RETRIES,
            )?,
            default_platform: env::var("DEFAULT_PLATFORM")
                .unwrap_or_else(|_| DEFAULT_PLATFORM.to_string()),
        })
    }
}

/// Parse an env var with a default, surfacing unparseable values instead of
/// silently falling back.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| AppError::InvalidInput(format!("{} is not a valid value for {}", raw, key))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_default_when_unset() {
        std::env::remove_var("POSTFLOW_TEST_UNSET");
        let v: u32 = env_parse("POSTFLOW_TEST_UNSET", 7).unwrap();
        assert_eq!(v, 7);
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        std::env::set_var("POSTFLOW_TEST_GARBAGE", "not-a-number");
        let v: Result<u32, _> = env_parse("POSTFLOW_TEST_GARBAGE", 7);
        assert!(v.is_err());
        std::env::remove_var("POSTFLOW_TEST_GARBAGE");
    }
}
