use anyhow::{Context, Result, anyhow};
use chrono::Duration;

use crate::application::reaper::{DEFAULT_INTERVAL_SECS, DEFAULT_TICK_TIMEOUT_SECS, ReaperConfig};
use crate::domain::expiry::{DEFAULT_TTL_HOURS, ExpiryPolicy};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub log_level: String,
    pub post_ttl_hours: i64,
    pub reaper_interval_secs: u64,
    pub reaper_tick_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://vanish.db".to_string());
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());

        let post_ttl_hours = parse_i64_env("POST_TTL_HOURS", DEFAULT_TTL_HOURS)?;
        let reaper_interval_secs = parse_u64_env("REAPER_INTERVAL_SECS", DEFAULT_INTERVAL_SECS)?;
        let reaper_tick_timeout_secs =
            parse_u64_env("REAPER_TICK_TIMEOUT_SECS", DEFAULT_TICK_TIMEOUT_SECS)?;

        Ok(Self {
            database_url,
            log_level,
            post_ttl_hours,
            reaper_interval_secs,
            reaper_tick_timeout_secs,
        })
    }

    /// The one TTL shared by feeds, search, replies, the remaining-time API,
    /// and the reaper.
    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::new(Duration::hours(self.post_ttl_hours))
    }

    pub fn reaper_config(&self) -> ReaperConfig {
        ReaperConfig {
            interval: std::time::Duration::from_secs(self.reaper_interval_secs),
            tick_timeout: std::time::Duration::from_secs(self.reaper_tick_timeout_secs),
        }
    }
}

fn parse_i64_env(key: &str, default: i64) -> Result<i64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<i64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value <= 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
