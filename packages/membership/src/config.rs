use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::limits::{Limits, DEFAULT_MAX_EVENT, DEFAULT_MAX_QUEUE, DEFAULT_MAX_TRADE};

/// Default seconds between expiration sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Tracker configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub limits: Limits,
    pub sweep_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Missing keys fall back to defaults; present keys must parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let limits = Limits {
            max_event: parse_or(&lookup, "MEMBERSHIP_MAX_EVENT", DEFAULT_MAX_EVENT)?,
            max_queue: parse_or(&lookup, "MEMBERSHIP_MAX_QUEUE", DEFAULT_MAX_QUEUE)?,
            max_trade: parse_or(&lookup, "MEMBERSHIP_MAX_TRADE", DEFAULT_MAX_TRADE)?,
        };

        let interval_secs = parse_or(
            &lookup,
            "MEMBERSHIP_SWEEP_INTERVAL_SECS",
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?;
        if interval_secs == 0 {
            bail!("MEMBERSHIP_SWEEP_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            limits,
            sweep_interval: Duration::from_secs(interval_secs),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
