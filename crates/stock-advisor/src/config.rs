//! Advisor Configuration
//!
//! Read from the environment with sensible defaults. Binaries call
//! `dotenvy::dotenv()` first so a `.env` file works too.

use std::time::Duration;

use crate::error::{AdvisorError, Result};
use crate::strategy::StrategyKind;

pub const DEFAULT_ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";

/// Alpha Vantage's public key; rate-limited, but keeps failover working
pub const DEFAULT_ALPHA_VANTAGE_KEY: &str = "demo";

/// Pipeline configuration
#[derive(Clone, Debug)]
pub struct AdvisorConfig {
    /// Alpha Vantage key for the secondary source and the exchange rate
    pub alpha_vantage_key: String,

    /// Alpha Vantage query endpoint
    pub alpha_vantage_url: String,

    /// Yahoo Finance host
    pub yahoo_url: String,

    /// Exchange-rate request timeout
    pub rate_timeout: Duration,

    /// Primary (Yahoo) request timeout
    pub primary_timeout: Duration,

    /// Secondary (Alpha Vantage) request timeout
    pub secondary_timeout: Duration,

    /// Pause between giving up on the primary source and asking the secondary
    pub failover_backoff: Duration,

    /// Which forecasting strategy answers requests
    pub strategy: StrategyKind,

    /// Serve synthetic demo data instead of calling any service
    pub offline: bool,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_key: DEFAULT_ALPHA_VANTAGE_KEY.into(),
            alpha_vantage_url: DEFAULT_ALPHA_VANTAGE_URL.into(),
            yahoo_url: DEFAULT_YAHOO_URL.into(),
            rate_timeout: Duration::from_secs(5),
            primary_timeout: Duration::from_secs(10),
            secondary_timeout: Duration::from_secs(10),
            failover_backoff: Duration::from_secs(1),
            strategy: StrategyKind::Trend,
            offline: false,
        }
    }
}

impl AdvisorConfig {
    /// Load from environment variables
    ///
    /// Unparseable numbers fall back to their defaults; an unknown
    /// `TICKR_STRATEGY` is a configuration error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let strategy = match std::env::var("TICKR_STRATEGY") {
            Ok(value) => value
                .parse()
                .map_err(|_| AdvisorError::Config(format!("unknown TICKR_STRATEGY '{value}'")))?,
            Err(_) => defaults.strategy,
        };

        Ok(Self {
            alpha_vantage_key: std::env::var("ALPHA_VANTAGE_API_KEY")
                .ok()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .unwrap_or(defaults.alpha_vantage_key),
            alpha_vantage_url: std::env::var("ALPHA_VANTAGE_BASE_URL")
                .unwrap_or(defaults.alpha_vantage_url),
            yahoo_url: std::env::var("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_url),
            rate_timeout: env_secs("TICKR_RATE_TIMEOUT_SECS").unwrap_or(defaults.rate_timeout),
            primary_timeout: env_secs("TICKR_PRIMARY_TIMEOUT_SECS")
                .unwrap_or(defaults.primary_timeout),
            secondary_timeout: env_secs("TICKR_SECONDARY_TIMEOUT_SECS")
                .unwrap_or(defaults.secondary_timeout),
            failover_backoff: std::env::var("TICKR_FAILOVER_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map_or(defaults.failover_backoff, Duration::from_millis),
            strategy,
            offline: std::env::var("TICKR_OFFLINE").is_ok_and(|v| is_truthy(&v)),
        })
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Whether the shared public key is in use
    pub fn uses_demo_key(&self) -> bool {
        self.alpha_vantage_key == DEFAULT_ALPHA_VANTAGE_KEY
    }

    pub fn with_failover_backoff(mut self, backoff: Duration) -> Self {
        self.failover_backoff = backoff;
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let config = AdvisorConfig::default();
        assert_eq!(config.rate_timeout, Duration::from_secs(5));
        assert_eq!(config.primary_timeout, Duration::from_secs(10));
        assert_eq!(config.failover_backoff, Duration::from_secs(1));
        assert_eq!(config.strategy, StrategyKind::Trend);
        assert_eq!(config.alpha_vantage_key, DEFAULT_ALPHA_VANTAGE_KEY);
    }

    #[test]
    fn test_builders() {
        let config = AdvisorConfig::default()
            .with_strategy(StrategyKind::Technical)
            .with_failover_backoff(Duration::ZERO);
        assert_eq!(config.strategy, StrategyKind::Technical);
        assert_eq!(config.failover_backoff, Duration::ZERO);
    }

    #[test]
    fn test_truthy_flags() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" True "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}
