//! Error Types for Stock Advisor
//!
//! These stay inside the crate. Source and rate failures are absorbed by
//! the failover logic; only `tickr_core::ForecastError` leaves the pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed response from {source_name}: {detail}")]
    Malformed { source_name: String, detail: String },

    #[error("{source_name} reported an error: {message}")]
    Upstream { source_name: String, message: String },

    #[error("{source_name} returned no rows for {symbol}")]
    Empty { source_name: String, symbol: String },

    #[error("Exchange rate unavailable: {0}")]
    Unavailable(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AdvisorError {
    pub fn malformed(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Malformed {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    pub fn upstream(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn empty(source_name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::Empty {
            source_name: source_name.into(),
            symbol: symbol.into(),
        }
    }
}
