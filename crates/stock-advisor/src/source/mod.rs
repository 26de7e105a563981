//! Market Data Sources
//!
//! Abstractions and implementations for daily price-history providers.

mod alpha_vantage;
mod mock;
mod yahoo;

pub use alpha_vantage::AlphaVantageClient;
pub use mock::StaticSource;
pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::QuoteSeries;

/// Daily OHLCV provider (Strategy pattern)
///
/// Implementations return bars already mapped to the unified shape, with
/// dates truncated to calendar days. An empty series must be reported as
/// `AdvisorError::Empty`, never as `Ok`.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the daily history for an exact, source-formatted symbol
    async fn fetch_daily(&self, symbol: &str) -> Result<QuoteSeries>;

    /// Source name, for logs and user-facing apologies
    fn name(&self) -> &str;
}
