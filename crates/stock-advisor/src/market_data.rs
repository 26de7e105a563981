//! Market Data Provider
//!
//! Fetches a daily history with failover:
//!
//! ```text
//!  TICKER ──▶ primary: TICKER.NS ──empty/err──▶ primary: TICKER.BO
//!                  │ ok                              │ ok   │ empty/err
//!                  ▼                                 ▼      ▼
//!               series                            series  sleep(backoff)
//!                                                           │
//!                                     secondary: NSE:TICKER ┘──▶ series | NotFound
//! ```
//!
//! Individual source failures are logged and absorbed; the caller only sees
//! a series or `NotFound`.

use std::sync::Arc;
use std::time::Duration;

use tickr_core::ForecastError;
use tickr_core::intent::normalize_ticker;

use crate::model::QuoteSeries;
use crate::source::QuoteSource;
use crate::ticker::MarketConventions;

pub struct MarketDataProvider {
    primary: Arc<dyn QuoteSource>,
    secondary: Arc<dyn QuoteSource>,
    conventions: MarketConventions,
    backoff: Duration,
}

impl MarketDataProvider {
    pub fn new(primary: Arc<dyn QuoteSource>, secondary: Arc<dyn QuoteSource>) -> Self {
        Self {
            primary,
            secondary,
            conventions: MarketConventions::default(),
            backoff: Duration::from_secs(1),
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Names of the configured sources, primary first
    pub fn source_names(&self) -> Vec<String> {
        vec![self.primary.name().to_owned(), self.secondary.name().to_owned()]
    }

    /// Fetch a non-empty, date-ascending series for `raw_ticker`
    pub async fn fetch_series(&self, raw_ticker: &str) -> tickr_core::Result<QuoteSeries> {
        let ticker = normalize_ticker(raw_ticker);

        for symbol in self.conventions.primary_candidates(&ticker) {
            if let Some(series) = attempt(self.primary.as_ref(), &ticker, &symbol).await {
                return Ok(series);
            }
        }

        tracing::info!(
            %ticker,
            primary = self.primary.name(),
            secondary = self.secondary.name(),
            backoff_ms = u64::try_from(self.backoff.as_millis()).unwrap_or(u64::MAX),
            "Primary source failed, falling back"
        );
        tokio::time::sleep(self.backoff).await;

        let symbol = self.conventions.secondary_symbol(&ticker);
        if let Some(series) = attempt(self.secondary.as_ref(), &ticker, &symbol).await {
            return Ok(series);
        }

        tracing::warn!(%ticker, "No source returned a usable series");
        Err(ForecastError::not_found(ticker, self.source_names()))
    }
}

/// One request to one source; `None` on any kind of failure
async fn attempt(source: &dyn QuoteSource, ticker: &str, symbol: &str) -> Option<QuoteSeries> {
    match source.fetch_daily(symbol).await {
        Ok(series) if !series.is_empty() => {
            tracing::info!(%ticker, %symbol, source = source.name(), bars = series.len(), "Fetched daily series");
            Some(series)
        }
        Ok(_) => {
            tracing::debug!(%ticker, %symbol, source = source.name(), "Source returned no rows");
            None
        }
        Err(e) => {
            tracing::debug!(%ticker, %symbol, source = source.name(), error = %e, "Source attempt failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use chrono::NaiveDate;

    fn series() -> QuoteSeries {
        QuoteSeries::from_closes(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), &[10.0, 11.0, 12.0])
    }

    fn provider(primary: &Arc<StaticSource>, secondary: &Arc<StaticSource>) -> MarketDataProvider {
        MarketDataProvider::new(primary.clone(), secondary.clone()).with_backoff(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_first_suffix_hit_skips_everything_else() {
        let primary = Arc::new(StaticSource::new("primary").with_series("TCS.NS", series()));
        let secondary = Arc::new(StaticSource::new("secondary").with_series("NSE:TCS", series()));

        let got = provider(&primary, &secondary).fetch_series("tcs").await.unwrap();

        assert_eq!(got, series());
        assert_eq!(primary.calls(), vec!["TCS.NS"]);
        assert!(secondary.calls().is_empty());
    }

    #[tokio::test]
    async fn test_second_suffix_tried_before_failover() {
        let primary = Arc::new(StaticSource::new("primary").with_series("TCS.BO", series()));
        let secondary = Arc::new(StaticSource::new("secondary"));

        provider(&primary, &secondary).fetch_series("TCS").await.unwrap();

        assert_eq!(primary.calls(), vec!["TCS.NS", "TCS.BO"]);
        assert!(secondary.calls().is_empty());
    }

    #[tokio::test]
    async fn test_suffixed_ticker_gets_one_primary_attempt() {
        let primary = Arc::new(StaticSource::new("primary"));
        let secondary = Arc::new(StaticSource::new("secondary").with_series("NSE:TCS.BO", series()));

        provider(&primary, &secondary).fetch_series("tcs.bo").await.unwrap();

        assert_eq!(primary.calls(), vec!["TCS.BO"]);
        assert_eq!(secondary.calls(), vec!["NSE:TCS.BO"]);
    }

    #[tokio::test]
    async fn test_primary_outage_fails_over_with_prefix() {
        let primary = Arc::new(StaticSource::new("primary").down());
        let secondary = Arc::new(StaticSource::new("secondary").with_series("NSE:INFY", series()));

        let got = provider(&primary, &secondary).fetch_series(" infy ").await.unwrap();

        assert_eq!(got.len(), 3);
        assert_eq!(primary.calls(), vec!["INFY.NS", "INFY.BO"]);
        assert_eq!(secondary.calls(), vec!["NSE:INFY"]);
    }

    #[tokio::test]
    async fn test_prefixed_ticker_kept_for_secondary() {
        let primary = Arc::new(StaticSource::new("primary"));
        let secondary = Arc::new(StaticSource::new("secondary").with_series("BSE:500325", series()));

        provider(&primary, &secondary).fetch_series("BSE:500325").await.unwrap();

        assert_eq!(secondary.calls(), vec!["BSE:500325"]);
    }

    #[tokio::test]
    async fn test_not_found_only_after_every_attempt() {
        let primary = Arc::new(StaticSource::new("primary"));
        let secondary = Arc::new(StaticSource::new("secondary").down());

        let err = provider(&primary, &secondary).fetch_series("zzzz").await.unwrap_err();

        assert_eq!(primary.calls(), vec!["ZZZZ.NS", "ZZZZ.BO"]);
        assert_eq!(secondary.calls(), vec!["NSE:ZZZZ"]);
        assert_eq!(err, ForecastError::not_found("ZZZZ", ["primary", "secondary"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_precedes_secondary_query() {
        let primary = Arc::new(StaticSource::new("primary").down());
        let secondary = Arc::new(StaticSource::new("secondary").with_series("NSE:INFY", series()));
        let provider = MarketDataProvider::new(primary, secondary.clone()).with_backoff(Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        provider.fetch_series("INFY").await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(secondary.calls(), vec!["NSE:INFY"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_backoff_when_primary_answers() {
        let primary = Arc::new(StaticSource::new("primary").with_series("INFY.NS", series()));
        let secondary = Arc::new(StaticSource::new("secondary"));
        let provider = MarketDataProvider::new(primary, secondary.clone()).with_backoff(Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        provider.fetch_series("INFY").await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(secondary.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_waits_out_backoff() {
        let primary = Arc::new(StaticSource::new("primary"));
        let secondary = Arc::new(StaticSource::new("secondary"));
        let provider = MarketDataProvider::new(primary, secondary).with_backoff(Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        let err = provider.fetch_series("ZZZZ").await.unwrap_err();

        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(err, ForecastError::not_found("ZZZZ", ["primary", "secondary"]));
    }
}
