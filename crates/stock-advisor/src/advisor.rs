//! Stock Advisor
//!
//! The forecast pipeline behind the dialogue layer:
//!
//! ```text
//!  ticker ──▶ RateProvider ──▶ MarketDataProvider ──▶ ForecastStrategy ──▶ reply
//!             (INR or neutral)  (primary → secondary)   (trend | technical)
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tickr_core::intent::normalize_ticker;
use tickr_core::{ForecastError, ForecastService};

use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::fx::{FixedRate, RateProvider};
use crate::market_data::MarketDataProvider;
use crate::model::ExchangeRate;
use crate::source::{AlphaVantageClient, StaticSource, YahooFinanceClient};
use crate::strategy::{ForecastStrategy, Recommendation, StrategyKind};

pub struct StockAdvisor {
    market: MarketDataProvider,
    rates: Arc<dyn RateProvider>,
    strategy: Arc<dyn ForecastStrategy>,
}

impl StockAdvisor {
    pub fn new(
        market: MarketDataProvider,
        rates: Arc<dyn RateProvider>,
        strategy: Arc<dyn ForecastStrategy>,
    ) -> Self {
        Self {
            market,
            rates,
            strategy,
        }
    }

    /// Wire up the live sources described by `config`
    ///
    /// Alpha Vantage serves as both the secondary source and the exchange
    /// rate provider.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        if config.offline {
            tracing::info!("Offline mode: serving synthetic demo data");
            return Ok(Self::offline(config.strategy, ExchangeRate::Unavailable));
        }

        let primary = Arc::new(YahooFinanceClient::new(&config.yahoo_url, config.primary_timeout)?);
        let alpha_vantage = Arc::new(
            AlphaVantageClient::new(&config.alpha_vantage_url, &config.alpha_vantage_key)
                .with_timeouts(config.secondary_timeout, config.rate_timeout),
        );
        if config.uses_demo_key() {
            tracing::warn!("ALPHA_VANTAGE_API_KEY not set; using the rate-limited public demo key");
        }

        let market = MarketDataProvider::new(primary, alpha_vantage.clone()).with_backoff(config.failover_backoff);
        Ok(Self::new(market, alpha_vantage, config.strategy.build()))
    }

    /// Load configuration from the environment and wire up live sources
    pub fn from_env() -> Result<Self> {
        Self::from_config(&AdvisorConfig::from_env()?)
    }

    /// Network-free advisor over synthetic demo data
    pub fn offline(strategy: StrategyKind, rate: ExchangeRate) -> Self {
        let market = MarketDataProvider::new(
            Arc::new(StaticSource::demo("Demo data")),
            Arc::new(StaticSource::new("Demo fallback")),
        )
        .with_backoff(Duration::ZERO);
        Self::new(market, Arc::new(FixedRate(rate)), strategy.build())
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Run the whole pipeline and return the structured result
    pub async fn recommend(&self, raw_ticker: &str) -> tickr_core::Result<Recommendation> {
        let ticker = normalize_ticker(raw_ticker);

        let rate = if self.strategy.uses_exchange_rate() {
            let rate = self.rates.fetch_rate().await;
            if !rate.is_available() {
                tracing::warn!(%ticker, provider = self.rates.name(), "Exchange rate unavailable, reporting in USD");
            }
            rate
        } else {
            ExchangeRate::Unavailable
        };

        let series = self.market.fetch_series(&ticker).await?;

        self.strategy
            .evaluate(&ticker, &series, rate)
            .map_err(|e| match e {
                AdvisorError::InsufficientData(reason) => ForecastError::insufficient(&ticker, reason),
                other => ForecastError::insufficient(&ticker, other.to_string()),
            })
    }
}

#[async_trait]
impl ForecastService for StockAdvisor {
    async fn forecast(&self, ticker: &str) -> tickr_core::Result<String> {
        let recommendation = self.recommend(ticker).await?;
        tracing::info!(ticker = %normalize_ticker(ticker), strategy = self.strategy.name(), "Forecast ready");
        Ok(recommendation.to_string())
    }

    fn name(&self) -> &str {
        "stock-advisor"
    }
}
