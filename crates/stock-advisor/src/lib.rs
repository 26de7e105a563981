//! # stock-advisor
//!
//! Next-day stock forecasts for NSE/BSE tickers, with failover between two
//! market-data sources and optional USD→INR normalization.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StockAdvisor (ForecastService)                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  1. RateProvider      USD→INR, or Unavailable (factor 1.0)   │
//! │  2. MarketDataProvider                                       │
//! │       Yahoo  TICKER.NS → TICKER.BO                           │
//! │       ── 1s backoff ──                                       │
//! │       Alpha Vantage  NSE:TICKER                              │
//! │  3. ForecastStrategy                                         │
//! │       trend      OLS on day index, predict day N             │
//! │       technical  SMA 20/50 crossover + RSI(10)               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Source and rate failures never escape: they degrade to the next source
//! or to native currency. Only `NotFound` and `InsufficientData` reach the
//! dialogue layer, as [`tickr_core::ForecastError`].

pub mod advisor;
pub mod config;
pub mod error;
pub mod fx;
pub mod market_data;
pub mod model;
pub mod source;
pub mod strategy;
pub mod ticker;

pub use advisor::StockAdvisor;
pub use config::AdvisorConfig;
pub use error::{AdvisorError, Result};
pub use fx::{FixedRate, RateProvider};
pub use market_data::MarketDataProvider;
pub use model::{Currency, DailyBar, Decision, ExchangeRate, Forecast, QuoteSeries};
pub use source::{AlphaVantageClient, QuoteSource, StaticSource, YahooFinanceClient};
pub use strategy::{ForecastEngine, ForecastStrategy, Recommendation, StrategyKind, TechnicalReport};
pub use ticker::MarketConventions;
