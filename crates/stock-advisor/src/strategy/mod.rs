//! Forecasting Strategies
//!
//! Two interchangeable ways of turning a price history into advice:
//!
//! - [`TrendStrategy`]: least-squares trend, one day ahead (default)
//! - [`TechnicalStrategy`]: 20/50 moving-average crossover plus RSI(10)
//!
//! They have different input needs (the technical one wants 50 bars and
//! works in native units) and different outputs, so each keeps its own
//! contract behind the shared [`ForecastStrategy`] trait.

mod technical;
mod trend;

pub use technical::{TechnicalReport, TechnicalStrategy};
pub use trend::{ForecastEngine, TrendFit, TrendStrategy};

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ExchangeRate, Forecast, QuoteSeries};

/// Output of a strategy
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum Recommendation {
    Trend(Forecast),
    Technical(TechnicalReport),
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trend(forecast) => forecast.fmt(f),
            Self::Technical(report) => report.fmt(f),
        }
    }
}

/// A way of producing a recommendation from history
pub trait ForecastStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether `evaluate` looks at the exchange rate at all
    fn uses_exchange_rate(&self) -> bool {
        true
    }

    fn evaluate(&self, ticker: &str, series: &QuoteSeries, rate: ExchangeRate) -> Result<Recommendation>;
}

/// Strategy selector used by configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Trend,
    Technical,
}

impl StrategyKind {
    pub fn build(self) -> Arc<dyn ForecastStrategy> {
        match self {
            Self::Trend => Arc::new(TrendStrategy::default()),
            Self::Technical => Arc::new(TechnicalStrategy::default()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Technical => "technical",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trend" | "regression" => Ok(Self::Trend),
            "technical" | "ma-rsi" => Ok(Self::Technical),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
