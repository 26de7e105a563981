//! Moving Average + RSI
//!
//! Two independent signals over native-unit closes:
//!
//! - 20-day vs 50-day simple moving average (crossover)
//! - RSI(10) with Wilder smoothing: oversold below 30, overbought above 70

use serde::Serialize;

use crate::error::{AdvisorError, Result};
use crate::model::{Decision, ExchangeRate, QuoteSeries};

use super::{ForecastStrategy, Recommendation};

/// Result of the technical strategy
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TechnicalReport {
    pub ticker: String,
    pub short_ma: f64,
    pub long_ma: f64,
    pub crossover: Decision,
    pub rsi: f64,
    pub momentum: Decision,
}

impl std::fmt::Display for TechnicalReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cmp = match self.crossover {
            Decision::Buy => '>',
            Decision::Sell => '<',
            Decision::Hold => '=',
        };
        let zone = match self.momentum {
            Decision::Buy => "oversold",
            Decision::Sell => "overbought",
            Decision::Hold => "neutral",
        };
        writeln!(f, "📊 Technical Analysis for {}", self.ticker)?;
        writeln!(
            f,
            "Moving averages: {} (short MA {:.2} {cmp} long MA {:.2})",
            self.crossover, self.short_ma, self.long_ma
        )?;
        write!(f, "RSI: {} ({:.2}, {zone})", self.momentum, self.rsi)
    }
}

/// Crossover and RSI evaluator
#[derive(Clone, Copy, Debug)]
pub struct TechnicalStrategy {
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_window: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for TechnicalStrategy {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
            rsi_window: 10,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl TechnicalStrategy {
    /// Bars needed before any signal is produced
    pub fn min_history(&self) -> usize {
        self.long_window.max(self.short_window).max(self.rsi_window + 1)
    }

    #[allow(clippy::float_cmp)]
    pub fn analyze(&self, ticker: &str, series: &QuoteSeries) -> Result<TechnicalReport> {
        let need = self.min_history();
        if series.len() < need {
            return Err(AdvisorError::InsufficientData(format!(
                "{} bar(s), need at least {need}",
                series.len()
            )));
        }

        let closes = series.closes();
        let short_ma = trailing_mean(&closes, self.short_window);
        let long_ma = trailing_mean(&closes, self.long_window);
        let rsi = wilder_rsi(&closes, self.rsi_window);

        if ![short_ma, long_ma, rsi].iter().all(|v| v.is_finite()) {
            return Err(AdvisorError::InsufficientData("non-finite indicator".into()));
        }

        let crossover = Decision::from_prediction(short_ma, long_ma);
        let momentum = if rsi < self.oversold {
            Decision::Buy
        } else if rsi > self.overbought {
            Decision::Sell
        } else {
            Decision::Hold
        };

        tracing::debug!(%ticker, short_ma, long_ma, rsi, "Computed indicators");

        Ok(TechnicalReport {
            ticker: ticker.to_string(),
            short_ma,
            long_ma,
            crossover,
            rsi,
            momentum,
        })
    }
}

impl ForecastStrategy for TechnicalStrategy {
    fn name(&self) -> &'static str {
        "technical"
    }

    fn uses_exchange_rate(&self) -> bool {
        false
    }

    fn evaluate(&self, ticker: &str, series: &QuoteSeries, _rate: ExchangeRate) -> Result<Recommendation> {
        self.analyze(ticker, series).map(Recommendation::Technical)
    }
}

/// Mean of the last `window` values
#[allow(clippy::cast_precision_loss)]
fn trailing_mean(values: &[f64], window: usize) -> f64 {
    let tail = &values[values.len().saturating_sub(window)..];
    tail.iter().sum::<f64>() / tail.len() as f64
}

/// RSI with exponential smoothing `alpha = 1 / window`, seeded with the
/// first change
///
/// With no smoothed loss the index is 100 as long as there was any gain.
/// A perfectly flat series has neither, so the `gain / loss` ratio is
/// undefined; it reads as a neutral 50 (momentum Hold) rather than 100,
/// which would flag a motionless stock as overbought.
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
fn wilder_rsi(closes: &[f64], window: usize) -> f64 {
    let alpha = 1.0 / window as f64;
    let mut changes = closes.windows(2).map(|w| w[1] - w[0]);

    let Some(first) = changes.next() else {
        return 50.0;
    };
    let (mut gain, mut loss) = (first.max(0.0), (-first).max(0.0));
    for change in changes {
        gain = (1.0 - alpha) * gain + alpha * change.max(0.0);
        loss = (1.0 - alpha) * loss + alpha * (-change).max(0.0);
    }

    if loss == 0.0 {
        if gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - 100.0 / (1.0 + gain / loss)
    }
}
