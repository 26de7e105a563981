//! Domain Models
//!
//! Price history, exchange rates and forecast results. Prices are `f64`:
//! they come out of a least-squares fit, and the decision rule compares the
//! fitted value against the last close exactly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One trading day, in the unified shape every source is mapped to
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl DailyBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self { date, open, high, low, close, volume }
    }

    /// Bar with every price equal to `close` (tests and demos)
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self::new(date, close, close, close, close, 0.0)
    }

    /// Multiply open/high/low/close by `factor`; volume is left alone
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            date: self.date,
            open: self.open * factor,
            high: self.high * factor,
            low: self.low * factor,
            close: self.close * factor,
            volume: self.volume,
        }
    }
}

/// Daily history, strictly ascending by date with no duplicate dates
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QuoteSeries {
    bars: Vec<DailyBar>,
}

impl QuoteSeries {
    /// Build from bars in any order
    ///
    /// Bars are sorted by date; when a date repeats, the bar seen last wins.
    pub fn new(bars: impl IntoIterator<Item = DailyBar>) -> Self {
        let by_date: BTreeMap<NaiveDate, DailyBar> =
            bars.into_iter().map(|bar| (bar.date, bar)).collect();
        Self {
            bars: by_date.into_values().collect(),
        }
    }

    /// Consecutive daily bars from `start` with the given closes
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Self {
        Self::new(
            closes
                .iter()
                .zip(start.iter_days())
                .map(|(&close, date)| DailyBar::flat(date, close)),
        )
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last(&self) -> Option<&DailyBar> {
        self.bars.last()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Copy with all prices multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            bars: self.bars.iter().map(|b| b.scaled(factor)).collect(),
        }
    }
}

/// Display currency of a forecast
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Usd,
    Inr,
}

impl Currency {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Inr => "₹",
        }
    }
}

/// USD→INR conversion factor, or the neutral "no conversion" sentinel
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExchangeRate {
    /// A positive, finite rate
    Quoted(f64),

    /// The rate could not be obtained; amounts stay in their native unit
    Unavailable,
}

impl ExchangeRate {
    /// Neutral factor used when no rate is available
    pub const NEUTRAL: f64 = 1.0;

    /// Accept only positive, finite rates
    pub fn quoted(rate: f64) -> Self {
        if rate.is_finite() && rate > 0.0 {
            Self::Quoted(rate)
        } else {
            Self::Unavailable
        }
    }

    /// Multiplicative factor to apply to prices
    pub fn factor(self) -> f64 {
        match self {
            Self::Quoted(rate) => rate,
            Self::Unavailable => Self::NEUTRAL,
        }
    }

    /// Currency that converted amounts are expressed in
    pub fn currency(self) -> Currency {
        match self {
            Self::Quoted(_) => Currency::Inr,
            Self::Unavailable => Currency::Usd,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Self::Quoted(_))
    }
}

/// Trading recommendation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

impl Decision {
    /// Compare a predicted price with the latest one, exactly
    #[allow(clippy::float_cmp)]
    pub fn from_prediction(predicted: f64, latest: f64) -> Self {
        if predicted > latest {
            Self::Buy
        } else if predicted < latest {
            Self::Sell
        } else {
            Self::Hold
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// Next-day trend forecast
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Forecast {
    pub ticker: String,
    pub latest_close: f64,
    pub predicted_next_close: f64,
    pub currency: Currency,
    pub decision: Decision,
}

impl std::fmt::Display for Forecast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sym = self.currency.symbol();
        let advice = match self.decision {
            Decision::Buy => "📈 Suggested Action: BUY — the price is expected to rise.",
            Decision::Sell => "📉 Suggested Action: SELL — the price is expected to drop.",
            Decision::Hold => "🔁 Suggested Action: HOLD — the price is expected to remain stable.",
        };
        writeln!(f, "📊 Stock Analysis for {}", self.ticker)?;
        writeln!(
            f,
            "The latest closing price of {} is {sym}{:.2}.",
            self.ticker, self.latest_close
        )?;
        writeln!(
            f,
            "The predicted price for the next trading day is {sym}{:.2}.",
            self.predicted_next_close
        )?;
        write!(f, "{advice}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, n).unwrap()
    }

    #[test]
    fn test_series_sorted_and_deduplicated() {
        let series = QuoteSeries::new([
            DailyBar::flat(day(3), 3.0),
            DailyBar::flat(day(1), 1.0),
            DailyBar::flat(day(2), 2.0),
            DailyBar::flat(day(1), 1.5),
        ]);
        let dates: Vec<_> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
        assert_eq!(series.closes(), vec![1.5, 2.0, 3.0]);
    }

    #[test]
    fn test_scaling_round_trips() {
        let series = QuoteSeries::from_closes(day(1), &[101.25, 99.5, 250.125]);
        let rate = 83.17;
        let converted = series.scaled(rate);

        for (native, conv) in series.bars().iter().zip(converted.bars()) {
            assert!((conv.close - native.close * rate).abs() < 1e-9);
            assert!((conv.close / rate - native.close).abs() < 1e-9);
            assert!((conv.volume - native.volume).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_exchange_rate_rejects_non_positive() {
        assert_eq!(ExchangeRate::quoted(0.0), ExchangeRate::Unavailable);
        assert_eq!(ExchangeRate::quoted(-3.0), ExchangeRate::Unavailable);
        assert_eq!(ExchangeRate::quoted(f64::NAN), ExchangeRate::Unavailable);
        assert_eq!(ExchangeRate::quoted(83.2).currency(), Currency::Inr);
        assert!((ExchangeRate::Unavailable.factor() - 1.0).abs() < f64::EPSILON);
        assert_eq!(ExchangeRate::Unavailable.currency(), Currency::Usd);
    }

    #[test]
    fn test_decision_rule() {
        assert_eq!(Decision::from_prediction(106.0, 104.0), Decision::Buy);
        assert_eq!(Decision::from_prediction(100.0, 104.0), Decision::Sell);
        assert_eq!(Decision::from_prediction(104.0, 104.0), Decision::Hold);
    }

    #[test]
    fn test_forecast_display_uses_currency_symbol() {
        let forecast = Forecast {
            ticker: "AAPL".into(),
            latest_close: 104.0,
            predicted_next_close: 106.0,
            currency: Currency::Usd,
            decision: Decision::Buy,
        };
        let text = forecast.to_string();
        assert!(text.contains("$104.00"));
        assert!(text.contains("$106.00"));
        assert!(text.contains("BUY"));
        assert!(!text.contains('₹'));
    }
}
