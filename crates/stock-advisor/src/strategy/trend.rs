//! Trend Regression
//!
//! Ordinary least squares of close against the bar index (0..N-1), then one
//! step ahead to index N. The index is the only feature.

use crate::error::{AdvisorError, Result};
use crate::model::{Decision, ExchangeRate, Forecast, QuoteSeries};

use super::{ForecastStrategy, Recommendation};

/// Fitted line `close = intercept + slope * index`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendFit {
    /// Fit against indices `0..ys.len()`
    ///
    /// `None` for fewer than two points or a non-finite result.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(ys: &[f64]) -> Option<Self> {
        if ys.len() < 2 {
            return None;
        }
        let n = ys.len() as f64;
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = ys.iter().sum::<f64>() / n;

        let (sxy, sxx) = ys.iter().enumerate().fold((0.0, 0.0), |(sxy, sxx), (i, y)| {
            let dx = i as f64 - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        (slope.is_finite() && intercept.is_finite()).then_some(Self { slope, intercept })
    }

    pub fn at(&self, index: f64) -> f64 {
        self.intercept + self.slope * index
    }
}

/// Next-day price predictor
#[derive(Clone, Copy, Debug, Default)]
pub struct ForecastEngine;

impl ForecastEngine {
    pub const MIN_HISTORY: usize = 2;

    /// Predict the next close and derive a decision
    ///
    /// With a quoted rate all prices are converted before fitting and the
    /// forecast is labelled INR; otherwise native USD figures are used.
    #[allow(clippy::cast_precision_loss)]
    pub fn predict(&self, ticker: &str, series: &QuoteSeries, rate: ExchangeRate) -> Result<Forecast> {
        if series.len() < Self::MIN_HISTORY {
            return Err(AdvisorError::InsufficientData(format!(
                "{} bar(s), need at least {}",
                series.len(),
                Self::MIN_HISTORY
            )));
        }

        let priced = match rate {
            ExchangeRate::Quoted(factor) => series.scaled(factor),
            ExchangeRate::Unavailable => series.clone(),
        };
        let closes = priced.closes();

        let fit = TrendFit::fit(&closes)
            .ok_or_else(|| AdvisorError::InsufficientData("degenerate regression".into()))?;
        let predicted = fit.at(closes.len() as f64);
        let latest = closes[closes.len() - 1];

        if !predicted.is_finite() || !latest.is_finite() {
            return Err(AdvisorError::InsufficientData("non-finite prediction".into()));
        }

        tracing::debug!(%ticker, slope = fit.slope, predicted, latest, "Fitted trend");

        Ok(Forecast {
            ticker: ticker.to_string(),
            latest_close: latest,
            predicted_next_close: predicted,
            currency: rate.currency(),
            decision: Decision::from_prediction(predicted, latest),
        })
    }
}

/// [`ForecastEngine`] as a strategy
#[derive(Clone, Copy, Debug, Default)]
pub struct TrendStrategy {
    engine: ForecastEngine,
}

impl ForecastStrategy for TrendStrategy {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn evaluate(&self, ticker: &str, series: &QuoteSeries, rate: ExchangeRate) -> Result<Recommendation> {
        self.engine.predict(ticker, series, rate).map(Recommendation::Trend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Currency;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> QuoteSeries {
        QuoteSeries::from_closes(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), closes)
    }

    #[test]
    fn test_rising_series_buys() {
        let forecast = ForecastEngine
            .predict("AAPL", &series(&[100.0, 102.0, 104.0]), ExchangeRate::Unavailable)
            .unwrap();

        assert_eq!(forecast.decision, Decision::Buy);
        assert!((forecast.predicted_next_close - 106.0).abs() < 1e-9);
        assert!((forecast.latest_close - 104.0).abs() < f64::EPSILON);
        assert_eq!(forecast.currency, Currency::Usd);
    }

    #[test]
    fn test_falling_series_sells() {
        let forecast = ForecastEngine
            .predict("X", &series(&[50.0, 48.0, 47.0, 45.0]), ExchangeRate::Unavailable)
            .unwrap();
        assert_eq!(forecast.decision, Decision::Sell);
    }

    #[test]
    fn test_flat_series_holds() {
        let forecast = ForecastEngine
            .predict("X", &series(&[20.0, 20.0, 20.0]), ExchangeRate::Unavailable)
            .unwrap();
        assert_eq!(forecast.decision, Decision::Hold);
    }

    #[test]
    fn test_short_series_is_insufficient() {
        for closes in [&[][..], &[100.0][..]] {
            let err = ForecastEngine
                .predict("X", &series(closes), ExchangeRate::Unavailable)
                .unwrap_err();
            assert!(matches!(err, AdvisorError::InsufficientData(_)));
        }
    }

    #[test]
    fn test_two_points_are_enough() {
        let forecast = ForecastEngine
            .predict("X", &series(&[10.0, 9.0]), ExchangeRate::Unavailable)
            .unwrap();
        assert!((forecast.predicted_next_close - 8.0).abs() < 1e-9);
        assert_eq!(forecast.decision, Decision::Sell);
    }

    #[test]
    fn test_quoted_rate_converts_and_labels_inr() {
        let rate = 83.0;
        let forecast = ForecastEngine
            .predict("AAPL", &series(&[100.0, 102.0, 104.0]), ExchangeRate::Quoted(rate))
            .unwrap();

        assert_eq!(forecast.currency, Currency::Inr);
        assert!((forecast.latest_close - 104.0 * rate).abs() < 1e-6);
        assert!((forecast.predicted_next_close / rate - 106.0).abs() < 1e-9);
        assert_eq!(forecast.decision, Decision::Buy);
    }

    #[test]
    fn test_non_finite_prices_are_insufficient() {
        let err = ForecastEngine
            .predict("X", &series(&[1.0, f64::NAN, 3.0]), ExchangeRate::Unavailable)
            .unwrap_err();
        assert!(matches!(err, AdvisorError::InsufficientData(_)));
    }

    #[test]
    fn test_always_one_decision_for_varied_series() {
        let shapes: [&[f64]; 5] = [
            &[1.0, 2.0],
            &[3.0, 1.0, 2.0],
            &[5.0, 5.0, 5.0, 5.1],
            &[1e6, 1e-6, 42.0, 0.0],
            &[7.5, 7.25, 7.75, 7.5, 7.5],
        ];
        for closes in shapes {
            let forecast = ForecastEngine
                .predict("X", &series(closes), ExchangeRate::Unavailable)
                .unwrap();
            assert!(matches!(forecast.decision, Decision::Buy | Decision::Sell | Decision::Hold));
        }
    }

    #[test]
    fn test_fit_recovers_line() {
        let fit = TrendFit::fit(&[3.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 3.0).abs() < 1e-12);
        assert!(TrendFit::fit(&[1.0]).is_none());
    }
}
