//! In-Memory Sources
//!
//! For tests and offline demos. `StaticSource` serves fixed series and
//! records every symbol it was asked for, so failover order can be checked.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::QuoteSource;
use crate::error::{AdvisorError, Result};
use crate::model::{DailyBar, QuoteSeries};

/// Source backed by a symbol → series map
pub struct StaticSource {
    name: String,
    series: HashMap<String, QuoteSeries>,
    outage: bool,
    calls: Mutex<Vec<String>>,
}

impl StaticSource {
    /// Source with no data; every symbol comes back empty
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            series: HashMap::new(),
            outage: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serve `series` for the exact symbol `symbol`
    pub fn with_series(mut self, symbol: impl Into<String>, series: QuoteSeries) -> Self {
        self.series.insert(symbol.into(), series);
        self
    }

    /// Fail every request as if the service were down
    pub fn down(mut self) -> Self {
        self.outage = true;
        self
    }

    /// Symbols requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Offline demo data: a year of synthetic weekday closes for a few
    /// well-known tickers, in the primary source's symbol format
    pub fn demo(name: impl Into<String>) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        [
            ("AAPL.NS", 185.0, 0.12),
            ("RELIANCE.NS", 2_600.0, 1.8),
            ("TCS.NS", 3_900.0, -2.1),
            ("INFY.BO", 1_600.0, 0.4),
        ]
        .into_iter()
        .fold(Self::new(name), |source, (symbol, base, drift)| {
            source.with_series(symbol, synthetic_series(start, base, drift, 250))
        })
    }
}

#[async_trait]
impl QuoteSource for StaticSource {
    async fn fetch_daily(&self, symbol: &str) -> Result<QuoteSeries> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(symbol.to_string());

        if self.outage {
            return Err(AdvisorError::upstream(&self.name, "simulated outage"));
        }
        match self.series.get(symbol) {
            Some(series) if !series.is_empty() => Ok(series.clone()),
            _ => Err(AdvisorError::empty(&self.name, symbol)),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Deterministic trend plus a bounded wobble, skipping weekends
fn synthetic_series(start: NaiveDate, base: f64, drift: f64, days: usize) -> QuoteSeries {
    use chrono::{Datelike, Weekday};

    let bars = start
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(days)
        .enumerate()
        .map(|(i, date)| {
            let t = i as f64;
            let close = base + drift * t + base * 0.01 * (t * 0.7).sin();
            DailyBar::new(date, close * 0.995, close * 1.01, close * 0.99, close, 1_000_000.0 + t * 100.0)
        });
    QuoteSeries::new(bars)
}
