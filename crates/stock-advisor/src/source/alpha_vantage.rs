//! Alpha Vantage Client
//!
//! Secondary price source (`TIME_SERIES_DAILY`) and USD→INR rate provider
//! (`CURRENCY_EXCHANGE_RATE`). Both go through the same `/query` endpoint.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use super::QuoteSource;
use crate::error::{AdvisorError, Result};
use crate::fx::RateProvider;
use crate::model::{DailyBar, ExchangeRate, QuoteSeries};

const SOURCE_NAME: &str = "Alpha Vantage";

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<HashMap<String, DailyEntry>>,

    #[serde(rename = "Error Message")]
    error_message: Option<String>,

    /// Rate-limit notices arrive as "Note" or "Information"
    #[serde(rename = "Note")]
    note: Option<String>,

    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

#[derive(Debug, Deserialize)]
struct RateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    realtime: Option<RealtimeRate>,
}

#[derive(Debug, Deserialize)]
struct RealtimeRate {
    #[serde(rename = "5. Exchange Rate")]
    rate: String,
}

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    series_timeout: Duration,
    rate_timeout: Duration,
}

impl AlphaVantageClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            series_timeout: Duration::from_secs(10),
            rate_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeouts(mut self, series_timeout: Duration, rate_timeout: Duration) -> Self {
        self.series_timeout = series_timeout;
        self.rate_timeout = rate_timeout;
        self
    }

    async fn query(&self, params: &[(&str, &str)], timeout: Duration) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    async fn try_fetch_rate(&self) -> Result<ExchangeRate> {
        let body = self
            .query(
                &[
                    ("function", "CURRENCY_EXCHANGE_RATE"),
                    ("from_currency", "USD"),
                    ("to_currency", "INR"),
                ],
                self.rate_timeout,
            )
            .await?;
        parse_rate(&body)
    }
}

#[async_trait]
impl QuoteSource for AlphaVantageClient {
    async fn fetch_daily(&self, symbol: &str) -> Result<QuoteSeries> {
        tracing::debug!(%symbol, source = SOURCE_NAME, "Requesting daily series");
        let body = self
            .query(
                &[
                    ("function", "TIME_SERIES_DAILY"),
                    ("symbol", symbol),
                    ("outputsize", "compact"),
                ],
                self.series_timeout,
            )
            .await?;
        parse_daily(symbol, &body)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

#[async_trait]
impl RateProvider for AlphaVantageClient {
    async fn fetch_rate(&self) -> ExchangeRate {
        tracing::debug!(source = SOURCE_NAME, "Fetching USD to INR exchange rate");
        match self.try_fetch_rate().await {
            Ok(rate) => {
                tracing::info!(rate = rate.factor(), "Fetched USD to INR rate");
                rate
            }
            Err(e) => {
                tracing::warn!(error = %e, "USD to INR rate unavailable, keeping native currency");
                ExchangeRate::Unavailable
            }
        }
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

fn parse_daily(symbol: &str, body: &str) -> Result<QuoteSeries> {
    let response: DailyResponse = serde_json::from_str(body)?;

    if let Some(message) = response.error_message {
        return Err(AdvisorError::upstream(SOURCE_NAME, message));
    }

    let Some(series) = response.series else {
        let detail = response
            .note
            .or(response.information)
            .unwrap_or_else(|| "'Time Series (Daily)' missing".into());
        return Err(AdvisorError::malformed(SOURCE_NAME, detail));
    };

    let number = |field: &str, value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| AdvisorError::malformed(SOURCE_NAME, format!("{field} '{value}' is not a number")))
    };

    let mut bars = Vec::with_capacity(series.len());
    for (day, entry) in &series {
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|_| AdvisorError::malformed(SOURCE_NAME, format!("bad date '{day}'")))?;
        bars.push(DailyBar::new(
            date,
            number("open", &entry.open)?,
            number("high", &entry.high)?,
            number("low", &entry.low)?,
            number("close", &entry.close)?,
            number("volume", &entry.volume)?,
        ));
    }

    if bars.is_empty() {
        return Err(AdvisorError::empty(SOURCE_NAME, symbol));
    }
    Ok(QuoteSeries::new(bars))
}

fn parse_rate(body: &str) -> Result<ExchangeRate> {
    let response: RateResponse = serde_json::from_str(body)?;
    let realtime = response
        .realtime
        .ok_or_else(|| AdvisorError::Unavailable("'Realtime Currency Exchange Rate' missing".into()))?;
    let value: f64 = realtime
        .rate
        .trim()
        .parse()
        .map_err(|_| AdvisorError::malformed(SOURCE_NAME, format!("rate '{}' is not a number", realtime.rate)))?;

    match ExchangeRate::quoted(value) {
        ExchangeRate::Unavailable => Err(AdvisorError::Unavailable(format!("non-positive rate {value}"))),
        rate => Ok(rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY_OK: &str = r#"{
        "Meta Data": {"2. Symbol": "NSE:INFY"},
        "Time Series (Daily)": {
            "2024-03-04": {"1. open": "1650.0", "2. high": "1670.5", "3. low": "1640.0", "4. close": "1665.25", "5. volume": "350000"},
            "2024-03-01": {"1. open": "1630.0", "2. high": "1652.0", "3. low": "1625.0", "4. close": "1648.00", "5. volume": "410000"}
        }
    }"#;

    #[test]
    fn test_parse_daily_sorts_ascending() {
        let series = parse_daily("NSE:INFY", DAILY_OK).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!((series.last().unwrap().close - 1665.25).abs() < f64::EPSILON);
        assert!((series.bars()[0].volume - 410_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_daily_error_message() {
        let body = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#;
        let err = parse_daily("NSE:NOPE", body).unwrap_err();
        assert!(matches!(err, AdvisorError::Upstream { .. }));
    }

    #[test]
    fn test_parse_daily_rate_limit_note_is_malformed() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let err = parse_daily("NSE:INFY", body).unwrap_err();
        assert!(matches!(err, AdvisorError::Malformed { .. }));
        assert!(err.to_string().contains("call frequency"));
    }

    #[test]
    fn test_parse_daily_bad_number() {
        let body = r#"{"Time Series (Daily)": {"2024-03-01": {"1. open": "n/a", "2. high": "1", "3. low": "1", "4. close": "1", "5. volume": "1"}}}"#;
        assert!(matches!(parse_daily("X", body), Err(AdvisorError::Malformed { .. })));
    }

    #[test]
    fn test_parse_daily_empty_series() {
        let body = r#"{"Time Series (Daily)": {}}"#;
        assert!(matches!(parse_daily("X", body), Err(AdvisorError::Empty { .. })));
    }

    #[test]
    fn test_parse_rate() {
        let body = r#"{"Realtime Currency Exchange Rate": {
            "1. From_Currency Code": "USD", "3. To_Currency Code": "INR",
            "5. Exchange Rate": "83.12500000"}}"#;
        assert_eq!(parse_rate(body).unwrap(), ExchangeRate::Quoted(83.125));
    }

    #[test]
    fn test_parse_rate_missing_field() {
        let body = r#"{"Information": "API key invalid"}"#;
        assert!(matches!(parse_rate(body), Err(AdvisorError::Unavailable(_))));
        assert!(parse_rate("not json").is_err());
        let zero = r#"{"Realtime Currency Exchange Rate": {"5. Exchange Rate": "0.0"}}"#;
        assert!(matches!(parse_rate(zero), Err(AdvisorError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_rate_service_degrades() {
        // Port 9 (discard) on loopback refuses connections
        let client = AlphaVantageClient::new("http://127.0.0.1:9/query", "demo")
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
        assert_eq!(client.fetch_rate().await, ExchangeRate::Unavailable);
    }
}
