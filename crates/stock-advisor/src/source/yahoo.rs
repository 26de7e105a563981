//! Yahoo Finance Chart Client
//!
//! Primary source. Uses the public chart endpoint:
//! `GET /v8/finance/chart/{symbol}?range=1y&interval=1d`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use super::QuoteSource;
use crate::error::{AdvisorError, Result};
use crate::model::{DailyBar, QuoteSeries};

const SOURCE_NAME: &str = "Yahoo Finance";

/// The chart endpoint rejects requests without a browser-like agent
const USER_AGENT: &str = "Mozilla/5.0 (compatible; tickr/0.1)";

/// One year of daily bars
const HISTORY_RANGE: &str = "1y";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Seconds east of UTC for the listing exchange
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Yahoo Finance chart API client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFinanceClient {
    /// Create a client with a request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn chart_url(&self, symbol: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| AdvisorError::Config(format!("invalid Yahoo URL '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| AdvisorError::Config(format!("Yahoo URL '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }
}

#[async_trait]
impl QuoteSource for YahooFinanceClient {
    async fn fetch_daily(&self, symbol: &str) -> Result<QuoteSeries> {
        let url = self.chart_url(symbol)?;
        tracing::debug!(%symbol, source = SOURCE_NAME, "Requesting daily chart");

        let response = self
            .client
            .get(url)
            .query(&[("range", HISTORY_RANGE), ("interval", "1d")])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        match parse_chart(symbol, &body) {
            // 404s still carry a chart.error payload worth reporting
            Err(AdvisorError::Serialization(_)) if !status.is_success() => {
                Err(AdvisorError::upstream(SOURCE_NAME, format!("HTTP {status}")))
            }
            other => other,
        }
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

/// Map a chart response body onto the unified series shape
fn parse_chart(symbol: &str, body: &str) -> Result<QuoteSeries> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.chart.error {
        let message = err.description.unwrap_or(err.code);
        return Err(AdvisorError::upstream(SOURCE_NAME, message));
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| AdvisorError::empty(SOURCE_NAME, symbol))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        // Rows without a close are halted/placeholder sessions
        let Some(close) = quote.close.get(i).copied().flatten() else {
            continue;
        };
        let date = ts
            .checked_add(offset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .ok_or_else(|| AdvisorError::malformed(SOURCE_NAME, format!("bad timestamp {ts}")))?
            .date_naive();
        let field = |column: &[Option<f64>]| column.get(i).copied().flatten().unwrap_or(close);

        bars.push(DailyBar::new(
            date,
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            close,
            quote.volume.get(i).copied().flatten().unwrap_or(0.0),
        ));
    }

    if bars.is_empty() {
        return Err(AdvisorError::empty(SOURCE_NAME, symbol));
    }
    Ok(QuoteSeries::new(bars))
}
