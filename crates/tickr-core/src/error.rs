//! Error Types

use thiserror::Error;

/// Result type alias for forecast requests
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Failures a forecast request can surface to the dialogue layer.
///
/// Provider-level problems (timeouts, bad payloads, missing exchange rates)
/// never show up here: they are absorbed by the pipeline and only the
/// outcome of the whole failover chain is reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForecastError {
    /// No usable price history from any data source
    #[error("No price history for {ticker} (tried {})", sources.join(", "))]
    NotFound {
        ticker: String,
        sources: Vec<String>,
    },

    /// History too short, or the fit produced non-finite numbers
    #[error("Insufficient data for {ticker}: {reason}")]
    InsufficientData { ticker: String, reason: String },
}

impl ForecastError {
    pub fn not_found<I, S>(ticker: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::NotFound {
            ticker: ticker.into(),
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insufficient(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }

    /// Ticker the request was about
    pub fn ticker(&self) -> &str {
        match self {
            Self::NotFound { ticker, .. } | Self::InsufficientData { ticker, .. } => ticker,
        }
    }

    /// Convert to a user-facing apology
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { ticker, sources } => {
                let tried = match sources.as_slice() {
                    [] => "any data source".to_string(),
                    [only] => only.clone(),
                    [init @ .., last] => format!("{} and {}", init.join(", "), last),
                };
                format!(
                    "⚠️ Couldn't fetch data for {ticker} from {tried}. \
                     Please check the ticker or try again later."
                )
            }
            Self::InsufficientData { ticker, .. } => format!(
                "❌ Not enough price history to make a prediction for {ticker}. \
                 Try another ticker or try again later."
            ),
        }
    }
}
