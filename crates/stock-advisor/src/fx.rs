//! Currency Normalization
//!
//! A [`RateProvider`] answers "how many INR per USD right now". It never
//! fails: anything that goes wrong is reported as
//! [`ExchangeRate::Unavailable`] and the pipeline keeps native units.

use async_trait::async_trait;

use crate::model::ExchangeRate;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// One attempt, no retry
    async fn fetch_rate(&self) -> ExchangeRate;

    fn name(&self) -> &str;
}

/// Always answers with the same rate
#[derive(Clone, Copy, Debug)]
pub struct FixedRate(pub ExchangeRate);

impl FixedRate {
    pub fn quoted(rate: f64) -> Self {
        Self(ExchangeRate::quoted(rate))
    }

    /// Provider for setups without a rate service
    pub fn unavailable() -> Self {
        Self(ExchangeRate::Unavailable)
    }
}

#[async_trait]
impl RateProvider for FixedRate {
    async fn fetch_rate(&self) -> ExchangeRate {
        self.0
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
