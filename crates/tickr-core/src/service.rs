//! Forecast Service Seam
//!
//! The dialogue layer only needs "give me a formatted recommendation for this
//! ticker". Everything behind that (data sources, currency handling, the
//! forecasting strategy) lives in whichever crate implements this trait.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tickr_core::{DialogueRouter, ForecastService};
//!
//! let service: Arc<dyn ForecastService> = Arc::new(StockAdvisor::from_env()?);
//! let router = DialogueRouter::new(service);
//! ```

use async_trait::async_trait;

use crate::error::Result;

/// Produces a ready-to-display recommendation for a ticker
#[async_trait]
pub trait ForecastService: Send + Sync {
    /// Run the whole pipeline for an already-uppercased ticker
    async fn forecast(&self, ticker: &str) -> Result<String>;

    /// Service name, for logs and health output
    fn name(&self) -> &str;
}
