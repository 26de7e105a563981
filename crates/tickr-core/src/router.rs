//! Dialogue Router
//!
//! Two-state machine driven by [`DialogueContext::awaiting_ticker`]:
//!
//! ```text
//!            trigger word, no ticker
//!   ┌──────┐ ─────────────────────────▶ ┌────────────────┐
//!   │ Idle │                            │ AwaitingTicker │
//!   └──────┘ ◀───────────────────────── └────────────────┘
//!            any utterance (= ticker, forecast runs)
//! ```
//!
//! Every other Idle intent (analyze with ticker, FAQ, bare ticker, unknown)
//! leaves the state unchanged.

use std::sync::Arc;

use rand::Rng;

use crate::faq::FaqTable;
use crate::intent::{Intent, normalize_ticker};
use crate::service::ForecastService;
use crate::session::DialogueContext;

/// Fixed replies used by the router
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Sent when an analysis request carries no ticker
    pub ticker_prompt: String,

    /// Sent when the user types something ticker-shaped on its own
    pub clarify_prompt: String,

    /// Sent when nothing matched
    pub fallback: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            ticker_prompt: "Sure! Please provide the company name or stock ticker to analyze.".into(),
            clarify_prompt: "Can you clarify what you'd like me to do with this ticker? \
                             Try saying 'analyze the stock of AAPL'."
                .into(),
            fallback: "I'm sorry, I didn't understand that. Can you rephrase?".into(),
        }
    }
}

/// Turns free text into replies, one turn at a time
pub struct DialogueRouter {
    service: Arc<dyn ForecastService>,
    faq: FaqTable,
    config: RouterConfig,
}

impl DialogueRouter {
    /// Create a router with the default FAQ table and replies
    pub fn new(service: Arc<dyn ForecastService>) -> Self {
        Self {
            service,
            faq: FaqTable::default(),
            config: RouterConfig::default(),
        }
    }

    pub fn builder() -> DialogueRouterBuilder {
        DialogueRouterBuilder::default()
    }

    /// Handle one user turn, using the thread-local RNG for canned replies
    pub async fn handle_turn(&self, utterance: &str, context: &mut DialogueContext) -> String {
        let intent = self.resolve(utterance, context);
        // ThreadRng is not Send, so it must not live across the await
        let canned = self.canned_reply(&intent, &mut rand::rng());
        self.dispatch(intent, canned).await
    }

    /// Handle one user turn with a caller-supplied RNG
    pub async fn handle_turn_with_rng<R>(
        &self,
        utterance: &str,
        context: &mut DialogueContext,
        rng: &mut R,
    ) -> String
    where
        R: Rng + Send + ?Sized,
    {
        let intent = self.resolve(utterance, context);
        let canned = self.canned_reply(&intent, rng);
        self.dispatch(intent, canned).await
    }

    fn canned_reply<R: Rng + ?Sized>(&self, turn: &Turn, rng: &mut R) -> Option<String> {
        match turn {
            Turn::Idle(Intent::Faq(key)) => self.faq.respond(key, rng).map(str::to_owned),
            _ => None,
        }
    }

    /// Decide what the turn is and apply the state transition
    fn resolve(&self, utterance: &str, context: &mut DialogueContext) -> Turn {
        if context.awaiting_ticker {
            context.awaiting_ticker = false;
            let ticker = normalize_ticker(utterance);
            tracing::debug!(%ticker, "Consuming turn as requested ticker");
            return Turn::TickerReply(ticker);
        }

        let intent = Intent::classify(utterance, &self.faq);
        tracing::debug!(intent = intent.label(), "Classified utterance");

        if intent == Intent::RequestTicker {
            context.awaiting_ticker = true;
        }
        Turn::Idle(intent)
    }

    async fn dispatch(&self, turn: Turn, canned: Option<String>) -> String {
        match turn {
            Turn::TickerReply(ticker) | Turn::Idle(Intent::Analyze(ticker)) => {
                self.run_forecast(&ticker).await
            }
            Turn::Idle(Intent::RequestTicker) => self.config.ticker_prompt.clone(),
            Turn::Idle(Intent::Faq(_)) => canned.unwrap_or_else(|| self.config.fallback.clone()),
            Turn::Idle(Intent::BareTicker) => self.config.clarify_prompt.clone(),
            Turn::Idle(Intent::Unknown) => self.config.fallback.clone(),
        }
    }

    async fn run_forecast(&self, ticker: &str) -> String {
        match self.service.forecast(ticker).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(%ticker, service = self.service.name(), error = %e, "Forecast failed");
                e.user_message()
            }
        }
    }

    pub fn faq(&self) -> &FaqTable {
        &self.faq
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// A resolved turn
#[derive(Debug)]
enum Turn {
    /// The utterance answered an earlier ticker prompt
    TickerReply(String),
    Idle(Intent),
}

/// Builder for [`DialogueRouter`]
#[derive(Default)]
pub struct DialogueRouterBuilder {
    service: Option<Arc<dyn ForecastService>>,
    faq: Option<FaqTable>,
    config: RouterConfig,
}

impl DialogueRouterBuilder {
    pub fn service(mut self, service: Arc<dyn ForecastService>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn faq(mut self, faq: FaqTable) -> Self {
        self.faq = Some(faq);
        self
    }

    pub fn ticker_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.ticker_prompt = prompt.into();
        self
    }

    pub fn clarify_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.clarify_prompt = prompt.into();
        self
    }

    pub fn fallback(mut self, reply: impl Into<String>) -> Self {
        self.config.fallback = reply.into();
        self
    }

    /// Returns `None` when no forecast service was supplied
    pub fn build(self) -> Option<DialogueRouter> {
        Some(DialogueRouter {
            service: self.service?,
            faq: self.faq.unwrap_or_default(),
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ForecastError, Result};
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Mutex;

    /// Records every ticker it is asked about
    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<String>>,
        fail_with: Option<ForecastError>,
    }

    impl RecordingService {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ForecastService for RecordingService {
        async fn forecast(&self, ticker: &str) -> Result<String> {
            self.calls.lock().unwrap().push(ticker.to_string());
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(format!("forecast:{ticker}")),
            }
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn router_with(service: Arc<RecordingService>) -> DialogueRouter {
        DialogueRouter::new(service)
    }

    #[tokio::test]
    async fn test_analyze_with_ticker_runs_forecast_and_stays_idle() {
        let service = Arc::new(RecordingService::default());
        let router = router_with(service.clone());
        let mut ctx = DialogueContext::new();

        let reply = router.handle_turn("analyze the stock of AAPL", &mut ctx).await;

        assert_eq!(reply, "forecast:AAPL");
        assert_eq!(service.calls(), vec!["AAPL"]);
        assert!(ctx.is_idle());
    }

    #[tokio::test]
    async fn test_trigger_wins_over_matching_faq_key() {
        let service = Arc::new(RecordingService::default());
        let router = DialogueRouter::builder()
            .service(service.clone())
            .faq(FaqTable::from_entries([("analyze the stock of aapl", ["canned reply"])]))
            .build()
            .unwrap();
        let mut ctx = DialogueContext::new();

        let reply = router.handle_turn("analyze the stock of AAPL", &mut ctx).await;

        assert_eq!(reply, "forecast:AAPL");
    }

    #[tokio::test]
    async fn test_missing_ticker_prompts_then_consumes_next_turn() {
        let service = Arc::new(RecordingService::default());
        let router = router_with(service.clone());
        let mut ctx = DialogueContext::new();

        let prompt = router.handle_turn("stock prediction", &mut ctx).await;
        assert_eq!(prompt, router.config().ticker_prompt);
        assert!(ctx.awaiting_ticker);
        assert!(service.calls().is_empty());

        // Even a FAQ key is taken as the ticker here
        let reply = router.handle_turn("  hello ", &mut ctx).await;
        assert_eq!(reply, "forecast:HELLO");
        assert!(ctx.is_idle());
        assert_eq!(service.calls(), vec!["HELLO"]);
    }

    #[tokio::test]
    async fn test_faq_reply_from_response_set() {
        let service = Arc::new(RecordingService::default());
        let router = router_with(service.clone());
        let mut ctx = DialogueContext::new();
        let mut rng = StdRng::seed_from_u64(1);

        let reply = router.handle_turn_with_rng("How are you", &mut ctx, &mut rng).await;

        let allowed = router.faq().replies("how are you").unwrap();
        assert!(allowed.iter().any(|r| r == &reply));
        assert!(service.calls().is_empty());
        assert!(ctx.is_idle());
    }

    #[tokio::test]
    async fn test_bare_ticker_asks_for_clarification() {
        let service = Arc::new(RecordingService::default());
        let router = router_with(service.clone());
        let mut ctx = DialogueContext::new();

        let reply = router.handle_turn("TSLA", &mut ctx).await;

        assert_eq!(reply, router.config().clarify_prompt);
        assert!(service.calls().is_empty());
        assert!(ctx.is_idle());
    }

    #[tokio::test]
    async fn test_unrecognized_input_falls_back() {
        let service = Arc::new(RecordingService::default());
        let router = router_with(service.clone());
        let mut ctx = DialogueContext::new();

        let reply = router.handle_turn("tell me a joke please", &mut ctx).await;

        assert_eq!(reply, router.config().fallback);
        assert!(ctx.is_idle());
    }

    #[tokio::test]
    async fn test_forecast_errors_become_apologies() {
        let service = Arc::new(RecordingService {
            fail_with: Some(ForecastError::not_found("ZZZZ", ["Yahoo Finance", "Alpha Vantage"])),
            ..Default::default()
        });
        let router = router_with(service);
        let mut ctx = DialogueContext::new();

        let reply = router.handle_turn("price of zzzz", &mut ctx).await;

        assert!(reply.contains("ZZZZ"));
        assert!(reply.contains("Yahoo Finance and Alpha Vantage"));
    }

    #[test]
    fn test_builder_requires_service() {
        assert!(DialogueRouter::builder().build().is_none());
    }
}
