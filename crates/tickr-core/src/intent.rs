//! Intent Classification
//!
//! Maps one utterance (received while the session is Idle) to what the
//! router should do with it. Rules are checked in a fixed order and the
//! first match wins:
//!
//! 1. trigger word present → analyze (ticker extracted) or ask for a ticker
//! 2. exact FAQ key → canned reply
//! 3. looks like a bare ticker → clarify
//! 4. anything else → not understood

use std::sync::LazyLock;

use regex::Regex;

use crate::faq::FaqTable;

/// Words that signal a request for analysis
pub const TRIGGER_WORDS: &[&str] = &["stock", "analyze", "price", "prediction"];

/// Ticker following a connector word ("of", "for", "about")
static TICKER_AFTER_CONNECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:of|for|about)\s+([A-Za-z.\-]+)").expect("valid regex"));

/// Whole utterance shaped like a ticker
static BARE_TICKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z.\-]{1,5}$").expect("valid regex"));

/// What an Idle-state utterance asks for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Analysis request with an extracted, uppercased ticker
    Analyze(String),

    /// Analysis request without a recognizable ticker
    RequestTicker,

    /// Exact match on a canned-response key
    Faq(String),

    /// Something that looks like a ticker on its own
    BareTicker,

    /// Nothing matched
    Unknown,
}

impl Intent {
    /// Classify an utterance against the given FAQ table
    pub fn classify(utterance: &str, faq: &FaqTable) -> Self {
        let clean = utterance.trim().to_lowercase();

        if TRIGGER_WORDS.iter().any(|word| clean.contains(word)) {
            return match extract_ticker(&clean) {
                Some(ticker) => Self::Analyze(ticker),
                None => Self::RequestTicker,
            };
        }

        if faq.contains(&clean) {
            return Self::Faq(clean);
        }

        if BARE_TICKER.is_match(&clean.to_uppercase()) {
            return Self::BareTicker;
        }

        Self::Unknown
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Analyze(_) => "analyze",
            Self::RequestTicker => "request_ticker",
            Self::Faq(_) => "faq",
            Self::BareTicker => "bare_ticker",
            Self::Unknown => "unknown",
        }
    }
}

/// Find the first token after a connector word, uppercased
///
/// Connectors are matched as substrings, the same way the trigger words are,
/// so "information about tsla" yields "TSLA" via "about".
pub fn extract_ticker(text: &str) -> Option<String> {
    TICKER_AFTER_CONNECTOR
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_uppercase())
        .filter(|ticker| !ticker.is_empty())
}

/// Normalize a free-form ticker reply ("  reliance.ns " → "RELIANCE.NS")
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}
