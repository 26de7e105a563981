//! Regional Ticker Conventions
//!
//! The two data sources spell non-default market symbols differently: the
//! primary wants an exchange suffix (`RELIANCE.NS`), the secondary an exchange
//! prefix (`NSE:RELIANCE`).

/// Suffixes and prefixes used to address regional markets
#[derive(Clone, Debug)]
pub struct MarketConventions {
    /// Primary-source suffixes, in the order they are tried
    pub suffixes: Vec<String>,

    /// Secondary-source prefixes that count as already qualified
    pub prefixes: Vec<String>,

    /// Prefix added for the secondary source when none is present
    pub default_prefix: String,
}

impl Default for MarketConventions {
    fn default() -> Self {
        Self {
            suffixes: vec![".NS".into(), ".BO".into()],
            prefixes: vec!["NSE:".into(), "BSE:".into()],
            default_prefix: "NSE:".into(),
        }
    }
}

impl MarketConventions {
    /// Symbols to ask the primary source for, in order
    ///
    /// A ticker that already ends in a known suffix is tried once as-is;
    /// otherwise each suffix is tried once.
    pub fn primary_candidates(&self, ticker: &str) -> Vec<String> {
        if self.has_suffix(ticker) {
            vec![ticker.to_string()]
        } else {
            self.suffixes.iter().map(|s| format!("{ticker}{s}")).collect()
        }
    }

    /// Symbol to ask the secondary source for
    pub fn secondary_symbol(&self, ticker: &str) -> String {
        if self.has_prefix(ticker) {
            ticker.to_string()
        } else {
            format!("{}{ticker}", self.default_prefix)
        }
    }

    pub fn has_suffix(&self, ticker: &str) -> bool {
        self.suffixes.iter().any(|s| ticker.ends_with(s.as_str()))
    }

    pub fn has_prefix(&self, ticker: &str) -> bool {
        self.prefixes.iter().any(|p| ticker.starts_with(p.as_str()))
    }
}
