//! Canned Responses
//!
//! Immutable mapping from an exact, lowercased utterance to a set of
//! interchangeable replies. Lookup is exact-match only.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::IndexedRandom;

const GREETINGS: &[&str] = &["Hello", "Hi", "Hey! How can I help you?"];

/// Default small-talk table
const DEFAULT_ENTRIES: &[(&str, &[&str])] = &[
    ("hello", GREETINGS),
    ("hi", GREETINGS),
    ("how are you", &["I am fine", "I am fine, how are you?"]),
    ("i am fine", &["How can I help you?", "Good! How can I help you?"]),
    (
        "can you analyze the stock price",
        &["Sure! Please tell me the name of the company or stock ticker you want to analyze."],
    ),
    (
        "stock prediction",
        &["Provide the company name or stock ticker for which you need the stock prediction."],
    ),
];

/// Intent key to response set
#[derive(Clone, Debug)]
pub struct FaqTable {
    entries: HashMap<String, Vec<String>>,
}

impl Default for FaqTable {
    fn default() -> Self {
        Self::from_entries(DEFAULT_ENTRIES.iter().map(|(key, replies)| (*key, replies.iter().copied())))
    }
}

impl FaqTable {
    /// Build a table from `(key, replies)` pairs
    ///
    /// Keys are normalized to trimmed lowercase; keys without replies are
    /// skipped so every stored key can always answer.
    pub fn from_entries<K, I, R>(entries: impl IntoIterator<Item = (K, I)>) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|(key, replies)| {
                let replies: Vec<String> = replies.into_iter().map(Into::into).collect();
                (!replies.is_empty()).then(|| (key.as_ref().trim().to_lowercase(), replies))
            })
            .collect();
        Self { entries }
    }

    /// Whether `key` (already trimmed and lowercased) has canned replies
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Reply set for `key`
    pub fn replies(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Pick one reply for `key` uniformly at random
    pub fn respond<R: Rng + ?Sized>(&self, key: &str, rng: &mut R) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|replies| replies.choose(rng))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
