//! Canned replies for small talk.
//!
//! A plain lookup table: phrases match only when the whole message equals the
//! phrase, ignoring case.

use std::collections::BTreeMap;

static BUILTIN_REPLIES: &[(&str, &str)] = &[
    ("hello", "Hi there! How can I assist you?"),
    ("what do you do", "I'm here to help with your questions!"),
    ("how are you", "I'm doing fine, thank you! How about you?"),
    ("bye", "Goodbye! Have a great day!"),
];

/// Exact-match phrase to reply table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedReplies {
    table: BTreeMap<String, String>,
}

impl Default for CannedReplies {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CannedReplies {
    /// An empty table.
    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    /// The built-in greetings and farewells.
    pub fn builtin() -> Self {
        let mut replies = Self::empty();
        for (phrase, reply) in BUILTIN_REPLIES {
            replies.insert(*phrase, *reply);
        }
        replies
    }

    /// Add entries on top of the current table, replacing existing phrases.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (phrase, reply) in overrides {
            self.insert(phrase, reply);
        }
        self
    }

    /// Insert or replace a reply. The phrase is stored lower-cased.
    pub fn insert(&mut self, phrase: impl Into<String>, reply: impl Into<String>) {
        self.table
            .insert(phrase.into().to_lowercase(), reply.into());
    }

    /// The canonical (lower-cased) phrase matching `text`, if any.
    pub fn canonical(&self, text: &str) -> Option<String> {
        let key = text.to_lowercase();
        self.table.contains_key(&key).then_some(key)
    }

    /// Reply for an exact, case-insensitive phrase match.
    pub fn lookup(&self, text: &str) -> Option<&str> {
        self.table.get(&text.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
