//! Keyword-based text command parser.
//!
//! Classifies a message into an [`Intent`] using a fixed priority ladder of
//! command rules (first match wins), then extracts the command's parameters.
//! Each extraction rule is a standalone function so it can be tested alone
//! and replaced by a stricter grammar without touching the router.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;
use crate::replies::CannedReplies;
use crate::types::{Intent, Message};

// =============================================================================
// Compiled patterns (compiled once, reused across calls)
// =============================================================================

/// "in" must be a whole word: "weather info" is not a weather query.
static WEATHER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)weather\s+in\b").expect("Invalid weather regex"));

static TO_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bto\b").expect("Invalid 'to' regex"));

static IN_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bin\b").expect("Invalid 'in' regex"));

const TRANSLATE_KEYWORD: &str = "translate";
const CONVERT_KEYWORD: &str = "convert";
const JOKE_KEYWORD: &str = "joke";

// =============================================================================
// Command ladder
// =============================================================================

/// One rung of the priority ladder.
struct CommandRule {
    name: &'static str,
    detect: fn(&str) -> bool,
    extract: fn(&str) -> Result<Intent, ParseError>,
}

/// Evaluated top to bottom; the order is part of the command grammar.
static COMMAND_RULES: &[CommandRule] = &[
    CommandRule {
        name: "translate",
        detect: |text| contains_keyword(text, TRANSLATE_KEYWORD),
        extract: |text| {
            let (text, target_language) =
                extract_translation(text).ok_or_else(ParseError::translation)?;
            Ok(Intent::Translate {
                text,
                target_language,
            })
        },
    },
    CommandRule {
        name: "weather",
        detect: |text| WEATHER_RE.is_match(text),
        extract: |text| {
            Ok(Intent::Weather {
                city: extract_city(text),
            })
        },
    },
    CommandRule {
        name: "convert",
        detect: |text| contains_keyword(text, CONVERT_KEYWORD),
        extract: |text| {
            let (amount, from_currency, to_currency) =
                extract_conversion(text).ok_or_else(ParseError::conversion)?;
            Ok(Intent::Convert {
                amount,
                from_currency,
                to_currency,
            })
        },
    },
    CommandRule {
        name: "joke",
        detect: |text| contains_keyword(text, JOKE_KEYWORD),
        extract: |_| Ok(Intent::Joke),
    },
];

// =============================================================================
// TextCommandParser
// =============================================================================

/// Rule-based command parser backed by a canned-reply table.
#[derive(Debug, Clone, Default)]
pub struct TextCommandParser {
    replies: CannedReplies,
}

impl TextCommandParser {
    /// Create a parser that recognises the phrases in `replies` as small talk.
    pub fn new(replies: CannedReplies) -> Self {
        Self { replies }
    }

    /// The canned-reply table used for small-talk matching.
    pub fn replies(&self) -> &CannedReplies {
        &self.replies
    }

    /// Classify a whole message.
    ///
    /// An attached image always wins: the text becomes the question about the
    /// image, whatever keywords it contains.
    pub fn classify_message(&self, message: &Message) -> Result<Intent, ParseError> {
        if message.attached_image().is_some() {
            return Ok(Intent::VisualQuestion {
                question: message.raw_text().to_string(),
            });
        }
        self.classify(message.raw_text())
    }

    /// Classify raw text.
    ///
    /// Checks the command ladder in order (translate, weather, convert, joke),
    /// then exact small-talk phrases. Falls back to `Unrecognized`.
    pub fn classify(&self, raw_text: &str) -> Result<Intent, ParseError> {
        for rule in COMMAND_RULES {
            if (rule.detect)(raw_text) {
                tracing::trace!(rule = rule.name, "Command rule matched");
                return (rule.extract)(raw_text);
            }
        }

        Ok(match self.replies.canonical(raw_text) {
            Some(phrase) => Intent::PlainChat { phrase },
            None => Intent::Unrecognized,
        })
    }
}

// =============================================================================
// Extraction rules
// =============================================================================

/// Extract `(text, target_language)` from a translation command.
///
/// The text sits between the first "translate" and the next "to"; the target
/// language is whatever follows the last "to". Both are trimmed.
pub fn extract_translation(raw_text: &str) -> Option<(String, String)> {
    let start = find_keyword(raw_text, TRANSLATE_KEYWORD)? + TRANSLATE_KEYWORD.len();
    let rest = &raw_text[start..];

    let first_to = TO_WORD_RE.find(rest)?;
    let last_to = TO_WORD_RE.find_iter(rest).last()?;

    let text = rest[..first_to.start()].trim().to_string();
    let target_language = rest[last_to.end()..].trim().to_string();
    Some((text, target_language))
}

/// Extract the city from a weather command: the trimmed text after the last
/// "in". Empty when nothing follows.
pub fn extract_city(raw_text: &str) -> String {
    IN_WORD_RE
        .find_iter(raw_text)
        .last()
        .map(|m| raw_text[m.end()..].trim().to_string())
        .unwrap_or_default()
}

/// Extract `(amount, from_currency, to_currency)` from a conversion command.
///
/// Expects `convert <amount> from <currency> to <currency>`, with the three
/// keywords as whole whitespace-separated tokens in any case. Currencies are
/// upper-cased; the amount must be a finite number.
pub fn extract_conversion(raw_text: &str) -> Option<(f64, String, String)> {
    let parts: Vec<&str> = raw_text.split_whitespace().collect();
    let token_after = |keyword: &str| {
        let idx = parts.iter().position(|p| p.eq_ignore_ascii_case(keyword))?;
        parts.get(idx + 1).copied()
    };

    let amount_token = token_after(CONVERT_KEYWORD)?;
    let from_currency = token_after("from")?;
    let to_currency = token_after("to")?;

    let amount = amount_token
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())?;

    Some((
        amount,
        from_currency.to_uppercase(),
        to_currency.to_uppercase(),
    ))
}

fn contains_keyword(text: &str, keyword: &str) -> bool {
    find_keyword(text, keyword).is_some()
}

/// Byte offset of the first case-insensitive occurrence of an ASCII keyword.
///
/// ASCII lower-casing keeps byte offsets aligned with the original text.
fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    text.to_ascii_lowercase().find(keyword)
}

// =============================================================================
// Tests
// =============================================================================
