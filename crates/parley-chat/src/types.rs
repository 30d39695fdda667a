//! Domain types shared by the parser, router and session.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// =============================================================================
// Inbound message
// =============================================================================

/// Opaque image payload attached to a message.
///
/// The chat engine never decodes the bytes; it only forwards the handle to
/// the visual question answering capability. Cloning is cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageHandle {
    bytes: Arc<[u8]>,
    name: Option<String>,
}

impl ImageHandle {
    /// Wrap raw image bytes.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            name: None,
        }
    }

    /// Attach a display name, usually the uploaded file name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A single user submission: free text plus an optional image.
#[derive(Debug, Clone)]
pub struct Message {
    raw_text: String,
    attached_image: Option<ImageHandle>,
}

impl Message {
    /// A text-only message.
    pub fn text(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            attached_image: None,
        }
    }

    /// A message asking a question about an image.
    pub fn with_image(raw_text: impl Into<String>, image: ImageHandle) -> Self {
        Self {
            raw_text: raw_text.into(),
            attached_image: Some(image),
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn attached_image(&self) -> Option<&ImageHandle> {
        self.attached_image.as_ref()
    }
}

// =============================================================================
// Intent
// =============================================================================

/// Classified purpose of a message, produced by the parser and consumed once
/// by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    /// Exact match against a canned phrase (stored lower-cased).
    PlainChat { phrase: String },
    Translate {
        text: String,
        target_language: String,
    },
    Weather { city: String },
    Convert {
        amount: f64,
        from_currency: String,
        to_currency: String,
    },
    Joke,
    VisualQuestion { question: String },
    Unrecognized,
}

impl Intent {
    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::PlainChat { .. } => "plain_chat",
            Intent::Translate { .. } => "translate",
            Intent::Weather { .. } => "weather",
            Intent::Convert { .. } => "convert",
            Intent::Joke => "joke",
            Intent::VisualQuestion { .. } => "visual_question",
            Intent::Unrecognized => "unrecognized",
        }
    }

    /// The external capability this intent dispatches to, if any.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Intent::Translate { .. } => Some(Capability::Translate),
            Intent::Weather { .. } => Some(Capability::Weather),
            Intent::Convert { .. } => Some(Capability::CurrencyRate),
            Intent::Joke => Some(Capability::Joke),
            Intent::VisualQuestion { .. } => Some(Capability::VisualQuestion),
            Intent::PlainChat { .. } | Intent::Unrecognized => None,
        }
    }
}

/// External operations reachable through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Translate,
    Weather,
    CurrencyRate,
    Joke,
    VisualQuestion,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Capability::Translate => "translate",
            Capability::Weather => "weather",
            Capability::CurrencyRate => "currency_rate",
            Capability::Joke => "joke",
            Capability::VisualQuestion => "visual_question",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// Capability payloads
// =============================================================================

/// A two-part joke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joke {
    pub setup: String,
    pub punchline: String,
}

/// Exchange rates keyed by upper-case currency code.
pub type RateTable = HashMap<String, f64>;

// =============================================================================
// Transcript
// =============================================================================

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "User"),
            Speaker::Bot => write!(f, "Bot"),
        }
    }
}

/// One labelled utterance in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    /// Part of an image-grounded exchange.
    #[serde(default)]
    pub visual: bool,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>, visual: bool) -> Self {
        Self {
            speaker,
            text: text.into(),
            visual,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text, false)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Speaker::Bot, text, false)
    }

    /// Display label, e.g. `"User"` or `"Bot (VQA)"`.
    pub fn label(&self) -> String {
        if self.visual {
            format!("{} (VQA)", self.speaker)
        } else {
            self.speaker.to_string()
        }
    }
}
