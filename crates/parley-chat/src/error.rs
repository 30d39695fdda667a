//! Error types for the chat engine.
//!
//! None of these reach the caller of the session coordinator: the router
//! turns every failure into one of the fixed user-facing strings below.

use std::time::Duration;

use crate::types::Capability;

/// Reply when an image question cannot be answered.
pub const IMAGE_APOLOGY: &str = "There was an error processing the image.";
/// Reply when translation fails or cannot be parsed.
pub const TRANSLATION_APOLOGY: &str = "Sorry, I couldn't process the translation request.";
/// Reply when the weather service fails.
pub const WEATHER_APOLOGY: &str = "Could not retrieve weather data.";
/// Reply when the rate table has no usable rate for the target currency.
pub const RATE_NOT_FOUND: &str = "Currency conversion rate not found.";
/// Reply when the rate request itself fails.
pub const CONVERSION_APOLOGY: &str = "Could not convert currency.";
/// Reply when the joke service fails.
pub const JOKE_APOLOGY: &str = "Could not retrieve a joke.";
/// Reply for anything the bot has no answer for.
pub const NOT_SURE: &str = "I'm not sure how to respond to that.";
/// Usage hint for a conversion command that could not be parsed.
pub const CONVERSION_USAGE: &str = "Please provide the amount and currencies in the format: convert <amount> from <currency> to <currency>";

/// Errors from the text command parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed {cause}")]
    MalformedCommand { cause: &'static str, hint: String },
}

impl ParseError {
    pub(crate) fn translation() -> Self {
        ParseError::MalformedCommand {
            cause: "translation request",
            hint: TRANSLATION_APOLOGY.to_string(),
        }
    }

    pub(crate) fn conversion() -> Self {
        ParseError::MalformedCommand {
            cause: "conversion request",
            hint: CONVERSION_USAGE.to_string(),
        }
    }

    /// User-facing hint describing how to fix the command.
    pub fn hint(&self) -> &str {
        match self {
            ParseError::MalformedCommand { hint, .. } => hint,
        }
    }
}

/// Errors returned by capability gateway implementations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CapabilityError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status code {0}")]
    Status(u16),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("capability unavailable: {0}")]
    Unavailable(String),
}

/// Why the router could not produce a successful reply.
#[derive(Debug, thiserror::Error)]
pub enum RouteFailure {
    #[error(transparent)]
    Malformed(#[from] ParseError),
    #[error("{capability} failed: {source}")]
    Capability {
        capability: Capability,
        #[source]
        source: CapabilityError,
    },
    #[error("no conversion rate for {currency}")]
    RateNotFound { currency: String },
    #[error("unrecognized message")]
    Unrecognized,
}

impl RouteFailure {
    /// The fixed reply shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            RouteFailure::Malformed(err) => err.hint().to_string(),
            RouteFailure::Capability { capability, .. } => apology_for(*capability).to_string(),
            RouteFailure::RateNotFound { .. } => RATE_NOT_FOUND.to_string(),
            RouteFailure::Unrecognized => NOT_SURE.to_string(),
        }
    }
}

fn apology_for(capability: Capability) -> &'static str {
    match capability {
        Capability::Translate => TRANSLATION_APOLOGY,
        Capability::Weather => WEATHER_APOLOGY,
        Capability::CurrencyRate => CONVERSION_APOLOGY,
        Capability::Joke => JOKE_APOLOGY,
        Capability::VisualQuestion => IMAGE_APOLOGY,
    }
}
