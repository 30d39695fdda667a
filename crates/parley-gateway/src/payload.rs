//! Response payloads of the public services behind the HTTP gateway.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use parley_chat::{CapabilityError, Joke, RateTable};

/// `open.er-api.com` latest-rates response.
#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
}

/// Parse an exchange-rate response body.
///
/// A body without a `rates` object yields an empty table, which the router
/// reports as "rate not found".
pub fn parse_rates(body: &str) -> Result<RateTable, CapabilityError> {
    let response: RatesResponse = serde_json::from_str(body)
        .map_err(|e| CapabilityError::UnexpectedResponse(format!("invalid rates body: {}", e)))?;
    if let Some(result) = response.result.as_deref() {
        if result != "success" {
            tracing::debug!(result, "Rate service reported a non-success result");
        }
    }
    Ok(response.rates.unwrap_or_default())
}

/// Parse a random-joke response body.
pub fn parse_joke(body: &str) -> Result<Joke, CapabilityError> {
    serde_json::from_str(body)
        .map_err(|e| CapabilityError::UnexpectedResponse(format!("invalid joke body: {}", e)))
}

/// LibreTranslate request body.
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    pub q: &'a str,
    pub source: &'a str,
    pub target: &'a str,
    pub format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    #[serde(default)]
    translated_text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse a LibreTranslate response body.
pub fn parse_translation(body: &str) -> Result<String, CapabilityError> {
    let response: TranslateResponse = serde_json::from_str(body).map_err(|e| {
        CapabilityError::UnexpectedResponse(format!("invalid translation body: {}", e))
    })?;
    match (response.translated_text, response.error) {
        (Some(text), _) => Ok(text),
        (None, Some(error)) => Err(CapabilityError::Request(error)),
        (None, None) => Err(CapabilityError::UnexpectedResponse(
            "translation body has no translatedText".to_string(),
        )),
    }
}
