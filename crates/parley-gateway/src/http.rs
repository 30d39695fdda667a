//! HTTP implementation of the capability gateway.
//!
//! Talks to wttr.in (weather), open.er-api.com (rates), the official joke API
//! and a LibreTranslate-compatible translation endpoint. Visual question
//! answering needs a local model and is reported as unavailable.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use parley_chat::{CapabilityError, CapabilityGateway, ImageHandle, Joke, RateTable};
use parley_core::config::GatewayConfig;
use parley_core::error::{ParleyError, Result};

use crate::payload::{parse_joke, parse_rates, parse_translation, TranslateRequest};

/// Gateway backed by public web APIs.
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
    timeout: Duration,
}

impl HttpGateway {
    /// Build a gateway with a shared HTTP client bounded by
    /// `request_timeout_secs`.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ParleyError::Gateway(format!("failed to build HTTP client: {}", e)))?;

        // Fail early on unusable endpoints rather than on the first request.
        for (name, url) in [
            ("weather_url", &config.weather_url),
            ("rates_url", &config.rates_url),
            ("joke_url", &config.joke_url),
            ("translate_url", &config.translate_url),
        ] {
            Url::parse(url)
                .map_err(|e| ParleyError::Config(format!("invalid {} {:?}: {}", name, url, e)))?;
        }

        Ok(Self {
            client,
            config,
            timeout,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// `{weather_url}/{city}?format={weather_format}`
    pub fn weather_url(&self, city: &str) -> std::result::Result<Url, CapabilityError> {
        let mut url = self.endpoint(&self.config.weather_url, Some(city))?;
        url.set_query(Some(&format!("format={}", self.config.weather_format)));
        Ok(url)
    }

    /// `{rates_url}/{FROM}`
    pub fn rates_url(&self, from_currency: &str) -> std::result::Result<Url, CapabilityError> {
        self.endpoint(&self.config.rates_url, Some(&from_currency.to_uppercase()))
    }

    /// Parse a base URL and optionally append one percent-encoded path segment.
    fn endpoint(
        &self,
        base: &str,
        segment: Option<&str>,
    ) -> std::result::Result<Url, CapabilityError> {
        let mut url = Url::parse(base)
            .map_err(|e| CapabilityError::Request(format!("invalid endpoint {:?}: {}", base, e)))?;
        if let Some(segment) = segment {
            url.path_segments_mut()
                .map_err(|_| {
                    CapabilityError::Request(format!("endpoint {:?} cannot take a path", base))
                })?
                .pop_if_empty()
                .push(segment);
        }
        Ok(url)
    }

    /// Send a request and return the body of a successful response.
    async fn fetch(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<String, CapabilityError> {
        let response = request.send().await.map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CapabilityError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| self.map_error(e))
    }

    fn map_error(&self, err: reqwest::Error) -> CapabilityError {
        if err.is_timeout() {
            CapabilityError::Timeout(self.timeout)
        } else {
            CapabilityError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl CapabilityGateway for HttpGateway {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> std::result::Result<String, CapabilityError> {
        let body = TranslateRequest {
            q: text,
            source: "auto",
            target: target_language,
            format: "text",
            api_key: self.config.translate_api_key.as_deref(),
        };
        let request = self.client.post(&self.config.translate_url).json(&body);
        let response = self.fetch(request).await?;
        let translated = parse_translation(&response)?;
        tracing::debug!(target_language, chars = translated.len(), "Translation received");
        Ok(translated)
    }

    async fn weather(&self, city: &str) -> std::result::Result<String, CapabilityError> {
        if city.trim().is_empty() {
            return Err(CapabilityError::Request("city must not be empty".to_string()));
        }
        let url = self.weather_url(city)?;
        let body = self.fetch(self.client.get(url)).await?;
        let report = body.trim();
        if report.is_empty() {
            return Err(CapabilityError::UnexpectedResponse(
                "empty weather report".to_string(),
            ));
        }
        tracing::debug!(city, "Weather received");
        Ok(report.to_string())
    }

    async fn currency_rates(
        &self,
        from_currency: &str,
    ) -> std::result::Result<RateTable, CapabilityError> {
        let url = self.rates_url(from_currency)?;
        let body = self.fetch(self.client.get(url)).await?;
        let rates = parse_rates(&body)?;
        tracing::debug!(from_currency, currencies = rates.len(), "Rates received");
        Ok(rates)
    }

    async fn random_joke(&self) -> std::result::Result<Joke, CapabilityError> {
        let body = self
            .fetch(self.client.get(&self.config.joke_url))
            .await?;
        parse_joke(&body)
    }

    async fn answer_visual_question(
        &self,
        image: &ImageHandle,
        _question: &str,
    ) -> std::result::Result<String, CapabilityError> {
        tracing::debug!(image_bytes = image.len(), "Visual question received without a model");
        Err(CapabilityError::Unavailable(
            "visual question answering requires a local model".to_string(),
        ))
    }
}
