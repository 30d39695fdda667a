//! Scripted in-memory gateway used by unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::gateway::CapabilityGateway;
use crate::types::{ImageHandle, Joke, RateTable};

/// Gateway returning canned results and recording every call.
pub(crate) struct ScriptedGateway {
    pub translation: Result<String, CapabilityError>,
    pub weather: Result<String, CapabilityError>,
    pub rates: Result<RateTable, CapabilityError>,
    pub joke: Result<Joke, CapabilityError>,
    pub visual_answer: Result<String, CapabilityError>,
    /// Artificial latency applied before every answer.
    pub delay: Option<Duration>,
    pub calls: Mutex<Vec<String>>,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self {
            translation: Ok("bonjour".to_string()),
            weather: Ok("Sunny +21°C".to_string()),
            rates: Ok(RateTable::from([
                ("EUR".to_string(), 0.9),
                ("GBP".to_string(), 0.8),
            ])),
            joke: Ok(Joke {
                setup: "Why did the chicken cross the road?".to_string(),
                punchline: "To get to the other side.".to_string(),
            }),
            visual_answer: Ok("red".to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedGateway {
    /// A gateway whose every capability fails with `err`.
    pub fn failing(err: CapabilityError) -> Self {
        Self {
            translation: Err(err.clone()),
            weather: Err(err.clone()),
            rates: Err(err.clone()),
            joke: Err(err.clone()),
            visual_answer: Err(err),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CapabilityGateway for ScriptedGateway {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, CapabilityError> {
        self.record(format!("translate({}, {})", text, target_language))
            .await;
        self.translation.clone()
    }

    async fn weather(&self, city: &str) -> Result<String, CapabilityError> {
        self.record(format!("weather({})", city)).await;
        self.weather.clone()
    }

    async fn currency_rates(&self, from_currency: &str) -> Result<RateTable, CapabilityError> {
        self.record(format!("currency_rates({})", from_currency))
            .await;
        self.rates.clone()
    }

    async fn random_joke(&self) -> Result<Joke, CapabilityError> {
        self.record("random_joke()".to_string()).await;
        self.joke.clone()
    }

    async fn answer_visual_question(
        &self,
        image: &ImageHandle,
        question: &str,
    ) -> Result<String, CapabilityError> {
        self.record(format!("answer_visual_question({}, {})", image.len(), question))
            .await;
        self.visual_answer.clone()
    }
}
