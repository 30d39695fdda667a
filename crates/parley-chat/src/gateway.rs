//! Capability gateway: the boundary between the router and external services.
//!
//! Implementations live outside the chat engine (see `parley-gateway` for the
//! HTTP one). Each call should bound its own latency; the router additionally
//! wraps every call in a timeout.

use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::types::{ImageHandle, Joke, RateTable};

/// External operations the router may invoke.
#[async_trait]
pub trait CapabilityGateway: Send + Sync {
    /// Translate `text` into `target_language`.
    async fn translate(&self, text: &str, target_language: &str)
        -> Result<String, CapabilityError>;

    /// Human-readable current weather for `city`.
    async fn weather(&self, city: &str) -> Result<String, CapabilityError>;

    /// Exchange rates from `from_currency` to every known currency.
    async fn currency_rates(&self, from_currency: &str) -> Result<RateTable, CapabilityError>;

    /// A random two-part joke.
    async fn random_joke(&self) -> Result<Joke, CapabilityError>;

    /// Answer a free-form question about an image.
    async fn answer_visual_question(
        &self,
        image: &ImageHandle,
        question: &str,
    ) -> Result<String, CapabilityError>;
}
