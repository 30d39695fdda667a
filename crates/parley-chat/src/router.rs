//! Command router: classify a message, dispatch to a capability, and turn the
//! outcome into reply text.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parley_core::config::ChatConfig;

use crate::error::{CapabilityError, RouteFailure};
use crate::gateway::CapabilityGateway;
use crate::parser::TextCommandParser;
use crate::replies::CannedReplies;
use crate::types::{Capability, Intent, Message};

/// Default upper bound for a single capability call.
pub const DEFAULT_CAPABILITY_TIMEOUT: Duration = Duration::from_secs(10);

/// Routes messages to capabilities. Never fails: every error becomes one of
/// the fixed apology strings.
pub struct CommandRouter {
    parser: TextCommandParser,
    gateway: Arc<dyn CapabilityGateway>,
    call_timeout: Duration,
}

impl CommandRouter {
    /// Create a router with an explicit parser and per-call timeout.
    pub fn new(
        parser: TextCommandParser,
        gateway: Arc<dyn CapabilityGateway>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            parser,
            gateway,
            call_timeout,
        }
    }

    /// Create a router from the `[chat]` config section.
    pub fn from_config(config: &ChatConfig, gateway: Arc<dyn CapabilityGateway>) -> Self {
        let replies = CannedReplies::builtin().with_overrides(config.replies.clone());
        Self::new(
            TextCommandParser::new(replies),
            gateway,
            Duration::from_secs(config.capability_timeout_secs),
        )
    }

    pub fn parser(&self) -> &TextCommandParser {
        &self.parser
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Produce the reply for a message.
    pub async fn handle(&self, message: &Message) -> String {
        match self.route(message).await {
            Ok(reply) => reply,
            Err(failure) => {
                match &failure {
                    RouteFailure::Unrecognized | RouteFailure::Malformed(_) => {
                        tracing::debug!(reason = %failure, "No command reply")
                    }
                    _ => tracing::warn!(error = %failure, "Routing failed"),
                }
                failure.user_message()
            }
        }
    }

    /// Classify and dispatch, keeping the failure kind visible to the caller.
    pub async fn route(&self, message: &Message) -> Result<String, RouteFailure> {
        let intent = self.parser.classify_message(message)?;
        tracing::debug!(intent = intent.name(), "Dispatching message");

        match intent {
            Intent::VisualQuestion { question } => {
                let Some(image) = message.attached_image() else {
                    return Err(RouteFailure::Capability {
                        capability: Capability::VisualQuestion,
                        source: CapabilityError::Unavailable("no image attached".to_string()),
                    });
                };
                self.call(
                    Capability::VisualQuestion,
                    self.gateway.answer_visual_question(image, &question),
                )
                .await
            }
            Intent::Translate {
                text,
                target_language,
            } => {
                let translated = self
                    .call(
                        Capability::Translate,
                        self.gateway.translate(&text, &target_language),
                    )
                    .await?;
                Ok(format!("Translated text: {}", translated))
            }
            Intent::Weather { city } => {
                self.call(Capability::Weather, self.gateway.weather(&city))
                    .await
            }
            Intent::Convert {
                amount,
                from_currency,
                to_currency,
            } => {
                let rates = self
                    .call(
                        Capability::CurrencyRate,
                        self.gateway.currency_rates(&from_currency),
                    )
                    .await?;
                let rate = rates
                    .get(&to_currency)
                    .copied()
                    .filter(|r| r.is_finite() && *r > 0.0)
                    .ok_or_else(|| RouteFailure::RateNotFound {
                        currency: to_currency.clone(),
                    })?;
                Ok(format!(
                    "{} {} is equal to {:.2} {}",
                    format_amount(amount),
                    from_currency,
                    amount * rate,
                    to_currency
                ))
            }
            Intent::Joke => {
                let joke = self
                    .call(Capability::Joke, self.gateway.random_joke())
                    .await?;
                Ok(format!("{} ... {}", joke.setup, joke.punchline))
            }
            // The parser only yields phrases found in its own table.
            Intent::PlainChat { phrase } => self
                .parser
                .replies()
                .lookup(&phrase)
                .map(str::to_string)
                .ok_or(RouteFailure::Unrecognized),
            Intent::Unrecognized => Err(RouteFailure::Unrecognized),
        }
    }

    /// Await a gateway call under the configured timeout.
    async fn call<T, F>(&self, capability: Capability, call: F) -> Result<T, RouteFailure>
    where
        F: Future<Output = Result<T, CapabilityError>>,
    {
        let source = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => err,
            Err(_) => CapabilityError::Timeout(self.call_timeout),
        };
        Err(RouteFailure::Capability { capability, source })
    }
}

/// Render an amount the way it was typed for whole numbers (`10.0`) and with
/// the shortest exact form otherwise (`2.5`). Magnitudes of at least 1e16 or
/// below 1e-4 switch to exponent form with a signed, two-digit exponent
/// (`1e+16`, `2.5e-05`).
fn format_amount(amount: f64) -> String {
    let magnitude = amount.abs();
    if amount.is_finite() && magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let rendered = format!("{:e}", amount);
        if let Some((mantissa, exponent)) = rendered.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                let sign = if exponent < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
            }
        }
        return rendered;
    }
    if amount.fract() == 0.0 {
        format!("{:.1}", amount)
    } else {
        format!("{}", amount)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{
        CONVERSION_APOLOGY, CONVERSION_USAGE, IMAGE_APOLOGY, JOKE_APOLOGY, NOT_SURE,
        RATE_NOT_FOUND, TRANSLATION_APOLOGY, WEATHER_APOLOGY,
    };
    use crate::test_support::ScriptedGateway;
    use crate::types::{ImageHandle, RateTable};

    fn router_with(gateway: Arc<ScriptedGateway>) -> CommandRouter {
        CommandRouter::new(
            TextCommandParser::default(),
            gateway,
            DEFAULT_CAPABILITY_TIMEOUT,
        )
    }

    fn default_router() -> (CommandRouter, Arc<ScriptedGateway>) {
        let gateway = Arc::new(ScriptedGateway::default());
        (router_with(gateway.clone()), gateway)
    }

    fn failing_router() -> CommandRouter {
        router_with(Arc::new(ScriptedGateway::failing(CapabilityError::Request(
            "connection refused".to_string(),
        ))))
    }

    fn image_message(text: &str) -> Message {
        Message::with_image(text, ImageHandle::new(vec![7u8; 16]))
    }

    // ---- Successful dispatch ----

    #[tokio::test]
    async fn test_convert_reply_format() {
        let (router, gateway) = default_router();
        let reply = router
            .handle(&Message::text("convert 10 from USD to EUR"))
            .await;
        assert_eq!(reply, "10.0 USD is equal to 9.00 EUR");
        assert_eq!(gateway.calls(), vec!["currency_rates(USD)"]);
    }

    #[tokio::test]
    async fn test_convert_fractional_amount() {
        let (router, _) = default_router();
        let reply = router
            .handle(&Message::text("convert 2.5 from usd to gbp"))
            .await;
        assert_eq!(reply, "2.5 USD is equal to 2.00 GBP");
    }

    #[tokio::test]
    async fn test_convert_tiny_amount_uses_exponent_form() {
        let (router, _) = default_router();
        let reply = router
            .handle(&Message::text("convert 0.00001 from USD to EUR"))
            .await;
        assert_eq!(reply, "1e-05 USD is equal to 0.00 EUR");
    }

    #[tokio::test]
    async fn test_translate_reply_format() {
        let (router, gateway) = default_router();
        let reply = router
            .handle(&Message::text("translate hello to fr"))
            .await;
        assert_eq!(reply, "Translated text: bonjour");
        assert_eq!(gateway.calls(), vec!["translate(hello, fr)"]);
    }

    #[tokio::test]
    async fn test_weather_returns_raw_string() {
        let (router, gateway) = default_router();
        let reply = router.handle(&Message::text("weather in Paris")).await;
        assert_eq!(reply, "Sunny +21°C");
        assert_eq!(gateway.calls(), vec!["weather(Paris)"]);
    }

    #[tokio::test]
    async fn test_joke_reply_format() {
        let (router, _) = default_router();
        let reply = router.handle(&Message::text("tell me a joke")).await;
        assert_eq!(
            reply,
            "Why did the chicken cross the road? ... To get to the other side."
        );
    }

    #[tokio::test]
    async fn test_visual_question_answer() {
        let (router, gateway) = default_router();
        let reply = router.handle(&image_message("what color is this?")).await;
        assert_eq!(reply, "red");
        assert_eq!(
            gateway.calls(),
            vec!["answer_visual_question(16, what color is this?)"]
        );
    }

    #[tokio::test]
    async fn test_image_ignores_joke_keyword() {
        let (router, gateway) = default_router();
        let reply = router.handle(&image_message("is this a joke?")).await;
        assert_eq!(reply, "red");
        assert!(!gateway.calls().iter().any(|c| c.starts_with("random_joke")));
    }

    #[tokio::test]
    async fn test_plain_chat_reply() {
        let (router, gateway) = default_router();
        assert_eq!(
            router.handle(&Message::text("hello")).await,
            "Hi there! How can I assist you?"
        );
        assert_eq!(
            router.handle(&Message::text("What do you do")).await,
            "I'm here to help with your questions!"
        );
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_reply_from_config() {
        let mut config = ChatConfig::default();
        config
            .replies
            .insert("thanks".to_string(), "Any time!".to_string());
        let router = CommandRouter::from_config(&config, Arc::new(ScriptedGateway::default()));
        assert_eq!(router.handle(&Message::text("Thanks")).await, "Any time!");
        assert_eq!(router.call_timeout(), Duration::from_secs(10));
    }

    // ---- Unrecognized / malformed ----

    #[tokio::test]
    async fn test_unrecognized_text() {
        let (router, gateway) = default_router();
        assert_eq!(router.handle(&Message::text("asdf123")).await, NOT_SURE);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_near_miss_phrase_is_unrecognized() {
        let (router, _) = default_router();
        let failure = router.route(&Message::text("hello!")).await.unwrap_err();
        assert!(matches!(failure, RouteFailure::Unrecognized));
        assert_eq!(failure.user_message(), NOT_SURE);
    }

    #[tokio::test]
    async fn test_malformed_conversion_returns_usage() {
        let (router, gateway) = default_router();
        let reply = router
            .handle(&Message::text("convert abc from USD to EUR"))
            .await;
        assert_eq!(reply, CONVERSION_USAGE);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_translation_returns_apology() {
        let (router, _) = default_router();
        let reply = router.handle(&Message::text("translate hello")).await;
        assert_eq!(reply, TRANSLATION_APOLOGY);
    }

    // ---- Capability failures ----

    #[tokio::test]
    async fn test_every_failure_maps_to_fixed_apology() {
        let router = failing_router();
        let cases = [
            (Message::text("translate hello to fr"), TRANSLATION_APOLOGY),
            (Message::text("weather in Paris"), WEATHER_APOLOGY),
            (Message::text("convert 10 from USD to EUR"), CONVERSION_APOLOGY),
            (Message::text("tell me a joke"), JOKE_APOLOGY),
            (image_message("what is this?"), IMAGE_APOLOGY),
        ];
        for (message, expected) in cases {
            assert_eq!(router.handle(&message).await, expected);
        }
    }

    #[tokio::test]
    async fn test_missing_rate_is_rate_not_found() {
        let (router, _) = default_router();
        let failure = router
            .route(&Message::text("convert 10 from USD to XYZ"))
            .await
            .unwrap_err();
        assert!(matches!(
            failure,
            RouteFailure::RateNotFound { ref currency } if currency == "XYZ"
        ));
        assert_eq!(failure.user_message(), RATE_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_zero_rate_is_rate_not_found() {
        let gateway = ScriptedGateway {
            rates: Ok(RateTable::from([("EUR".to_string(), 0.0)])),
            ..ScriptedGateway::default()
        };
        let router = router_with(Arc::new(gateway));
        assert_eq!(
            router
                .handle(&Message::text("convert 10 from USD to EUR"))
                .await,
            RATE_NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_rate_request_failure_is_distinct() {
        let router = failing_router();
        let failure = router
            .route(&Message::text("convert 10 from USD to EUR"))
            .await
            .unwrap_err();
        assert!(matches!(
            failure,
            RouteFailure::Capability {
                capability: Capability::CurrencyRate,
                ..
            }
        ));
        assert_eq!(failure.user_message(), CONVERSION_APOLOGY);
    }

    #[tokio::test]
    async fn test_unexpected_response_is_capability_failure() {
        let gateway = ScriptedGateway {
            weather: Err(CapabilityError::UnexpectedResponse("empty body".to_string())),
            ..ScriptedGateway::default()
        };
        let router = router_with(Arc::new(gateway));
        assert_eq!(
            router.handle(&Message::text("weather in")).await,
            WEATHER_APOLOGY
        );
    }

    #[tokio::test]
    async fn test_slow_capability_times_out() {
        let gateway = ScriptedGateway {
            delay: Some(Duration::from_secs(5)),
            ..ScriptedGateway::default()
        };
        let router = CommandRouter::new(
            TextCommandParser::default(),
            Arc::new(gateway),
            Duration::from_millis(20),
        );
        let failure = router
            .route(&Message::text("tell me a joke"))
            .await
            .unwrap_err();
        assert!(matches!(
            failure,
            RouteFailure::Capability {
                capability: Capability::Joke,
                source: CapabilityError::Timeout(_),
            }
        ));
        assert_eq!(failure.user_message(), JOKE_APOLOGY);
    }

    // ---- Formatting ----

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(10.0), "10.0");
        assert_eq!(format_amount(0.0), "0.0");
        assert_eq!(format_amount(2.5), "2.5");
        assert_eq!(format_amount(-3.0), "-3.0");
        assert_eq!(format_amount(0.125), "0.125");
        assert_eq!(format_amount(0.0001), "0.0001");
        assert_eq!(format_amount(9999999999999998.0), "9999999999999998.0");
    }

    #[test]
    fn test_format_amount_exponent_form() {
        assert_eq!(format_amount(1e16), "1e+16");
        assert_eq!(format_amount(1.5e16), "1.5e+16");
        assert_eq!(format_amount(1e-5), "1e-05");
        assert_eq!(format_amount(-2.5e-7), "-2.5e-07");
        assert_eq!(format_amount(1e100), "1e+100");
    }
}
