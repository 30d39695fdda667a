//! Session coordinator: the single per-turn entry point for a UI.
//!
//! Owns one router and one session. Use one coordinator per conversation;
//! `process_turn` takes `&mut self`, so turns are appended strictly in the
//! order they are processed.

use std::sync::Arc;

use parley_core::config::ChatConfig;

use crate::gateway::CapabilityGateway;
use crate::router::CommandRouter;
use crate::session::ConversationSession;
use crate::types::{Message, Speaker, Turn};

/// Folds router replies into the conversation transcript.
pub struct SessionCoordinator {
    router: CommandRouter,
    session: ConversationSession,
}

impl SessionCoordinator {
    /// Wrap an existing router and session.
    pub fn new(router: CommandRouter, session: ConversationSession) -> Self {
        tracing::info!(
            session_id = %session.id(),
            retention = session.retention(),
            "Conversation session started"
        );
        Self { router, session }
    }

    /// Build router and session from the `[chat]` config section.
    pub fn from_config(config: &ChatConfig, gateway: Arc<dyn CapabilityGateway>) -> Self {
        Self::new(
            CommandRouter::from_config(config, gateway),
            ConversationSession::new(config.retention_turns),
        )
    }

    /// Handle one user submission.
    ///
    /// Always produces a reply. Both turns are appended to the session and
    /// returned for rendering.
    pub async fn process_turn(&mut self, message: Message) -> (Turn, Turn) {
        let visual = message.attached_image().is_some();
        let user_turn = Turn::new(Speaker::User, message.raw_text(), visual);

        let reply = self.router.handle(&message).await;
        let bot_turn = Turn::new(Speaker::Bot, reply, visual);

        self.session.append_pair(user_turn.clone(), bot_turn.clone());
        tracing::debug!(
            session_id = %self.session.id(),
            retained = self.session.len(),
            "Turn processed"
        );

        (user_turn, bot_turn)
    }

    /// Read access to the transcript.
    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    /// End the coordinator's lifecycle, handing back the transcript.
    pub fn into_session(self) -> ConversationSession {
        tracing::info!(
            session_id = %self.session.id(),
            exchanges = self.session.exchange_count(),
            "Conversation session ended"
        );
        self.session
    }
}

// =============================================================================
// Tests
// =============================================================================
