//! Size-bounded conversation transcript.

use std::collections::VecDeque;

use chrono::Local;
use uuid::Uuid;

use crate::types::Turn;

/// Number of turns kept when no retention is configured.
pub const DEFAULT_RETENTION: usize = 8;

/// Ordered log of turns, keeping only the most recent `retention` entries.
///
/// Appending is the only mutation. Overflow evicts from the front, so the
/// surviving turns keep their chronological order.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: Uuid,
    started_at: i64,
    last_message_at: i64,
    exchange_count: u64,
    retention: usize,
    turns: VecDeque<Turn>,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl ConversationSession {
    /// Start an empty session keeping at most `retention` turns.
    pub fn new(retention: usize) -> Self {
        let now = Local::now().timestamp();
        Self {
            id: Uuid::new_v4(),
            started_at: now,
            last_message_at: now,
            exchange_count: 0,
            retention,
            turns: VecDeque::with_capacity(retention.min(64) + 2),
        }
    }

    /// Append a single turn, then trim to the retention window.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        self.touch();
        self.trim();
    }

    /// Append a user turn and the bot's reply as one exchange.
    pub fn append_pair(&mut self, user_turn: Turn, bot_turn: Turn) {
        self.turns.push_back(user_turn);
        self.turns.push_back(bot_turn);
        self.exchange_count += 1;
        self.touch();
        self.trim();
    }

    /// Copy of the retained turns, oldest first.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Epoch seconds when the session was created.
    pub fn started_at(&self) -> i64 {
        self.started_at
    }

    /// Epoch seconds of the most recent append.
    pub fn last_message_at(&self) -> i64 {
        self.last_message_at
    }

    /// Number of user/bot exchanges ever appended, including evicted ones.
    pub fn exchange_count(&self) -> u64 {
        self.exchange_count
    }

    fn touch(&mut self) {
        self.last_message_at = Local::now().timestamp();
    }

    fn trim(&mut self) {
        let overflow = self.turns.len().saturating_sub(self.retention);
        if overflow > 0 {
            self.turns.drain(..overflow);
            tracing::trace!(session_id = %self.id, evicted = overflow, "Trimmed transcript");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
