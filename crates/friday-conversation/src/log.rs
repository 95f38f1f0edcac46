//! Ordered, append-only log of conversation turns

use friday_ai::Turn;
use serde::{Deserialize, Serialize};

/// Conversation turns in insertion order.
///
/// Unbounded in memory; only the persistence layer caps what is written out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn followed by the assistant's answer
    pub fn push_exchange(&mut self, user_text: impl Into<String>, assistant_text: impl Into<String>) {
        self.turns.push(Turn::user(user_text));
        self.turns.push(Turn::assistant(assistant_text));
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// The last `n` turns, oldest first
    pub fn window(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<Turn>> for ConversationLog {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}
