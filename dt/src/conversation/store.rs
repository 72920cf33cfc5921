//! In-memory conversation store

use tracing::debug;

use super::Turn;

/// Append-only log of turns in chronological order
///
/// Role alternation is not enforced here; the session controller is
/// responsible for appending user and assistant turns in sequence.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    turns: Vec<Turn>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn to the end of the log
    pub fn append(&mut self, turn: Turn) {
        debug!(role = %turn.role(), len = self.turns.len(), "ConversationStore::append: called");
        self.turns.push(turn);
    }

    /// Drop every turn
    pub fn clear(&mut self) {
        debug!(len = self.turns.len(), "ConversationStore::clear: called");
        self.turns.clear();
    }

    /// All turns, oldest first
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
