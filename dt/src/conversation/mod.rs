//! Conversation log
//!
//! Holds the chronological list of turns exchanged in one chat session.
//! Nothing here is persisted: the log lives and dies with its session.

mod store;
mod turn;

pub use store::ConversationStore;
pub use turn::{Role, Turn};
