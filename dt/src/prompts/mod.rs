//! Prompt System
//!
//! Builds the single request string sent to the model each turn.
//!
//! System prompt loading chain:
//! 1. Explicit `chat.system-prompt-file` from config
//! 2. `.deeptok/prompts/system.pmt` (project override)
//! 3. Embedded fallback in code
//!
//! Only the latest user turn is sent; earlier turns stay local for display.

mod compose;
pub mod embedded;
mod loader;

pub use compose::{RESPONSE_LABEL, USER_LABEL, compose};
pub use loader::PromptLoader;
