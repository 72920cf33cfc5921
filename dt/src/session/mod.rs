//! Chat session controller
//!
//! A [`Session`] owns one conversation log plus its ephemeral settings and
//! drives each user turn through compose → invoke → record. Sessions share
//! nothing, so several can run side by side without locking.

mod controller;
mod error;
mod notice;
mod settings;

pub use controller::{Session, SessionSnapshot, SessionState, TurnOutcome};
pub use error::SessionError;
pub use notice::Notice;
pub use settings::{Panel, SessionSettings};
