//! Per-user check-in dialogue: session table and state machine.

pub mod engine;
pub mod session;

pub use engine::{ConversationEngine, Input};
pub use session::{DialogueState, Session, SessionStore};
