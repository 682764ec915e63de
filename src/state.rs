//! Shared application state handed to every Slack callback.

use std::sync::Arc;

use crate::clock::Clock;
use crate::conversation::ConversationEngine;
use crate::persistence::status_repo::StatusRepo;
use crate::slack::client::SlackService;

/// State reachable from slash commands, push events and interactions.
pub struct AppState {
    /// Dialogue state machine.
    pub engine: Arc<ConversationEngine>,
    /// Status log.
    pub status: StatusRepo,
    /// Local clock.
    pub clock: Arc<dyn Clock>,
    /// Slack client service (absent when running without credentials).
    pub slack: Option<Arc<SlackService>>,
}
