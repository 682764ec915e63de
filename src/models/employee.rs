//! Directory entry for a known chat participant.

use serde::{Deserialize, Serialize};

/// A user who has registered a display name with the bot.
///
/// Created on first successful identity capture and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Employee {
    /// Name shown in the roster, captured verbatim.
    pub display_name: String,
    /// Opaque chat identity issued by the transport.
    pub identity: String,
}

impl Employee {
    /// Construct a directory entry.
    #[must_use]
    pub fn new(display_name: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            identity: identity.into(),
        }
    }
}
