//! Chat transport boundary.
//!
//! The conversation engine and the reminder sweep only ever produce
//! [`Outbound`] values addressed to an identity. Any chat backend that can
//! deliver text plus an optional fixed reply menu implements
//! [`ChatTransport`].

use std::future::Future;
use std::pin::Pin;

use crate::models::StatusKind;
use crate::Result;

/// Fixed reply menus the bot can attach to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    /// Every status kind plus the roster query.
    Status,
}

/// One option of the status menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Declare a status.
    Status(StatusKind),
    /// Show today's roster instead of declaring anything.
    Roster,
}

/// Label of the roster option in the status menu.
pub const ROSTER_LABEL: &str = "📋 Who's in today";

impl MenuChoice {
    /// Every option in display order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        StatusKind::ALL
            .into_iter()
            .map(Self::Status)
            .chain(std::iter::once(Self::Roster))
            .collect()
    }

    /// Stable identifier carried by buttons (`status_remote`, `status_roster`).
    #[must_use]
    pub fn action_id(self) -> String {
        match self {
            Self::Status(kind) => format!("status_{}", kind.tag()),
            Self::Roster => "status_roster".to_owned(),
        }
    }

    /// Resolve a button identifier produced by [`action_id`](Self::action_id).
    #[must_use]
    pub fn from_action_id(action_id: &str) -> Option<Self> {
        match action_id.strip_prefix("status_")? {
            "roster" => Some(Self::Roster),
            tag => StatusKind::from_tag(tag).map(Self::Status),
        }
    }

    /// Resolve free text typed instead of pressing a button.
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        let plain_roster = ROSTER_LABEL
            .split_once(' ')
            .map_or(ROSTER_LABEL, |(_, rest)| rest);
        if text == ROSTER_LABEL || text.eq_ignore_ascii_case(plain_roster) {
            return Some(Self::Roster);
        }
        StatusKind::from_label(text).map(Self::Status)
    }

    /// User-facing label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Status(kind) => kind.label(),
            Self::Roster => ROSTER_LABEL,
        }
    }
}

/// A message addressed to one chat identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Message body.
    pub text: String,
    /// Reply menu to show with the message, if any.
    pub menu: Option<Menu>,
}

impl Outbound {
    /// Text-only message.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: None,
        }
    }

    /// Message carrying the status menu.
    #[must_use]
    pub fn with_menu(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: Some(Menu::Status),
        }
    }
}

/// Delivery side of a chat backend.
pub trait ChatTransport: Send + Sync {
    /// Deliver `message` to `identity` and report whether it arrived.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Transport`](crate::AppError::Transport) when the
    /// backend refuses or fails the delivery (blocked or deleted chat).
    fn send<'a>(
        &'a self,
        identity: &'a str,
        message: Outbound,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
