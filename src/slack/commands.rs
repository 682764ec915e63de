//! Slack slash command router.
//!
//! `/checkin` starts (or restarts) the dialogue, `/cancel` abandons it and
//! `/roster` answers synchronously with today's statuses.

use std::sync::Arc;

use slack_morphism::prelude::{
    SlackClient, SlackClientEventsUserState, SlackClientHyperHttpsConnector, SlackCommandEvent,
    SlackCommandEventResponse, SlackMessageContent, SlackMessageResponseType,
};
use tracing::{error, info, warn};

use crate::conversation::Input;
use crate::roster;
use crate::slack::blocks;
use crate::slack::events::app_state;
use crate::state::AppState;
use crate::transport::Outbound;

const UNAVAILABLE: &str = "The check-in bot is starting up, please try again in a moment.";
const ROSTER_FAILED: &str = "Couldn't read today's statuses, please try again.";

/// Commands understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Begin a check-in dialogue.
    CheckIn,
    /// Abandon the current dialogue.
    Cancel,
    /// Show today's roster.
    Roster,
}

impl Command {
    /// Resolve a slash command name, with or without the leading slash.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().trim_start_matches('/') {
            "checkin" | "start" => Some(Self::CheckIn),
            "cancel" => Some(Self::Cancel),
            "roster" | "list" => Some(Self::Roster),
            _ => None,
        }
    }
}

/// Run `command` for `identity` and produce the reply.
pub async fn execute(app: &AppState, identity: &str, command: Command) -> Outbound {
    match command {
        Command::CheckIn => app.engine.handle(identity, Input::Start).await,
        Command::Cancel => app.engine.handle(identity, Input::Cancel).await,
        Command::Roster => match roster::today_roster(&app.status, app.clock.today()).await {
            Ok(text) => Outbound::plain(text),
            Err(err) => {
                error!(%err, "roster query failed");
                Outbound::plain(ROSTER_FAILED)
            }
        },
    }
}

fn ephemeral(reply: &Outbound) -> SlackCommandEventResponse {
    SlackCommandEventResponse {
        content: SlackMessageContent {
            text: Some(reply.text.clone()),
            blocks: blocks::outbound_blocks(reply),
            attachments: None,
            upload: None,
            files: None,
            reactions: None,
            metadata: None,
        },
        response_type: Some(SlackMessageResponseType::Ephemeral),
    }
}

/// Handle incoming slash commands routed via Socket Mode.
///
/// # Errors
///
/// Returns an error if the command response cannot be constructed.
pub async fn handle_command(
    event: SlackCommandEvent,
    _client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    state: SlackClientEventsUserState,
) -> slack_morphism::AnyStdResult<SlackCommandEventResponse> {
    info!(command = ?event.command, user = ?event.user_id, "received slash command");

    let Some(app) = app_state(&state).await else {
        warn!("app state not available; cannot process command");
        return Ok(ephemeral(&Outbound::plain(UNAVAILABLE)));
    };

    let identity = event.user_id.to_string();
    let reply = match Command::parse(&event.command.to_string()) {
        Some(command) => execute(&app, &identity, command).await,
        None => Outbound::plain(format!("Unknown command {}", event.command)),
    };

    Ok(ephemeral(&reply))
}
