//! Slack push-event and interaction handlers.
//!
//! Direct messages to the bot become free-text turns; presses on the
//! status menu buttons become menu picks. Both are fed to the
//! [`ConversationEngine`](crate::conversation::ConversationEngine) and the
//! reply is queued back into the same DM.

use std::sync::Arc;

use slack_morphism::prelude::{
    SlackChannelId, SlackClient, SlackClientEventsUserState, SlackClientHyperHttpsConnector,
    SlackEventCallbackBody, SlackInteractionEvent, SlackPushEventCallback,
};
use tracing::{debug, info, warn};

use crate::conversation::Input;
use crate::slack::blocks;
use crate::slack::client::SlackMessage;
use crate::state::AppState;
use crate::transport::MenuChoice;

/// Extract the shared [`AppState`] injected into the listener environment.
pub(crate) async fn app_state(state: &SlackClientEventsUserState) -> Option<Arc<AppState>> {
    let guard = state.read().await;
    guard.get_user_state::<Arc<AppState>>().cloned()
}

/// Run one conversation turn and queue the reply into `channel`.
async fn converse(app: &AppState, identity: &str, channel: SlackChannelId, input: Input) {
    let reply = app.engine.handle(identity, input).await;
    let Some(ref slack) = app.slack else {
        warn!(identity, "slack not available; reply dropped");
        return;
    };
    if let Err(err) = slack
        .enqueue(SlackMessage::from_outbound(channel, &reply))
        .await
    {
        warn!(%err, identity, "failed to queue reply");
    }
}

/// Whether a DM channel id (`D...`) addresses the bot directly.
fn is_direct_channel(channel: &SlackChannelId) -> bool {
    channel.0.starts_with('D')
}

/// Handle push events delivered via Socket Mode.
///
/// Only human-authored direct messages are processed; bot echoes, edits
/// and channel chatter are ignored.
///
/// # Errors
///
/// Never fails; problems are logged.
pub async fn handle_push_event(
    event: SlackPushEventCallback,
    _client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    state: SlackClientEventsUserState,
) -> slack_morphism::UserCallbackResult<()> {
    let SlackEventCallbackBody::Message(message) = event.event else {
        debug!("non-message push event ignored");
        return Ok(());
    };

    if message.sender.bot_id.is_some() || message.subtype.is_some() {
        return Ok(());
    }

    let (Some(user), Some(channel)) = (message.sender.user, message.origin.channel) else {
        return Ok(());
    };
    if !is_direct_channel(&channel) {
        return Ok(());
    }

    let text = message
        .content
        .and_then(|content| content.text)
        .unwrap_or_default();

    let Some(app) = app_state(&state).await else {
        warn!("app state not available; cannot process message");
        return Ok(());
    };

    let identity = user.to_string();
    info!(identity, "direct message received");
    converse(&app, &identity, channel, Input::Text(text)).await;
    Ok(())
}

/// Handle interactive payloads (status menu buttons) delivered via Socket Mode.
///
/// The pressed menu is replaced with the chosen label before the turn
/// runs, so a second tap on the same message does nothing visible.
///
/// # Errors
///
/// Never fails; problems are logged.
pub async fn handle_interaction(
    event: SlackInteractionEvent,
    _client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    state: SlackClientEventsUserState,
) -> slack_morphism::UserCallbackResult<()> {
    let SlackInteractionEvent::BlockActions(block_event) = &event else {
        info!(?event, "unhandled interaction event type");
        return Ok(());
    };

    let user_id = block_event
        .user
        .as_ref()
        .map(|u| u.id.to_string())
        .unwrap_or_default();
    if user_id.is_empty() {
        warn!("block action with empty user ID; ignoring");
        return Ok(());
    }

    let Some(app) = app_state(&state).await else {
        warn!("app state not available; cannot process interaction");
        return Ok(());
    };

    let Some(actions) = &block_event.actions else {
        return Ok(());
    };

    for action in actions {
        let action_id = action.action_id.to_string();
        let Some(choice) = MenuChoice::from_action_id(&action_id) else {
            warn!(action_id, "unknown action_id");
            continue;
        };
        info!(action_id, user_id, "dispatching menu choice");

        // Ephemeral menus (slash command replies) carry no message to edit.
        if let (Some(slack), Some(channel), Some(msg)) = (
            &app.slack,
            block_event.channel.as_ref(),
            block_event.message.as_ref(),
        ) {
            let replacement = vec![blocks::choice_made_section(choice)];
            if let Err(err) = slack
                .update_message(channel.id.clone(), msg.origin.ts.clone(), replacement)
                .await
            {
                warn!(%err, "failed to replace status menu");
            }
        }

        // Replies always go to the user's DM with the bot, never a shared channel.
        let reply_channel = SlackChannelId(user_id.clone());
        converse(&app, &user_id, reply_channel, Input::Choice(choice)).await;
    }
    Ok(())
}
