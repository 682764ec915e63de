//! Slack Socket Mode client with a small buffered send queue.
//!
//! Conversation replies go through the queue so callbacks return quickly.
//! Reminder nudges use [`ChatTransport::send`], which posts directly so the
//! sweep learns about each delivery failure.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use slack_morphism::errors::SlackClientError;
use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiChatUpdateRequest, SlackApiToken, SlackApiTokenType,
    SlackApiTokenValue, SlackBlock, SlackChannelId, SlackClient,
    SlackClientEventsListenerEnvironment, SlackClientHyperHttpsConnector, SlackClientSession,
    SlackClientSocketModeConfig, SlackClientSocketModeListener, SlackMessageContent,
    SlackSocketModeListenerCallbacks, SlackTs,
};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tracing::{error, info, warn};

use crate::slack::{blocks, commands, events};
use crate::state::AppState;
use crate::transport::{ChatTransport, Outbound};
use crate::{config::SlackConfig, AppError, Result};

const QUEUE_CAPACITY: usize = 256;
const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
/// Attempts per message before the queue worker gives up on it.
const MAX_DELIVERY_ATTEMPTS: u32 = 5;

/// Message to be delivered to Slack via chat.postMessage.
#[derive(Debug, Clone)]
pub struct SlackMessage {
    /// Target channel; a user id addresses the bot's DM with that user.
    pub channel: SlackChannelId,
    /// Fallback / body text.
    pub text: Option<String>,
    /// Optional Block Kit layout.
    pub blocks: Option<Vec<SlackBlock>>,
}

impl SlackMessage {
    /// Render an [`Outbound`] for delivery into `channel`.
    #[must_use]
    pub fn from_outbound(channel: SlackChannelId, message: &Outbound) -> Self {
        Self {
            channel,
            text: Some(message.text.clone()),
            blocks: blocks::outbound_blocks(message),
        }
    }

    fn into_request(self) -> SlackApiChatPostMessageRequest {
        let content = SlackMessageContent {
            text: self.text,
            blocks: self.blocks,
            attachments: None,
            upload: None,
            files: None,
            reactions: None,
            metadata: None,
        };

        SlackApiChatPostMessageRequest {
            channel: self.channel,
            content,
            as_user: None,
            icon_emoji: None,
            icon_url: None,
            link_names: Some(true),
            parse: None,
            thread_ts: None,
            username: None,
            reply_broadcast: None,
            unfurl_links: None,
            unfurl_media: None,
        }
    }
}

/// Delay to wait before retrying `error`, or `None` when retrying is futile.
fn retry_delay(error: &SlackClientError, backoff: Duration) -> Option<Duration> {
    match error {
        SlackClientError::RateLimitError(rate) => Some(rate.retry_after.unwrap_or(backoff)),
        SlackClientError::ApiError(_) => None,
        _ => Some(backoff),
    }
}

/// Slack Socket Mode wrapper that owns a rate-limited outgoing queue.
pub struct SlackService {
    client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    bot_token: SlackApiToken,
    app_token: SlackApiToken,
    queue_tx: mpsc::Sender<SlackMessage>,
}

/// Join handles for Slack background tasks.
pub struct SlackRuntime {
    /// Outgoing queue worker.
    pub queue_task: JoinHandle<()>,
}

impl SlackService {
    /// Build the Slack client and start the background sender task.
    ///
    /// Socket Mode is started separately with [`listen`](Self::listen) once
    /// the shared [`AppState`] exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the HTTPS connector cannot be created.
    pub fn start(config: &SlackConfig) -> Result<(Self, SlackRuntime)> {
        let connector = SlackClientHyperHttpsConnector::new()
            .map_err(|err| AppError::Slack(format!("failed to init slack connector: {err}")))?;
        let client = Arc::new(SlackClient::new(connector));
        let bot_token = SlackApiToken {
            token_value: SlackApiTokenValue(config.bot_token.clone()),
            cookie: None,
            team_id: None,
            scope: None,
            token_type: Some(SlackApiTokenType::Bot),
        };
        let app_token = SlackApiToken {
            token_value: SlackApiTokenValue(config.app_token.clone()),
            cookie: None,
            team_id: None,
            scope: None,
            token_type: Some(SlackApiTokenType::App),
        };

        let (queue_tx, queue_rx) = mpsc::channel(QUEUE_CAPACITY);
        let queue_task = Self::spawn_worker(Arc::clone(&client), bot_token.clone(), queue_rx);

        info!("slack service started with buffered queue");

        Ok((
            Self {
                client,
                bot_token,
                app_token,
                queue_tx,
            },
            SlackRuntime { queue_task },
        ))
    }

    /// Enqueue a message for async delivery.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the message queue is closed.
    pub async fn enqueue(&self, message: SlackMessage) -> Result<()> {
        self.queue_tx
            .send(message)
            .await
            .map_err(|err| AppError::Slack(format!("failed to enqueue slack message: {err}")))
    }

    fn spawn_worker(
        client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
        token: SlackApiToken,
        mut queue_rx: mpsc::Receiver<SlackMessage>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let session = client.open_session(&token);
            while let Some(message) = queue_rx.recv().await {
                let request = message.into_request();
                let mut backoff = INITIAL_RETRY_DELAY;
                for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
                    match session.chat_post_message(&request).await {
                        Ok(_) => break,
                        Err(error) => {
                            let Some(delay) = retry_delay(&error, backoff)
                                .filter(|_| attempt < MAX_DELIVERY_ATTEMPTS)
                            else {
                                error!(?error, channel = %request.channel, "slack post dropped");
                                break;
                            };
                            warn!(?error, delay = ?delay, attempt, "slack post failed; retrying");
                            sleep(delay).await;
                            backoff = (backoff * 2).min(MAX_RETRY_DELAY);
                        }
                    }
                }
            }
            info!("slack sender task exiting");
        })
    }

    /// Start Socket Mode, routing commands, DMs and button presses to `state`.
    #[must_use]
    pub fn listen(&self, state: Arc<AppState>) -> JoinHandle<()> {
        let listener_env = Arc::new(
            SlackClientEventsListenerEnvironment::new(Arc::clone(&self.client))
                .with_error_handler(|err, _client, _state| {
                    error!(?err, "socket mode error");
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR
                })
                .with_user_state(state),
        );
        let callbacks = SlackSocketModeListenerCallbacks::new()
            .with_hello_events(|event, _client, _state| async move {
                info!(?event, "socket hello");
            })
            .with_command_events(commands::handle_command)
            .with_interaction_events(events::handle_interaction)
            .with_push_events(events::handle_push_event);
        let config = SlackClientSocketModeConfig {
            max_connections_count: SlackClientSocketModeConfig::DEFAULT_CONNECTIONS_COUNT,
            debug_connections: SlackClientSocketModeConfig::DEFAULT_DEBUG_CONNECTIONS,
            initial_backoff_in_seconds:
                SlackClientSocketModeConfig::DEFAULT_INITIAL_BACKOFF_IN_SECONDS,
            reconnect_timeout_in_seconds:
                SlackClientSocketModeConfig::DEFAULT_RECONNECT_TIMEOUT_IN_SECONDS,
            ping_interval_in_seconds: SlackClientSocketModeConfig::DEFAULT_PING_INTERVAL_IN_SECONDS,
            ping_failure_threshold_times:
                SlackClientSocketModeConfig::DEFAULT_PING_FAILURE_THRESHOLD_TIMES,
        };

        let listener = SlackClientSocketModeListener::new(&config, listener_env, callbacks);
        let app_token = self.app_token.clone();
        tokio::spawn(async move {
            if let Err(error) = listener.listen_for(&app_token).await {
                error!(?error, "socket mode listen failed");
                return;
            }

            listener.serve().await;
            info!("socket mode listener exited");
        })
    }

    /// Create an HTTP session for direct API calls using the bot token.
    #[must_use]
    pub fn http_session(&self) -> SlackClientSession<'_, SlackClientHyperHttpsConnector> {
        self.client.open_session(&self.bot_token)
    }

    /// Post a message immediately, retrying only on rate limits.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if Slack rejects the message.
    pub async fn post_now(&self, message: SlackMessage) -> Result<()> {
        let channel = message.channel.clone();
        let request = message.into_request();
        let session = self.http_session();
        let mut backoff = INITIAL_RETRY_DELAY;
        let mut attempt = 1;
        loop {
            match session.chat_post_message(&request).await {
                Ok(_) => return Ok(()),
                Err(SlackClientError::RateLimitError(rate)) if attempt < MAX_DELIVERY_ATTEMPTS => {
                    let delay = rate.retry_after.unwrap_or(backoff);
                    warn!(%channel, delay = ?delay, attempt, "rate limited; retrying");
                    sleep(delay).await;
                    backoff = (backoff * 2).min(MAX_RETRY_DELAY);
                    attempt += 1;
                }
                Err(err) => {
                    return Err(AppError::Transport(format!(
                        "failed to post to {channel}: {err}"
                    )));
                }
            }
        }
    }

    /// Update an existing Slack message (e.g., replace buttons with static text).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the Slack API call fails.
    pub async fn update_message(
        &self,
        channel: SlackChannelId,
        ts: SlackTs,
        blocks: Vec<SlackBlock>,
    ) -> Result<()> {
        let request = SlackApiChatUpdateRequest::new(
            channel,
            SlackMessageContent {
                text: None,
                blocks: Some(blocks),
                attachments: None,
                upload: None,
                files: None,
                reactions: None,
                metadata: None,
            },
            ts,
        );
        self.http_session()
            .chat_update(&request)
            .await
            .map_err(|err| AppError::Slack(format!("failed to update message: {err}")))?;
        Ok(())
    }
}

impl ChatTransport for SlackService {
    fn send<'a>(
        &'a self,
        identity: &'a str,
        message: Outbound,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let channel = SlackChannelId(identity.to_owned());
            self.post_now(SlackMessage::from_outbound(channel, &message))
                .await
        })
    }
}
