//! Per-identity dialogue sessions with idle eviction.
//!
//! Sessions live only while a dialogue is in progress. They are removed on
//! commit or cancel, and the eviction task drops any session left idle past
//! the configured timeout so abandoned dialogues do not accumulate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::models::StatusKind;

/// Where a dialogue currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueState {
    /// Waiting for the user's display name.
    AwaitIdentity,
    /// Status menu shown, waiting for a pick.
    ChoosingStatus,
    /// Waiting for the first detail of `kind`.
    AwaitPrimaryDetail(StatusKind),
    /// Running late: arrival time captured, waiting for the reason.
    AwaitSecondaryDetail {
        /// Kind being declared.
        kind: StatusKind,
        /// Detail captured in the previous turn.
        primary: String,
    },
}

/// In-progress dialogue for one identity.
#[derive(Debug, Clone)]
pub struct Session {
    /// Display name once known.
    pub display_name: Option<String>,
    /// Current step.
    pub state: DialogueState,
    /// Last time the user advanced this dialogue.
    pub last_activity: Instant,
}

impl Session {
    /// Fresh session at `state`.
    #[must_use]
    pub fn new(display_name: Option<String>, state: DialogueState) -> Self {
        Self {
            display_name,
            state,
            last_activity: Instant::now(),
        }
    }
}

/// Session table keyed by identity.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    idle_timeout: Duration,
}

impl SessionStore {
    /// Empty store evicting sessions idle longer than `idle_timeout`.
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Remove and return the session for `identity`.
    ///
    /// The caller owns the session for the duration of one turn and puts it
    /// back with [`put`](Self::put) unless the turn was terminal.
    pub async fn take(&self, identity: &str) -> Option<Session> {
        self.sessions.lock().await.remove(identity)
    }

    /// Store `session` for `identity`, refreshing its activity time.
    pub async fn put(&self, identity: &str, mut session: Session) {
        session.last_activity = Instant::now();
        self.sessions
            .lock()
            .await
            .insert(identity.to_owned(), session);
    }

    /// Drop the session for `identity`, returning whether one existed.
    pub async fn discard(&self, identity: &str) -> bool {
        self.sessions.lock().await.remove(identity).is_some()
    }

    /// Current state for `identity`, if a dialogue is open.
    pub async fn state_of(&self, identity: &str) -> Option<DialogueState> {
        self.sessions
            .lock()
            .await
            .get(identity)
            .map(|session| session.state.clone())
    }

    /// Number of open dialogues.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no dialogue is open.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Drop sessions idle since before `now - idle_timeout`.
    ///
    /// Returns the number of evicted sessions.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|identity, session| {
            let keep = now.saturating_duration_since(session.last_activity) < self.idle_timeout;
            if !keep {
                debug!(identity, "evicting idle dialogue");
            }
            keep
        });
        before - sessions.len()
    }
}

/// Spawn the background task that evicts idle sessions every `interval`.
#[must_use]
pub fn spawn_eviction_task(
    store: Arc<SessionStore>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("session eviction task shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let evicted = store.evict_idle(Instant::now()).await;
                    if evicted > 0 {
                        info!(evicted, "evicted idle dialogues");
                    }
                }
            }
        }
    })
}
