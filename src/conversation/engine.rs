//! Check-in dialogue state machine.
//!
//! `AwaitIdentity → ChoosingStatus → [AwaitPrimaryDetail → AwaitSecondaryDetail] → end`.
//!
//! Each inbound message for an identity runs one turn: the session is taken
//! out of the [`SessionStore`], advanced, and either put back or dropped on
//! a terminal transition (commit, cancel, roster query). Every commit writes
//! exactly one status log row.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::models::{Employee, StatusKind};
use crate::persistence::directory_repo::DirectoryRepo;
use crate::persistence::status_repo::StatusRepo;
use crate::roster;
use crate::transport::{MenuChoice, Outbound};
use crate::Result;

use super::session::{DialogueState, Session, SessionStore};

const ASK_NAME: &str = "Hi! What's your name? It will be shown in the daily roster.";
const ASK_NAME_AGAIN: &str = "Please type your name as it should appear in the roster.";
const CHOOSE_STATUS: &str = "Pick your status for today:";
const UNKNOWN_CHOICE: &str = "Please pick one of the options below.";
const CANCELLED: &str = "Cancelled.";
const NOTHING_TO_CANCEL: &str = "Nothing to cancel. Send /checkin to start.";
const TRY_AGAIN: &str = "Something went wrong while saving, please try again with /checkin.";
const ROSTER_FAILED: &str = "Couldn't read today's statuses, please try again.";

/// One inbound turn from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Explicit (re)start of the dialogue.
    Start,
    /// Explicit cancel.
    Cancel,
    /// A status menu button press.
    Choice(MenuChoice),
    /// Free text.
    Text(String),
}

/// Result of advancing a session by one turn.
enum Step {
    /// Keep the dialogue open at the given session.
    Continue(Session, Outbound),
    /// Dialogue finished; nothing survives.
    End(Outbound),
}

/// Drives every identity's dialogue against the directory and status log.
pub struct ConversationEngine {
    directory: DirectoryRepo,
    status: StatusRepo,
    sessions: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
}

impl ConversationEngine {
    /// Create an engine over the given stores.
    #[must_use]
    pub fn new(
        directory: DirectoryRepo,
        status: StatusRepo,
        sessions: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            status,
            sessions,
            clock,
        }
    }

    /// Session table backing this engine.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Process one inbound message for `identity` and return the reply.
    ///
    /// Store failures end the dialogue with a "try again" reply; they never
    /// leave a half-advanced session behind.
    pub async fn handle(&self, identity: &str, input: Input) -> Outbound {
        let current = match input {
            Input::Start => {
                self.sessions.discard(identity).await;
                None
            }
            Input::Cancel => {
                return if self.sessions.discard(identity).await {
                    info!(identity, "dialogue cancelled");
                    Outbound::plain(CANCELLED)
                } else {
                    Outbound::plain(NOTHING_TO_CANCEL)
                };
            }
            Input::Choice(_) | Input::Text(_) => self.sessions.take(identity).await,
        };

        let outcome = match current {
            Some(session) => self.advance(identity, session, input).await,
            // A button press on a menu left over from an earlier dialogue is
            // taken as the pick itself once the user is known.
            None => match (self.open(identity).await, input) {
                (Ok(Step::Continue(session, _)), Input::Choice(choice))
                    if session.state == DialogueState::ChoosingStatus =>
                {
                    self.choose(identity, session, &Input::Choice(choice)).await
                }
                (outcome, _) => outcome,
            },
        };

        match outcome {
            Ok(Step::Continue(session, reply)) => {
                self.sessions.put(identity, session).await;
                reply
            }
            Ok(Step::End(reply)) => reply,
            Err(err) => {
                error!(identity, %err, "check-in turn failed");
                Outbound::plain(TRY_AGAIN)
            }
        }
    }

    /// Start a dialogue, skipping the name prompt for registered users.
    async fn open(&self, identity: &str) -> Result<Step> {
        match self.directory.find(identity).await? {
            Some(employee) => Ok(Step::Continue(
                Session::new(Some(employee.display_name), DialogueState::ChoosingStatus),
                Outbound::with_menu(CHOOSE_STATUS),
            )),
            None => Ok(Step::Continue(
                Session::new(None, DialogueState::AwaitIdentity),
                Outbound::plain(ASK_NAME),
            )),
        }
    }

    async fn advance(&self, identity: &str, session: Session, input: Input) -> Result<Step> {
        match session.state.clone() {
            DialogueState::AwaitIdentity => self.capture_identity(identity, session, input).await,
            DialogueState::ChoosingStatus => self.choose(identity, session, &input).await,
            DialogueState::AwaitPrimaryDetail(kind) => {
                let Input::Text(text) = input else {
                    let prompt = detail_prompt(kind);
                    return Ok(Step::Continue(session, Outbound::plain(prompt)));
                };
                match kind {
                    StatusKind::RunningLate => {
                        let next = Session {
                            state: DialogueState::AwaitSecondaryDetail {
                                kind,
                                primary: text,
                            },
                            ..session
                        };
                        Ok(Step::Continue(next, Outbound::plain(ASK_DELAY_REASON)))
                    }
                    StatusKind::Vacation => {
                        self.commit(identity, &session, kind, &text, "").await
                    }
                    _ => self.commit(identity, &session, kind, "", &text).await,
                }
            }
            DialogueState::AwaitSecondaryDetail { kind, primary } => {
                let Input::Text(text) = input else {
                    return Ok(Step::Continue(session, Outbound::plain(ASK_DELAY_REASON)));
                };
                self.commit(identity, &session, kind, &primary, &text)
                    .await
            }
        }
    }

    async fn capture_identity(&self, identity: &str, session: Session, input: Input) -> Result<Step> {
        let name = match input {
            Input::Text(text) if !text.trim().is_empty() => text,
            _ => return Ok(Step::Continue(session, Outbound::plain(ASK_NAME_AGAIN))),
        };

        let inserted = self
            .directory
            .register(&Employee::new(name.clone(), identity))
            .await?;
        // A concurrent registration keeps the first name written.
        let display_name = if inserted {
            info!(identity, "registered new employee");
            name
        } else {
            self.directory
                .find(identity)
                .await?
                .map_or(name, |existing| existing.display_name)
        };

        Ok(Step::Continue(
            Session {
                display_name: Some(display_name),
                state: DialogueState::ChoosingStatus,
                ..session
            },
            Outbound::with_menu(CHOOSE_STATUS),
        ))
    }

    async fn choose(&self, identity: &str, session: Session, input: &Input) -> Result<Step> {
        let choice = match input {
            Input::Choice(choice) => Some(*choice),
            Input::Text(text) => MenuChoice::from_text(text),
            Input::Start | Input::Cancel => None,
        };

        let Some(choice) = choice else {
            return Ok(Step::Continue(session, Outbound::with_menu(UNKNOWN_CHOICE)));
        };

        match choice {
            MenuChoice::Roster => {
                let reply = match roster::today_roster(&self.status, self.clock.today()).await {
                    Ok(text) => Outbound::plain(text),
                    Err(err) => {
                        error!(identity, %err, "roster query failed");
                        Outbound::plain(ROSTER_FAILED)
                    }
                };
                Ok(Step::End(reply))
            }
            MenuChoice::Status(kind @ StatusKind::InOffice) => {
                let arrived = self.clock.time().format("%H:%M").to_string();
                self.commit(identity, &session, kind, &arrived, "").await
            }
            MenuChoice::Status(kind @ StatusKind::DayOff) => {
                self.commit(identity, &session, kind, "", "").await
            }
            MenuChoice::Status(kind) => Ok(Step::Continue(
                Session {
                    state: DialogueState::AwaitPrimaryDetail(kind),
                    ..session
                },
                Outbound::plain(detail_prompt(kind)),
            )),
        }
    }

    async fn commit(
        &self,
        identity: &str,
        session: &Session,
        kind: StatusKind,
        primary: &str,
        secondary: &str,
    ) -> Result<Step> {
        let display_name = match &session.display_name {
            Some(name) => name.clone(),
            None => {
                warn!(identity, "committing without a captured name");
                identity.to_owned()
            }
        };
        let employee = Employee::new(display_name, identity);
        let entry = self
            .status
            .record(self.clock.today(), &employee, kind, primary, secondary)
            .await?;

        info!(identity, kind = kind.tag(), date = %entry.date_string(), "status recorded");
        Ok(Step::End(Outbound::plain(confirmation(kind, &entry.primary_detail))))
    }
}

const ASK_DELAY_REASON: &str = "What's the reason for the delay?";

fn detail_prompt(kind: StatusKind) -> &'static str {
    match kind {
        StatusKind::RunningLate => "What time will you be in? For example, 09:30",
        StatusKind::Remote => "Why are you working remotely today?",
        StatusKind::OnShoot => "What's the shoot? Give the client and details.",
        StatusKind::Vacation => "Enter your vacation dates as DD.MM–DD.MM, for example 07.09–12.09",
        StatusKind::InOffice | StatusKind::DayOff => CHOOSE_STATUS,
    }
}

fn confirmation(kind: StatusKind, primary: &str) -> String {
    match kind {
        StatusKind::InOffice => format!("Recorded: in office since {primary}."),
        StatusKind::Remote => "Recorded: working remotely.".to_owned(),
        StatusKind::OnShoot => "Recorded: on a shoot.".to_owned(),
        StatusKind::Vacation => format!("Recorded: vacation {primary}."),
        StatusKind::RunningLate => format!("Recorded: running late, arriving {primary}."),
        StatusKind::DayOff => "Recorded: day off.".to_owned(),
    }
}
