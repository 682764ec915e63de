//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, NaiveTime, Weekday};
use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keyring service name under which Slack tokens are stored.
const KEYRING_SERVICE: &str = "checkin-bot";

/// Slack credentials for Socket Mode connectivity.
///
/// Tokens are loaded at runtime via OS keychain or environment variables,
/// never from the TOML config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// App-level token used for Socket Mode (populated at runtime).
    #[serde(skip)]
    pub app_token: String,
    /// Bot user token used for posting messages (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

/// Weekday reminder schedule.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReminderConfig {
    /// Whether the scheduled sweep runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Local time of day (`HH:MM`) at which the sweep fires.
    #[serde(default = "default_reminder_time")]
    pub time: String,
    /// Days of the week on which the sweep fires (`mon`, `tue`, ...).
    #[serde(default = "default_weekdays")]
    pub weekdays: Vec<String>,
    /// Text delivered to every user who has not checked in.
    #[serde(default = "default_reminder_message")]
    pub message: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time: default_reminder_time(),
            weekdays: default_weekdays(),
            message: default_reminder_message(),
        }
    }
}

/// Conversation session lifecycle settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ConversationConfig {
    /// Seconds of inactivity after which an unfinished dialogue is dropped.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// How often the eviction task scans for idle dialogues.
    #[serde(default = "default_eviction_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: default_idle_timeout(),
            sweep_interval_seconds: default_eviction_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_reminder_time() -> String {
    "10:00".into()
}

fn default_weekdays() -> Vec<String> {
    ["mon", "tue", "wed", "thu", "fri"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn default_reminder_message() -> String {
    "👋 You haven't checked in today. Send /checkin to pick your status.".into()
}

fn default_idle_timeout() -> u64 {
    1800
}

fn default_eviction_interval() -> u64 {
    60
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// `SQLite` database file holding the directory and status log.
    pub db_path: PathBuf,
    /// Fixed local offset such as `+03:00`; host zone when absent.
    #[serde(default)]
    pub utc_offset: Option<String>,
    /// Port for the `/health` endpoint; `0` disables it.
    #[serde(default)]
    pub http_port: u16,
    /// Reminder sweep schedule.
    #[serde(default)]
    pub reminder: ReminderConfig,
    /// Dialogue session settings.
    #[serde(default)]
    pub conversation: ConversationConfig,
    /// Slack connectivity settings.
    #[serde(default)]
    pub slack: SlackConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load Slack credentials from OS keychain with env-var fallback.
    ///
    /// Tries the `checkin-bot` keyring service first, then falls back to
    /// `SLACK_APP_TOKEN` / `SLACK_BOT_TOKEN` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither keychain nor env vars provide
    /// the required tokens.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.slack.app_token = load_credential("slack_app_token", "SLACK_APP_TOKEN").await?;
        self.slack.bot_token = load_credential("slack_bot_token", "SLACK_BOT_TOKEN").await?;
        Ok(())
    }

    /// Configured local offset, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `utc_offset` is malformed.
    pub fn offset(&self) -> Result<Option<FixedOffset>> {
        self.utc_offset.as_deref().map(parse_offset).transpose()
    }

    /// Local time of day at which the reminder sweep fires.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `reminder.time` is not `HH:MM`.
    pub fn reminder_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.reminder.time.trim(), "%H:%M").map_err(|err| {
            AppError::Config(format!(
                "reminder.time `{}` is not HH:MM: {err}",
                self.reminder.time
            ))
        })
    }

    /// Weekdays on which the reminder sweep fires.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if any entry is not a weekday name.
    pub fn reminder_weekdays(&self) -> Result<Vec<Weekday>> {
        self.reminder
            .weekdays
            .iter()
            .map(|day| {
                day.trim()
                    .parse::<Weekday>()
                    .map_err(|_| AppError::Config(format!("unknown weekday `{day}`")))
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.conversation.idle_timeout_seconds == 0 {
            return Err(AppError::Config(
                "conversation.idle_timeout_seconds must be greater than zero".into(),
            ));
        }

        if self.conversation.sweep_interval_seconds == 0 {
            return Err(AppError::Config(
                "conversation.sweep_interval_seconds must be greater than zero".into(),
            ));
        }

        if self.reminder.weekdays.is_empty() {
            return Err(AppError::Config(
                "reminder.weekdays must not be empty".into(),
            ));
        }

        self.reminder_time()?;
        self.reminder_weekdays()?;
        self.offset()?;
        Ok(())
    }
}

/// Parse `+HH:MM` / `-HH:MM` into a fixed offset.
fn parse_offset(raw: &str) -> Result<FixedOffset> {
    let invalid = || AppError::Config(format!("utc_offset `{raw}` is not ±HH:MM"));
    let raw = raw.trim();
    let (sign, rest) = match raw.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    env::var(env_key).map_err(|_| {
        AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))
    })
}
