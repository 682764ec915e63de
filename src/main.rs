#![forbid(unsafe_code)]

//! `checkin-bot`: daily attendance check-in bot binary.
//!
//! Bootstraps configuration, opens the `SQLite` store, starts the Slack
//! Socket Mode integration, and runs the idle-dialogue eviction and
//! weekday reminder background tasks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use checkin_bot::clock::{Clock, SystemClock};
use checkin_bot::config::GlobalConfig;
use checkin_bot::conversation::session::spawn_eviction_task;
use checkin_bot::conversation::{ConversationEngine, SessionStore};
use checkin_bot::health;
use checkin_bot::persistence::db;
use checkin_bot::persistence::directory_repo::DirectoryRepo;
use checkin_bot::persistence::status_repo::StatusRepo;
use checkin_bot::reminder::{spawn_reminder_task, ReminderSchedule};
use checkin_bot::slack::client::SlackService;
use checkin_bot::state::AppState;
use checkin_bot::transport::ChatTransport;
use checkin_bot::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "checkin-bot", about = "Daily attendance check-in bot", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("checkin-bot bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(args.config)?;
    config.load_credentials().await?;
    let config = Arc::new(config);
    info!("configuration loaded");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.offset()?));

    // ── Initialize database ─────────────────────────────
    let db = Arc::new(db::connect(&config.db_path).await?);
    info!(path = %config.db_path.display(), "database connected");

    let directory = DirectoryRepo::new(Arc::clone(&db));
    let status = StatusRepo::new(Arc::clone(&db));

    // ── Conversation engine ─────────────────────────────
    let ct = CancellationToken::new();
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(
        config.conversation.idle_timeout_seconds,
    )));
    let eviction_handle = spawn_eviction_task(
        Arc::clone(&sessions),
        Duration::from_secs(config.conversation.sweep_interval_seconds),
        ct.clone(),
    );
    let engine = Arc::new(ConversationEngine::new(
        directory.clone(),
        status.clone(),
        sessions,
        Arc::clone(&clock),
    ));

    // ── Slack ───────────────────────────────────────────
    let (slack, slack_runtime) = SlackService::start(&config.slack).map_err(|err| {
        error!(%err, "slack service start failed");
        err
    })?;
    let slack = Arc::new(slack);

    let state = Arc::new(AppState {
        engine,
        status: status.clone(),
        clock: Arc::clone(&clock),
        slack: Some(Arc::clone(&slack)),
    });
    let listener_handle = slack.listen(Arc::clone(&state));
    info!("slack socket mode listener started");

    // ── Reminder ────────────────────────────────────────
    let reminder_handle = if config.reminder.enabled {
        let schedule = ReminderSchedule {
            time: config.reminder_time()?,
            weekdays: config.reminder_weekdays()?,
            message: config.reminder.message.clone(),
        };
        let transport: Arc<dyn ChatTransport> = slack;
        Some(spawn_reminder_task(
            schedule,
            directory,
            status,
            transport,
            clock,
            ct.clone(),
        ))
    } else {
        info!("reminder disabled");
        None
    };

    // ── Health endpoint ─────────────────────────────────
    let health_handle = (config.http_port != 0).then(|| {
        let port = config.http_port;
        let health_ct = ct.clone();
        tokio::spawn(async move {
            if let Err(err) = health::serve_health(port, health_ct).await {
                error!(%err, "health endpoint failed");
            }
        })
    });

    info!("checkin-bot ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();
    listener_handle.abort();

    let _ = eviction_handle.await;
    if let Some(handle) = reminder_handle {
        let _ = handle.await;
    }
    if let Some(handle) = health_handle {
        let _ = handle.await;
    }
    drop(state);
    slack_runtime.queue_task.abort();
    info!("checkin-bot shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
