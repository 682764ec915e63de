//! Weekday timer that fires the reminder sweep at a fixed local time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Days, NaiveDateTime, NaiveTime, Weekday};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::clock::Clock;
use crate::persistence::directory_repo::DirectoryRepo;
use crate::persistence::status_repo::StatusRepo;
use crate::transport::ChatTransport;

use super::sweep::run_sweep;

/// When and what to remind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSchedule {
    /// Local time of day.
    pub time: NaiveTime,
    /// Days on which the sweep fires.
    pub weekdays: Vec<Weekday>,
    /// Nudge text.
    pub message: String,
}

/// First slot strictly after `now` on one of `weekdays`.
///
/// Returns `None` only when `weekdays` is empty.
#[must_use]
pub fn next_fire(now: NaiveDateTime, time: NaiveTime, weekdays: &[Weekday]) -> Option<NaiveDateTime> {
    (0..=7)
        .filter_map(|offset| now.date().checked_add_days(Days::new(offset)))
        .filter(|date| weekdays.contains(&date.weekday()))
        .map(|date| date.and_time(time))
        .find(|slot| *slot > now)
}

/// Spawn the background task running the sweep on every scheduled slot.
///
/// Slots are always computed strictly after the last fired one, so an
/// early wake-up or a slow sweep never fires the same slot twice.
#[must_use]
pub fn spawn_reminder_task(
    schedule: ReminderSchedule,
    directory: DirectoryRepo,
    status: StatusRepo,
    transport: Arc<dyn ChatTransport>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_slot: Option<NaiveDateTime> = None;
        loop {
            let now = clock.now();
            let after = last_slot.map_or(now, |last| last.max(now));
            let Some(slot) = next_fire(after, schedule.time, &schedule.weekdays) else {
                error!("reminder schedule has no weekdays; stopping");
                break;
            };
            let wait = (slot - now).to_std().unwrap_or(Duration::ZERO);
            info!(%slot, wait_secs = wait.as_secs(), "next reminder sweep scheduled");

            tokio::select! {
                () = cancel.cancelled() => {
                    info!("reminder task shutting down");
                    break;
                }
                () = tokio::time::sleep(wait) => {}
            }

            last_slot = Some(slot);
            let today = slot.date();
            if let Err(err) =
                run_sweep(&directory, &status, transport.as_ref(), &schedule.message, today).await
            {
                error!(%err, "reminder sweep aborted");
            }
        }
    })
}
