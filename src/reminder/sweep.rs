//! Reminder sweep: directory − checked in today − currently absent.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{info, info_span, warn, Instrument};

use crate::absence;
use crate::persistence::directory_repo::DirectoryRepo;
use crate::persistence::status_repo::StatusRepo;
use crate::transport::{ChatTransport, Outbound};
use crate::Result;

/// Outcome of one sweep, by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Identities a nudge was delivered to.
    pub nudged: Vec<String>,
    /// Identities with at least one row today.
    pub already_checked_in: Vec<String>,
    /// Identities on a vacation covering today.
    pub absent: Vec<String>,
    /// Identities skipped because delivery or the absence lookup failed.
    pub failed: Vec<String>,
}

/// Nudge every employee who has not checked in and is not on vacation.
///
/// One identity's failure (absence lookup or delivery) is logged and
/// recorded in the report; the sweep carries on with the rest.
///
/// # Errors
///
/// Returns `AppError::Db` if the directory or today's check-ins cannot be
/// read at the start of the sweep.
pub async fn run_sweep(
    directory: &DirectoryRepo,
    status: &StatusRepo,
    transport: &dyn ChatTransport,
    message: &str,
    today: NaiveDate,
) -> Result<SweepReport> {
    async move {
        let employees = directory.list_all().await?;
        let done: HashSet<String> = status.identities_on(today).await?.into_iter().collect();
        let mut report = SweepReport::default();

        for employee in &employees {
            let identity = employee.identity.as_str();
            if done.contains(identity) {
                report.already_checked_in.push(identity.to_owned());
                continue;
            }

            match absence::is_absent_today(status, identity, today).await {
                Ok(true) => {
                    report.absent.push(identity.to_owned());
                    continue;
                }
                Ok(false) => {}
                Err(err) => {
                    warn!(identity, %err, "absence lookup failed; skipping");
                    report.failed.push(identity.to_owned());
                    continue;
                }
            }

            match transport.send(identity, Outbound::plain(message)).await {
                Ok(()) => report.nudged.push(identity.to_owned()),
                Err(err) => {
                    warn!(identity, %err, "reminder delivery failed");
                    report.failed.push(identity.to_owned());
                }
            }
        }

        info!(
            nudged = report.nudged.len(),
            checked_in = report.already_checked_in.len(),
            absent = report.absent.len(),
            failed = report.failed.len(),
            "reminder sweep complete"
        );
        Ok(report)
    }
    .instrument(info_span!("reminder_sweep", %today))
    .await
}
