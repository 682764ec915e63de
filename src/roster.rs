//! Same-day roster rendering.

use chrono::NaiveDate;

use crate::models::StatusEntry;
use crate::persistence::status_repo::StatusRepo;
use crate::Result;

/// Reply used when nobody has declared a status yet today.
pub const EMPTY_ROSTER: &str = "Nobody has checked in yet today.";

const ROSTER_HEADER: &str = "Today's statuses:";

/// Render one roster line: `Name — Kind (detail; detail)`.
#[must_use]
pub fn render_line(entry: &StatusEntry) -> String {
    let details: Vec<&str> = entry.details().collect();
    if details.is_empty() {
        format!("{} — {}", entry.display_name, entry.kind)
    } else {
        format!(
            "{} — {} ({})",
            entry.display_name,
            entry.kind,
            details.join("; ")
        )
    }
}

/// Numbered listing of every row dated `today`, in log order.
///
/// Duplicate same-day rows for one identity are all listed.
#[must_use]
pub fn render(entries: &[StatusEntry], today: NaiveDate) -> String {
    let lines: Vec<String> = entries
        .iter()
        .filter(|entry| entry.date == today)
        .enumerate()
        .map(|(idx, entry)| format!("{}. {}", idx + 1, render_line(entry)))
        .collect();

    if lines.is_empty() {
        EMPTY_ROSTER.to_owned()
    } else {
        format!("{ROSTER_HEADER}\n{}", lines.join("\n"))
    }
}

/// Read the full status log and render today's roster.
///
/// # Errors
///
/// Returns `AppError::Db` if the status log cannot be read.
pub async fn today_roster(repo: &StatusRepo, today: NaiveDate) -> Result<String> {
    let entries = repo.list_all().await?;
    Ok(render(&entries, today))
}
