//! Vacation interval parsing and the "is currently absent" predicate.
//!
//! Vacation declarations store the raw interval text the user typed
//! (`DD.MM–DD.MM`, optionally with years). Nothing validates it at commit
//! time; it is parsed here, on every evaluation, against a fresh read of the
//! status log.

use std::fmt::{Display, Formatter};

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::models::{StatusEntry, StatusKind, DATE_FORMAT};
use crate::persistence::status_repo::StatusRepo;
use crate::Result;

/// Dash-like characters accepted between the two interval endpoints.
const SEPARATORS: [char; 5] = ['-', '–', '—', '‒', '−'];

/// Why a vacation interval could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalParseError {
    /// No dash-like separator between the endpoints.
    MissingSeparator,
    /// An endpoint is neither `DD.MM.YYYY` nor `DD.MM`.
    InvalidDate(String),
}

impl Display for IntervalParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "interval has no separator"),
            Self::InvalidDate(raw) => write!(f, "`{raw}` is not DD.MM or DD.MM.YYYY"),
        }
    }
}

impl std::error::Error for IntervalParseError {}

/// Inclusive day range of a declared absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VacationInterval {
    /// First day away.
    pub start: NaiveDate,
    /// Last day away.
    pub end: NaiveDate,
}

impl VacationInterval {
    /// Parse `D1.M1[.Y1]<sep>D2.M2[.Y2]`, defaulting missing years to
    /// `current_year`.
    ///
    /// When the end year is inferred and the end would fall before the
    /// start (`28.12–03.01`), the end rolls into the following year.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalParseError`] if the separator is missing or either
    /// endpoint fails both date formats.
    pub fn parse(raw: &str, current_year: i32) -> std::result::Result<Self, IntervalParseError> {
        let (start_raw, end_raw) = raw
            .trim()
            .split_once(|c: char| SEPARATORS.contains(&c))
            .ok_or(IntervalParseError::MissingSeparator)?;

        let (start, _) = parse_day(start_raw, current_year)?;
        let (mut end, end_year_given) = parse_day(end_raw, current_year)?;

        if !end_year_given && end < start {
            if let Some(rolled) = end.with_year(end.year() + 1) {
                end = rolled;
            }
        }

        Ok(Self { start, end })
    }

    /// Whether `day` falls within `[start, end]`.
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Parse one endpoint; the flag reports whether the year was explicit.
fn parse_day(raw: &str, current_year: i32) -> std::result::Result<(NaiveDate, bool), IntervalParseError> {
    let raw = raw.trim();
    let invalid = || IntervalParseError::InvalidDate(raw.to_owned());
    let parts: Vec<&str> = raw.split('.').collect();
    match parts.as_slice() {
        // The year must be written out in full; `01.07.25` is not 2025.
        [_, _, year] if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) => {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(|date| (date, true))
                .map_err(|_| invalid())
        }
        [_, _] => NaiveDate::parse_from_str(&format!("{raw}.{current_year}"), DATE_FORMAT)
            .map(|date| (date, false))
            .map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Whether any vacation row for `identity` covers `today`.
///
/// Rows whose interval cannot be parsed are skipped; they never confirm an
/// absence and never stop the scan.
#[must_use]
pub fn is_absent_on(entries: &[StatusEntry], identity: &str, today: NaiveDate) -> bool {
    entries
        .iter()
        .filter(|entry| entry.identity == identity && entry.kind == StatusKind::Vacation)
        .any(|entry| match VacationInterval::parse(&entry.primary_detail, today.year()) {
            // A short-form interval declared last December may still be
            // running in January.
            Ok(interval) => {
                interval.contains(today)
                    || VacationInterval::parse(&entry.primary_detail, today.year() - 1)
                        .is_ok_and(|previous| previous.contains(today))
            }
            Err(err) => {
                debug!(identity, raw = %entry.primary_detail, %err, "skipping unparsable vacation interval");
                false
            }
        })
}

/// Re-read the status log and test whether `identity` is on vacation `today`.
///
/// # Errors
///
/// Returns `AppError::Db` if the status log cannot be read.
pub async fn is_absent_today(repo: &StatusRepo, identity: &str, today: NaiveDate) -> Result<bool> {
    let entries = repo.list_for_identity(identity).await?;
    Ok(is_absent_on(&entries, identity, today))
}
