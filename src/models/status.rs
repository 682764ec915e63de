//! Daily status declarations and the closed set of status kinds.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted date format of the status log (`DD.MM.YYYY`).
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Declarable daily status.
///
/// The stable tag is what gets persisted; the label is only shown to users.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Physically at the office.
    InOffice,
    /// Working from elsewhere.
    Remote,
    /// Out on a shoot.
    OnShoot,
    /// On an approved vacation interval.
    Vacation,
    /// Coming in later than usual.
    RunningLate,
    /// Taking the day off.
    DayOff,
}

impl StatusKind {
    /// Every kind, in menu order.
    pub const ALL: [Self; 6] = [
        Self::InOffice,
        Self::Remote,
        Self::OnShoot,
        Self::Vacation,
        Self::RunningLate,
        Self::DayOff,
    ];

    /// Stable storage tag.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::InOffice => "in_office",
            Self::Remote => "remote",
            Self::OnShoot => "on_shoot",
            Self::Vacation => "vacation",
            Self::RunningLate => "running_late",
            Self::DayOff => "day_off",
        }
    }

    /// User-facing menu label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::InOffice => "🏢 In office",
            Self::Remote => "🏠 Remote",
            Self::OnShoot => "🎨 On a shoot",
            Self::Vacation => "🌴 Vacation",
            Self::RunningLate => "⏰ Running late",
            Self::DayOff => "🛌 Day off",
        }
    }

    /// Resolve a storage tag back to a kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Resolve typed menu text: the full label or the label without its emoji,
    /// compared case-insensitively.
    #[must_use]
    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|kind| {
            let label = kind.label();
            let plain = label.split_once(' ').map_or(label, |(_, rest)| rest);
            text == label || text.eq_ignore_ascii_case(plain)
        })
    }
}

impl Display for StatusKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the append-only status log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEntry {
    /// Local calendar day the declaration applies to.
    pub date: NaiveDate,
    /// Display name at the time of writing.
    pub display_name: String,
    /// Opaque chat identity.
    pub identity: String,
    /// Declared status.
    pub kind: StatusKind,
    /// Check-in time, expected arrival, vacation interval, or empty.
    pub primary_detail: String,
    /// Remote reason, shoot description, delay reason, or empty.
    pub secondary_detail: String,
}

impl StatusEntry {
    /// Non-empty detail fields in column order.
    pub fn details(&self) -> impl Iterator<Item = &str> {
        [self.primary_detail.as_str(), self.secondary_detail.as_str()]
            .into_iter()
            .filter(|detail| !detail.is_empty())
    }

    /// Date rendered in the persisted `DD.MM.YYYY` format.
    #[must_use]
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}
