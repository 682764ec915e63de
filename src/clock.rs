//! Wall-clock source for "today" and "now" in the bot's local time zone.
//!
//! Every date written to the status log and every reminder slot is computed
//! through a [`Clock`], so the hosting machine's zone never leaks into the
//! persisted data when an explicit offset is configured.

use chrono::{FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Source of the current local date and time.
pub trait Clock: Send + Sync {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Current local time of day.
    fn time(&self) -> NaiveTime {
        self.now().time()
    }
}

/// Real clock, optionally pinned to a fixed UTC offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    /// Clock following the host's local zone, or `offset` when given.
    #[must_use]
    pub fn new(offset: Option<FixedOffset>) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}

/// Clock frozen at a single instant. Used by tests and replay tooling.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
