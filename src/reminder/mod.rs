//! Weekday reminder: who still owes a check-in, and when to ask them.

pub mod scheduler;
pub mod sweep;

pub use scheduler::{next_fire, spawn_reminder_task, ReminderSchedule};
pub use sweep::{run_sweep, SweepReport};
