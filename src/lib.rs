#![forbid(unsafe_code)]

//! Daily attendance check-in bot.
//!
//! Users declare one status per day through a short Slack dialogue; the
//! declarations land in an append-only status log, feed a same-day roster,
//! and drive a weekday reminder for whoever has not checked in.

pub mod absence;
pub mod clock;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod health;
pub mod models;
pub mod persistence;
pub mod reminder;
pub mod roster;
pub mod slack;
pub mod state;
pub mod transport;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
