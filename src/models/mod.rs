//! Domain model module declarations.

pub mod employee;
pub mod status;

pub use employee::Employee;
pub use status::{StatusEntry, StatusKind, DATE_FORMAT};
