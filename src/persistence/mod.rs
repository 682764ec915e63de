//! Persistence layer modules.

pub mod db;
pub mod directory_repo;
pub mod schema;
pub mod status_repo;
