//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS`, so it is safe to
//! re-run on every startup.

use sqlx::SqlitePool;

use crate::Result;

/// Apply the directory and status log tables.
///
/// Column order of `status_log` mirrors the persisted row layout
/// `[date, display_name, identity, kind, primary_detail, secondary_detail]`;
/// `seq` only records append order.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS directory (
    display_name    TEXT NOT NULL,
    identity        TEXT PRIMARY KEY NOT NULL
);

CREATE TABLE IF NOT EXISTS status_log (
    seq              INTEGER PRIMARY KEY AUTOINCREMENT,
    date             TEXT NOT NULL,
    display_name     TEXT NOT NULL,
    identity         TEXT NOT NULL,
    kind             TEXT NOT NULL CHECK(kind IN ('in_office','remote','on_shoot','vacation','running_late','day_off')),
    primary_detail   TEXT NOT NULL DEFAULT '',
    secondary_detail TEXT NOT NULL DEFAULT ''
);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
