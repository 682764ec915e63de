//! Status log: append-only daily declarations.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{Employee, StatusEntry, StatusKind, DATE_FORMAT};
use crate::{AppError, Result};

use super::db::Database;

/// Repository for the append-only status log.
#[derive(Clone)]
pub struct StatusRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct StatusRow {
    date: String,
    display_name: String,
    identity: String,
    kind: String,
    primary_detail: String,
    secondary_detail: String,
}

impl StatusRow {
    fn into_entry(self) -> Result<StatusEntry> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|e| AppError::Db(format!("invalid date `{}`: {e}", self.date)))?;
        let kind = StatusKind::from_tag(&self.kind)
            .ok_or_else(|| AppError::Db(format!("invalid status kind: {}", self.kind)))?;

        Ok(StatusEntry {
            date,
            display_name: self.display_name,
            identity: self.identity,
            kind,
            primary_detail: self.primary_detail,
            secondary_detail: self.secondary_detail,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT date, display_name, identity, kind, primary_detail, secondary_detail FROM status_log";

impl StatusRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append one declaration dated `today`.
    ///
    /// Purely additive: no uniqueness check, no upsert.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn record(
        &self,
        today: NaiveDate,
        employee: &Employee,
        kind: StatusKind,
        primary_detail: &str,
        secondary_detail: &str,
    ) -> Result<StatusEntry> {
        let entry = StatusEntry {
            date: today,
            display_name: employee.display_name.clone(),
            identity: employee.identity.clone(),
            kind,
            primary_detail: primary_detail.to_owned(),
            secondary_detail: secondary_detail.to_owned(),
        };
        self.append(&entry).await?;
        Ok(entry)
    }

    /// Append a fully formed row.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn append(&self, entry: &StatusEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO status_log (date, display_name, identity, kind, primary_detail, secondary_detail)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(entry.date_string())
        .bind(&entry.display_name)
        .bind(&entry.identity)
        .bind(entry.kind.tag())
        .bind(&entry.primary_detail)
        .bind(&entry.secondary_detail)
        .execute(self.db.as_ref())
        .await?;
        Ok(())
    }

    /// Full scan of the log in append order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails or a row is malformed.
    pub async fn list_all(&self) -> Result<Vec<StatusEntry>> {
        let rows: Vec<StatusRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY seq ASC"))
            .fetch_all(self.db.as_ref())
            .await?;

        rows.into_iter().map(StatusRow::into_entry).collect()
    }

    /// Distinct identities with at least one row dated `day`.
    ///
    /// Only the raw date text is compared, so a malformed row of another
    /// identity never fails this read.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn identities_on(&self, day: NaiveDate) -> Result<Vec<String>> {
        let day = day.format(DATE_FORMAT).to_string();
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT identity FROM status_log WHERE date = ?1")
                .bind(day)
                .fetch_all(self.db.as_ref())
                .await?;
        Ok(rows.into_iter().map(|(identity,)| identity).collect())
    }

    /// All rows for one identity in append order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails or a row is malformed.
    pub async fn list_for_identity(&self, identity: &str) -> Result<Vec<StatusEntry>> {
        let rows: Vec<StatusRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE identity = ?1 ORDER BY seq ASC"
        ))
        .bind(identity)
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(StatusRow::into_entry).collect()
    }
}
