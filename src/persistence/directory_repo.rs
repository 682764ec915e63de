//! Directory store: known users keyed by chat identity.

use std::sync::Arc;

use crate::models::Employee;
use crate::Result;

use super::db::Database;

/// Repository for the append-only user directory.
#[derive(Clone)]
pub struct DirectoryRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct DirectoryRow {
    display_name: String,
    identity: String,
}

impl From<DirectoryRow> for Employee {
    fn from(row: DirectoryRow) -> Self {
        Self {
            display_name: row.display_name,
            identity: row.identity,
        }
    }
}

impl DirectoryRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append an employee unless the identity is already registered.
    ///
    /// Returns `true` when a new row was written. An existing identity keeps
    /// its original display name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn register(&self, employee: &Employee) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO directory (display_name, identity) VALUES (?1, ?2)",
        )
        .bind(&employee.display_name)
        .bind(&employee.identity)
        .execute(self.db.as_ref())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Look up a registered employee by identity.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn find(&self, identity: &str) -> Result<Option<Employee>> {
        let row: Option<DirectoryRow> =
            sqlx::query_as("SELECT display_name, identity FROM directory WHERE identity = ?1")
                .bind(identity)
                .fetch_optional(self.db.as_ref())
                .await?;
        Ok(row.map(Employee::from))
    }

    /// Full scan of the directory in registration order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Employee>> {
        let rows: Vec<DirectoryRow> =
            sqlx::query_as("SELECT display_name, identity FROM directory ORDER BY rowid ASC")
                .fetch_all(self.db.as_ref())
                .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }
}
