//! Migration Ledger - the persisted record of applied migrations
//!
//! One table, created on demand, appended to on success, never deleted from
//! by this system. `name` carries a UNIQUE constraint so double-application
//! is rejected by the database itself rather than merely avoided by the
//! diff step.

use std::collections::HashSet;

use sqlx::sqlite::SqlitePool;
use sqlx::{Executor, Row, Sqlite};

use crate::definitions::LedgerRecord;
use crate::error::{MigrateError, MigrateResult};

/// Handle to the ledger table in a specific database
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
    table: String,
}

impl Ledger {
    /// Create a ledger handle over the given pool and table name
    pub fn new(pool: SqlitePool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    /// Idempotently create the ledger table if it does not exist
    pub async fn ensure_exists(&self) -> MigrateResult<()> {
        let sql = self.create_table_sql();
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| MigrateError::Init {
                table: self.table.clone(),
                source: e,
            })?;
        Ok(())
    }

    /// Every migration name currently recorded, as a membership set
    pub async fn applied_names(&self) -> MigrateResult<HashSet<String>> {
        let sql = format!("SELECT name FROM {}", self.table);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MigrateError::Query {
                table: self.table.clone(),
                source: e,
            })?;

        let mut names = HashSet::new();
        for row in rows {
            let name: String = row.try_get("name").map_err(|e| MigrateError::Query {
                table: self.table.clone(),
                source: e,
            })?;
            names.insert(name);
        }

        Ok(names)
    }

    /// All ledger records, in application order
    pub async fn records(&self) -> MigrateResult<Vec<LedgerRecord>> {
        let sql = format!(
            "SELECT id, name, applied_at FROM {} ORDER BY id",
            self.table
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MigrateError::Query {
                table: self.table.clone(),
                source: e,
            })?;

        let mut records = Vec::new();
        for row in rows {
            let record = LedgerRecord {
                id: row.try_get("id").map_err(|e| MigrateError::Query {
                    table: self.table.clone(),
                    source: e,
                })?,
                name: row.try_get("name").map_err(|e| MigrateError::Query {
                    table: self.table.clone(),
                    source: e,
                })?,
                applied_at: row.try_get("applied_at").map_err(|e| MigrateError::Query {
                    table: self.table.clone(),
                    source: e,
                })?,
            };
            records.push(record);
        }

        Ok(records)
    }

    /// Record a migration as applied.
    ///
    /// Only the name is supplied; the database assigns id and timestamp.
    /// Takes any executor so the insert can share a transaction with the
    /// migration it records. Inserting a name twice violates the UNIQUE
    /// constraint and fails.
    pub async fn record<'e, E>(&self, executor: E, name: &str) -> MigrateResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("INSERT INTO {} (name) VALUES (?1)", self.table);
        sqlx::query(&sql)
            .bind(name)
            .execute(executor)
            .await
            .map_err(|e| MigrateError::Record {
                name: name.to_string(),
                source: e,
            })?;
        Ok(())
    }

    /// SQL to create the ledger table
    fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    \
                id INTEGER PRIMARY KEY AUTOINCREMENT,\n    \
                name TEXT NOT NULL UNIQUE,\n    \
                applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP\n\
            );",
            self.table
        )
    }
}
