//! Migration Runner - applies pending migrations and reports status
//!
//! The run is a straight line: ensure the ledger exists, list candidates,
//! diff them against the ledger, then apply what remains in order. The
//! first failure stops the run where it stands, because later migrations
//! may depend on schema changes from earlier ones.
//!
//! Each migration's SQL batch and its ledger insert share one transaction.
//! A failed batch leaves neither schema effects nor a ledger row, and two
//! racing runners cannot both apply the same migration: the loser's insert
//! hits the ledger's UNIQUE constraint, its transaction rolls back, and its
//! run fails loudly.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::time::Instant;

use sqlx::sqlite::SqlitePool;
use sqlx::Executor;
use tracing::info;

use crate::definitions::{
    LedgerRecord, MigrationConfig, MigrationEntry, MigrationStatus, RunSummary, StatusEntry,
    StatusReport,
};
use crate::diff;
use crate::error::{MigrateError, MigrateResult};
use crate::ledger::Ledger;
use crate::source::MigrationSource;

/// Orchestrates migration runs against a single database
pub struct Migrator {
    pool: SqlitePool,
    source: MigrationSource,
    ledger: Ledger,
}

impl Migrator {
    /// Create a migrator over an already-open pool
    pub fn new(pool: SqlitePool, config: MigrationConfig) -> Self {
        let ledger = Ledger::new(pool.clone(), config.ledger_table.clone());
        let source = MigrationSource::new(config);

        Self {
            pool,
            source,
            ledger,
        }
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run all pending migrations, in `(version, name)` order.
    ///
    /// Already-recorded candidates are skipped, so running twice in a row
    /// applies nothing the second time and still succeeds.
    pub async fn run(&self) -> MigrateResult<RunSummary> {
        let start_time = Instant::now();

        self.ledger.ensure_exists().await?;

        let candidates = self.source.list()?;
        let candidate_count = candidates.len();
        let applied = self.ledger.applied_names().await?;
        let pending = diff::unapplied(candidates, &applied);
        let skipped_count = candidate_count - pending.len();

        let mut applied_migrations = Vec::new();
        for (index, entry) in pending.iter().enumerate() {
            self.apply_migration(entry).await?;
            info!(index, name = %entry.name, "applied migration");
            applied_migrations.push(entry.name.clone());
        }

        let summary = RunSummary {
            applied_count: applied_migrations.len(),
            applied_migrations,
            skipped_count,
            execution_time_ms: start_time.elapsed().as_millis(),
        };

        info!(
            applied = summary.applied_count,
            skipped = summary.skipped_count,
            elapsed_ms = summary.execution_time_ms,
            "migration run complete"
        );

        Ok(summary)
    }

    /// Report every candidate's status plus ghost ledger records.
    ///
    /// A ghost is a ledger row whose file no longer exists in the source
    /// directory. Ghosts are surfaced, not treated as errors: deleting an
    /// old migration file is history cleanup, not corruption.
    pub async fn status(&self) -> MigrateResult<StatusReport> {
        self.ledger.ensure_exists().await?;

        let candidates = self.source.list()?;
        let records = self.ledger.records().await?;

        let by_name: HashMap<&str, &LedgerRecord> =
            records.iter().map(|r| (r.name.as_str(), r)).collect();

        let entries = candidates
            .iter()
            .map(|candidate| StatusEntry {
                name: candidate.name.clone(),
                version: candidate.version,
                status: match by_name.get(candidate.name.as_str()) {
                    Some(record) => MigrationStatus::Applied {
                        applied_at: record.applied_at,
                    },
                    None => MigrationStatus::Pending,
                },
            })
            .collect();

        let candidate_names: HashSet<&str> =
            candidates.iter().map(|c| c.name.as_str()).collect();
        let ghosts = records
            .iter()
            .filter(|record| !candidate_names.contains(record.name.as_str()))
            .cloned()
            .collect();

        Ok(StatusReport { entries, ghosts })
    }

    /// Apply a single migration: read its body, execute it, record it.
    ///
    /// All three effects are atomic. The body may hold multiple statements;
    /// it must not manage its own transactions, since it already runs
    /// inside one.
    async fn apply_migration(&self, entry: &MigrationEntry) -> MigrateResult<()> {
        let body = fs::read_to_string(&entry.path).map_err(|e| MigrateError::Read {
            path: entry.path.clone(),
            source: e,
        })?;

        let mut transaction = self.pool.begin().await.map_err(|e| MigrateError::Exec {
            name: entry.name.clone(),
            source: e,
        })?;

        (&mut *transaction)
            .execute(body.as_str())
            .await
            .map_err(|e| MigrateError::Exec {
                name: entry.name.clone(),
                source: e,
            })?;

        self.ledger.record(&mut *transaction, &entry.name).await?;

        transaction.commit().await.map_err(|e| MigrateError::Record {
            name: entry.name.clone(),
            source: e,
        })?;

        Ok(())
    }
}
