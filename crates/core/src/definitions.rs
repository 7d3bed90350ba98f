//! Migration Definitions - Core types for the migration engine
//!
//! Defines the fundamental types used throughout the migration system:
//! candidate entries discovered on disk, ledger records read back from the
//! database, engine configuration, and the run and status reports.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Conventional directory for migration files
pub const DEFAULT_SOURCE_DIR: &str = "schema";

/// Default name of the ledger table
pub const DEFAULT_LEDGER_TABLE: &str = "waystone_migrations";

/// A candidate migration discovered in the source directory.
///
/// Entries carry metadata only. The SQL body is read lazily at apply time,
/// so listing a large directory stays cheap and a file that disappears
/// between discovery and application is caught at the moment it matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationEntry {
    /// Filename, the identity recorded in the ledger
    pub name: String,
    /// Numeric version parsed from the filename prefix
    pub version: u64,
    /// Full path to the migration file
    pub path: PathBuf,
}

/// One ledger row recording an applied migration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Row id, monotonically increasing in application order
    pub id: i64,
    /// Migration filename
    pub name: String,
    /// When the migration was applied, assigned by the database
    pub applied_at: NaiveDateTime,
}

/// Configuration for the migration engine
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Directory where migration files are stored
    pub source_dir: PathBuf,
    /// Table name for the ledger of applied migrations
    pub ledger_table: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            ledger_table: DEFAULT_LEDGER_TABLE.to_string(),
        }
    }
}

impl MigrationConfig {
    /// Build a config for the given source directory, falling back to the
    /// conventional directory when the path is empty.
    pub fn with_source_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let source_dir = if dir.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_SOURCE_DIR)
        } else {
            dir
        };

        Self {
            source_dir,
            ..Default::default()
        }
    }
}

/// Result of one migration run
#[derive(Debug)]
pub struct RunSummary {
    /// Number of migrations that were applied
    pub applied_count: usize,
    /// Names of migrations that were applied, in application order
    pub applied_migrations: Vec<String>,
    /// Number of candidates skipped because the ledger already had them
    pub skipped_count: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Status of a single candidate relative to the ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MigrationStatus {
    /// Present on disk, not yet in the ledger
    Pending,
    /// Present on disk and recorded in the ledger
    Applied { applied_at: NaiveDateTime },
}

/// Status line for one candidate migration
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub name: String,
    pub version: u64,
    pub status: MigrationStatus,
}

/// Full status report: every candidate plus ledger rows with no file
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// One entry per candidate, in `(version, name)` order
    pub entries: Vec<StatusEntry>,
    /// Ledger records whose file no longer exists in the source directory
    pub ghosts: Vec<LedgerRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_conventional_paths() {
        let config = MigrationConfig::default();
        assert_eq!(config.source_dir, PathBuf::from("schema"));
        assert_eq!(config.ledger_table, "waystone_migrations");
    }

    #[test]
    fn empty_source_dir_falls_back_to_default() {
        let config = MigrationConfig::with_source_dir("");
        assert_eq!(config.source_dir, PathBuf::from("schema"));

        let config = MigrationConfig::with_source_dir("db/schema");
        assert_eq!(config.source_dir, PathBuf::from("db/schema"));
    }
}
