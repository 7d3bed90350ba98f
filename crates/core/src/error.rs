//! Error types for the migration engine
//!
//! Every failure in the engine is fatal at the point it occurs: the run
//! stops, nothing is retried or skipped, and the error is returned to the
//! caller. Each variant names the stage that failed and carries the
//! underlying cause, so a failed run always reports both.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for migration operations
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Errors raised by the migration engine, one variant per failing stage
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The database could not be opened
    #[error("could not open database `{url}`: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    /// The ledger table could not be created or verified
    #[error("could not initialize ledger table `{table}`: {source}")]
    Init {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    /// The migration source directory could not be read
    #[error("could not read migration directory `{dir}`: {source}")]
    List {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration filename has no parseable numeric version prefix
    #[error("migration filename `{name}` has no numeric version prefix (expected `<digits>_<label>.sql`)")]
    Version { name: String },

    /// The ledger could not be queried for applied migrations
    #[error("could not query ledger table `{table}`: {source}")]
    Query {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    /// A migration file could not be read at apply time
    #[error("could not read migration file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration's SQL was rejected by the database
    #[error("could not apply migration `{name}`: {source}")]
    Exec {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    /// An applied migration could not be recorded in the ledger
    #[error("could not record migration `{name}` in the ledger: {source}")]
    Record {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    /// A scaffolded migration file could not be written
    #[error("could not create migration file `{path}`: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report could not be rendered as JSON
    #[error("could not render report: {0}")]
    Render(#[from] serde_json::Error),
}
