//! Database connectivity for the migration engine
//!
//! One entry point: open a SQLite pool from a database URL. The pool is
//! capped at a single connection because migration runs are strictly
//! sequential single-writer work.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::{MigrateError, MigrateResult};

/// Default database URL when the caller supplies none
pub const DEFAULT_DATABASE_URL: &str = "sqlite://waystone.db";

/// Open a SQLite connection pool for the given database URL.
///
/// The database file is created if it does not exist, so pointing the tool
/// at a fresh environment does not require a separate bootstrap step.
pub async fn connect(url: &str) -> MigrateResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|e| MigrateError::Connect {
            url: url.to_string(),
            source: e,
        })?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
        .map_err(|e| MigrateError::Connect {
            url: url.to_string(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_creates_missing_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("fresh.db");
        let url = format!("sqlite:{}", db_path.display());

        let pool = connect(&url).await.unwrap();
        sqlx::query("SELECT 1").execute(&pool).await.unwrap();
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let err = connect("postgres://nope").await.unwrap_err();
        assert!(matches!(err, MigrateError::Connect { .. }));
    }
}
