//! Migration Source - filesystem discovery of candidate migrations
//!
//! Scans the source directory for `.sql` files and returns them in explicit
//! `(version, name)` order. Directory enumeration order is never trusted:
//! every candidate must carry a numeric version prefix, and a `.sql` file
//! without one is an error rather than a silent skip.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use tracing::debug;

use crate::definitions::{MigrationConfig, MigrationEntry};
use crate::error::{MigrateError, MigrateResult};

/// Lists and scaffolds migration files in the configured source directory
pub struct MigrationSource {
    config: MigrationConfig,
}

impl MigrationSource {
    /// Create a new source over the given configuration
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    /// List candidate migrations, sorted by `(version, name)`.
    ///
    /// Only metadata is collected here; bodies are read at apply time.
    /// Files without a `.sql` extension are ignored. A missing or unreadable
    /// directory is fatal: the engine cannot proceed without knowing the
    /// full candidate set.
    pub fn list(&self) -> MigrateResult<Vec<MigrationEntry>> {
        let dir = &self.config.source_dir;
        let read_dir = fs::read_dir(dir).map_err(|e| MigrateError::List {
            dir: dir.clone(),
            source: e,
        })?;

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| MigrateError::List {
                dir: dir.clone(),
                source: e,
            })?;

            let path = dir_entry.path();
            if path.extension().map_or(false, |ext| ext == "sql") {
                let name = dir_entry.file_name().to_string_lossy().into_owned();
                let version = parse_version(&name)
                    .ok_or_else(|| MigrateError::Version { name: name.clone() })?;

                entries.push(MigrationEntry {
                    name,
                    version,
                    path,
                });
            }
        }

        entries.sort_by(|a, b| (a.version, &a.name).cmp(&(b.version, &b.name)));

        for (index, entry) in entries.iter().enumerate() {
            debug!(index, name = %entry.name, "discovered migration");
        }

        Ok(entries)
    }

    /// Scaffold the next migration file and return its path.
    ///
    /// The new file continues from the highest existing version, zero-padded
    /// to four digits, so authored files always satisfy the version-prefix
    /// scheme. The source directory is created if missing.
    pub fn create_migration(&self, label: &str) -> MigrateResult<PathBuf> {
        fs::create_dir_all(&self.config.source_dir).map_err(|e| MigrateError::Create {
            path: self.config.source_dir.clone(),
            source: e,
        })?;

        let next_version = self
            .list()?
            .iter()
            .map(|entry| entry.version)
            .max()
            .unwrap_or(0)
            + 1;

        let label = label.trim().to_lowercase().replace(' ', "_").replace('-', "_");
        let filename = format!("{:04}_{}.sql", next_version, label);
        let path = self.config.source_dir.join(&filename);

        let template = format!(
            "-- Migration: {}\n-- Created: {}\n\n-- Write your schema changes below.\n",
            filename,
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        );

        fs::write(&path, template).map_err(|e| MigrateError::Create {
            path: path.clone(),
            source: e,
        })?;

        Ok(path)
    }
}

/// Parse the numeric version prefix from `<digits>_<label>.sql`
fn parse_version(name: &str) -> Option<u64> {
    let (prefix, rest) = name.split_once('_')?;
    // `u64::from_str` tolerates a leading `+`; the prefix must be digits only.
    if prefix.is_empty() || rest.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_in(dir: &std::path::Path) -> MigrationSource {
        MigrationSource::new(MigrationConfig::with_source_dir(dir))
    }

    #[test]
    fn lists_in_numeric_version_order() {
        let dir = tempfile::tempdir().unwrap();
        // Lexicographic order would put "10" before "2".
        fs::write(dir.path().join("10_ten.sql"), "SELECT 10;").unwrap();
        fs::write(dir.path().join("2_two.sql"), "SELECT 2;").unwrap();
        fs::write(dir.path().join("0001_one.sql"), "SELECT 1;").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a migration").unwrap();

        let entries = source_in(dir.path()).list().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["0001_one.sql", "2_two.sql", "10_ten.sql"]);
        assert_eq!(entries[2].version, 10);
    }

    #[test]
    fn equal_versions_tie_break_on_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0001_b.sql"), "").unwrap();
        fs::write(dir.path().join("0001_a.sql"), "").unwrap();

        let entries = source_in(dir.path()).list().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["0001_a.sql", "0001_b.sql"]);
    }

    #[test]
    fn version_prefix_is_required() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("init.sql"), "CREATE TABLE t (id INTEGER);").unwrap();

        let err = source_in(dir.path()).list().unwrap_err();
        assert!(matches!(err, MigrateError::Version { name } if name == "init.sql"));
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_in(&dir.path().join("no_such_dir"));

        let err = source.list().unwrap_err();
        assert!(matches!(err, MigrateError::List { .. }));
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(source_in(dir.path()).list().unwrap().is_empty());
    }

    #[test]
    fn create_migration_continues_numbering() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0001_init.sql"), "").unwrap();
        fs::write(dir.path().join("0002_seed.sql"), "").unwrap();

        let source = source_in(dir.path());
        let path = source.create_migration("add users table").unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "0003_add_users_table.sql"
        );
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("-- Migration: 0003_add_users_table.sql"));

        // The scaffolded file is itself a valid candidate.
        assert_eq!(source.list().unwrap().len(), 3);
    }

    #[test]
    fn create_migration_bootstraps_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_in(&dir.path().join("schema"));

        let path = source.create_migration("init").unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), "0001_init.sql");
    }

    #[test]
    fn parses_version_prefixes() {
        assert_eq!(parse_version("0001_init.sql"), Some(1));
        assert_eq!(parse_version("20240101_add_users.sql"), Some(20240101));
        assert_eq!(parse_version("init.sql"), None);
        assert_eq!(parse_version("_init.sql"), None);
        assert_eq!(parse_version("x1_init.sql"), None);
        assert_eq!(parse_version("+1_init.sql"), None);
        assert_eq!(parse_version("-1_init.sql"), None);
    }
}
