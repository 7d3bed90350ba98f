//! Migration commands: run, status, create

use waystone_core::{
    connect, MigrateResult, MigrationConfig, MigrationSource, MigrationStatus, Migrator,
    DEFAULT_DATABASE_URL,
};

/// Resolve the database URL: explicit flag first, then the `DATABASE_URL`
/// environment variable, then the local-development default.
pub fn resolve_database_url(flag: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Apply all pending migrations and print the run summary.
pub async fn run(database_url: Option<&str>, config: &MigrationConfig) -> MigrateResult<()> {
    let url = resolve_database_url(database_url);
    let pool = connect(&url).await?;
    let migrator = Migrator::new(pool, config.clone());

    let summary = migrator.run().await?;
    println!("{}", summary_line(summary.applied_count));

    Ok(())
}

fn summary_line(applied_count: usize) -> String {
    if applied_count == 0 {
        "No migrations were applied".to_string()
    } else {
        format!("{} migrations were applied", applied_count)
    }
}

/// Print the status of every candidate migration plus any ghost records.
pub async fn status(
    database_url: Option<&str>,
    config: &MigrationConfig,
    json: bool,
) -> MigrateResult<()> {
    let url = resolve_database_url(database_url);
    let pool = connect(&url).await?;
    let migrator = Migrator::new(pool, config.clone());

    let report = migrator.status().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.entries.is_empty() && report.ghosts.is_empty() {
        println!("No migrations found in {}", config.source_dir.display());
        return Ok(());
    }

    for entry in &report.entries {
        match &entry.status {
            MigrationStatus::Applied { applied_at } => {
                println!(
                    "applied  {}  {}",
                    applied_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.name
                );
            }
            MigrationStatus::Pending => {
                println!("pending  {:19}  {}", "", entry.name);
            }
        }
    }

    for ghost in &report.ghosts {
        println!(
            "ghost    {}  {} (ledger record without a file)",
            ghost.applied_at.format("%Y-%m-%d %H:%M:%S"),
            ghost.name
        );
    }

    Ok(())
}

/// Scaffold the next migration file in the source directory.
pub fn create(config: &MigrationConfig, name: &str) -> MigrateResult<()> {
    let source = MigrationSource::new(config.clone());
    let path = source.create_migration(name)?;

    println!("Created migration: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn summary_lines_are_exact() {
        assert_eq!(summary_line(0), "No migrations were applied");
        assert_eq!(summary_line(1), "1 migrations were applied");
        assert_eq!(summary_line(2), "2 migrations were applied");
    }

    #[test]
    #[serial]
    fn explicit_flag_wins() {
        std::env::set_var("DATABASE_URL", "sqlite://from-env.db");
        assert_eq!(
            resolve_database_url(Some("sqlite://flag.db")),
            "sqlite://flag.db"
        );
        std::env::remove_var("DATABASE_URL");
    }

    #[test]
    #[serial]
    fn environment_beats_default() {
        std::env::set_var("DATABASE_URL", "sqlite://from-env.db");
        assert_eq!(resolve_database_url(None), "sqlite://from-env.db");
        std::env::remove_var("DATABASE_URL");
    }

    #[test]
    #[serial]
    fn default_is_local_sqlite_file() {
        std::env::remove_var("DATABASE_URL");
        assert_eq!(resolve_database_url(None), DEFAULT_DATABASE_URL);
    }
}
