mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "waystone")]
#[command(about = "Versioned SQL schema migrations, applied exactly once", version)]
struct Cli {
    /// Database URL (defaults to $DATABASE_URL, then sqlite://waystone.db)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Directory containing migration files
    #[arg(long, global = true, default_value = waystone_core::DEFAULT_SOURCE_DIR)]
    source: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending migrations
    Run,

    /// Show applied, pending, and ghost migrations
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new migration file
    Create {
        /// Migration label, e.g. add_users
        name: String,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let config = waystone_core::MigrationConfig::with_source_dir(&cli.source);

    let result = match cli.command {
        Commands::Run => commands::migrate::run(cli.database_url.as_deref(), &config).await,
        Commands::Status { json } => {
            commands::migrate::status(cli.database_url.as_deref(), &config, json).await
        }
        Commands::Create { name } => commands::migrate::create(&config, &name),
    };

    if let Err(err) = result {
        eprintln!("waystone: {err}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber, honoring `RUST_LOG` when set.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,waystone_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
