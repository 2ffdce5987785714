//! # Text Analyzer CLI (`text-analyzer`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `text-analyzer init` | Create the results table if it does not exist |
//! | `text-analyzer serve` | Start the HTTP server |
//! | `text-analyzer analyze "<text>"` | Analyze text and print the JSON result |
//! | `text-analyzer history` | Print stored analyses |
//!
//! The store is configured through `TABLES_CONNECTION_STRING` and
//! `TABLE_NAME`, or an optional `--config` TOML file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use text_analyzer::{analyze, config, history, server, store};

/// Text Analyzer: text statistics over HTTP with a stored history.
#[derive(Parser)]
#[command(
    name = "text-analyzer",
    about = "Text statistics over HTTP with best-effort persistence to a table store",
    version
)]
struct Cli {
    /// Path to an optional configuration file (TOML).
    ///
    /// Environment variables override values from the file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the results table. Safe to run repeatedly.
    Init,

    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Analyze a text and print the result as JSON.
    Analyze {
        /// The text to analyze.
        text: String,

        /// Also write the record to the table store.
        #[arg(long)]
        save: bool,
    },

    /// Print stored analyses as JSON.
    History {
        /// Maximum number of records (clamped to 1-50, default 10).
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output on stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => {
            store::run_init(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Analyze { text, save } => {
            analyze::run_analyze(&cfg, &text, save).await?;
        }
        Commands::History { limit } => {
            history::run_history(&cfg, limit.as_deref()).await?;
        }
    }

    Ok(())
}
