//! metasync CLI: harvest a metadata graph into relational history tables.
//!
//! Usage:
//!   metasync refresh --graph-db path --sink-db path [--config path] [--interval secs] [--verbose]
//!   metasync tables

use clap::{Parser, Subcommand};
use metasync::sink::ALL_TABLES;
use metasync::{
    OpenSink, OpenStore, SqliteSink, SqliteStore, SyncConfig, SyncController, TracingAuditLog,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "metasync",
    version,
    about = "Incremental metadata harvest into append-only relational history"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize the graph into the sink
    Refresh {
        /// Path to the metadata graph SQLite database
        #[arg(long)]
        graph_db: PathBuf,
        /// Path to the history SQLite database (created if missing)
        #[arg(long)]
        sink_db: PathBuf,
        /// YAML config file (defaults to <config dir>/metasync/config.yaml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Repeat every N seconds instead of running once
        #[arg(long)]
        interval: Option<u64>,
        /// Log at debug level
        #[arg(long, short)]
        verbose: bool,
    },
    /// List target tables and their business keys
    Tables,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn open_controller(graph_db: &Path, sink_db: &Path, config: Option<&Path>) -> Result<SyncController, String> {
    let config = SyncConfig::load_or_default(config).map_err(|e| format!("Failed to load config: {}", e))?;
    let store =
        SqliteStore::open(graph_db).map_err(|e| format!("Failed to open graph database: {}", e))?;
    let sink = SqliteSink::open(sink_db).map_err(|e| format!("Failed to open sink database: {}", e))?;
    SyncController::new(
        Arc::new(store),
        Arc::new(sink),
        Arc::new(TracingAuditLog),
        config,
    )
    .map_err(|e| format!("Invalid configuration: {}", e))
}

fn refresh_once(controller: &SyncController) -> i32 {
    match controller.refresh() {
        Ok(report) => {
            print!("{}", report);
            0
        }
        Err(e) => {
            eprintln!("Error ({}): {}", e.kind(), e);
            1
        }
    }
}

fn cmd_refresh(controller: &SyncController, interval: Option<u64>) -> i32 {
    let Some(seconds) = interval else {
        return refresh_once(controller);
    };
    let period = Duration::from_secs(seconds.max(1));
    tracing::info!(seconds = period.as_secs(), "refreshing on a timer");
    loop {
        // a failed run is rolled back; the next tick starts clean
        refresh_once(controller);
        std::thread::sleep(period);
    }
}

fn cmd_tables() -> i32 {
    for table in ALL_TABLES {
        println!("{:<24} {}", table.name, table.key_columns.join(", "));
    }
    0
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Refresh {
            graph_db,
            sink_db,
            config,
            interval,
            verbose,
        } => {
            init_logging(verbose);
            let controller = match open_controller(&graph_db, &sink_db, config.as_deref()) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            std::process::exit(cmd_refresh(&controller, interval));
        }
        Commands::Tables => std::process::exit(cmd_tables()),
    }
}
