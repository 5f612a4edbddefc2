//! Command-line interface for graph-import
//!
//! # Usage Examples
//!
//! ```bash
//! # Import persons and their relationships into Neo4j
//! graph-import import \
//!   --nodes Person=file:/persons.csv \
//!   --relationships KNOWS=file:/knows.csv \
//!   --import-dir /var/lib/import \
//!   --string-ids false \
//!   --neo4j-uri bolt://localhost:7687
//!
//! # Pipe-delimited files with labels from the :LABEL column only
//! graph-import import \
//!   --nodes people.csv \
//!   --delimiter '|' --array-delimiter ':' \
//!   --dry-run
//!
//! # Job document with progress metrics
//! graph-import import --job job.yaml --emit-metrics metrics.jsonl
//! ```

use clap::{Parser, Subcommand};
use graph_import::import::{run_import, ImportArgs};

#[derive(Parser)]
#[command(name = "graph-import")]
#[command(about = "A tool for bulk-importing CSV node and relationship files into Neo4j")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import node and relationship files
    Import {
        #[command(flatten)]
        args: ImportArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import { args } => {
            run_import(&args).await?;
        }
    }

    Ok(())
}
