//! The `import` command.

use crate::{parse_node_file, parse_relationship_file, ConfigArgs, Neo4jArgs};
use anyhow::{bail, Context};
use clap::Parser;
use graph_import_csv::{ImportJob, ImportSummary, MetricsCollector};
use graph_sink::GraphSink;
use memory_sink::MemoryGraph;
use neo4j_sink::{neo4j_connect, Neo4jOpts, Neo4jSink};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Clone, Debug)]
pub struct ImportArgs {
    /// Job document listing node files, relationship files and options
    #[arg(long, value_name = "PATH")]
    pub job: Option<PathBuf>,

    /// Node file, optionally prefixed with labels: [Label1:Label2=]FILE
    #[arg(long = "nodes", value_name = "FILE")]
    pub nodes: Vec<String>,

    /// Relationship file, optionally prefixed with a default type: [TYPE=]FILE
    #[arg(long = "relationships", value_name = "FILE")]
    pub relationships: Vec<String>,

    /// Import options
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Directory that file: URLs and relative file names resolve against
    #[arg(long, value_name = "DIR")]
    pub import_dir: Option<PathBuf>,

    /// Emit metrics to this file during execution
    #[arg(long, value_name = "PATH")]
    pub emit_metrics: Option<PathBuf>,

    /// Import into an in-memory graph instead of Neo4j
    #[arg(long)]
    pub dry_run: bool,

    /// Neo4j connection options
    #[command(flatten)]
    pub neo4j: Neo4jArgs,
}

impl ImportArgs {
    /// Combine the job document with the files and options on the command line.
    pub fn build_job(&self) -> anyhow::Result<ImportJob> {
        let mut job = match &self.job {
            Some(path) => ImportJob::from_file(path)
                .with_context(|| format!("Failed to load import job from {path:?}"))?,
            None => ImportJob::default(),
        };

        for arg in &self.nodes {
            job.nodes.push(parse_node_file(arg)?);
        }
        for arg in &self.relationships {
            job.relationships.push(parse_relationship_file(arg)?);
        }
        job.config = self.config.apply(job.config)?;

        if job.nodes.is_empty() && job.relationships.is_empty() {
            bail!("Nothing to import: pass --job, --nodes or --relationships");
        }
        Ok(job)
    }
}

/// Run the import described by `args` and return its summary.
pub async fn run_import(args: &ImportArgs) -> anyhow::Result<ImportSummary> {
    let job = args.build_job()?;
    info!(
        "Importing {} node files and {} relationship files (batch size {})",
        job.nodes.len(),
        job.relationships.len(),
        job.config.batch_size
    );

    let metrics_task = if let Some(ref metrics_path) = args.emit_metrics {
        info!("Metrics emission enabled: {}", metrics_path.display());
        let collector = MetricsCollector::new(metrics_path.clone());
        let task = collector.start_emission_task(Duration::from_secs(1));
        Some((collector, task))
    } else {
        None
    };
    let collector = metrics_task.as_ref().map(|(collector, _)| collector.clone());
    let import_dir = args.import_dir.as_deref();

    let result = if args.dry_run {
        info!("Dry run: importing into an in-memory graph");
        let graph = MemoryGraph::new();
        run_job(&job, &graph, import_dir, collector).await
    } else {
        let opts = Neo4jOpts::from(&args.neo4j);
        let graph = neo4j_connect(&opts)
            .await
            .context("Failed to connect to Neo4j")?;
        run_job(&job, &Neo4jSink::new(graph), import_dir, collector).await
    };

    if let Some((_collector, task)) = metrics_task {
        task.abort();
    }

    let summary = result?;
    info!("Import completed: {summary}");
    Ok(summary)
}

async fn run_job<S: GraphSink>(
    job: &ImportJob,
    sink: &S,
    import_dir: Option<&Path>,
    metrics: Option<MetricsCollector>,
) -> anyhow::Result<ImportSummary> {
    Ok(job.run(sink, import_dir, metrics).await?)
}
