use neo4rs::{query, ConfigBuilder, Graph};
use std::time::Duration;

/// Neo4j connection options
#[derive(Clone, Debug)]
pub struct Neo4jOpts {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl Default for Neo4jOpts {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            username: "neo4j".to_string(),
            password: "password".to_string(),
            database: "neo4j".to_string(),
        }
    }
}

/// Default number of connection retry attempts
const DEFAULT_RETRY_ATTEMPTS: u32 = 5;
/// Default delay between retry attempts in seconds
const DEFAULT_RETRY_DELAY_SECS: u64 = 2;

pub async fn neo4j_connect(opts: &Neo4jOpts) -> anyhow::Result<Graph> {
    neo4j_connect_with_retries(opts, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_SECS).await
}

/// Connect to Neo4j with configurable retries.
///
/// The connection is verified with a trivial query, so a server that is
/// still starting up is retried rather than reported as connected.
pub async fn neo4j_connect_with_retries(
    opts: &Neo4jOpts,
    max_retries: u32,
    retry_delay_secs: u64,
) -> anyhow::Result<Graph> {
    tracing::debug!(
        "Connecting to Neo4j at {} (database: {})",
        opts.uri,
        opts.database
    );

    let mut last_error = None;

    for attempt in 1..=max_retries {
        match try_connect(opts).await {
            Ok(graph) => {
                if attempt > 1 {
                    tracing::info!("Successfully connected to Neo4j after {} attempts", attempt);
                }
                return Ok(graph);
            }
            Err(e) => {
                if attempt < max_retries {
                    tracing::warn!(
                        "Failed to connect to Neo4j at '{}' (attempt {}/{}): {}. Retrying in {}s...",
                        opts.uri,
                        attempt,
                        max_retries,
                        e,
                        retry_delay_secs
                    );
                    tokio::time::sleep(Duration::from_secs(retry_delay_secs)).await;
                }
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) => Err(e.context(format!(
            "Failed to connect to Neo4j at '{}' after {} attempts",
            opts.uri, max_retries
        ))),
        None => anyhow::bail!("Neo4j connection attempted with zero retries"),
    }
}

/// Attempt a single connection to Neo4j.
async fn try_connect(opts: &Neo4jOpts) -> anyhow::Result<Graph> {
    let config = ConfigBuilder::default()
        .uri(&opts.uri)
        .user(opts.username.as_str())
        .password(opts.password.as_str())
        .db(opts.database.as_str())
        .build()?;

    let graph = Graph::connect(config)?;
    graph.run(query("RETURN 1")).await.map_err(|e| {
        anyhow::anyhow!(
            "Neo4j connection to '{}' failed (user: '{}'): {e}",
            opts.uri,
            opts.username
        )
    })?;

    Ok(graph)
}
