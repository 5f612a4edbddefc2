//! GraphSink implementation over a Neo4j `Graph`.

use crate::convert::{escape_identifier, property_map_to_bolt};
use anyhow::{Context, Result};
use graph_sink::{GraphSink, GraphTransaction};
use import_core::{NodeHandle, PropertyMap, RelationshipHandle};
use neo4rs::{query, Graph, Txn};

/// Neo4j-backed graph sink.
#[derive(Clone)]
pub struct Neo4jSink {
    graph: Graph,
}

impl Neo4jSink {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }
}

#[async_trait::async_trait]
impl GraphSink for Neo4jSink {
    type Transaction = Neo4jTransaction;

    async fn begin_transaction(&self) -> Result<Neo4jTransaction> {
        let txn = self
            .graph
            .start_txn()
            .await
            .context("Failed to start Neo4j transaction")?;
        Ok(Neo4jTransaction { txn })
    }
}

/// One explicit Neo4j transaction.
pub struct Neo4jTransaction {
    txn: Txn,
}

impl Neo4jTransaction {
    /// Run a query that returns a single integer column `id`.
    async fn execute_for_id(&mut self, q: neo4rs::Query, what: &str) -> Result<i64> {
        let mut stream = self
            .txn
            .execute(q)
            .await
            .with_context(|| format!("Failed to create {what}"))?;
        let row = stream
            .next(self.txn.handle())
            .await
            .with_context(|| format!("Failed to read id of created {what}"))?
            .with_context(|| format!("Neo4j returned no row when creating {what}"))?;
        let id: i64 = row
            .get("id")
            .with_context(|| format!("Created {what} has no id column"))?;
        // Drain the stream so the connection is free for the next statement.
        while stream.next(self.txn.handle()).await?.is_some() {}
        Ok(id)
    }
}

/// Build the `CREATE` statement for a node with the given labels.
fn create_node_cypher(labels: &[String]) -> String {
    let label_clause: String = labels
        .iter()
        .map(|l| format!(":{}", escape_identifier(l)))
        .collect();
    format!("CREATE (n{label_clause} $props) RETURN id(n) AS id")
}

/// Build the `CREATE` statement for a relationship of the given type.
fn create_relationship_cypher(rel_type: &str) -> String {
    format!(
        "MATCH (a), (b) WHERE id(a) = $start AND id(b) = $end \
         CREATE (a)-[r:{} $props]->(b) RETURN id(r) AS id",
        escape_identifier(rel_type)
    )
}

#[async_trait::async_trait]
impl GraphTransaction for Neo4jTransaction {
    async fn create_node(
        &mut self,
        labels: &[String],
        properties: &PropertyMap,
    ) -> Result<NodeHandle> {
        let q = query(&create_node_cypher(labels)).param("props", property_map_to_bolt(properties));
        let id = self.execute_for_id(q, "node").await?;
        Ok(NodeHandle(id))
    }

    async fn create_relationship(
        &mut self,
        start: NodeHandle,
        end: NodeHandle,
        rel_type: &str,
        properties: &PropertyMap,
    ) -> Result<RelationshipHandle> {
        let q = query(&create_relationship_cypher(rel_type))
            .param("start", start.0)
            .param("end", end.0)
            .param("props", property_map_to_bolt(properties));
        let id = self
            .execute_for_id(q, &format!("{rel_type} relationship {start} -> {end}"))
            .await?;
        Ok(RelationshipHandle(id))
    }

    async fn commit(self) -> Result<()> {
        self.txn
            .commit()
            .await
            .context("Failed to commit Neo4j transaction")
    }

    async fn rollback(self) -> Result<()> {
        self.txn
            .rollback()
            .await
            .context("Failed to roll back Neo4j transaction")
    }
}
