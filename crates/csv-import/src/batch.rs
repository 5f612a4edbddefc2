//! Batched, transactional writes to the graph store.
//!
//! Staged nodes and relationships are written in one store transaction per
//! batch. A failing batch is rolled back as a whole; batches committed
//! before it stay committed.

use crate::error::ImportError;
use crate::metrics::MetricsCollector;
use crate::registry::{IdKey, IdentifierRegistry};
use graph_sink::{GraphSink, GraphTransaction};
use import_core::{NodeHandle, PropertyMap};
use tracing::{debug, warn};

/// A node waiting for its batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingNode {
    /// Registered id, bound to the store handle after commit. `None` for
    /// nodes from files without an id column.
    pub key: Option<IdKey>,
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

/// A relationship with both endpoints already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRelationship {
    pub start: NodeHandle,
    pub end: NodeHandle,
    pub rel_type: String,
    pub properties: PropertyMap,
}

/// Running totals of committed work.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchTotals {
    pub nodes: u64,
    pub relationships: u64,
    pub batches: u64,
}

/// Queues staged records and commits them in batches of `batch_size`.
///
/// The committer owns the [`IdentifierRegistry`] so that node ids are bound
/// in the same step that commits their batch.
pub struct BatchCommitter<'a, S: GraphSink> {
    sink: &'a S,
    batch_size: usize,
    registry: IdentifierRegistry,
    nodes: Vec<PendingNode>,
    relationships: Vec<PendingRelationship>,
    totals: BatchTotals,
    metrics: Option<&'a MetricsCollector>,
}

impl<'a, S: GraphSink> BatchCommitter<'a, S> {
    pub fn new(sink: &'a S, batch_size: usize) -> Self {
        Self {
            sink,
            batch_size: batch_size.max(1),
            registry: IdentifierRegistry::new(),
            nodes: Vec::new(),
            relationships: Vec::new(),
            totals: BatchTotals::default(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Option<&'a MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &IdentifierRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut IdentifierRegistry {
        &mut self.registry
    }

    pub fn totals(&self) -> BatchTotals {
        self.totals
    }

    /// Number of staged, uncommitted records.
    pub fn pending(&self) -> usize {
        self.nodes.len() + self.relationships.len()
    }

    pub async fn stage_node(&mut self, node: PendingNode) -> Result<(), ImportError> {
        self.nodes.push(node);
        if self.pending() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    pub async fn stage_relationship(&mut self, rel: PendingRelationship) -> Result<(), ImportError> {
        self.relationships.push(rel);
        if self.pending() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// Commit everything staged so far as one batch. Does nothing when
    /// nothing is staged.
    pub async fn flush(&mut self) -> Result<(), ImportError> {
        if self.nodes.is_empty() && self.relationships.is_empty() {
            return Ok(());
        }

        let batch = self.totals.batches + 1;
        let nodes = std::mem::take(&mut self.nodes);
        let relationships = std::mem::take(&mut self.relationships);
        let storage = |source| ImportError::Storage { batch, source };

        let mut txn = self.sink.begin_transaction().await.map_err(storage)?;
        let handles = match write_batch(&mut txn, &nodes, &relationships).await {
            Ok(handles) => handles,
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("Failed to roll back batch {batch}: {rollback_err:#}");
                }
                return Err(storage(e));
            }
        };
        txn.commit().await.map_err(storage)?;

        for (node, handle) in nodes.iter().zip(handles) {
            if let Some(key) = &node.key {
                self.registry.bind(key.clone(), handle)?;
            }
        }

        let node_count = nodes.len() as u64;
        let rel_count = relationships.len() as u64;
        self.totals.nodes += node_count;
        self.totals.relationships += rel_count;
        self.totals.batches = batch;
        if let Some(metrics) = self.metrics {
            metrics.add_batch(node_count, rel_count);
        }

        debug!("Committed batch {batch}: {node_count} nodes, {rel_count} relationships");
        Ok(())
    }
}

async fn write_batch<T: GraphTransaction>(
    txn: &mut T,
    nodes: &[PendingNode],
    relationships: &[PendingRelationship],
) -> anyhow::Result<Vec<NodeHandle>> {
    let mut handles = Vec::with_capacity(nodes.len());
    for node in nodes {
        handles.push(txn.create_node(&node.labels, &node.properties).await?);
    }
    for rel in relationships {
        txn.create_relationship(rel.start, rel.end, &rel.rel_type, &rel.properties)
            .await?;
    }
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::IdSpace;
    use import_core::PropertyValue;
    use memory_sink::MemoryGraph;

    fn node(id: Option<&str>, name: &str) -> PendingNode {
        let mut properties = PropertyMap::new();
        properties.insert("name".to_string(), PropertyValue::from(name));
        PendingNode {
            key: id.map(|id| IdKey::new(IdSpace::Global, id)),
            labels: vec!["Person".to_string()],
            properties,
        }
    }

    #[tokio::test]
    async fn test_flush_at_batch_size() {
        let graph = MemoryGraph::new();
        let mut committer = BatchCommitter::new(&graph, 2);

        committer.stage_node(node(Some("1"), "John")).await.unwrap();
        assert_eq!(graph.node_count().await, 0);
        committer.stage_node(node(Some("2"), "Jane")).await.unwrap();
        assert_eq!(graph.node_count().await, 2);
        assert_eq!(committer.pending(), 0);

        committer.stage_node(node(None, "Anon")).await.unwrap();
        committer.flush().await.unwrap();

        assert_eq!(
            committer.totals(),
            BatchTotals {
                nodes: 3,
                relationships: 0,
                batches: 2
            }
        );
        assert!(committer
            .registry()
            .resolve(&IdKey::new(IdSpace::Global, "2"))
            .is_some());
    }

    #[tokio::test]
    async fn test_empty_flush_is_noop() {
        let graph = MemoryGraph::new();
        let mut committer = BatchCommitter::new(&graph, 10);
        committer.flush().await.unwrap();
        assert_eq!(committer.totals().batches, 0);
        assert_eq!(graph.commit_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_batch_rolls_back() {
        let graph = MemoryGraph::new();
        let mut committer = BatchCommitter::new(&graph, 10);
        committer.stage_node(node(Some("1"), "John")).await.unwrap();
        committer.flush().await.unwrap();
        let john = committer
            .registry()
            .resolve(&IdKey::new(IdSpace::Global, "1"))
            .unwrap();

        committer.stage_node(node(Some("2"), "Jane")).await.unwrap();
        committer
            .stage_relationship(PendingRelationship {
                start: john,
                end: NodeHandle(9999),
                rel_type: "KNOWS".to_string(),
                properties: PropertyMap::new(),
            })
            .await
            .unwrap();

        let err = committer.flush().await.unwrap_err();
        assert!(matches!(err, ImportError::Storage { batch: 2, .. }));
        assert_eq!(graph.node_count().await, 1);
        assert_eq!(graph.relationship_count().await, 0);
        assert_eq!(committer.totals().batches, 1);
    }
}
