use anyhow::{bail, Result};
use graph_sink::{GraphSink, GraphTransaction};
use import_core::{NodeHandle, PropertyMap, PropertyValue, RelationshipHandle};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A committed node.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub handle: NodeHandle,
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

impl StoredNode {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// A committed relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRelationship {
    pub handle: RelationshipHandle,
    pub start: NodeHandle,
    pub end: NodeHandle,
    pub rel_type: String,
    pub properties: PropertyMap,
}

#[derive(Default)]
struct GraphState {
    nodes: BTreeMap<NodeHandle, StoredNode>,
    relationships: BTreeMap<RelationshipHandle, StoredRelationship>,
    commits: usize,
    /// Commits allowed to succeed before every further commit fails.
    commit_limit: Option<usize>,
}

/// In-memory graph store. Clones share the same underlying graph.
#[derive(Clone, Default)]
pub struct MemoryGraph {
    state: Arc<Mutex<GraphState>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph whose commits fail once `limit` commits have succeeded.
    pub fn with_commit_limit(limit: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(GraphState {
                commit_limit: Some(limit),
                ..GraphState::default()
            })),
            next_id: Arc::default(),
        }
    }

    pub async fn node_count(&self) -> usize {
        self.state.lock().await.nodes.len()
    }

    pub async fn relationship_count(&self) -> usize {
        self.state.lock().await.relationships.len()
    }

    /// Number of successful commits so far.
    pub async fn commit_count(&self) -> usize {
        self.state.lock().await.commits
    }

    pub async fn node(&self, handle: NodeHandle) -> Option<StoredNode> {
        self.state.lock().await.nodes.get(&handle).cloned()
    }

    pub async fn nodes(&self) -> Vec<StoredNode> {
        self.state.lock().await.nodes.values().cloned().collect()
    }

    pub async fn nodes_with_label(&self, label: &str) -> Vec<StoredNode> {
        self.state
            .lock()
            .await
            .nodes
            .values()
            .filter(|n| n.has_label(label))
            .cloned()
            .collect()
    }

    pub async fn relationships(&self) -> Vec<StoredRelationship> {
        self.state
            .lock()
            .await
            .relationships
            .values()
            .cloned()
            .collect()
    }

    pub async fn relationships_of_type(&self, rel_type: &str) -> Vec<StoredRelationship> {
        self.state
            .lock()
            .await
            .relationships
            .values()
            .filter(|r| r.rel_type == rel_type)
            .cloned()
            .collect()
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl GraphSink for MemoryGraph {
    type Transaction = MemoryTransaction;

    async fn begin_transaction(&self) -> Result<MemoryTransaction> {
        Ok(MemoryTransaction {
            graph: self.clone(),
            nodes: Vec::new(),
            relationships: Vec::new(),
        })
    }
}

/// Write buffer applied to the [`MemoryGraph`] on commit.
pub struct MemoryTransaction {
    graph: MemoryGraph,
    nodes: Vec<StoredNode>,
    relationships: Vec<StoredRelationship>,
}

impl MemoryTransaction {
    fn staged_node(&self, handle: NodeHandle) -> bool {
        self.nodes.iter().any(|n| n.handle == handle)
    }
}

#[async_trait::async_trait]
impl GraphTransaction for MemoryTransaction {
    async fn create_node(
        &mut self,
        labels: &[String],
        properties: &PropertyMap,
    ) -> Result<NodeHandle> {
        let handle = NodeHandle(self.graph.allocate_id());
        self.nodes.push(StoredNode {
            handle,
            labels: labels.to_vec(),
            properties: properties.clone(),
        });
        Ok(handle)
    }

    async fn create_relationship(
        &mut self,
        start: NodeHandle,
        end: NodeHandle,
        rel_type: &str,
        properties: &PropertyMap,
    ) -> Result<RelationshipHandle> {
        {
            let state = self.graph.state.lock().await;
            for endpoint in [start, end] {
                if !state.nodes.contains_key(&endpoint) && !self.staged_node(endpoint) {
                    bail!("Relationship endpoint {endpoint} does not exist");
                }
            }
        }
        let handle = RelationshipHandle(self.graph.allocate_id());
        self.relationships.push(StoredRelationship {
            handle,
            start,
            end,
            rel_type: rel_type.to_string(),
            properties: properties.clone(),
        });
        Ok(handle)
    }

    async fn commit(self) -> Result<()> {
        let mut state = self.graph.state.lock().await;
        if let Some(limit) = state.commit_limit {
            if state.commits >= limit {
                bail!("Commit rejected: memory graph commit limit of {limit} reached");
            }
        }
        tracing::debug!(
            "Committing {} nodes and {} relationships to memory graph",
            self.nodes.len(),
            self.relationships.len()
        );
        for node in self.nodes {
            state.nodes.insert(node.handle, node);
        }
        for rel in self.relationships {
            state.relationships.insert(rel.handle, rel);
        }
        state.commits += 1;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        tracing::debug!(
            "Rolling back {} nodes and {} relationships",
            self.nodes.len(),
            self.relationships.len()
        );
        Ok(())
    }
}
