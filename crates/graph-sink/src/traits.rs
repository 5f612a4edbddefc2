//! GraphSink and GraphTransaction trait definitions.

use anyhow::Result;
use import_core::{NodeHandle, PropertyMap, RelationshipHandle};

/// Trait for opening write transactions against a graph store.
///
/// # Usage Pattern
///
/// Callers use generics for zero-cost dispatch:
///
/// ```ignore
/// pub async fn write_batch<S: GraphSink>(sink: &S, nodes: &[PendingNode]) -> Result<()> {
///     let mut txn = sink.begin_transaction().await?;
///     for node in nodes {
///         txn.create_node(&node.labels, &node.properties).await?;
///     }
///     txn.commit().await
/// }
/// ```
#[async_trait::async_trait]
pub trait GraphSink: Send + Sync {
    /// Transaction type handed out by this store.
    type Transaction: GraphTransaction;

    /// Begin a new write transaction.
    async fn begin_transaction(&self) -> Result<Self::Transaction>;
}

/// A single write transaction.
///
/// Nothing created through a transaction is visible to other readers until
/// [`commit`](GraphTransaction::commit) succeeds. Dropping a transaction
/// without committing discards its writes.
#[async_trait::async_trait]
pub trait GraphTransaction: Send {
    /// Create a node with the given labels and properties.
    ///
    /// The returned handle may be used as a relationship endpoint within the
    /// same transaction and in any later one.
    async fn create_node(
        &mut self,
        labels: &[String],
        properties: &PropertyMap,
    ) -> Result<NodeHandle>;

    /// Create a directed relationship `start -[rel_type]-> end`.
    async fn create_relationship(
        &mut self,
        start: NodeHandle,
        end: NodeHandle,
        rel_type: &str,
        properties: &PropertyMap,
    ) -> Result<RelationshipHandle>;

    /// Make every write of this transaction durable.
    async fn commit(self) -> Result<()>;

    /// Discard every write of this transaction.
    async fn rollback(self) -> Result<()>;
}
