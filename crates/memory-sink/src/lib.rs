//! In-memory graph store.
//!
//! `MemoryGraph` implements [`graph_sink::GraphSink`] by staging writes in a
//! transaction buffer and applying them to a shared state on commit. It
//! backs dry runs and the import engine's tests, and can be told to fail
//! commits after a number of successful ones to exercise rollback paths.

mod graph;

pub use graph::{MemoryGraph, MemoryTransaction, StoredNode, StoredRelationship};
