//! Graph store sink trait abstraction.
//!
//! This crate defines the `GraphSink` and `GraphTransaction` traits that
//! abstract over the concrete graph store. `memory-sink` and `neo4j-sink`
//! implement them, so the import engine is written once against this
//! interface.
//!
//! The traits use import-core types (PropertyMap, NodeHandle,
//! RelationshipHandle) to avoid coupling to a specific driver.

mod traits;

pub use traits::{GraphSink, GraphTransaction};
