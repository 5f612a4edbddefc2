//! Neo4j graph sink.
//!
//! Writes nodes and relationships over Bolt with `neo4rs`. Each
//! [`graph_sink::GraphTransaction`] maps onto one explicit Neo4j
//! transaction, so a failed batch is rolled back server-side.

mod connect;
mod convert;
mod sink;

pub use connect::{neo4j_connect, neo4j_connect_with_retries, Neo4jOpts};
pub use convert::{escape_identifier, property_map_to_bolt, property_to_bolt};
pub use sink::{Neo4jSink, Neo4jTransaction};
