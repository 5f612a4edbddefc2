//! Core types for the graph-import framework.
//!
//! This crate provides the value model shared by the import engine and the
//! storage sinks:
//!
//! - [`ScalarType`] / [`ValueType`] - declared column types from CSV headers
//! - [`PropertyValue`] / [`PropertyMap`] - typed property values
//! - [`NodeHandle`] / [`RelationshipHandle`] - opaque identifiers assigned by a store
//!
//! # Architecture
//!
//! ```text
//! import-core (this crate)
//!    │
//!    ├─── graph-sink          (storage traits over these types)
//!    │      ├─── memory-sink  (in-memory store)
//!    │      └─── neo4j-sink   (Bolt store)
//!    │
//!    └─── graph-import-csv    (parses CSV fields into PropertyValue)
//! ```

pub mod types;
pub mod values;

pub use types::{ScalarType, ValueType};
pub use values::{NodeHandle, PropertyMap, PropertyValue, RelationshipHandle};
