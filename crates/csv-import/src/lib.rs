//! Bulk import of property graphs from CSV files.
//!
//! Node files and relationship files describe their columns in the header
//! line (`personId:ID(Person)`, `:LABEL`, `:START_ID`, `since:INT`, ...).
//! The importer reads every node file, binds each node id to the handle the
//! store assigns, then reads every relationship file and connects the
//! referenced nodes. Writes go to a [`graph_sink::GraphSink`] in batches of
//! `batchSize` records, each batch in its own transaction.
//!
//! # Example
//!
//! ```ignore
//! use graph_import_csv::{CsvImporter, ImportConfig, NodeFile, RelationshipFile};
//!
//! let summary = CsvImporter::new(&sink, ImportConfig::default())
//!     .with_import_dir("/var/lib/import")
//!     .run(
//!         &[NodeFile::new("file:/persons.csv", &["Person"])],
//!         &[RelationshipFile::new("file:/knows.csv", "KNOWS")],
//!     )
//!     .await?;
//! println!("{summary}");
//! ```

mod batch;
mod coerce;
mod config;
mod error;
mod header;
mod import;
mod metrics;
mod nodes;
mod reader;
mod registry;
mod relationships;

pub use batch::{BatchCommitter, BatchTotals, PendingNode, PendingRelationship};
pub use coerce::{coerce_field, coerce_scalar, split_array, strip_quotes, CoercionError};
pub use config::{ImportConfig, ImportJob, NodeFile, RelationshipFile};
pub use error::{Endpoint, ImportError, RowError};
pub use header::{ColumnDescriptor, ColumnRole, FileKind, Header, IdSpace};
pub use import::{import_csv, CsvImporter, ImportPhase, ImportSummary};
pub use metrics::{MetricsCollector, MetricsEntry};
pub use nodes::FileStats;
pub use reader::CsvFile;
pub use registry::{IdKey, IdentifierRegistry, Registration};
