//! Error types for CSV graph import.
//!
//! [`ImportError`] aborts the whole import call. Batches committed before
//! the failure stay in the store; only the batch in flight is rolled back.
//!
//! [`RowError`] describes a single row that was skipped or collapsed. Row
//! errors never abort an import and are returned in the summary instead.

use crate::header::IdSpace;
use import_core::{NodeHandle, ValueType};
use std::fmt;
use thiserror::Error;

/// Fatal errors that abort an import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A header field could not be interpreted.
    #[error("Invalid header in {file} at column {column}: {reason}")]
    InvalidHeader {
        file: String,
        column: usize,
        reason: String,
    },

    /// A field value does not parse as its declared type.
    #[error("Cannot convert '{value}' to {value_type} in {file} row {row}, column '{column}': {reason}")]
    ValueCoercion {
        file: String,
        row: u64,
        column: String,
        value: String,
        value_type: ValueType,
        reason: String,
    },

    /// A data row has a different field count than the header.
    #[error("Malformed row {row} in {file}: expected {expected} fields, found {found}")]
    MalformedRow {
        file: String,
        row: u64,
        expected: usize,
        found: usize,
    },

    /// An identifier was bound twice to different nodes.
    #[error("Identifier '{id}' in id space {space} is already bound to {existing}, cannot bind it to {attempted}")]
    IdentifierCollision {
        space: IdSpace,
        id: String,
        existing: NodeHandle,
        attempted: NodeHandle,
    },

    /// The named file could not be located or opened.
    #[error("Cannot open {file}")]
    ResourceNotFound {
        file: String,
        #[source]
        source: anyhow::Error,
    },

    /// Reading or decoding the file failed part way through.
    #[error("Failed to read {file}")]
    Read {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// A relationship row has no type and its file declares no default.
    #[error("Relationship row {row} in {file} has no type and the file declares no default type")]
    MissingRelationshipType { file: String, row: u64 },

    /// The store rejected a batch; the batch was rolled back.
    #[error("Batch {batch} failed and was rolled back")]
    Storage {
        batch: u64,
        #[source]
        source: anyhow::Error,
    },

    /// Invalid configuration or job document.
    #[error("Invalid import configuration: {0}")]
    Config(String),
}

/// Which end of a relationship an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::End => f.write_str("end"),
        }
    }
}

/// Non-fatal, row-local problems collected during an import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// A relationship endpoint does not match any imported node. The row is skipped.
    #[error("{file} row {row}: {endpoint} id '{id}' in id space {space} does not match any node")]
    UnresolvedIdentifier {
        file: String,
        row: u64,
        endpoint: Endpoint,
        space: IdSpace,
        id: String,
    },

    /// A node id repeats within its id space. The first occurrence was kept.
    #[error("{file} row {row}: duplicate id '{id}' in id space {space}, keeping the first node")]
    DuplicateIdentifier {
        file: String,
        row: u64,
        space: IdSpace,
        id: String,
    },
}

/// Row errors of one import: the first `limit` in full, plus a count of all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RowErrorLog {
    kept: Vec<RowError>,
    total: u64,
    limit: usize,
}

impl RowErrorLog {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            kept: Vec::new(),
            total: 0,
            limit,
        }
    }

    pub(crate) fn push(&mut self, error: RowError) {
        self.total += 1;
        if self.kept.len() < self.limit {
            self.kept.push(error);
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<RowError>, u64) {
        (self.kept, self.total)
    }
}
