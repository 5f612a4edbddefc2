//! Relationship file loading.

use crate::batch::{BatchCommitter, PendingRelationship};
use crate::coerce::coerce_column;
use crate::config::{ImportConfig, RelationshipFile};
use crate::error::{Endpoint, ImportError, RowError, RowErrorLog};
use crate::header::{ColumnDescriptor, ColumnRole, Header, IdSpace};
use crate::metrics::MetricsCollector;
use crate::nodes::FileStats;
use crate::reader::CsvFile;
use crate::registry::{IdKey, IdentifierRegistry};
use csv::StringRecord;
use graph_sink::GraphSink;
use import_core::{NodeHandle, PropertyMap};
use tracing::{info, warn};

/// A relationship row after endpoint resolution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RelationshipRow {
    Ready(PendingRelationship),
    /// At least one endpoint did not resolve; the row is dropped.
    Unresolved(Vec<RowError>),
}

struct RowContext<'r> {
    file: &'r str,
    record: &'r StringRecord,
    row: u64,
    config: &'r ImportConfig,
}

impl RowContext<'_> {
    fn raw(&self, column: &ColumnDescriptor) -> &str {
        self.record.get(column.index).unwrap_or("")
    }

    /// Coerce an endpoint id and look it up.
    fn resolve(
        &self,
        column: &ColumnDescriptor,
        space: &IdSpace,
        endpoint: Endpoint,
        registry: &IdentifierRegistry,
    ) -> Result<Result<NodeHandle, RowError>, ImportError> {
        let raw = self.raw(column);
        let key = match coerce_column(self.file, self.row, column, raw, self.config)? {
            Some(value) => IdKey::from_value(space.clone(), &value, raw),
            None => IdKey::new(space.clone(), ""),
        };
        Ok(registry
            .resolve(&key)
            .ok_or_else(|| RowError::UnresolvedIdentifier {
                file: self.file.to_string(),
                row: self.row,
                endpoint,
                space: key.space,
                id: key.id,
            }))
    }
}

/// Build the relationship for one data row.
///
/// The type is the row's `:TYPE` value, or the file's default type when
/// that cell is empty.
pub(crate) fn build_relationship(
    file: &str,
    header: &Header,
    record: &StringRecord,
    row: u64,
    default_type: Option<&str>,
    registry: &IdentifierRegistry,
    config: &ImportConfig,
) -> Result<RelationshipRow, ImportError> {
    let ctx = RowContext {
        file,
        record,
        row,
        config,
    };

    let mut start = None;
    let mut end = None;
    let mut row_type = None;
    let mut properties = PropertyMap::new();

    for column in header.columns() {
        match &column.role {
            ColumnRole::StartId(space) => {
                start = Some(ctx.resolve(column, space, Endpoint::Start, registry)?);
            }
            ColumnRole::EndId(space) => {
                end = Some(ctx.resolve(column, space, Endpoint::End, registry)?);
            }
            ColumnRole::Type => {
                let raw = ctx.raw(column);
                if !raw.is_empty() {
                    row_type = Some(raw.to_string());
                }
            }
            ColumnRole::Property => {
                if let Some(value) = coerce_column(file, row, column, ctx.raw(column), config)? {
                    properties.insert(column.name.clone(), value);
                }
            }
            ColumnRole::Ignore | ColumnRole::Id(_) | ColumnRole::Label => {}
        }
    }

    let rel_type = match row_type.or_else(|| default_type.map(str::to_string)) {
        Some(t) => t,
        None => {
            return Err(ImportError::MissingRelationshipType {
                file: file.to_string(),
                row,
            })
        }
    };

    let missing_column = |endpoint: Endpoint| ImportError::InvalidHeader {
        file: file.to_string(),
        column: 0,
        reason: format!("no {endpoint} id column"),
    };
    let start = start.ok_or_else(|| missing_column(Endpoint::Start))?;
    let end = end.ok_or_else(|| missing_column(Endpoint::End))?;

    match (start, end) {
        (Ok(start), Ok(end)) => Ok(RelationshipRow::Ready(PendingRelationship {
            start,
            end,
            rel_type,
            properties,
        })),
        (start, end) => Ok(RelationshipRow::Unresolved(
            [start.err(), end.err()].into_iter().flatten().collect(),
        )),
    }
}

/// Stage every row of a relationship file.
///
/// Rows with an endpoint that matches no imported node are skipped and
/// reported as [`RowError::UnresolvedIdentifier`].
pub(crate) async fn load_relationships<S: GraphSink>(
    file: &mut CsvFile,
    descriptor: &RelationshipFile,
    config: &ImportConfig,
    committer: &mut BatchCommitter<'_, S>,
    row_errors: &mut RowErrorLog,
    metrics: Option<&MetricsCollector>,
) -> Result<FileStats, ImportError> {
    let mut stats = FileStats::default();
    let mut record = StringRecord::new();

    while let Some(row) = file.next_row(&mut record).await? {
        stats.rows += 1;
        if let Some(metrics) = metrics {
            metrics.add_rows(1);
        }

        let built = build_relationship(
            file.name(),
            file.header(),
            &record,
            row,
            descriptor.default_type(),
            committer.registry(),
            config,
        )?;

        match built {
            RelationshipRow::Ready(rel) => {
                committer.stage_relationship(rel).await?;
                stats.staged += 1;
            }
            RelationshipRow::Unresolved(errors) => {
                stats.skipped += 1;
                for error in &errors {
                    warn!("Skipping relationship: {error}");
                }
                if let Some(metrics) = metrics {
                    metrics.add_row_errors(errors.len() as u64);
                }
                for error in errors {
                    row_errors.push(error);
                }
            }
        }
    }

    info!(
        "Loaded {} relationships from {} ({} rows, {} skipped)",
        stats.staged,
        file.name(),
        stats.rows,
        stats.skipped
    );
    Ok(stats)
}
