//! Header line grammar.
//!
//! Every header field has the form `name:TOKEN`, where `TOKEN` is a value
//! type (`INT`, `STRING[]`, ...) or a structural keyword (`ID`, `START_ID`,
//! `END_ID`, `LABEL`, `TYPE`, `IGNORE`). Id keywords may carry an id space
//! in parentheses: `personId:ID(Person)`. A field without a colon is a
//! `STRING` property.

use crate::config::ImportConfig;
use crate::error::ImportError;
use import_core::{ScalarType, ValueType};
use std::fmt;

/// Namespace that node ids are unique within.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdSpace {
    Global,
    Named(String),
}

impl IdSpace {
    fn from_suffix(space: Option<&str>) -> Self {
        match space {
            Some(name) if !name.is_empty() => IdSpace::Named(name.to_string()),
            _ => IdSpace::Global,
        }
    }
}

impl fmt::Display for IdSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdSpace::Global => f.write_str("<global>"),
            IdSpace::Named(name) => f.write_str(name),
        }
    }
}

/// What a column contributes to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    Property,
    Id(IdSpace),
    StartId(IdSpace),
    EndId(IdSpace),
    Label,
    Type,
    Ignore,
}

/// One parsed header field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Zero-based position in the row
    pub index: usize,
    /// Property name; empty for purely structural columns
    pub name: String,
    pub role: ColumnRole,
    pub value_type: ValueType,
}

/// Kind of file a header belongs to. Decides which roles are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Node,
    Relationship,
}

/// Parsed header of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    columns: Vec<ColumnDescriptor>,
}

impl Header {
    /// Parse and validate the header fields of `file`.
    pub fn parse<'f>(
        file: &str,
        fields: impl IntoIterator<Item = &'f str>,
        kind: FileKind,
        config: &ImportConfig,
    ) -> Result<Self, ImportError> {
        let columns = fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| parse_field(file, index, field, config))
            .collect::<Result<Vec<_>, _>>()?;
        let header = Self { columns };
        header.validate(file, kind)?;
        Ok(header)
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn find(&self, pred: impl Fn(&ColumnRole) -> bool) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| pred(&c.role))
    }

    pub fn id_column(&self) -> Option<&ColumnDescriptor> {
        self.find(|r| matches!(r, ColumnRole::Id(_)))
    }

    pub fn start_column(&self) -> Option<&ColumnDescriptor> {
        self.find(|r| matches!(r, ColumnRole::StartId(_)))
    }

    pub fn end_column(&self) -> Option<&ColumnDescriptor> {
        self.find(|r| matches!(r, ColumnRole::EndId(_)))
    }

    pub fn type_column(&self) -> Option<&ColumnDescriptor> {
        self.find(|r| matches!(r, ColumnRole::Type))
    }

    fn validate(&self, file: &str, kind: FileKind) -> Result<(), ImportError> {
        let invalid = |column: usize, reason: String| ImportError::InvalidHeader {
            file: file.to_string(),
            column,
            reason,
        };

        let mut seen = RoleCounts::default();
        for column in &self.columns {
            let (count, keyword) = match column.role {
                ColumnRole::Id(_) => (&mut seen.id, "ID"),
                ColumnRole::StartId(_) => (&mut seen.start, "START_ID"),
                ColumnRole::EndId(_) => (&mut seen.end, "END_ID"),
                ColumnRole::Type => (&mut seen.rel_type, "TYPE"),
                ColumnRole::Label => (&mut seen.label, "LABEL"),
                ColumnRole::Property | ColumnRole::Ignore => continue,
            };
            *count += 1;

            let allowed = match kind {
                FileKind::Node => matches!(column.role, ColumnRole::Id(_) | ColumnRole::Label),
                FileKind::Relationship => !matches!(column.role, ColumnRole::Id(_) | ColumnRole::Label),
            };
            if !allowed {
                let kind_name = match kind {
                    FileKind::Node => "node",
                    FileKind::Relationship => "relationship",
                };
                return Err(invalid(
                    column.index,
                    format!("{keyword} columns are not allowed in {kind_name} files"),
                ));
            }

            let repeatable = matches!(column.role, ColumnRole::Label);
            if *count > 1 && !repeatable {
                return Err(invalid(
                    column.index,
                    format!("only one {keyword} column is allowed"),
                ));
            }
        }

        if kind == FileKind::Relationship {
            if seen.start == 0 {
                return Err(invalid(0, "relationship files need a START_ID column".to_string()));
            }
            if seen.end == 0 {
                return Err(invalid(0, "relationship files need an END_ID column".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct RoleCounts {
    id: usize,
    start: usize,
    end: usize,
    rel_type: usize,
    label: usize,
}

/// Split `name:TOKEN` at the colon that introduces the token. A colon inside
/// a trailing `(...)` id space does not count.
fn split_field(field: &str) -> Option<(&str, &str)> {
    let search_end = if field.ends_with(')') {
        field.rfind('(').unwrap_or(field.len())
    } else {
        field.len()
    };
    let colon = field[..search_end].rfind(':')?;
    Some((&field[..colon], &field[colon + 1..]))
}

/// Split `KEYWORD(space)` into the keyword and the space.
fn split_space(token: &str) -> (&str, Option<&str>) {
    if let Some(inner) = token.strip_suffix(')') {
        if let Some(open) = inner.find('(') {
            return (&inner[..open], Some(&inner[open + 1..]));
        }
    }
    (token, None)
}

fn parse_field(
    file: &str,
    index: usize,
    field: &str,
    config: &ImportConfig,
) -> Result<ColumnDescriptor, ImportError> {
    let invalid = |reason: String| ImportError::InvalidHeader {
        file: file.to_string(),
        column: index,
        reason,
    };

    if field.trim().is_empty() {
        return Err(invalid("empty header field".to_string()));
    }

    let Some((name, token)) = split_field(field) else {
        return Ok(ColumnDescriptor {
            index,
            name: field.to_string(),
            role: ColumnRole::Property,
            value_type: ValueType::STRING,
        });
    };

    let (keyword, space) = split_space(token);
    let keyword = keyword.trim().to_ascii_uppercase();
    let id_type = if config.string_ids {
        ValueType::STRING
    } else {
        ValueType::Scalar(ScalarType::Long)
    };

    let (role, value_type) = match keyword.as_str() {
        "ID" => (ColumnRole::Id(IdSpace::from_suffix(space)), id_type),
        "START_ID" => (ColumnRole::StartId(IdSpace::from_suffix(space)), id_type),
        "END_ID" => (ColumnRole::EndId(IdSpace::from_suffix(space)), id_type),
        _ if space.is_some() => {
            return Err(invalid(format!(
                "only ID, START_ID and END_ID accept an id space, found '{token}'"
            )))
        }
        "LABEL" => (ColumnRole::Label, ValueType::STRING_ARRAY),
        "TYPE" => (ColumnRole::Type, ValueType::STRING),
        "IGNORE" => (ColumnRole::Ignore, ValueType::STRING),
        other => match ValueType::parse(other) {
            Some(value_type) if name.is_empty() => {
                return Err(invalid(format!("{value_type} column has no property name")))
            }
            Some(value_type) => (ColumnRole::Property, value_type),
            None => return Err(invalid(format!("unknown type '{token}'"))),
        },
    };

    Ok(ColumnDescriptor {
        index,
        name: name.to_string(),
        role,
        value_type,
    })
}
