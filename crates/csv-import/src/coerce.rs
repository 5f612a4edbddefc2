//! Conversion of raw field text into typed property values.

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::header::ColumnDescriptor;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use import_core::{PropertyValue, ScalarType, ValueType};
use thiserror::Error;

/// Why a field could not be converted. The loaders attach file, row and column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CoercionError(pub String);

/// Remove one pair of surrounding quote characters, if present.
///
/// Embedded quote characters have no escape form and are kept as-is.
pub fn strip_quotes(raw: &str, quote: char) -> &str {
    let len = quote.len_utf8();
    if raw.len() >= 2 * len && raw.starts_with(quote) && raw.ends_with(quote) {
        &raw[len..raw.len() - len]
    } else {
        raw
    }
}

/// Split an array field into its quote-stripped elements.
///
/// An empty field is an empty array, not an array with one empty element.
pub fn split_array<'a>(raw: &'a str, config: &ImportConfig) -> Vec<&'a str> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(config.array_delimiter)
        .map(|element| strip_quotes(element, config.quotation_character))
        .collect()
}

/// Convert a field to its declared type.
///
/// `raw` is the field as the reader returns it, with any outer quote pair
/// already removed. Returns `None` for an empty scalar field; such
/// properties are left out of the property map rather than stored as
/// empty strings.
pub fn coerce_field(
    raw: &str,
    value_type: ValueType,
    config: &ImportConfig,
) -> Result<Option<PropertyValue>, CoercionError> {
    match value_type {
        ValueType::Array(element) => {
            let values = split_array(raw, config)
                .into_iter()
                .map(|e| coerce_scalar(e, element))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(PropertyValue::Array(values)))
        }
        ValueType::Scalar(scalar) => {
            if raw.is_empty() {
                return Ok(None);
            }
            coerce_scalar(raw, scalar).map(Some)
        }
    }
}

/// [`coerce_field`] for one column of one row, with failures reported
/// against that file, row and column.
pub(crate) fn coerce_column(
    file: &str,
    row: u64,
    column: &ColumnDescriptor,
    raw: &str,
    config: &ImportConfig,
) -> Result<Option<PropertyValue>, ImportError> {
    coerce_field(raw, column.value_type, config).map_err(|e| ImportError::ValueCoercion {
        file: file.to_string(),
        row,
        column: if column.name.is_empty() {
            format!("#{}", column.index)
        } else {
            column.name.clone()
        },
        value: raw.to_string(),
        value_type: column.value_type,
        reason: e.0,
    })
}

/// Convert a single non-array value.
pub fn coerce_scalar(raw: &str, scalar: ScalarType) -> Result<PropertyValue, CoercionError> {
    let fail = |e: &dyn std::fmt::Display| CoercionError(e.to_string());
    let value = match scalar {
        ScalarType::String => PropertyValue::String(raw.to_string()),
        ScalarType::Int => PropertyValue::Int(raw.parse().map_err(|e| fail(&e))?),
        ScalarType::Long => PropertyValue::Long(raw.parse().map_err(|e| fail(&e))?),
        ScalarType::Float => PropertyValue::Float(raw.parse().map_err(|e| fail(&e))?),
        ScalarType::Double => PropertyValue::Double(raw.parse().map_err(|e| fail(&e))?),
        ScalarType::Byte => PropertyValue::Byte(raw.parse().map_err(|e| fail(&e))?),
        ScalarType::Short => PropertyValue::Short(raw.parse().map_err(|e| fail(&e))?),
        ScalarType::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                PropertyValue::Boolean(true)
            } else if raw.eq_ignore_ascii_case("false") {
                PropertyValue::Boolean(false)
            } else {
                return Err(CoercionError("expected true or false".to_string()));
            }
        }
        ScalarType::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => PropertyValue::Char(c),
                _ => return Err(CoercionError("expected exactly one character".to_string())),
            }
        }
        ScalarType::Date => PropertyValue::Date(raw.parse::<NaiveDate>().map_err(|e| fail(&e))?),
        ScalarType::LocalDateTime => {
            PropertyValue::LocalDateTime(raw.parse::<NaiveDateTime>().map_err(|e| fail(&e))?)
        }
        ScalarType::DateTime => {
            PropertyValue::DateTime(DateTime::parse_from_rfc3339(raw).map_err(|e| fail(&e))?)
        }
    };
    Ok(value)
}
