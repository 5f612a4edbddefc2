//! Property values and store handles.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A typed property value produced from one CSV field.
///
/// Absent values are never represented here: a field that coerces to
/// "nothing" is left out of the [`PropertyMap`] entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Date(NaiveDate),
    LocalDateTime(NaiveDateTime),
    DateTime(DateTime<FixedOffset>),
    Array(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an i64, widening any integer variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Byte(i) => Some(i64::from(*i)),
            Self::Short(i) => Some(i64::from(*i)),
            Self::Int(i) => Some(i64::from(*i)),
            Self::Long(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64, widening `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(f64::from(*f)),
            Self::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an array.
    pub fn as_array(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Long(i)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// Property name to value mapping for one node or relationship.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Opaque identifier of a node, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(pub i64);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Opaque identifier of a relationship, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationshipHandle(pub i64);

impl fmt::Display for RelationshipHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rel#{}", self.0)
    }
}
