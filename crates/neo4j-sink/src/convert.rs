//! PropertyValue → Bolt conversion and Cypher identifier escaping.

use import_core::{PropertyMap, PropertyValue};
use neo4rs::{
    BoltBoolean, BoltDate, BoltDateTime, BoltFloat, BoltInteger, BoltList, BoltLocalDateTime,
    BoltMap, BoltString, BoltType,
};

/// Convert a property value to its Bolt representation.
///
/// Narrow integer and float types widen to Bolt's 64-bit `Integer` and
/// `Float`; `CHAR` becomes a one-character string.
pub fn property_to_bolt(value: &PropertyValue) -> BoltType {
    match value {
        PropertyValue::String(s) => BoltType::String(BoltString::new(s)),
        PropertyValue::Char(c) => BoltType::String(BoltString::new(&c.to_string())),
        PropertyValue::Boolean(b) => BoltType::Boolean(BoltBoolean::new(*b)),
        PropertyValue::Byte(i) => BoltType::Integer(BoltInteger::new(i64::from(*i))),
        PropertyValue::Short(i) => BoltType::Integer(BoltInteger::new(i64::from(*i))),
        PropertyValue::Int(i) => BoltType::Integer(BoltInteger::new(i64::from(*i))),
        PropertyValue::Long(i) => BoltType::Integer(BoltInteger::new(*i)),
        PropertyValue::Float(f) => BoltType::Float(BoltFloat::new(f64::from(*f))),
        PropertyValue::Double(f) => BoltType::Float(BoltFloat::new(*f)),
        PropertyValue::Date(d) => BoltType::Date(BoltDate::from(*d)),
        PropertyValue::LocalDateTime(dt) => BoltType::LocalDateTime(BoltLocalDateTime::from(*dt)),
        PropertyValue::DateTime(dt) => BoltType::DateTime(BoltDateTime::from(*dt)),
        PropertyValue::Array(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(property_to_bolt(item));
            }
            BoltType::List(list)
        }
    }
}

/// Convert a property map to a Bolt map suitable for a `$props` parameter.
pub fn property_map_to_bolt(properties: &PropertyMap) -> BoltType {
    let mut map = BoltMap::new();
    for (key, value) in properties {
        map.put(key.as_str().into(), property_to_bolt(value));
    }
    BoltType::Map(map)
}

/// Quote a label or relationship type for direct use in Cypher.
///
/// Labels and types cannot be passed as parameters, so they are wrapped in
/// backticks with embedded backticks doubled.
pub fn escape_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}
