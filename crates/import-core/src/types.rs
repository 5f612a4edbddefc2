//! Declared value types for CSV header columns.

use std::fmt;

/// Scalar type named by a header type token such as `INT` or `STRING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Byte,
    Short,
    Char,
    /// Calendar date, `YYYY-MM-DD`
    Date,
    /// Date and time without offset, `YYYY-MM-DDTHH:MM:SS[.f]`
    LocalDateTime,
    /// RFC 3339 timestamp with offset
    DateTime,
}

impl ScalarType {
    /// Parse a type token. Matching is case-insensitive.
    pub fn parse(token: &str) -> Option<Self> {
        let scalar = match token.to_ascii_uppercase().as_str() {
            "STRING" => Self::String,
            "INT" => Self::Int,
            "LONG" => Self::Long,
            "FLOAT" => Self::Float,
            "DOUBLE" => Self::Double,
            "BOOLEAN" => Self::Boolean,
            "BYTE" => Self::Byte,
            "SHORT" => Self::Short,
            "CHAR" => Self::Char,
            "DATE" => Self::Date,
            "LOCALDATETIME" => Self::LocalDateTime,
            "DATETIME" => Self::DateTime,
            _ => return None,
        };
        Some(scalar)
    }

    /// Canonical header token for this type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Int => "INT",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Boolean => "BOOLEAN",
            Self::Byte => "BYTE",
            Self::Short => "SHORT",
            Self::Char => "CHAR",
            Self::Date => "DATE",
            Self::LocalDateTime => "LOCALDATETIME",
            Self::DateTime => "DATETIME",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a column: a scalar or an array of scalars (`INT[]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Scalar(ScalarType),
    Array(ScalarType),
}

impl ValueType {
    /// Plain `STRING`, the type of untyped columns.
    pub const STRING: Self = Self::Scalar(ScalarType::String);

    /// `STRING[]`, the type of label columns.
    pub const STRING_ARRAY: Self = Self::Array(ScalarType::String);

    /// Parse a type token, where a `[]` suffix makes it an array type.
    pub fn parse(token: &str) -> Option<Self> {
        match token.strip_suffix("[]") {
            Some(base) => ScalarType::parse(base).map(Self::Array),
            None => ScalarType::parse(token).map(Self::Scalar),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Scalar type of the value, or of each element for arrays.
    pub fn element_type(&self) -> ScalarType {
        match self {
            Self::Scalar(s) | Self::Array(s) => *s,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Array(s) => write!(f, "{s}[]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_tokens() {
        assert_eq!(ScalarType::parse("STRING"), Some(ScalarType::String));
        assert_eq!(ScalarType::parse("int"), Some(ScalarType::Int));
        assert_eq!(ScalarType::parse("Boolean"), Some(ScalarType::Boolean));
        assert_eq!(ScalarType::parse("localdatetime"), Some(ScalarType::LocalDateTime));
        assert_eq!(ScalarType::parse("DECIMAL"), None);
        assert_eq!(ScalarType::parse(""), None);
    }

    #[test]
    fn test_parse_array_tokens() {
        assert_eq!(ValueType::parse("STRING[]"), Some(ValueType::STRING_ARRAY));
        assert_eq!(
            ValueType::parse("long[]"),
            Some(ValueType::Array(ScalarType::Long))
        );
        assert_eq!(ValueType::parse("[]"), None);
        assert_eq!(ValueType::parse("INT[][]"), None);
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for token in ["STRING", "INT[]", "DATETIME", "CHAR[]"] {
            let parsed = ValueType::parse(token).unwrap();
            assert_eq!(parsed.to_string(), token);
        }
    }

    #[test]
    fn test_element_type() {
        assert!(ValueType::STRING_ARRAY.is_array());
        assert!(!ValueType::STRING.is_array());
        assert_eq!(
            ValueType::Array(ScalarType::Double).element_type(),
            ScalarType::Double
        );
    }
}
