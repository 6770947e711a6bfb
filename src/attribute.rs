//! Opaque attribute values attached to time series.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single attribute value.
///
/// Attributes are not interpreted by the engine; they only feed key functions
/// and are carried through merges. The serde representation is untagged so a
/// JSON document field maps directly onto the matching variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Explicit null.
    #[default]
    Null,
    /// Boolean flag.
    Boolean(bool),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Multi-valued attribute.
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Returns the string if this is a `String` attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Integer` attribute.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as `f64` for `Integer` and `Float` attributes.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns `true` for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_key_joining() {
        assert_eq!(AttributeValue::from("Load").to_string(), "Load");
        assert_eq!(AttributeValue::from(42i64).to_string(), "42");
        assert_eq!(AttributeValue::from(true).to_string(), "true");
        assert_eq!(AttributeValue::Null.to_string(), "null");
        assert_eq!(
            AttributeValue::from(vec!["a", "b"]).to_string(),
            "[a,b]"
        );
    }

    #[test]
    fn test_accessors_are_type_safe() {
        let v = AttributeValue::from(7i64);
        assert_eq!(v.as_integer(), Some(7));
        assert_eq!(v.as_float(), Some(7.0));
        assert_eq!(v.as_str(), None);
        assert_eq!(v.type_name(), "integer");
        assert!(AttributeValue::default().is_null());
    }

    #[test]
    fn test_untagged_json_mapping() {
        let v: AttributeValue = serde_json::from_str("\"h1\"").unwrap();
        assert_eq!(v, AttributeValue::from("h1"));

        let v: AttributeValue = serde_json::from_str("12").unwrap();
        assert_eq!(v, AttributeValue::Integer(12));

        let v: AttributeValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(v, AttributeValue::Float(1.5));

        let v: AttributeValue = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
    }
}
