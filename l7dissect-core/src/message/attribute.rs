//! Typed attribute values written by dissectors.

use std::fmt;

use compact_str::CompactString;
use smallvec::SmallVec;

/// Well-known attribute names.
pub mod names {
    /// Raw SQL statement text.
    pub const SQL: &str = "sql";
    /// Normalized statement signature.
    pub const CONTENT_KEY: &str = "content_key";
    /// The command expects no response.
    pub const ONEWAY: &str = "oneway";
    /// Server error code from an ERR packet.
    pub const SQL_ERROR_CODE: &str = "sql_error_code";
    /// Server error message from an ERR packet.
    pub const SQL_ERROR_MSG: &str = "sql_error_msg";
    /// Affected rows reported by an OK packet.
    pub const SQL_AFFECTED_ROWS: &str = "sql_affected_rows";
}

/// Attribute value.
///
/// Strings use CompactString, so short values (up to 24 bytes) stay inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Str(CompactString),
    Bool(bool),
    Int(i64),
}

impl AttributeValue {
    /// Try to get as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Short type name, used by output formatting.
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Str(_) => "string",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Int(_) => "int",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Str(s) => f.write_str(s),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Int(v) => write!(f, "{v}"),
        }
    }
}

/// Attribute entry: (attribute_name, value).
pub type AttributeEntry = (&'static str, AttributeValue);

/// Write-once attribute set owned by a payload message.
///
/// A dissector sets at most a handful of attributes, so entries live in a
/// SmallVec and lookups are linear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: SmallVec<[AttributeEntry; 4]>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute unless the name is already set.
    ///
    /// Returns false when an earlier value was kept.
    pub fn insert(&mut self, name: &'static str, value: AttributeValue) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push((name, value));
        true
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(AttributeValue::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(AttributeValue::as_i64)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| *n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttributeValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_wins() {
        let mut attrs = Attributes::new();
        assert!(attrs.insert(names::SQL, AttributeValue::Str("SELECT 1".into())));
        assert!(!attrs.insert(names::SQL, AttributeValue::Str("SELECT 2".into())));

        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get_str(names::SQL), Some("SELECT 1"));
    }

    #[test]
    fn test_typed_getters() {
        let mut attrs = Attributes::new();
        attrs.insert(names::ONEWAY, AttributeValue::Bool(true));
        attrs.insert(names::SQL_ERROR_CODE, AttributeValue::Int(1064));

        assert_eq!(attrs.get_bool(names::ONEWAY), Some(true));
        assert_eq!(attrs.get_int(names::SQL_ERROR_CODE), Some(1064));
        // Wrong type yields None rather than a conversion
        assert_eq!(attrs.get_str(names::ONEWAY), None);
        assert_eq!(attrs.get_int(names::SQL), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(AttributeValue::Str("abc".into()).to_string(), "abc");
        assert_eq!(AttributeValue::Bool(false).to_string(), "false");
        assert_eq!(AttributeValue::Int(-3).to_string(), "-3");
    }

    #[test]
    fn test_iteration_order() {
        let mut attrs = Attributes::new();
        attrs.insert(names::SQL, AttributeValue::Str("x".into()));
        attrs.insert(names::CONTENT_KEY, AttributeValue::Str("y".into()));

        let order: Vec<_> = attrs.iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec![names::SQL, names::CONTENT_KEY]);
    }
}
