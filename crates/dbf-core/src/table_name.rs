//! Strongly-typed table name wrapper.

use crate::error::{CoreError, CoreResult};
use crate::sql_utils::quote_ident;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Longest identifier MySQL accepts for a table.
pub const MAX_TABLE_NAME_LEN: usize = 64;

/// Strongly-typed wrapper for MySQL table names.
///
/// Prevents accidental mixing of table names with column names or raw SQL
/// fragments. Names are always rendered backtick-quoted in statements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Create a new `TableName`, validating length and content.
    pub fn new(name: impl Into<String>) -> CoreResult<Self> {
        let s = name.into();
        if s.is_empty() {
            return Err(CoreError::InvalidIdentifier {
                name: s,
                reason: "table name must not be empty".to_string(),
            });
        }
        if s.chars().count() > MAX_TABLE_NAME_LEN {
            return Err(CoreError::InvalidIdentifier {
                reason: format!("table name exceeds {} characters", MAX_TABLE_NAME_LEN),
                name: s,
            });
        }
        if s.contains('\0') {
            return Err(CoreError::InvalidIdentifier {
                name: s.replace('\0', "\\0"),
                reason: "table name must not contain NUL".to_string(),
            });
        }
        Ok(Self(s))
    }

    /// Derive a sibling table name by prefixing this one (e.g. `copy_of_source_orders`).
    pub fn with_prefix(&self, prefix: &str) -> CoreResult<Self> {
        Self::new(format!("{}{}", prefix, self.0))
    }

    /// Render the name as a backtick-quoted identifier.
    pub fn quoted(&self) -> String {
        quote_ident(&self.0)
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for TableName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TableName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TableName {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for TableName {
    type Error = CoreError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<TableName> for String {
    fn from(name: TableName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let name = TableName::new("orders").unwrap();
        assert_eq!(name.as_str(), "orders");
        assert_eq!(name.quoted(), "`orders`");
    }

    #[test]
    fn test_new_empty_rejected() {
        assert!(matches!(
            TableName::new(""),
            Err(CoreError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_new_too_long_rejected() {
        let long = "t".repeat(MAX_TABLE_NAME_LEN + 1);
        assert!(TableName::new(long).is_err());
        assert!(TableName::new("t".repeat(MAX_TABLE_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_with_prefix() {
        let name = TableName::new("orders").unwrap();
        let copy = name.with_prefix("copy_of_source_").unwrap();
        assert_eq!(copy.as_str(), "copy_of_source_orders");
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        let parsed: Result<TableName, _> = serde_yaml::from_str("\"\"");
        assert!(parsed.is_err());
        let parsed: TableName = serde_yaml::from_str("orders").unwrap();
        assert_eq!(parsed, TableName::new("orders").unwrap());
    }
}
