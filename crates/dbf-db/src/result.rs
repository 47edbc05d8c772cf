//! Driver-independent query results

use dbf_core::SqlValue;

/// Logical kind of a result column, derived from the server's column metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    UInt,
    Bit,
    Float,
    Decimal,
    Text,
    Binary,
    Date,
    DateTime,
    Time,
}

/// Name and kind of one result column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Fully materialized result of one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The single integer of a `SELECT COUNT(*)`-style result
    pub fn scalar_count(&self) -> Option<u64> {
        match self.rows.first()?.first()? {
            SqlValue::Int(v) => u64::try_from(*v).ok(),
            SqlValue::UInt(v) => Some(*v),
            other => other.as_text()?.parse().ok(),
        }
    }
}
