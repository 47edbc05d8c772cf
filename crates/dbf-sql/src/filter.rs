//! Read-side query description: projection, predicates, ordering, limit

use crate::error::{SqlError, SqlResult};
use crate::predicate::Predicate;
use dbf_core::sql_utils::quote_ident;
use dbf_core::SqlValue;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which columns a read returns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Columns(Vec<String>),
}

impl Selection {
    /// Render the projection list
    pub fn to_sql(&self) -> String {
        match self {
            Selection::All => "*".to_string(),
            Selection::Columns(cols) => cols
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(SqlError::InvalidSortOrder(s.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One `ORDER BY` term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortOrder::Ascending)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortOrder::Descending)
    }

    fn to_sql(&self) -> String {
        format!("{} {}", quote_ident(&self.column), self.order)
    }
}

impl FromStr for SortKey {
    type Err = SqlError;

    /// Parse `column` or `column:asc|desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, order) = match s.rsplit_once(':') {
            Some((column, order)) => (column, order.parse()?),
            None => (s, SortOrder::Ascending),
        };
        let column = column.trim();
        if column.is_empty() {
            return Err(SqlError::InvalidColumn(s.to_string()));
        }
        Ok(Self::new(column, order))
    }
}

/// Ordering for an in-place sort: a single column, or an ordered list of
/// column/direction pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec(Vec<SortKey>);

impl SortSpec {
    pub fn column(column: impl Into<String>, order: SortOrder) -> Self {
        Self(vec![SortKey::new(column, order)])
    }

    pub fn keys(keys: Vec<SortKey>) -> SqlResult<Self> {
        if keys.is_empty() {
            return Err(SqlError::EmptyColumns { context: "ORDER BY" });
        }
        Ok(Self(keys))
    }

    pub fn as_keys(&self) -> &[SortKey] {
        &self.0
    }
}

/// Render an `ORDER BY` body from a non-empty key list
pub(crate) fn order_by_sql(keys: &[SortKey]) -> String {
    keys.iter()
        .map(SortKey::to_sql)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A filtered, sorted and limited read over one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub selection: Selection,
    pub predicates: Vec<Predicate>,
    pub order_by: Vec<SortKey>,
    pub limit: Option<usize>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the projection to the given columns
    pub fn select<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> SqlResult<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SqlError::EmptyColumns { context: "SELECT" });
        }
        if let Some(bad) = columns.iter().find(|c| c.trim().is_empty()) {
            return Err(SqlError::InvalidColumn(bad.clone()));
        }
        self.selection = Selection::Columns(columns);
        Ok(self)
    }

    /// Add a raw predicate; it is validated before being accepted
    pub fn where_clause(mut self, predicate: &str) -> SqlResult<Self> {
        self.predicates.push(Predicate::parse(predicate)?);
        Ok(self)
    }

    /// Add one `column IN (...)` predicate per map entry
    pub fn where_in(mut self, values: &BTreeMap<String, Vec<SqlValue>>) -> SqlResult<Self> {
        for (column, vals) in values {
            self.predicates.push(Predicate::in_list(column, vals)?);
        }
        Ok(self)
    }

    pub fn order_by(mut self, key: SortKey) -> Self {
        self.order_by.push(key);
        self
    }

    /// Append ascending keys for each of `columns` not already ordered on.
    ///
    /// With a unique column set (or every column) appended, each row has one
    /// fixed position, which paged reads rely on.
    pub fn with_stable_order(mut self, columns: &[String]) -> Self {
        for column in columns {
            if !self
                .order_by
                .iter()
                .any(|k| k.column.eq_ignore_ascii_case(column))
            {
                self.order_by.push(SortKey::asc(column.clone()));
            }
        }
        self
    }

    pub fn limit(mut self, limit: usize) -> SqlResult<Self> {
        if limit == 0 {
            return Err(SqlError::InvalidSize { name: "limit" });
        }
        self.limit = Some(limit);
        Ok(self)
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
