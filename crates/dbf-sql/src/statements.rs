//! MySQL statement builders
//!
//! Every statement the helpers send to the server is assembled here, so the
//! exact SQL can be unit tested without a live connection.

use crate::error::{SqlError, SqlResult};
use crate::filter::{order_by_sql, Filter, SortSpec};
use crate::predicate::conjunction;
use dbf_core::sql_utils::{escape_sql_string, quote_ident, quote_ident_list};
use dbf_core::{SqlValue, TableName};
use std::fmt;

/// Prefix of the rebuilt table during de-duplication
pub const DEDUP_COPY_PREFIX: &str = "copy_of_source_";

/// Prefix the original table is parked under during the swap
pub const DEDUP_BACKUP_PREFIX: &str = "old_source_";


/// Which constraint to add over a column set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Primary,
    Unique,
}

impl KeyKind {
    fn as_sql(&self) -> &'static str {
        match self {
            KeyKind::Primary => "PRIMARY KEY",
            KeyKind::Unique => "UNIQUE",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Primary => f.write_str("primary key"),
            KeyKind::Unique => f.write_str("unique key"),
        }
    }
}

/// One column of an index definition, with an optional prefix length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumn {
    pub name: String,
    pub prefix: Option<u32>,
}

impl KeyColumn {
    pub fn to_sql(&self) -> String {
        match self.prefix {
            Some(len) => format!("{}({})", quote_ident(&self.name), len),
            None => quote_ident(&self.name),
        }
    }
}

/// How an INSERT treats rows whose key already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    /// Plain insert; a duplicate key is an error
    Fail,
    /// `ON DUPLICATE KEY UPDATE` every inserted column
    UpdateAll,
}

/// Join flavour for `join`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
}

impl JoinKind {
    fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

pub fn show_databases() -> String {
    "SHOW DATABASES".to_string()
}

pub fn create_database(name: &str) -> String {
    format!("CREATE DATABASE {}", quote_ident(name))
}

pub fn show_fields(table: &TableName) -> String {
    format!("SHOW FIELDS FROM {}", table.quoted())
}

/// Count query answering whether `table` exists in the current database
pub fn table_exists(table: &TableName) -> String {
    format!(
        "SELECT COUNT(*) FROM information_schema.tables \
         WHERE table_schema = DATABASE() AND table_name = '{}'",
        escape_sql_string(table.as_str())
    )
}

pub fn select_all(table: &TableName) -> String {
    format!("SELECT * FROM {}", table.quoted())
}

/// `SELECT <cols> FROM t [WHERE ...] [ORDER BY ...] [LIMIT n]`
pub fn select(table: &TableName, filter: &Filter) -> String {
    let mut sql = select_unlimited(table, filter);
    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    sql
}

/// Rows `[offset, offset + size)` of the filtered read.
///
/// The filter's own LIMIT is not rendered; the caller clamps `size` to it.
/// Pages are only disjoint when `filter.order_by` gives every row a fixed
/// position (see [`Filter::with_stable_order`]).
pub fn select_page(table: &TableName, filter: &Filter, size: usize, offset: usize) -> String {
    format!(
        "{} LIMIT {} OFFSET {}",
        select_unlimited(table, filter),
        size,
        offset
    )
}

fn select_unlimited(table: &TableName, filter: &Filter) -> String {
    let mut sql = format!(
        "SELECT {} FROM {}",
        filter.selection.to_sql(),
        table.quoted()
    );
    if let Some(predicate) = conjunction(&filter.predicates) {
        sql.push_str(" WHERE ");
        sql.push_str(&predicate);
    }
    if !filter.order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order_by_sql(&filter.order_by));
    }
    sql
}

/// `SELECT * FROM t ORDER BY ...`
pub fn sort(table: &TableName, spec: &SortSpec) -> String {
    format!(
        "SELECT * FROM {} ORDER BY {}",
        table.quoted(),
        order_by_sql(spec.as_keys())
    )
}

/// Statement sequence that rebuilds `table` with one row per distinct `keys`.
///
/// `columns` is the table's full column list in declared order. Non-key
/// columns are projected through `ANY_VALUE` so the GROUP BY is accepted
/// under `ONLY_FULL_GROUP_BY`. The rebuilt copy replaces the original in a
/// single `RENAME TABLE` and the original is dropped last.
pub fn dedup(table: &TableName, keys: &[String], columns: &[String]) -> SqlResult<Vec<String>> {
    if keys.is_empty() {
        return Err(SqlError::EmptyColumns {
            context: "Removing duplicates",
        });
    }
    let copy = table.with_prefix(DEDUP_COPY_PREFIX)?;
    let backup = table.with_prefix(DEDUP_BACKUP_PREFIX)?;

    let is_key = |c: &str| keys.iter().any(|k| k.eq_ignore_ascii_case(c));
    let projection: Vec<String> = columns
        .iter()
        .map(|c| {
            if is_key(c) {
                quote_ident(c)
            } else {
                format!("ANY_VALUE({0}) AS {0}", quote_ident(c))
            }
        })
        .collect();
    let projection = if projection.is_empty() {
        quote_ident_list(keys)
    } else {
        projection.join(", ")
    };

    Ok(vec![
        drop_table_if_exists(&copy),
        format!(
            "CREATE TABLE {} AS SELECT {} FROM {} GROUP BY {}",
            copy.quoted(),
            projection,
            table.quoted(),
            quote_ident_list(keys)
        ),
        format!(
            "RENAME TABLE {} TO {}, {} TO {}",
            table.quoted(),
            backup.quoted(),
            copy.quoted(),
            table.quoted()
        ),
        drop_table(&backup),
    ])
}

/// `ALTER TABLE t ADD PRIMARY KEY (...)` / `ADD UNIQUE (...)`
pub fn add_key(table: &TableName, kind: KeyKind, columns: &[KeyColumn]) -> SqlResult<String> {
    if columns.is_empty() {
        return Err(SqlError::EmptyColumns {
            context: "Adding a key",
        });
    }
    let cols: Vec<String> = columns.iter().map(KeyColumn::to_sql).collect();
    Ok(format!(
        "ALTER TABLE {} ADD {} ({})",
        table.quoted(),
        kind.as_sql(),
        cols.join(", ")
    ))
}

/// `CREATE TABLE t (col TYPE, ...)`
pub fn create_table(table: &TableName, columns: &[(String, String)]) -> SqlResult<String> {
    if columns.is_empty() {
        return Err(SqlError::EmptyColumns {
            context: "Creating a table",
        });
    }
    let defs: Vec<String> = columns
        .iter()
        .map(|(name, ty)| format!("{} {}", quote_ident(name), ty))
        .collect();
    Ok(format!(
        "CREATE TABLE {} ({})",
        table.quoted(),
        defs.join(", ")
    ))
}

pub fn drop_table(table: &TableName) -> String {
    format!("DROP TABLE {}", table.quoted())
}

pub fn drop_table_if_exists(table: &TableName) -> String {
    format!("DROP TABLE IF EXISTS {}", table.quoted())
}

/// Multi-row `INSERT INTO t (...) VALUES (...), (...)`.
///
/// With [`OnConflict::UpdateAll`] the statement ends with
/// `ON DUPLICATE KEY UPDATE c = VALUES(c)` for every column, which turns
/// the insert into an upsert on the table's primary or unique key.
pub fn insert(
    table: &TableName,
    columns: &[String],
    rows: &[Vec<SqlValue>],
    on_conflict: OnConflict,
) -> SqlResult<String> {
    if columns.is_empty() {
        return Err(SqlError::EmptyColumns { context: "INSERT" });
    }
    let mut tuples = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(SqlError::RowWidthMismatch {
                row: i,
                expected: columns.len(),
                actual: row.len(),
            });
        }
        let literals: Vec<String> = row.iter().map(SqlValue::to_sql_literal).collect();
        tuples.push(format!("({})", literals.join(", ")));
    }

    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        table.quoted(),
        quote_ident_list(columns),
        tuples.join(", ")
    );
    if on_conflict == OnConflict::UpdateAll {
        let updates: Vec<String> = columns
            .iter()
            .map(|c| format!("{0} = VALUES({0})", quote_ident(c)))
            .collect();
        sql.push_str(" ON DUPLICATE KEY UPDATE ");
        sql.push_str(&updates.join(", "));
    }
    Ok(sql)
}

/// `SELECT * FROM l <kind> JOIN r ON l.a = r.b AND ...`
pub fn join(
    left: &TableName,
    right: &TableName,
    on: &[(String, String)],
    kind: JoinKind,
) -> SqlResult<String> {
    if on.is_empty() {
        return Err(SqlError::EmptyColumns { context: "JOIN" });
    }
    let conditions: Vec<String> = on
        .iter()
        .map(|(l, r)| {
            format!(
                "{}.{} = {}.{}",
                left.quoted(),
                quote_ident(l),
                right.quoted(),
                quote_ident(r)
            )
        })
        .collect();
    Ok(format!(
        "SELECT * FROM {} {} {} ON {}",
        left.quoted(),
        kind.as_sql(),
        right.quoted(),
        conditions.join(" AND ")
    ))
}

pub fn commit() -> String {
    "COMMIT".to_string()
}

#[cfg(test)]
#[path = "statements_test.rs"]
mod tests;
