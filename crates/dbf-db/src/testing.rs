//! In-memory `Database` for exercising the helpers without a server.
//!
//! Every statement is recorded. Queries are answered from scripted results
//! matched by substring, in the order they were scripted; unmatched queries
//! return an empty result. Failures can be injected the same way.

use crate::error::{DbError, DbResult};
use crate::result::{ColumnKind, ColumnMeta, ResultSet};
use crate::traits::Database;
use async_trait::async_trait;
use dbf_core::SqlValue;
use std::sync::Mutex;

type ErrorFactory = Box<dyn Fn() -> DbError + Send + Sync>;

struct Scripted<T> {
    pattern: String,
    response: T,
}

/// Recording, scriptable database
#[derive(Default)]
pub struct ScriptedDatabase {
    database: Option<String>,
    statements: Mutex<Vec<String>>,
    results: Mutex<Vec<Scripted<ResultSet>>>,
    failures: Mutex<Vec<Scripted<ErrorFactory>>>,
}

impl ScriptedDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope the fake session to a database name
    pub fn with_database(mut self, name: &str) -> Self {
        self.database = Some(name.to_string());
        self
    }

    /// Answer the next query containing `pattern` with `result` (used once)
    pub fn on_query(&self, pattern: &str, result: ResultSet) -> &Self {
        lock(&self.results).push(Scripted {
            pattern: pattern.to_string(),
            response: result,
        });
        self
    }

    /// Fail the next statement containing `pattern` (used once)
    pub fn fail_on<F>(&self, pattern: &str, error: F) -> &Self
    where
        F: Fn() -> DbError + Send + Sync + 'static,
    {
        lock(&self.failures).push(Scripted {
            pattern: pattern.to_string(),
            response: Box::new(error),
        });
        self
    }

    /// Every statement seen so far, in order
    pub fn statements(&self) -> Vec<String> {
        lock(&self.statements).clone()
    }

    /// Statements containing `pattern`
    pub fn statements_matching(&self, pattern: &str) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|s| s.contains(pattern))
            .collect()
    }

    fn record(&self, sql: &str) -> DbResult<()> {
        lock(&self.statements).push(sql.to_string());
        let mut failures = lock(&self.failures);
        if let Some(pos) = failures.iter().position(|f| sql.contains(&f.pattern)) {
            let failure = failures.remove(pos);
            return Err((failure.response)());
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Database for ScriptedDatabase {
    async fn execute(&self, sql: &str) -> DbResult<u64> {
        self.record(sql)?;
        Ok(0)
    }

    async fn query(&self, sql: &str) -> DbResult<ResultSet> {
        self.record(sql)?;
        let mut results = lock(&self.results);
        match results.iter().position(|r| sql.contains(&r.pattern)) {
            Some(pos) => Ok(results.remove(pos).response),
            None => Ok(ResultSet::default()),
        }
    }

    fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    fn db_type(&self) -> &'static str {
        "scripted"
    }
}

/// Single-text-column result, e.g. the answer to `SHOW DATABASES`
pub fn text_column(name: &str, values: &[&str]) -> ResultSet {
    ResultSet::new(
        vec![ColumnMeta::new(name, ColumnKind::Text)],
        values
            .iter()
            .map(|v| vec![SqlValue::Text(v.to_string())])
            .collect(),
    )
}

/// Answer to `SELECT COUNT(*)`
pub fn count(n: i64) -> ResultSet {
    ResultSet::new(
        vec![ColumnMeta::new("COUNT(*)", ColumnKind::Int)],
        vec![vec![SqlValue::Int(n)]],
    )
}

/// Answer to `SHOW FIELDS FROM t` for the given (name, type) pairs
pub fn fields(columns: &[(&str, &str)]) -> ResultSet {
    keyed_fields(columns, &[])
}

/// Like [`fields`], with `primary` marked `PRI` in the `Key` column
pub fn keyed_fields(columns: &[(&str, &str)], primary: &[&str]) -> ResultSet {
    let meta = ["Field", "Type", "Null", "Key", "Default", "Extra"]
        .iter()
        .map(|n| ColumnMeta::new(*n, ColumnKind::Text))
        .collect();
    let rows = columns
        .iter()
        .map(|(name, ty)| {
            vec![
                SqlValue::Text(name.to_string()),
                SqlValue::Text(ty.to_string()),
                SqlValue::Text("YES".to_string()),
                SqlValue::Text(if primary.contains(name) {
                    "PRI".to_string()
                } else {
                    String::new()
                }),
                SqlValue::Null,
                SqlValue::Text(String::new()),
            ]
        })
        .collect();
    ResultSet::new(meta, rows)
}

/// Integer-keyed rows `(id, label)` for chunking and read tests
pub fn id_label_rows(ids: std::ops::Range<i64>) -> ResultSet {
    ResultSet::new(
        vec![
            ColumnMeta::new("id", ColumnKind::Int),
            ColumnMeta::new("label", ColumnKind::Text),
        ],
        ids.map(|i| vec![SqlValue::Int(i), SqlValue::Text(format!("row-{i}"))])
            .collect(),
    )
}
