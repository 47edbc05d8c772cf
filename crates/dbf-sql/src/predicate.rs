//! Validated WHERE-clause fragments

use crate::error::{SqlError, SqlResult};
use dbf_core::sql_utils::quote_ident;
use dbf_core::SqlValue;
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;
use std::fmt;

/// A boolean SQL expression that is safe to splice into a WHERE clause.
///
/// Raw fragments are parsed as a single MySQL expression; anything that
/// does not parse, or that carries trailing tokens (a second statement,
/// an unbalanced parenthesis), is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate(String);

impl Predicate {
    /// Parse and validate a raw predicate fragment such as `amount > 10`.
    pub fn parse(sql: &str) -> SqlResult<Self> {
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            return Err(SqlError::EmptyPredicate);
        }

        let dialect = MySqlDialect {};
        let invalid = |message: String| SqlError::InvalidPredicate {
            predicate: trimmed.to_string(),
            message,
        };

        let mut parser = Parser::new(&dialect)
            .try_with_sql(trimmed)
            .map_err(|e| invalid(e.to_string()))?;
        parser.parse_expr().map_err(|e| invalid(e.to_string()))?;

        let next = parser.peek_token();
        if next.token != Token::EOF {
            return Err(invalid(format!("unexpected trailing input at '{}'", next.token)));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Build `column IN (v1, v2, ...)`.
    ///
    /// An empty value list matches nothing and renders as `FALSE`.
    pub fn in_list(column: &str, values: &[SqlValue]) -> SqlResult<Self> {
        if column.trim().is_empty() {
            return Err(SqlError::InvalidColumn(column.to_string()));
        }
        if values.is_empty() {
            return Ok(Self("FALSE".to_string()));
        }
        let literals: Vec<String> = values.iter().map(SqlValue::to_sql_literal).collect();
        Ok(Self(format!(
            "{} IN ({})",
            quote_ident(column),
            literals.join(", ")
        )))
    }

    /// Return the predicate text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Join predicates with `AND`, parenthesizing each one.
pub fn conjunction(predicates: &[Predicate]) -> Option<String> {
    match predicates {
        [] => None,
        [only] => Some(only.0.clone()),
        many => Some(
            many.iter()
                .map(|p| format!("({})", p.0))
                .collect::<Vec<_>>()
                .join(" AND "),
        ),
    }
}

#[cfg(test)]
#[path = "predicate_test.rs"]
mod tests;
