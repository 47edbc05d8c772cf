//! MySQL database backend implementation

use crate::error::{DbError, DbResult};
use crate::result::{ColumnKind, ColumnMeta, ResultSet};
use crate::traits::Database;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use dbf_core::{ConnectionParams, SqlValue};
use mysql::consts::{ColumnFlags, ColumnType};
use mysql::prelude::Queryable;
use mysql::{Column, Conn, OptsBuilder, Row, Value};
use std::sync::{Mutex, MutexGuard};

/// Character set id the server reports for binary strings
const BINARY_CHARSET: u16 = 63;

/// MySQL database backend over a single blocking connection
pub struct MySqlBackend {
    conn: Mutex<Conn>,
    database: Option<String>,
}

impl MySqlBackend {
    /// Open a connection, optionally scoped to `database`
    pub fn connect(params: &ConnectionParams, database: Option<&str>) -> DbResult<Self> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(params.host.clone()))
            .tcp_port(params.port)
            .user(Some(params.user.clone()))
            .pass(Some(params.password.clone()))
            .db_name(database.map(str::to_string));

        log::debug!(
            "Connecting to mysql://{}@{}:{}/{}",
            params.user,
            params.host,
            params.port,
            database.unwrap_or("")
        );
        let conn = Conn::new(opts).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            database: database.map(str::to_string),
        })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Conn>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str) -> DbResult<u64> {
        log::debug!("execute: {}", sql);
        let mut conn = self.lock()?;
        conn.query_drop(sql)
            .map_err(|e| DbError::from_mysql(e, sql))?;
        Ok(conn.affected_rows())
    }

    /// Query synchronously, decoding every value by its column kind
    fn query_sync(&self, sql: &str) -> DbResult<ResultSet> {
        log::debug!("query: {}", sql);
        let mut conn = self.lock()?;
        let mut result = conn
            .query_iter(sql)
            .map_err(|e| DbError::from_mysql(e, sql))?;

        let columns: Vec<ColumnMeta> = result
            .columns()
            .as_ref()
            .iter()
            .map(column_meta)
            .collect();

        let mut rows = Vec::new();
        for row in result.by_ref() {
            let row = row.map_err(|e| DbError::from_mysql(e, sql))?;
            let values = Row::unwrap(row);
            let decoded = values
                .into_iter()
                .zip(&columns)
                .map(|(value, meta)| decode_value(value, meta))
                .collect::<DbResult<Vec<_>>>()?;
            rows.push(decoded);
        }

        Ok(ResultSet::new(columns, rows))
    }
}

#[async_trait]
impl Database for MySqlBackend {
    async fn execute(&self, sql: &str) -> DbResult<u64> {
        self.execute_sync(sql)
    }

    async fn query(&self, sql: &str) -> DbResult<ResultSet> {
        self.query_sync(sql)
    }

    fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    fn db_type(&self) -> &'static str {
        "mysql"
    }
}

fn column_meta(column: &Column) -> ColumnMeta {
    let unsigned = column.flags().contains(ColumnFlags::UNSIGNED_FLAG);
    let binary = column.character_set() == BINARY_CHARSET;
    let kind = match column.column_type() {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => {
            if unsigned {
                ColumnKind::UInt
            } else {
                ColumnKind::Int
            }
        }
        ColumnType::MYSQL_TYPE_BIT => ColumnKind::Bit,
        ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => ColumnKind::Float,
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => ColumnKind::Decimal,
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => ColumnKind::Date,
        ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_DATETIME2
        | ColumnType::MYSQL_TYPE_TIMESTAMP
        | ColumnType::MYSQL_TYPE_TIMESTAMP2 => ColumnKind::DateTime,
        ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => ColumnKind::Time,
        ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB
        | ColumnType::MYSQL_TYPE_BLOB
        | ColumnType::MYSQL_TYPE_VAR_STRING
        | ColumnType::MYSQL_TYPE_VARCHAR
        | ColumnType::MYSQL_TYPE_STRING
            if binary =>
        {
            ColumnKind::Binary
        }
        _ => ColumnKind::Text,
    };
    ColumnMeta::new(column.name_str().into_owned(), kind)
}

fn decode_value(value: Value, meta: &ColumnMeta) -> DbResult<SqlValue> {
    let conversion = |message: String| DbError::Conversion {
        column: meta.name.clone(),
        message,
    };

    Ok(match value {
        Value::NULL => SqlValue::Null,
        Value::Int(v) => SqlValue::Int(v),
        Value::UInt(v) => SqlValue::UInt(v),
        Value::Float(v) => SqlValue::Float(f64::from(v)),
        Value::Double(v) => SqlValue::Float(v),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            let date = NaiveDate::from_ymd_opt(year.into(), month.into(), day.into());
            match (meta.kind, date) {
                (_, None) => SqlValue::Null,
                (ColumnKind::Date, Some(date)) => SqlValue::Date(date),
                (_, Some(date)) => date
                    .and_hms_micro_opt(hour.into(), minute.into(), second.into(), micros)
                    .map(SqlValue::DateTime)
                    .ok_or_else(|| conversion("time of day out of range".to_string()))?,
            }
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            SqlValue::Text(format_time(negative, days, hours, minutes, seconds, micros))
        }
        Value::Bytes(bytes) => decode_text(bytes, meta.kind).map_err(conversion)?,
    })
}

/// Decode a text-protocol value using the column kind
fn decode_text(bytes: Vec<u8>, kind: ColumnKind) -> Result<SqlValue, String> {
    if matches!(kind, ColumnKind::Binary) {
        return Ok(SqlValue::Bytes(bytes));
    }
    if matches!(kind, ColumnKind::Bit) {
        let value = bytes
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
        return Ok(SqlValue::UInt(value));
    }

    let text = String::from_utf8(bytes).map_err(|e| e.to_string())?;
    let value = match kind {
        ColumnKind::Int => SqlValue::Int(text.parse().map_err(|_| format!("not an integer: {text}"))?),
        ColumnKind::UInt => {
            SqlValue::UInt(text.parse().map_err(|_| format!("not an unsigned integer: {text}"))?)
        }
        ColumnKind::Float | ColumnKind::Decimal => {
            SqlValue::Float(text.parse().map_err(|_| format!("not a number: {text}"))?)
        }
        ColumnKind::Date => match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
            Ok(date) => SqlValue::Date(date),
            Err(_) if is_zero_date(&text) => SqlValue::Null,
            Err(e) => return Err(format!("invalid date '{text}': {e}")),
        },
        ColumnKind::DateTime => match NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f") {
            Ok(dt) => SqlValue::DateTime(dt),
            Err(_) if is_zero_date(&text) => SqlValue::Null,
            Err(e) => return Err(format!("invalid datetime '{text}': {e}")),
        },
        ColumnKind::Text | ColumnKind::Time | ColumnKind::Binary | ColumnKind::Bit => {
            SqlValue::Text(text)
        }
    };
    Ok(value)
}

/// MySQL's `0000-00-00` placeholder has no calendar equivalent
fn is_zero_date(text: &str) -> bool {
    text.starts_with("0000-00-00")
}

fn format_time(negative: bool, days: u32, hours: u8, minutes: u8, seconds: u8, micros: u32) -> String {
    let sign = if negative { "-" } else { "" };
    let total_hours = days * 24 + u32::from(hours);
    if micros == 0 {
        format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(kind: ColumnKind) -> ColumnMeta {
        ColumnMeta::new("c", kind)
    }

    #[test]
    fn test_decode_text_protocol_numbers() {
        assert_eq!(
            decode_value(Value::Bytes(b"-12".to_vec()), &meta(ColumnKind::Int)).unwrap(),
            SqlValue::Int(-12)
        );
        assert_eq!(
            decode_value(Value::Bytes(b"18446744073709551615".to_vec()), &meta(ColumnKind::UInt))
                .unwrap(),
            SqlValue::UInt(u64::MAX)
        );
        assert_eq!(
            decode_value(Value::Bytes(b"12.50".to_vec()), &meta(ColumnKind::Decimal)).unwrap(),
            SqlValue::Float(12.5)
        );
    }

    #[test]
    fn test_decode_bad_integer_is_conversion_error() {
        let err = decode_value(Value::Bytes(b"abc".to_vec()), &meta(ColumnKind::Int)).unwrap_err();
        assert!(matches!(err, DbError::Conversion { .. }));
    }

    #[test]
    fn test_decode_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            decode_value(Value::Bytes(b"2024-02-29".to_vec()), &meta(ColumnKind::Date)).unwrap(),
            SqlValue::Date(date)
        );
        assert_eq!(
            decode_value(
                Value::Bytes(b"2024-02-29 10:11:12.5".to_vec()),
                &meta(ColumnKind::DateTime)
            )
            .unwrap(),
            SqlValue::DateTime(date.and_hms_milli_opt(10, 11, 12, 500).unwrap())
        );
        assert_eq!(
            decode_value(
                Value::Bytes(b"0000-00-00 00:00:00".to_vec()),
                &meta(ColumnKind::DateTime)
            )
            .unwrap(),
            SqlValue::Null
        );
        assert_eq!(
            decode_value(Value::Date(2024, 2, 29, 0, 0, 0, 0), &meta(ColumnKind::Date)).unwrap(),
            SqlValue::Date(date)
        );
    }

    #[test]
    fn test_decode_bit_and_binary() {
        assert_eq!(
            decode_value(Value::Bytes(vec![0x01, 0x02]), &meta(ColumnKind::Bit)).unwrap(),
            SqlValue::UInt(258)
        );
        assert_eq!(
            decode_value(Value::Bytes(vec![0xff, 0x00]), &meta(ColumnKind::Binary)).unwrap(),
            SqlValue::Bytes(vec![0xff, 0x00])
        );
    }

    #[test]
    fn test_decode_null_and_time() {
        assert_eq!(
            decode_value(Value::NULL, &meta(ColumnKind::Int)).unwrap(),
            SqlValue::Null
        );
        assert_eq!(
            decode_value(Value::Time(true, 1, 2, 3, 4, 0), &meta(ColumnKind::Time)).unwrap(),
            SqlValue::Text("-26:03:04".to_string())
        );
    }
}
