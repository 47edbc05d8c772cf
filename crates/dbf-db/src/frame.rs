//! Conversion between Arrow record batches and SQL rows
//!
//! Writes flatten a `RecordBatch` into column names plus row-major
//! [`SqlValue`]s; reads rebuild a `RecordBatch` from a [`ResultSet`] using
//! the column kinds the server reported.

use crate::error::{DbError, DbResult};
use crate::result::{ColumnKind, ResultSet};
use arrow::array::{
    Array, ArrayRef, AsArray, BinaryBuilder, Date32Builder, Float64Builder, Int64Builder,
    StringBuilder, TimestampMicrosecondBuilder, UInt64Builder,
};
use arrow::datatypes::{
    DataType, Date32Type, Field, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, Schema, SchemaRef, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use dbf_core::SqlValue;
use std::sync::Arc;

/// Column names and row-major values extracted from a frame
pub type FrameRows = (Vec<String>, Vec<Vec<SqlValue>>);

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// MySQL column type used when creating a table for an Arrow field
pub fn mysql_type_for(field: &Field) -> DbResult<&'static str> {
    let ty = match field.data_type() {
        DataType::Boolean => "BOOLEAN",
        DataType::Int8 => "TINYINT",
        DataType::Int16 => "SMALLINT",
        DataType::Int32 => "INT",
        DataType::Int64 => "BIGINT",
        DataType::UInt8 => "TINYINT UNSIGNED",
        DataType::UInt16 => "SMALLINT UNSIGNED",
        DataType::UInt32 => "INT UNSIGNED",
        DataType::UInt64 => "BIGINT UNSIGNED",
        DataType::Float32 => "FLOAT",
        DataType::Float64 => "DOUBLE",
        DataType::Utf8 | DataType::LargeUtf8 => "TEXT",
        DataType::Binary | DataType::LargeBinary => "BLOB",
        DataType::Date32 => "DATE",
        DataType::Timestamp(_, _) => "DATETIME(6)",
        other => {
            return Err(DbError::UnsupportedType {
                column: field.name().clone(),
                data_type: other.to_string(),
            })
        }
    };
    Ok(ty)
}

/// Column definitions for `CREATE TABLE` derived from a frame schema
pub fn column_definitions(schema: &Schema) -> DbResult<Vec<(String, String)>> {
    schema
        .fields()
        .iter()
        .map(|f| Ok((f.name().clone(), mysql_type_for(f)?.to_string())))
        .collect()
}

/// Flatten a record batch into column names and row-major values
pub fn batch_to_rows(batch: &RecordBatch) -> DbResult<FrameRows> {
    let schema = batch.schema();
    let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

    let columns = batch
        .columns()
        .iter()
        .zip(schema.fields().iter())
        .map(|(array, field)| column_values(array, field))
        .collect::<DbResult<Vec<_>>>()?;

    let mut rows: Vec<Vec<SqlValue>> = (0..batch.num_rows())
        .map(|_| Vec::with_capacity(names.len()))
        .collect();
    for column in columns {
        for (row, value) in rows.iter_mut().zip(column) {
            row.push(value);
        }
    }
    Ok((names, rows))
}

fn column_values(array: &ArrayRef, field: &Field) -> DbResult<Vec<SqlValue>> {
    let conversion = |message: String| DbError::Conversion {
        column: field.name().clone(),
        message,
    };

    macro_rules! primitive {
        ($ty:ty, $variant:expr) => {{
            let arr = array.as_primitive::<$ty>();
            (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        SqlValue::Null
                    } else {
                        ($variant)(arr.value(i))
                    }
                })
                .collect()
        }};
    }

    let values: Vec<SqlValue> = match array.data_type() {
        DataType::Null => vec![SqlValue::Null; array.len()],
        DataType::Boolean => {
            let arr = array.as_boolean();
            (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        SqlValue::Null
                    } else {
                        SqlValue::Bool(arr.value(i))
                    }
                })
                .collect()
        }
        DataType::Int8 => primitive!(Int8Type, |v: i8| SqlValue::Int(v.into())),
        DataType::Int16 => primitive!(Int16Type, |v: i16| SqlValue::Int(v.into())),
        DataType::Int32 => primitive!(Int32Type, |v: i32| SqlValue::Int(v.into())),
        DataType::Int64 => primitive!(Int64Type, SqlValue::Int),
        DataType::UInt8 => primitive!(UInt8Type, |v: u8| SqlValue::UInt(v.into())),
        DataType::UInt16 => primitive!(UInt16Type, |v: u16| SqlValue::UInt(v.into())),
        DataType::UInt32 => primitive!(UInt32Type, |v: u32| SqlValue::UInt(v.into())),
        DataType::UInt64 => primitive!(UInt64Type, SqlValue::UInt),
        DataType::Float32 => primitive!(Float32Type, |v: f32| SqlValue::Float(v.into())),
        DataType::Float64 => primitive!(Float64Type, SqlValue::Float),
        DataType::Utf8 => {
            let arr = array.as_string::<i32>();
            arr.iter()
                .map(|v| v.map_or(SqlValue::Null, |s| SqlValue::Text(s.to_string())))
                .collect()
        }
        DataType::LargeUtf8 => {
            let arr = array.as_string::<i64>();
            arr.iter()
                .map(|v| v.map_or(SqlValue::Null, |s| SqlValue::Text(s.to_string())))
                .collect()
        }
        DataType::Binary => {
            let arr = array.as_binary::<i32>();
            arr.iter()
                .map(|v| v.map_or(SqlValue::Null, |b| SqlValue::Bytes(b.to_vec())))
                .collect()
        }
        DataType::LargeBinary => {
            let arr = array.as_binary::<i64>();
            arr.iter()
                .map(|v| v.map_or(SqlValue::Null, |b| SqlValue::Bytes(b.to_vec())))
                .collect()
        }
        DataType::Date32 => {
            let arr = array.as_primitive::<Date32Type>();
            arr.iter()
                .map(|v| match v {
                    None => Ok(SqlValue::Null),
                    Some(days) => unix_epoch()
                        .checked_add_signed(chrono::Duration::days(days.into()))
                        .map(SqlValue::Date)
                        .ok_or_else(|| conversion(format!("date out of range: {days}"))),
                })
                .collect::<DbResult<_>>()?
        }
        DataType::Timestamp(unit, _) => {
            let raw: Vec<Option<i64>> = match unit {
                TimeUnit::Second => array.as_primitive::<TimestampSecondType>().iter().collect(),
                TimeUnit::Millisecond => {
                    array.as_primitive::<TimestampMillisecondType>().iter().collect()
                }
                TimeUnit::Microsecond => {
                    array.as_primitive::<TimestampMicrosecondType>().iter().collect()
                }
                TimeUnit::Nanosecond => {
                    array.as_primitive::<TimestampNanosecondType>().iter().collect()
                }
            };
            raw.into_iter()
                .map(|v| match v {
                    None => Ok(SqlValue::Null),
                    Some(ts) => timestamp_to_naive(ts, *unit)
                        .map(SqlValue::DateTime)
                        .ok_or_else(|| conversion(format!("timestamp out of range: {ts}"))),
                })
                .collect::<DbResult<_>>()?
        }
        other => {
            return Err(DbError::UnsupportedType {
                column: field.name().clone(),
                data_type: other.to_string(),
            })
        }
    };
    Ok(values)
}

fn timestamp_to_naive(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Second => DateTime::from_timestamp(value, 0)?,
        TimeUnit::Millisecond => DateTime::from_timestamp_millis(value)?,
        TimeUnit::Microsecond => DateTime::from_timestamp_micros(value)?,
        TimeUnit::Nanosecond => DateTime::from_timestamp_nanos(value),
    };
    Some(dt.naive_utc())
}

/// Arrow type produced for a result column of the given kind
pub fn arrow_type_for(kind: ColumnKind) -> DataType {
    match kind {
        ColumnKind::Int => DataType::Int64,
        ColumnKind::UInt | ColumnKind::Bit => DataType::UInt64,
        ColumnKind::Float | ColumnKind::Decimal => DataType::Float64,
        ColumnKind::Text | ColumnKind::Time => DataType::Utf8,
        ColumnKind::Binary => DataType::Binary,
        ColumnKind::Date => DataType::Date32,
        ColumnKind::DateTime => DataType::Timestamp(TimeUnit::Microsecond, None),
    }
}

/// Schema of the frame a result set converts into
pub fn result_schema(result: &ResultSet) -> SchemaRef {
    let fields: Vec<Field> = result
        .columns
        .iter()
        .map(|c| Field::new(&c.name, arrow_type_for(c.kind), true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Build a record batch from a materialized result set
pub fn result_to_batch(result: &ResultSet) -> DbResult<RecordBatch> {
    let schema = result_schema(result);
    let columns = result
        .columns
        .iter()
        .enumerate()
        .map(|(idx, meta)| {
            build_column(result, idx, meta.kind).map_err(|message| DbError::Conversion {
                column: meta.name.clone(),
                message,
            })
        })
        .collect::<DbResult<Vec<_>>>()?;

    let options = RecordBatchOptions::new().with_row_count(Some(result.rows.len()));
    Ok(RecordBatch::try_new_with_options(schema, columns, &options)?)
}

fn build_column(result: &ResultSet, idx: usize, kind: ColumnKind) -> Result<ArrayRef, String> {
    let cells = result.rows.iter().map(|row| row.get(idx).unwrap_or(&SqlValue::Null));
    let unexpected = |v: &SqlValue| format!("unexpected value {v:?} for {kind:?} column");

    let array: ArrayRef = match arrow_type_for(kind) {
        DataType::Int64 => {
            let mut b = Int64Builder::new();
            for v in cells {
                match v {
                    SqlValue::Null => b.append_null(),
                    SqlValue::Int(i) => b.append_value(*i),
                    SqlValue::UInt(u) => b.append_value(
                        i64::try_from(*u).map_err(|_| format!("{u} overflows BIGINT"))?,
                    ),
                    SqlValue::Bool(x) => b.append_value(i64::from(*x)),
                    other => return Err(unexpected(other)),
                }
            }
            Arc::new(b.finish())
        }
        DataType::UInt64 => {
            let mut b = UInt64Builder::new();
            for v in cells {
                match v {
                    SqlValue::Null => b.append_null(),
                    SqlValue::UInt(u) => b.append_value(*u),
                    SqlValue::Int(i) => b.append_value(
                        u64::try_from(*i).map_err(|_| format!("{i} is negative"))?,
                    ),
                    other => return Err(unexpected(other)),
                }
            }
            Arc::new(b.finish())
        }
        DataType::Float64 => {
            let mut b = Float64Builder::new();
            for v in cells {
                match v {
                    SqlValue::Null => b.append_null(),
                    SqlValue::Float(f) => b.append_value(*f),
                    SqlValue::Int(i) => b.append_value(*i as f64),
                    SqlValue::UInt(u) => b.append_value(*u as f64),
                    other => return Err(unexpected(other)),
                }
            }
            Arc::new(b.finish())
        }
        DataType::Binary => {
            let mut b = BinaryBuilder::new();
            for v in cells {
                match v {
                    SqlValue::Null => b.append_null(),
                    SqlValue::Bytes(bytes) => b.append_value(bytes),
                    SqlValue::Text(s) => b.append_value(s.as_bytes()),
                    other => return Err(unexpected(other)),
                }
            }
            Arc::new(b.finish())
        }
        DataType::Date32 => {
            let mut b = Date32Builder::new();
            for v in cells {
                match v {
                    SqlValue::Null => b.append_null(),
                    SqlValue::Date(d) => {
                        let days = d.signed_duration_since(unix_epoch()).num_days();
                        b.append_value(
                            i32::try_from(days).map_err(|_| format!("date {d} out of range"))?,
                        )
                    }
                    other => return Err(unexpected(other)),
                }
            }
            Arc::new(b.finish())
        }
        DataType::Timestamp(_, _) => {
            let mut b = TimestampMicrosecondBuilder::new();
            for v in cells {
                match v {
                    SqlValue::Null => b.append_null(),
                    SqlValue::DateTime(dt) => b.append_value(dt.and_utc().timestamp_micros()),
                    SqlValue::Date(d) => b.append_value(
                        d.and_hms_opt(0, 0, 0)
                            .unwrap_or_default()
                            .and_utc()
                            .timestamp_micros(),
                    ),
                    other => return Err(unexpected(other)),
                }
            }
            Arc::new(b.finish())
        }
        _ => {
            let mut b = StringBuilder::new();
            for v in cells {
                match v {
                    SqlValue::Null => b.append_null(),
                    SqlValue::Text(s) => b.append_value(s),
                    other => b.append_value(other.to_string()),
                }
            }
            Arc::new(b.finish())
        }
    };
    Ok(array)
}

/// Concatenate frames that share a schema; an empty list yields an empty frame
pub fn concat(schema: SchemaRef, batches: &[RecordBatch]) -> DbResult<RecordBatch> {
    Ok(arrow::compute::concat_batches(&schema, batches)?)
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
