use super::*;
use crate::result::ColumnMeta;
use arrow::array::{
    BooleanArray, Date32Array, Float64Array, Int32Array, Int64Array, StringArray,
    TimestampMillisecondArray,
};

fn sample_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("score", DataType::Float64, true),
        Field::new("active", DataType::Boolean, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int32Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec![Some("ann"), None])),
            Arc::new(Float64Array::from(vec![Some(1.5), Some(2.0)])),
            Arc::new(BooleanArray::from(vec![Some(true), None])),
        ],
    )
    .unwrap()
}

#[test]
fn test_batch_to_rows_row_major() {
    let (names, rows) = batch_to_rows(&sample_batch()).unwrap();
    assert_eq!(names, vec!["id", "name", "score", "active"]);
    assert_eq!(
        rows,
        vec![
            vec![
                SqlValue::Int(1),
                SqlValue::Text("ann".into()),
                SqlValue::Float(1.5),
                SqlValue::Bool(true),
            ],
            vec![
                SqlValue::Int(2),
                SqlValue::Null,
                SqlValue::Float(2.0),
                SqlValue::Null,
            ],
        ]
    );
}

#[test]
fn test_batch_to_rows_dates_and_timestamps() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("day", DataType::Date32, true),
        Field::new(
            "at",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            true,
        ),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Date32Array::from(vec![Some(19_782), None])),
            Arc::new(TimestampMillisecondArray::from(vec![
                Some(1_709_200_000_123),
                None,
            ])),
        ],
    )
    .unwrap();

    let (_, rows) = batch_to_rows(&batch).unwrap();
    assert_eq!(
        rows[0][0],
        SqlValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
    );
    let expected = DateTime::from_timestamp_millis(1_709_200_000_123)
        .unwrap()
        .naive_utc();
    assert_eq!(rows[0][1], SqlValue::DateTime(expected));
    assert_eq!(rows[1], vec![SqlValue::Null, SqlValue::Null]);
}

#[test]
fn test_column_definitions() {
    let defs = column_definitions(&sample_batch().schema()).unwrap();
    assert_eq!(
        defs,
        vec![
            ("id".to_string(), "INT".to_string()),
            ("name".to_string(), "TEXT".to_string()),
            ("score".to_string(), "DOUBLE".to_string()),
            ("active".to_string(), "BOOLEAN".to_string()),
        ]
    );
}

#[test]
fn test_unsupported_type() {
    let field = Field::new(
        "tags",
        DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
        true,
    );
    assert!(matches!(
        mysql_type_for(&field),
        Err(DbError::UnsupportedType { .. })
    ));
}

#[test]
fn test_result_to_batch() {
    let result = ResultSet::new(
        vec![
            ColumnMeta::new("id", ColumnKind::Int),
            ColumnMeta::new("name", ColumnKind::Text),
            ColumnMeta::new("day", ColumnKind::Date),
        ],
        vec![
            vec![
                SqlValue::Int(7),
                SqlValue::Text("x".into()),
                SqlValue::Date(NaiveDate::from_ymd_opt(1970, 1, 3).unwrap()),
            ],
            vec![SqlValue::Null, SqlValue::Null, SqlValue::Null],
        ],
    );

    let batch = result_to_batch(&result).unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.schema().field(0).data_type(), &DataType::Int64);
    assert_eq!(batch.schema().field(2).data_type(), &DataType::Date32);

    let ids = batch.column(0).as_primitive::<Int64Type>();
    assert_eq!(ids.value(0), 7);
    assert!(ids.is_null(1));

    let days = batch.column(2).as_primitive::<Date32Type>();
    assert_eq!(days.value(0), 2);
}

#[test]
fn test_result_to_batch_empty_keeps_schema() {
    let result = ResultSet::new(vec![ColumnMeta::new("id", ColumnKind::UInt)], vec![]);
    let batch = result_to_batch(&result).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.schema().field(0).data_type(), &DataType::UInt64);
}

#[test]
fn test_result_to_batch_no_columns() {
    let batch = result_to_batch(&ResultSet::default()).unwrap();
    assert_eq!(batch.num_columns(), 0);
    assert_eq!(batch.num_rows(), 0);
}

#[test]
fn test_result_to_batch_rejects_mismatched_value() {
    let result = ResultSet::new(
        vec![ColumnMeta::new("id", ColumnKind::Int)],
        vec![vec![SqlValue::Text("oops".into())]],
    );
    assert!(matches!(
        result_to_batch(&result),
        Err(DbError::Conversion { .. })
    ));
}

#[test]
fn test_written_rows_read_back_identically() {
    let batch = sample_batch();
    let (names, rows) = batch_to_rows(&batch).unwrap();

    // What the server would report for a table created from this frame
    let kinds = [
        ColumnKind::Int,
        ColumnKind::Text,
        ColumnKind::Float,
        ColumnKind::Int,
    ];
    let columns = names
        .iter()
        .zip(kinds)
        .map(|(n, k)| ColumnMeta::new(n.clone(), k))
        .collect();
    let read_back = result_to_batch(&ResultSet::new(columns, rows)).unwrap();

    let ids = read_back.column(0).as_primitive::<Int64Type>();
    assert_eq!(ids.values().to_vec(), vec![1, 2]);
    let names = read_back.column(1).as_string::<i32>();
    assert_eq!(names.value(0), "ann");
    assert!(names.is_null(1));
    let active = read_back.column(3).as_primitive::<Int64Type>();
    assert_eq!(active.value(0), 1);
    assert!(active.is_null(1));
}

#[test]
fn test_concat_batches() {
    let a = sample_batch();
    let b = sample_batch();
    let merged = concat(a.schema(), &[a, b]).unwrap();
    assert_eq!(merged.num_rows(), 4);
    let empty = concat(sample_batch().schema(), &[]).unwrap();
    assert_eq!(empty.num_rows(), 0);

    let ids: &Int32Array = merged.column(0).as_primitive::<Int32Type>();
    assert_eq!(ids.value(2), 1);
}
