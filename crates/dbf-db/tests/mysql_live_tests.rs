//! Round trips against a real MySQL server.
//!
//! Skipped unless `DBF_TEST_MYSQL_HOST` is set. The user, password and port
//! come from `DBF_TEST_MYSQL_USER` (default `root`), `DBF_TEST_MYSQL_PASSWORD`
//! (default empty) and `DBF_TEST_MYSQL_PORT` (default 3306). Each test works
//! in its own table of the `dbf_live_tests` database.

use arrow::array::{Array, AsArray, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use dbf_core::ConnectionParams;
use dbf_db::{DbError, IfExists, MySqlDatabase, MySqlTable, TableOptions};
use dbf_sql::{Filter, SortKey};
use std::sync::Arc;

fn live_params() -> Option<ConnectionParams> {
    let host = std::env::var("DBF_TEST_MYSQL_HOST").ok()?;
    let user = std::env::var("DBF_TEST_MYSQL_USER").unwrap_or_else(|_| "root".to_string());
    let password = std::env::var("DBF_TEST_MYSQL_PASSWORD").unwrap_or_default();
    let port = std::env::var("DBF_TEST_MYSQL_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3306);
    Some(ConnectionParams::new(host, user, password, "dbf_live_tests").with_port(port))
}

async fn fresh_table(name: &str) -> Option<MySqlTable> {
    let params = live_params()?;
    let database = MySqlDatabase::connect(params, TableOptions::default())
        .await
        .unwrap();
    database
        .execute(&format!("DROP TABLE IF EXISTS `{name}`"))
        .await
        .unwrap();
    Some(MySqlTable::new(&database, name).unwrap())
}

fn people(ids: &[i64], names: &[&str]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(ids.to_vec())),
            Arc::new(StringArray::from(names.to_vec())),
        ],
    )
    .unwrap()
}

fn sorted_ids(batch: &RecordBatch) -> Vec<i64> {
    let mut ids: Vec<i64> = batch
        .column(0)
        .as_primitive::<Int64Type>()
        .values()
        .to_vec();
    ids.sort_unstable();
    ids
}

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_connect_is_idempotent() {
    let Some(params) = live_params() else {
        return;
    };
    let first = MySqlDatabase::connect(params.clone(), TableOptions::default())
        .await
        .unwrap();
    let second = MySqlDatabase::connect(params, TableOptions::default())
        .await
        .unwrap();
    let listed = second.list_databases().await.unwrap();
    assert_eq!(
        listed.iter().filter(|d| d.as_str() == "dbf_live_tests").count(),
        1
    );
    drop(first);
}

#[tokio::test]
async fn test_append_then_read_back() {
    let Some(table) = fresh_table("live_append").await else {
        return;
    };
    table
        .populate_table(&people(&[3, 1, 2], &["c", "a", "b"]), IfExists::Append)
        .await
        .unwrap();

    let back = table.read_table().await.unwrap();
    assert_eq!(sorted_ids(&back), vec![1, 2, 3]);

    let types = table.get_data_type().await.unwrap();
    assert_eq!(types.get("id"), Some("bigint"));
    assert_eq!(types.get("name"), Some("text"));
}

#[tokio::test]
async fn test_upsert_keeps_latest_values() {
    let Some(mut table) = fresh_table("live_upsert").await else {
        return;
    };
    table
        .populate_table(&people(&[1, 2], &["a", "b"]), IfExists::Append)
        .await
        .unwrap();
    table.set_primary_key(&cols(&["id"]), false).await.unwrap();

    table
        .update_table(&people(&[1, 2], &["x", "y"]), IfExists::Append)
        .await
        .unwrap();

    let filter = Filter::new().order_by(SortKey::asc("id"));
    let back = table.table_filter(&filter).await.unwrap();
    assert_eq!(back.num_rows(), 2);
    let names = back.column(1).as_string::<i32>();
    assert_eq!(names.value(0), "x");
    assert_eq!(names.value(1), "y");
}

#[tokio::test]
async fn test_key_over_duplicates() {
    let Some(mut table) = fresh_table("live_dedup").await else {
        return;
    };
    table
        .populate_table(&people(&[1, 1, 2], &["a", "b", "c"]), IfExists::Append)
        .await
        .unwrap();

    let err = table
        .set_primary_key(&cols(&["id"]), false)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::DuplicateEntries { .. }));

    table.set_primary_key(&cols(&["id"]), true).await.unwrap();
    let back = table.read_table().await.unwrap();
    assert_eq!(sorted_ids(&back), vec![1, 2]);
}

#[tokio::test]
async fn test_limit_and_chunks() {
    let Some(table) = fresh_table("live_chunks").await else {
        return;
    };
    table
        .populate_table(
            &people(&[1, 2, 3, 4, 5], &["a", "b", "c", "d", "e"]),
            IfExists::Append,
        )
        .await
        .unwrap();

    let limited = table
        .table_filter(&Filter::new().limit(3).unwrap())
        .await
        .unwrap();
    assert!(limited.num_rows() <= 3);

    let chunked = table.read_table_chunks(2).await.unwrap().collect().await.unwrap();
    let whole = table.read_table().await.unwrap();
    assert_eq!(sorted_ids(&chunked), sorted_ids(&whole));
    assert_eq!(chunked.column(1).null_count(), 0);
}
