use super::*;
use crate::filter::{SortKey, SortOrder};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

fn table(name: &str) -> TableName {
    TableName::new(name).unwrap()
}

fn assert_parses(sql: &str) {
    let statements = Parser::parse_sql(&MySqlDialect {}, sql)
        .unwrap_or_else(|e| panic!("failed to parse {sql}: {e}"));
    assert_eq!(statements.len(), 1, "expected one statement in {sql}");
}

#[test]
fn test_database_statements() {
    assert_eq!(show_databases(), "SHOW DATABASES");
    assert_eq!(create_database("Sales"), "CREATE DATABASE `Sales`");
    assert_eq!(show_fields(&table("orders")), "SHOW FIELDS FROM `orders`");
}

#[test]
fn test_table_exists_escapes_name() {
    let sql = table_exists(&table("o'rders"));
    assert!(sql.ends_with("table_name = 'o''rders'"));
    assert!(sql.contains("table_schema = DATABASE()"));
}

#[test]
fn test_select_all() {
    assert_eq!(select_all(&table("orders")), "SELECT * FROM `orders`");
}

#[test]
fn test_select_with_filter() {
    let filter = Filter::new()
        .select(["id", "amount"])
        .unwrap()
        .where_clause("amount > 10")
        .unwrap()
        .where_clause("region = 'EU'")
        .unwrap()
        .order_by(SortKey::desc("amount"))
        .limit(3)
        .unwrap();

    let sql = select(&table("orders"), &filter);
    assert_eq!(
        sql,
        "SELECT `id`, `amount` FROM `orders` WHERE (amount > 10) AND (region = 'EU') \
         ORDER BY `amount` DESC LIMIT 3"
    );
    assert_parses(&sql);
}

#[test]
fn test_select_without_clauses() {
    assert_eq!(
        select(&table("orders"), &Filter::new()),
        "SELECT * FROM `orders`"
    );
}

#[test]
fn test_sort() {
    let spec = SortSpec::column("created_at", SortOrder::Descending);
    let sql = sort(&table("orders"), &spec);
    assert_eq!(sql, "SELECT * FROM `orders` ORDER BY `created_at` DESC");
    assert_parses(&sql);
}

#[test]
fn test_select_page_replaces_filter_limit() {
    let filter = Filter::new()
        .where_clause("amount > 10")
        .unwrap()
        .order_by(SortKey::desc("amount"))
        .with_stable_order(&["id".to_string()])
        .limit(10)
        .unwrap();
    let sql = select_page(&table("orders"), &filter, 4, 8);
    assert_eq!(
        sql,
        "SELECT * FROM `orders` WHERE amount > 10 ORDER BY `amount` DESC, `id` ASC LIMIT 4 OFFSET 8"
    );
    assert_parses(&sql);
}

#[test]
fn test_dedup_sequence() {
    let columns = vec!["id".to_string(), "region".to_string(), "amount".to_string()];
    let stmts = dedup(&table("orders"), &["id".to_string()], &columns).unwrap();

    assert_eq!(
        stmts,
        vec![
            "DROP TABLE IF EXISTS `copy_of_source_orders`".to_string(),
            "CREATE TABLE `copy_of_source_orders` AS SELECT `id`, ANY_VALUE(`region`) AS `region`, \
             ANY_VALUE(`amount`) AS `amount` FROM `orders` GROUP BY `id`"
                .to_string(),
            "RENAME TABLE `orders` TO `old_source_orders`, `copy_of_source_orders` TO `orders`"
                .to_string(),
            "DROP TABLE `old_source_orders`".to_string(),
        ]
    );
    assert_parses(&stmts[1]);
}

#[test]
fn test_dedup_composite_key_case_insensitive() {
    let columns = vec!["ID".to_string(), "Region".to_string(), "amount".to_string()];
    let stmts = dedup(
        &table("orders"),
        &["id".to_string(), "region".to_string()],
        &columns,
    )
    .unwrap();
    assert!(stmts[1].contains("SELECT `ID`, `Region`, ANY_VALUE(`amount`) AS `amount`"));
    assert!(stmts[1].ends_with("GROUP BY `id`, `region`"));
}

#[test]
fn test_dedup_requires_keys() {
    assert!(matches!(
        dedup(&table("orders"), &[], &["id".to_string()]),
        Err(SqlError::EmptyColumns { .. })
    ));
}

#[test]
fn test_dedup_rejects_overlong_copy_name() {
    let long = table(&"t".repeat(60));
    assert!(matches!(
        dedup(&long, &["id".to_string()], &["id".to_string()]),
        Err(SqlError::Core(_))
    ));
}

#[test]
fn test_add_primary_key_with_prefix() {
    let cols = vec![
        KeyColumn {
            name: "id".into(),
            prefix: None,
        },
        KeyColumn {
            name: "email".into(),
            prefix: Some(255),
        },
    ];
    assert_eq!(
        add_key(&table("users"), KeyKind::Primary, &cols).unwrap(),
        "ALTER TABLE `users` ADD PRIMARY KEY (`id`, `email`(255))"
    );
    assert_eq!(
        add_key(&table("users"), KeyKind::Unique, &cols[..1]).unwrap(),
        "ALTER TABLE `users` ADD UNIQUE (`id`)"
    );
    assert!(add_key(&table("users"), KeyKind::Unique, &[]).is_err());
}

#[test]
fn test_create_table() {
    let sql = create_table(
        &table("orders"),
        &[
            ("id".to_string(), "BIGINT".to_string()),
            ("note".to_string(), "TEXT".to_string()),
        ],
    )
    .unwrap();
    assert_eq!(sql, "CREATE TABLE `orders` (`id` BIGINT, `note` TEXT)");
    assert_parses(&sql);
}

#[test]
fn test_insert_plain() {
    let sql = insert(
        &table("orders"),
        &["id".to_string(), "note".to_string()],
        &[
            vec![SqlValue::Int(1), SqlValue::from("a'b")],
            vec![SqlValue::Int(2), SqlValue::Null],
        ],
        OnConflict::Fail,
    )
    .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `orders` (`id`, `note`) VALUES (1, 'a''b'), (2, NULL)"
    );
    assert_parses(&sql);
}

#[test]
fn test_insert_upsert_updates_every_column() {
    let sql = insert(
        &table("orders"),
        &["id".to_string(), "amount".to_string()],
        &[vec![SqlValue::Int(1), SqlValue::Float(9.5)]],
        OnConflict::UpdateAll,
    )
    .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `orders` (`id`, `amount`) VALUES (1, 9.5) \
         ON DUPLICATE KEY UPDATE `id` = VALUES(`id`), `amount` = VALUES(`amount`)"
    );
    assert_parses(&sql);
}

#[test]
fn test_insert_row_width_mismatch() {
    let err = insert(
        &table("orders"),
        &["id".to_string(), "amount".to_string()],
        &[vec![SqlValue::Int(1)]],
        OnConflict::Fail,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SqlError::RowWidthMismatch {
            row: 0,
            expected: 2,
            actual: 1
        }
    ));
}

#[test]
fn test_join() {
    let sql = join(
        &table("orders"),
        &table("customers"),
        &[("customer_id".to_string(), "id".to_string())],
        JoinKind::Left,
    )
    .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM `orders` LEFT JOIN `customers` ON `orders`.`customer_id` = `customers`.`id`"
    );
    assert_parses(&sql);
    assert!(join(&table("a"), &table("b"), &[], JoinKind::Inner).is_err());
}
