use super::*;
use std::io::Write;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("connection:\n  host: localhost\n").unwrap();
    assert_eq!(config.connection.host.as_deref(), Some("localhost"));
    assert_eq!(config.insert_batch_size, 1000);
    assert_eq!(config.key_prefix_length, 255);
    assert!(config.targets.is_empty());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
connection:
  host: localhost
  port: 3307
  user: analyst
  password: secret
  database: sales
insert_batch_size: 250
key_prefix_length: 191
targets:
  prod:
    connection:
      host: db.prod.internal
      database: sales_prod
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.insert_batch_size, 250);
    assert_eq!(config.key_prefix_length, 191);
    assert_eq!(config.target_names(), vec!["prod"]);

    let base = config.connection_params(None).unwrap();
    assert_eq!(base.host, "localhost");
    assert_eq!(base.port, 3307);
    assert_eq!(base.database, "sales");

    let prod = config.connection_params(Some("prod")).unwrap();
    assert_eq!(prod.host, "db.prod.internal");
    assert_eq!(prod.port, 3307);
    assert_eq!(prod.user, "analyst");
    assert_eq!(prod.database, "sales_prod");
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("connection:\n  hostname: x\n");
    assert!(result.is_err());
}

#[test]
fn test_unknown_target() {
    let config: Config = serde_yaml::from_str("connection:\n  host: localhost\n").unwrap();
    let err = config.connection_params(Some("staging")).unwrap_err();
    assert!(matches!(err, CoreError::UnknownTarget { .. }));
}

#[test]
fn test_missing_required_field() {
    let config: Config =
        serde_yaml::from_str("connection:\n  host: localhost\n  user: root\n").unwrap();
    let err = config.connection_params(None).unwrap_err();
    assert!(err.to_string().contains("connection.database"));
}

#[test]
fn test_default_port_and_empty_password() {
    let config: Config = serde_yaml::from_str(
        "connection:\n  host: localhost\n  user: root\n  database: sales\n",
    )
    .unwrap();
    let params = config.connection_params(None).unwrap();
    assert_eq!(params.port, 3306);
    assert_eq!(params.password, "");
}

#[test]
fn test_password_env_unset_is_error() {
    let config: Config = serde_yaml::from_str(
        "connection:\n  host: h\n  user: u\n  database: d\n  password_env: DBF_TEST_SURELY_UNSET_VAR\n",
    )
    .unwrap();
    let err = config.connection_params(None).unwrap_err();
    assert!(err.to_string().contains("DBF_TEST_SURELY_UNSET_VAR"));
}

#[test]
fn test_explicit_password_wins_over_env() {
    let conn = ConnectionConfig {
        host: Some("h".into()),
        user: Some("u".into()),
        database: Some("d".into()),
        password: Some("inline".into()),
        password_env: Some("DBF_TEST_SURELY_UNSET_VAR".into()),
        port: None,
    };
    assert_eq!(conn.resolve().unwrap().password, "inline");
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "connection:\n  host: localhost\n  user: root\n  database: sales\ninsert_batch_size: 10"
    )
    .unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.insert_batch_size, 10);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_rejects_zero_batch_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "insert_batch_size: 0\n").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_default_matches_empty_yaml() {
    let parsed: Config = serde_yaml::from_str("{}").unwrap();
    let default = Config::default();
    assert_eq!(parsed.insert_batch_size, default.insert_batch_size);
    assert_eq!(parsed.key_prefix_length, default.key_prefix_length);
    assert_eq!(parsed.connection, default.connection);
}
