#![cfg(feature = "sqlite")]

use std::path::Path;

use sql_kit::prelude::*;
use tempfile::tempdir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn seeded(engine: &Engine) -> Result<(), SqlKitError> {
    engine.exec(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, active INTEGER, joined TEXT)",
        &[],
    )?;
    engine.insert("users", &[("name", "Alice".into()), ("active", true.into())])?;
    engine.insert("users", &[("name", "Bob".into()), ("active", false.into())])?;
    Ok(())
}

#[test]
fn crud_against_an_in_memory_database() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let engine = Engine::from_dsn(Dsn::new("sqlite:", None, None));
    seeded(&engine)?;
    assert_eq!(engine.last_insert_id(None)?, "2");

    let updated = engine.update(
        "users",
        &[("name", "Robert".into())],
        &[("id", RowValues::Int(2))],
    )?;
    assert_eq!(updated, 1);

    let row = engine
        .select_row("SELECT id, name, active FROM users WHERE id = ?", &[RowValues::Int(2)])?
        .expect("row 2 exists");
    assert_eq!(row.get("name"), Some(&RowValues::Text("Robert".into())));
    assert_eq!(row.get("active"), Some(&RowValues::Int(0)));
    assert_eq!(row.column_names().as_slice(), ["id", "name", "active"]);

    assert_eq!(engine.delete("users", &[("name", "Alice".into())])?, 1);
    let remaining = engine.select_all("SELECT name FROM users", &[])?;
    assert_eq!(remaining.len(), 1);
    Ok(())
}

#[test]
fn missing_row_and_zero_count_differ() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::from_dsn(Dsn::new("sqlite:", None, None));
    seeded(&engine)?;

    assert!(engine
        .select_row("SELECT id FROM users WHERE name = ?", &["Nobody".into()])?
        .is_none());

    let count = engine
        .select_row("SELECT COUNT(*) AS n FROM users WHERE name = ?", &["Nobody".into()])?
        .expect("aggregate always yields a row");
    assert_eq!(count.get("n"), Some(&RowValues::Int(0)));
    Ok(())
}

#[test]
fn values_bind_with_sqlite_affinities() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::from_dsn(Dsn::new("sqlite:", None, None));
    seeded(&engine)?;
    let joined = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(12, 30, 0))
        .expect("valid timestamp");
    engine.update(
        "users",
        &[("joined", joined.into())],
        &[("name", "Alice".into())],
    )?;

    let row = engine
        .select_row("SELECT joined FROM users WHERE name = 'Alice'", &[])?
        .expect("alice exists");
    assert_eq!(row.get("joined"), Some(&RowValues::Text("2024-03-01 12:30:00".into())));
    assert_eq!(row.get("joined").and_then(RowValues::as_timestamp), Some(joined));
    Ok(())
}

#[test]
fn errors_carry_sqlite_codes() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let engine = Engine::from_dsn(Dsn::new("sqlite:", None, None));
    seeded(&engine)?;

    let err = engine.select_row("SELECT * FROM nope", &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Statement);
    assert_eq!(err.native_code(), Some("1"));

    // NOT NULL constraint: SQLITE_CONSTRAINT_NOTNULL
    let err = engine
        .insert("users", &[("name", RowValues::Null)])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Execution);
    assert_eq!(err.native_code(), Some("1299"));

    // the engine is still usable after failures
    assert_eq!(engine.select_all("SELECT * FROM users", &[])?.len(), 2);
    Ok(())
}

#[test]
fn quoting_handles_awkward_names() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::from_dsn(Dsn::new("sqlite:", None, None));
    engine.exec(r#"CREATE TABLE "odd""table" ("sel ect" TEXT)"#, &[])?;
    assert_eq!(engine.quote_table_name("odd\"table")?, r#""odd""table""#);
    engine.insert("odd\"table", &[("sel ect", "x".into())])?;
    assert_eq!(engine.delete("odd\"table", &[("sel ect", "x".into())])?, 1);
    Ok(())
}

#[test]
fn descriptor_opens_a_file_database() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("app.db");
    let source = ConnectionDescriptor::builder(DriverKind::Sqlite)
        .database_name(path.to_string_lossy())
        .finish();

    {
        let engine = Engine::from_descriptor(&source);
        seeded(&engine)?;
        assert_eq!(engine.driver_kind()?, DriverKind::Sqlite);
    }
    assert!(Path::new(&path).exists());

    let reopened = Engine::from_descriptor(&source);
    assert_eq!(reopened.select_all("SELECT id FROM users", &[])?.len(), 2);
    Ok(())
}

#[test]
fn wrapped_connection_keeps_its_own_setup() -> Result<(), Box<dyn std::error::Error>> {
    let conn = rusqlite::Connection::open_in_memory()?;
    conn.execute_batch("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT); INSERT INTO kv VALUES ('a', '1');")?;
    let engine = Engine::from_handle(Box::new(SqliteConnectionHandle::new(conn)));

    let row = engine
        .select_row("SELECT v FROM kv WHERE k = ?", &["a".into()])?
        .expect("seeded row");
    assert_eq!(row.get("v"), Some(&RowValues::Text("1".into())));
    Ok(())
}
