use tasklist_core::db::migrations::latest_version;
use tasklist_core::db::{open_db, open_db_in_memory, DbError};
use tasklist_core::{KeyValueStore, SqliteStore, StorageError, StoreConfig, TaskStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_slots");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "kv_slots");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sqlite_store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteStore::try_new(&conn) {
        Err(StorageError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn sqlite_store_upserts_and_removes_slots() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteStore::try_new(&conn).unwrap();

    assert_eq!(store.get_item("todoapp_data").unwrap(), None);
    store.set_item("todoapp_data", "first").unwrap();
    store.set_item("todoapp_data", "second").unwrap();
    assert_eq!(
        store.get_item("todoapp_data").unwrap().as_deref(),
        Some("second")
    );

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_slots;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);

    store.remove_item("todoapp_data").unwrap();
    assert_eq!(store.get_item("todoapp_data").unwrap(), None);
}

#[test]
fn sqlite_store_records_write_time_in_milliseconds() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteStore::try_new(&conn).unwrap();

    let before = chrono::Utc::now().timestamp_millis();
    store.set_item("todoapp_data", "value").unwrap();
    let after = chrono::Utc::now().timestamp_millis();

    let updated_at: i64 = conn
        .query_row(
            "SELECT updated_at FROM kv_slots WHERE slot_key = ?1;",
            ["todoapp_data"],
            |row| row.get(0),
        )
        .unwrap();
    assert!(updated_at >= before && updated_at <= after);
}

#[test]
fn kv_slots_default_write_time_is_in_milliseconds() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_slots (slot_key, slot_value) VALUES ('raw', 'value');",
        [],
    )
    .unwrap();

    let (updated_at, now_seconds): (i64, i64) = conn
        .query_row(
            "SELECT updated_at, CAST(unixepoch('now') AS INTEGER) FROM kv_slots WHERE slot_key = 'raw';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert!((updated_at / 1000 - now_seconds).abs() <= 1);
}

#[test]
fn task_store_survives_reopening_an_on_disk_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");
    let config = StoreConfig::default();

    let (kept_id, done_id) = {
        let conn = open_db(&path).unwrap();
        let mut store = TaskStore::open(SqliteStore::try_new(&conn).unwrap(), &config);
        let kept = store.add("Write report").unwrap().into_value();
        let done = store.add("Buy milk").unwrap().into_value();
        assert!(store.toggle(done.id.as_str()).unwrap().is_saved());
        (kept.id, done.id)
    };

    let conn = open_db(&path).unwrap();
    let store = TaskStore::open(SqliteStore::try_new(&conn).unwrap(), &config);
    let ids: Vec<_> = store.tasks().iter().map(|task| task.id.clone()).collect();
    assert_eq!(ids, vec![done_id.clone(), kept_id]);
    assert!(store.get(done_id.as_str()).unwrap().completed);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
