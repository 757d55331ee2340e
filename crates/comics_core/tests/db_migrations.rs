use comics_core::db::migrations::latest_version;
use comics_core::db::{open_db, open_db_in_memory, DbError};
use comics_core::{DocumentStore, SqliteDocumentStore, StoreError, COMICS_COLLECTION};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "documents");
}

#[test]
fn opening_same_database_twice_keeps_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let saved_id = {
        let conn = open_db(&path).unwrap();
        let store = SqliteDocumentStore::try_new(&conn, COMICS_COLLECTION).unwrap();
        let saved = store
            .save(comics_core::Document::new(
                serde_json::from_str(r#"{"title":"Watchmen","year":1986}"#).unwrap(),
            ))
            .unwrap();
        saved.id.unwrap()
    };

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let store = SqliteDocumentStore::try_new(&conn, COMICS_COLLECTION).unwrap();
    let loaded = store.find_by_id(&saved_id).unwrap().unwrap();
    assert_eq!(loaded.get("title"), Some(&serde_json::json!("Watchmen")));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteDocumentStore::try_new(&conn, COMICS_COLLECTION) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
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
