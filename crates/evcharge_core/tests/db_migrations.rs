use evcharge_core::db::migrations::latest_version;
use evcharge_core::db::{open_db, open_db_in_memory, ConstraintKind, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "condos");
    assert_table_exists(&conn, "users");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("evcharge.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO condos (name, apartments_count, chargers_count, charger_type, state, energy_price)
             VALUES ('Alpha', 50, 2, 'slow', 'SP', 0.75);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM condos;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn open_db_creates_missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("nested").join("evcharge.db");

    let conn = open_db(&path).unwrap();
    assert_table_exists(&conn, "condos");
    assert!(path.exists());
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
fn foreign_key_restricts_condo_delete_and_cascades_rename() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO condos (name, apartments_count, chargers_count, charger_type, state, energy_price)
         VALUES ('Alpha', 50, 2, 'slow', 'SP', 0.75);
         INSERT INTO users (name, apartment, condo, plate_ending, vehicle_type, rfid_code)
         VALUES ('Ana', '12B', 'Alpha', '34', 'elétrico', 'b3950a25');",
    )
    .unwrap();

    let err = DbError::from(conn.execute("DELETE FROM condos WHERE name = 'Alpha';", []).unwrap_err());
    assert!(matches!(
        err,
        DbError::ConstraintViolation {
            kind: ConstraintKind::ForeignKey,
            ..
        }
    ));

    conn.execute("UPDATE condos SET name = 'Alpha Prime' WHERE name = 'Alpha';", [])
        .unwrap();
    let condo: String = conn
        .query_row("SELECT condo FROM users WHERE name = 'Ana';", [], |row| row.get(0))
        .unwrap();
    assert_eq!(condo, "Alpha Prime");
}

#[test]
fn foreign_key_rejects_user_with_unknown_condo() {
    let conn = open_db_in_memory().unwrap();
    let err = DbError::from(
        conn.execute(
            "INSERT INTO users (name, apartment, condo, plate_ending, vehicle_type, rfid_code)
             VALUES ('Ana', '12B', 'Nowhere', '34', 'elétrico', 'b3950a25');",
            [],
        )
        .unwrap_err(),
    );
    assert!(err.is_constraint_violation());
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
