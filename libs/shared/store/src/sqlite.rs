use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;

/// Open a SQLite connection to the given path and run migrations.
pub fn open_database(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory_database() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA foreign_keys=ON;
         PRAGMA busy_timeout=5000;",
    )?;
    Ok(())
}

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../resources/migrations/001_initial.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| StoreError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet).
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

/// Count tables in the database (for verification).
pub fn count_tables(conn: &Connection) -> Result<i64, StoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        let count = count_tables(&conn).unwrap();
        // schema_version + clinics + operating_hours + users + veterinarians
        // + integrations + appointments = 7
        assert_eq!(count, 7, "Expected 7 tables, got {count}");
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn migration_is_idempotent() {
        let conn = open_memory_database().unwrap();
        assert!(run_migrations(&conn).is_ok());
    }

    #[test]
    fn appointment_range_check_rejects_inverted_range() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO clinics (id, name) VALUES ('c1', 'North Paw')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO veterinarians (id, clinic_id, name, email)
             VALUES ('v1', 'c1', 'Dr. Reis', 'reis@northpaw.example')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO appointments
                 (id, clinic_id, veterinarian_id, client_name, pet_name,
                  start_time, end_time, status, origin)
             VALUES ('a1', 'c1', 'v1', 'Ana', 'Thor',
                     '2026-03-02T11:00:00.000Z', '2026-03-02T10:00:00.000Z',
                     'scheduled', 'manual')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_weekday_is_rejected() {
        let conn = open_memory_database().unwrap();
        conn.execute("INSERT INTO clinics (id, name) VALUES ('c1', 'North Paw')", [])
            .unwrap();
        conn.execute(
            "INSERT INTO operating_hours (id, clinic_id, weekday, opens_at, closes_at)
             VALUES ('h1', 'c1', 1, '09:00', '17:00')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO operating_hours (id, clinic_id, weekday, opens_at, closes_at)
             VALUES ('h2', 'c1', 1, '08:00', '12:00')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn update_trigger_refreshes_updated_at() {
        let conn = open_memory_database().unwrap();
        conn.execute("INSERT INTO clinics (id, name) VALUES ('c1', 'North Paw')", [])
            .unwrap();
        let before: String = conn
            .query_row("SELECT updated_at FROM clinics WHERE id = 'c1'", [], |row| {
                row.get(0)
            })
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        conn.execute("UPDATE clinics SET address = 'Rua A, 1' WHERE id = 'c1'", [])
            .unwrap();

        let after: String = conn
            .query_row("SELECT updated_at FROM clinics WHERE id = 'c1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(after > before, "updated_at did not advance: {before} -> {after}");
    }
}
