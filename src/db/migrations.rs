//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: price records
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PRICE RECORDS
        -- One row per shelf observation; append-only
        -- ============================================
        CREATE TABLE price_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,                  -- ISO date: "2025-01-09"
            category TEXT NOT NULL CHECK(category IN (
                'produce', 'dairy', 'meat', 'seafood', 'bakery', 'pantry',
                'frozen', 'beverages', 'snacks', 'household', 'other'
            )),
            description TEXT NOT NULL DEFAULT '',
            price REAL NOT NULL,
            weight REAL NOT NULL,
            unit TEXT NOT NULL CHECK(unit IN ('kg', 'g', 'L', 'ml', 'pcs')),
            norm_price REAL NOT NULL,            -- price per kg / L / piece, 0 when weight <= 0

            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_price_records_date ON price_records(date);
        CREATE INDEX idx_price_records_category ON price_records(category);
        "#,
    )?;

    Ok(())
}

fn has_migrations_table(conn: &Connection) -> DbResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
        [],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Get the current schema version (0 for a database never migrated)
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    if !has_migrations_table(conn)? {
        return Ok(0);
    }
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_migration(&conn).unwrap());

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_schema_version_propagates_sqlite_errors() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);

        // A migrations table without the expected column is a real error, not version 0
        conn.execute("CREATE TABLE schema_migrations (applied_at TEXT)", []).unwrap();
        assert!(get_schema_version(&conn).is_err());
    }

    #[test]
    fn test_unit_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO price_records (date, category, price, weight, unit, norm_price)
             VALUES ('2025-01-09', 'dairy', 1.0, 1.0, 'oz', 1.0)",
            [],
        );
        assert!(result.is_err());
    }
}
