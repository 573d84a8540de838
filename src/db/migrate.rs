//! Schema ownership. All tables are created (and upgraded) here; nothing
//! else in the crate issues CREATE TABLE.

use crate::ui::messages::warning;
use rusqlite::{Connection, Result};

/// Ensure the `audit` table exists.
fn ensure_audit_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS audit (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn create_directory_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tenants (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS workers (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            tenant_id INTEGER NOT NULL REFERENCES tenants(id),
            name      TEXT NOT NULL,
            phone     TEXT
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            tenant_id INTEGER NOT NULL REFERENCES tenants(id),
            title     TEXT NOT NULL,
            status    TEXT NOT NULL DEFAULT 'pending'
                      CHECK(status IN ('pending','in_progress','done'))
        );
        "#,
    )?;
    Ok(())
}

fn create_contract_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS contracts (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            tenant_id        INTEGER NOT NULL REFERENCES tenants(id),
            lat              REAL NOT NULL,
            lon              REAL NOT NULL,
            start_at         TEXT NOT NULL,
            end_at           TEXT NOT NULL,
            description      TEXT,
            break_minutes    INTEGER,
            is_template      INTEGER NOT NULL DEFAULT 0,
            template_name    TEXT,
            repetition_count INTEGER NOT NULL DEFAULT 0,
            created_at       TEXT NOT NULL,
            deleted          INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_contracts_window
            ON contracts(start_at, end_at);
        CREATE INDEX IF NOT EXISTS idx_contracts_tenant
            ON contracts(tenant_id, is_template, deleted);

        CREATE TABLE IF NOT EXISTS contract_workers (
            contract_id INTEGER NOT NULL REFERENCES contracts(id),
            worker_id   INTEGER NOT NULL REFERENCES workers(id),
            PRIMARY KEY (contract_id, worker_id)
        );

        CREATE INDEX IF NOT EXISTS idx_contract_workers_worker
            ON contract_workers(worker_id);

        CREATE TABLE IF NOT EXISTS contract_tasks (
            contract_id INTEGER NOT NULL REFERENCES contracts(id),
            task_id     INTEGER NOT NULL REFERENCES tasks(id),
            PRIMARY KEY (contract_id, task_id)
        );
        "#,
    )?;
    Ok(())
}

/// The unique index on (worker_id, contract_id, day) is what enforces
/// "one arrival+departure pair per day" against racing clock-in calls.
fn create_presences_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS presences (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            worker_id     INTEGER NOT NULL REFERENCES workers(id),
            contract_id   INTEGER NOT NULL REFERENCES contracts(id),
            day           TEXT NOT NULL,
            arrival_at    TEXT NOT NULL,
            arrival_lat   REAL NOT NULL,
            arrival_lon   REAL NOT NULL,
            departure_at  TEXT,
            departure_lat REAL,
            departure_lon REAL,
            notes         TEXT NOT NULL DEFAULT ''
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_presences_one_per_day
            ON presences(worker_id, contract_id, day);
        CREATE INDEX IF NOT EXISTS idx_presences_open
            ON presences(contract_id) WHERE departure_at IS NULL;
        "#,
    )?;
    Ok(())
}

/// Check if a table has a given column.
fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Upgrade pre-0.3 databases that tracked deletion with a timestamp column.
fn migrate_deleted_flag(conn: &Connection) -> Result<()> {
    if !table_has_column(conn, "contracts", "deleted_at")? {
        return Ok(());
    }

    warning("Converting contracts.deleted_at to the deleted flag...");
    conn.execute_batch(
        r#"
        BEGIN;
        UPDATE contracts SET deleted = 1 WHERE deleted_at IS NOT NULL;
        ALTER TABLE contracts DROP COLUMN deleted_at;
        COMMIT;
        "#,
    )?;
    Ok(())
}

/// Run all pending migrations. Safe to call on every startup.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_audit_table(conn)?;
    create_directory_tables(conn)?;
    create_contract_tables(conn)?;
    create_presences_table(conn)?;
    migrate_deleted_flag(conn)?;
    Ok(())
}
