//! Tenant / worker / task rows. CRUD for these lives outside the core; the
//! engine only needs lookups, membership checks and the task-status flip.

use crate::errors::{AppError, AppResult};
use crate::models::task::{Task, TaskStatus};
use crate::models::worker::{Tenant, Worker};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn insert_tenant(conn: &Connection, name: &str) -> AppResult<i64> {
    conn.execute("INSERT INTO tenants (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn get_tenant(conn: &Connection, id: i64) -> AppResult<Tenant> {
    conn.query_row(
        "SELECT id, name FROM tenants WHERE id = ?1",
        params![id],
        |row| {
            Ok(Tenant {
                id: row.get("id")?,
                name: row.get("name")?,
            })
        },
    )
    .optional()?
    .ok_or(AppError::NotFound("Tenant", id))
}

fn map_worker(row: &Row) -> rusqlite::Result<Worker> {
    Ok(Worker {
        id: row.get("id")?,
        tenant_id: row.get("tenant_id")?,
        name: row.get("name")?,
        phone: row.get("phone")?,
    })
}

pub fn insert_worker(
    conn: &Connection,
    tenant_id: i64,
    name: &str,
    phone: Option<&str>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO workers (tenant_id, name, phone) VALUES (?1, ?2, ?3)",
        params![tenant_id, name, phone],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_worker(conn: &Connection, id: i64) -> AppResult<Worker> {
    conn.query_row("SELECT * FROM workers WHERE id = ?1", params![id], map_worker)
        .optional()?
        .ok_or(AppError::NotFound("Worker", id))
}

/// Tenant-membership check consumed by the scheduling core.
pub fn is_worker_in_tenant(conn: &Connection, worker_id: i64, tenant_id: i64) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM workers WHERE id = ?1 AND tenant_id = ?2",
            params![worker_id, tenant_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Load all workers by id, failing on the first unknown or foreign one.
pub fn workers_in_tenant(
    conn: &Connection,
    tenant_id: i64,
    worker_ids: &[i64],
) -> AppResult<Vec<Worker>> {
    let mut out = Vec::with_capacity(worker_ids.len());
    for &id in worker_ids {
        let worker = get_worker(conn, id)?;
        if worker.tenant_id != tenant_id {
            return Err(AppError::NotFound("Worker", id));
        }
        out.push(worker);
    }
    Ok(out)
}

fn map_task(row: &Row) -> rusqlite::Result<Task> {
    let status_str: String = row.get("status")?;
    let status = TaskStatus::from_db_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidTaskStatus(status_str.clone())),
        )
    })?;
    Ok(Task {
        id: row.get("id")?,
        tenant_id: row.get("tenant_id")?,
        title: row.get("title")?,
        status,
    })
}

pub fn insert_task(
    conn: &Connection,
    tenant_id: i64,
    title: &str,
    status: TaskStatus,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO tasks (tenant_id, title, status) VALUES (?1, ?2, ?3)",
        params![tenant_id, title, status.to_db_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_task(conn: &Connection, id: i64) -> AppResult<Task> {
    conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], map_task)
        .optional()?
        .ok_or(AppError::NotFound("Task", id))
}

pub fn set_task_status(conn: &Connection, id: i64, status: TaskStatus) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE tasks SET status = ?1 WHERE id = ?2",
        params![status.to_db_str(), id],
    )?;
    if n == 0 {
        return Err(AppError::NotFound("Task", id));
    }
    Ok(())
}

/// Clone a task under a new identity with its status reset. Used by the
/// repeater so generated contracts never share task rows with the base.
pub fn clone_task(conn: &Connection, task_id: i64) -> AppResult<i64> {
    let task = get_task(conn, task_id)?;
    insert_task(conn, task.tenant_id, &task.title, TaskStatus::InProgress)
}
