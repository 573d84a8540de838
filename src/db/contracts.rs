//! Contract rows, the explicit assignment join table and the window queries
//! behind conflict detection, the termination sweep and the daily trigger.

use crate::db::db_utils::{parse_ts, ts};
use crate::errors::{AppError, AppResult};
use crate::models::contract::Contract;
use crate::models::point::GeoPoint;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

/// Column values for a contract about to be persisted.
pub struct InsertContract<'a> {
    pub tenant_id: i64,
    pub location: GeoPoint,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub description: Option<&'a str>,
    pub break_minutes: Option<i64>,
    pub is_template: bool,
    pub template_name: Option<&'a str>,
}

fn map_contract(row: &Row) -> rusqlite::Result<Contract> {
    let start_str: String = row.get("start_at")?;
    let end_str: String = row.get("end_at")?;
    Ok(Contract {
        id: row.get("id")?,
        tenant_id: row.get("tenant_id")?,
        location: GeoPoint {
            lat: row.get("lat")?,
            lon: row.get("lon")?,
        },
        start_at: parse_ts(0, &start_str)?,
        end_at: parse_ts(0, &end_str)?,
        description: row.get("description")?,
        break_minutes: row.get("break_minutes")?,
        is_template: row.get::<_, i64>("is_template")? == 1,
        template_name: row.get("template_name")?,
        repetition_count: row.get("repetition_count")?,
        created_at: row.get("created_at")?,
        deleted: row.get::<_, i64>("deleted")? == 1,
        worker_ids: Vec::new(),
        task_ids: Vec::new(),
    })
}

fn load_links(conn: &Connection, contract: &mut Contract) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "SELECT worker_id FROM contract_workers WHERE contract_id = ?1 ORDER BY rowid",
    )?;
    contract.worker_ids = stmt
        .query_map(params![contract.id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;

    let mut stmt = conn.prepare_cached(
        "SELECT task_id FROM contract_tasks WHERE contract_id = ?1 ORDER BY rowid",
    )?;
    contract.task_ids = stmt
        .query_map(params![contract.id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(())
}

fn collect_contracts(conn: &Connection, mut rows: Vec<Contract>) -> AppResult<Vec<Contract>> {
    for c in &mut rows {
        load_links(conn, c)?;
    }
    Ok(rows)
}

pub fn insert_contract(conn: &Connection, row: &InsertContract) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO contracts
            (tenant_id, lat, lon, start_at, end_at, description, break_minutes,
             is_template, template_name, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            row.tenant_id,
            row.location.lat,
            row.location.lon,
            ts(row.start_at),
            ts(row.end_at),
            row.description,
            row.break_minutes,
            if row.is_template { 1 } else { 0 },
            row.template_name,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn assign_worker(conn: &Connection, contract_id: i64, worker_id: i64) -> AppResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO contract_workers (contract_id, worker_id) VALUES (?1, ?2)",
        params![contract_id, worker_id],
    )?;
    Ok(())
}

pub fn attach_task(conn: &Connection, contract_id: i64, task_id: i64) -> AppResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO contract_tasks (contract_id, task_id) VALUES (?1, ?2)",
        params![contract_id, task_id],
    )?;
    Ok(())
}

pub fn clear_workers(conn: &Connection, contract_id: i64) -> AppResult<()> {
    conn.execute(
        "DELETE FROM contract_workers WHERE contract_id = ?1",
        params![contract_id],
    )?;
    Ok(())
}

pub fn clear_tasks(conn: &Connection, contract_id: i64) -> AppResult<()> {
    conn.execute(
        "DELETE FROM contract_tasks WHERE contract_id = ?1",
        params![contract_id],
    )?;
    Ok(())
}

pub fn get_contract(conn: &Connection, tenant_id: i64, id: i64) -> AppResult<Contract> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM contracts WHERE id = ?1 AND tenant_id = ?2 AND deleted = 0",
    )?;
    let mut rows = stmt.query_map(params![id, tenant_id], map_contract)?;
    match rows.next() {
        Some(row) => {
            let mut contract = row?;
            load_links(conn, &mut contract)?;
            Ok(contract)
        }
        None => Err(AppError::NotFound("Contract", id)),
    }
}

/// Contracts of one worker whose window overlaps `[start, end)` strictly:
/// touching endpoints do not conflict. Templates and deleted contracts are
/// out of scope for scheduling.
pub fn find_conflicts(
    conn: &Connection,
    worker_id: i64,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    exclude_contract_id: Option<i64>,
) -> AppResult<Vec<Contract>> {
    let mut stmt = conn.prepare_cached(
        "SELECT c.* FROM contracts c
         JOIN contract_workers cw ON cw.contract_id = c.id
         WHERE cw.worker_id = ?1
           AND c.is_template = 0
           AND c.deleted = 0
           AND c.start_at < ?2
           AND c.end_at > ?3
           AND c.id != ?4
         ORDER BY c.start_at ASC",
    )?;
    let rows = stmt
        .query_map(
            params![worker_id, ts(end_at), ts(start_at), exclude_contract_id.unwrap_or(-1)],
            map_contract,
        )?
        .collect::<rusqlite::Result<Vec<Contract>>>()?;
    collect_contracts(conn, rows)
}

/// Non-template contracts whose end has passed. Input for the sweep; reruns
/// are harmless because only still-open presences are touched downstream.
pub fn expired_contracts(conn: &Connection, now: DateTime<Utc>) -> AppResult<Vec<Contract>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM contracts
         WHERE end_at < ?1 AND is_template = 0 AND deleted = 0
         ORDER BY end_at ASC",
    )?;
    let rows = stmt
        .query_map(params![ts(now)], map_contract)?
        .collect::<rusqlite::Result<Vec<Contract>>>()?;
    collect_contracts(conn, rows)
}

/// Non-template contracts starting within `[from, to)`. Drives the daily
/// notification trigger.
pub fn contracts_starting_between(
    conn: &Connection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> AppResult<Vec<Contract>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM contracts
         WHERE start_at >= ?1 AND start_at < ?2 AND is_template = 0 AND deleted = 0
         ORDER BY start_at ASC",
    )?;
    let rows = stmt
        .query_map(params![ts(from), ts(to)], map_contract)?
        .collect::<rusqlite::Result<Vec<Contract>>>()?;
    collect_contracts(conn, rows)
}

pub fn list_contracts(conn: &Connection, tenant_id: i64) -> AppResult<Vec<Contract>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM contracts
         WHERE tenant_id = ?1 AND is_template = 0 AND deleted = 0
         ORDER BY start_at ASC",
    )?;
    let rows = stmt
        .query_map(params![tenant_id], map_contract)?
        .collect::<rusqlite::Result<Vec<Contract>>>()?;
    collect_contracts(conn, rows)
}

pub fn list_templates(conn: &Connection, tenant_id: i64) -> AppResult<Vec<Contract>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM contracts
         WHERE tenant_id = ?1 AND is_template = 1 AND deleted = 0
         ORDER BY template_name ASC",
    )?;
    let rows = stmt
        .query_map(params![tenant_id], map_contract)?
        .collect::<rusqlite::Result<Vec<Contract>>>()?;
    collect_contracts(conn, rows)
}

pub fn contracts_for_worker(conn: &Connection, worker_id: i64) -> AppResult<Vec<Contract>> {
    let mut stmt = conn.prepare_cached(
        "SELECT c.* FROM contracts c
         JOIN contract_workers cw ON cw.contract_id = c.id
         WHERE cw.worker_id = ?1 AND c.deleted = 0
         ORDER BY c.start_at ASC",
    )?;
    let rows = stmt
        .query_map(params![worker_id], map_contract)?
        .collect::<rusqlite::Result<Vec<Contract>>>()?;
    collect_contracts(conn, rows)
}

/// Persist the mutable columns after an update.
pub fn update_contract_row(conn: &Connection, contract: &Contract) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE contracts
         SET lat = ?1, lon = ?2, start_at = ?3, end_at = ?4,
             description = ?5, break_minutes = ?6
         WHERE id = ?7 AND deleted = 0",
        params![
            contract.location.lat,
            contract.location.lon,
            ts(contract.start_at),
            ts(contract.end_at),
            contract.description,
            contract.break_minutes,
            contract.id,
        ],
    )?;
    if n == 0 {
        return Err(AppError::NotFound("Contract", contract.id));
    }
    Ok(())
}

pub fn set_repetition_count(conn: &Connection, contract_id: i64, count: i64) -> AppResult<()> {
    conn.execute(
        "UPDATE contracts SET repetition_count = ?1 WHERE id = ?2",
        params![count, contract_id],
    )?;
    Ok(())
}

pub fn soft_delete(conn: &Connection, tenant_id: i64, id: i64) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE contracts SET deleted = 1 WHERE id = ?1 AND tenant_id = ?2 AND deleted = 0",
        params![id, tenant_id],
    )?;
    if n == 0 {
        return Err(AppError::NotFound("Contract", id));
    }
    Ok(())
}
