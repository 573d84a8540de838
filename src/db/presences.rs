//! Presence (pointage) rows. The unique index on (worker_id, contract_id,
//! day) backs the one-pair-per-day invariant; "open" means departure IS NULL.

use crate::db::db_utils::{day_str, parse_day, parse_ts, ts};
use crate::errors::{AppError, AppResult};
use crate::models::point::GeoPoint;
use crate::models::presence::Presence;
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};

fn map_presence(row: &Row) -> rusqlite::Result<Presence> {
    let day_s: String = row.get("day")?;
    let arrival_s: String = row.get("arrival_at")?;
    let departure_s: Option<String> = row.get("departure_at")?;
    let departure_at = match departure_s {
        Some(s) => Some(parse_ts(0, &s)?),
        None => None,
    };
    let departure_lat: Option<f64> = row.get("departure_lat")?;
    let departure_lon: Option<f64> = row.get("departure_lon")?;
    let departure_location = match (departure_lat, departure_lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
        _ => None,
    };
    Ok(Presence {
        id: row.get("id")?,
        worker_id: row.get("worker_id")?,
        contract_id: row.get("contract_id")?,
        day: parse_day(0, &day_s)?,
        arrival_at: parse_ts(0, &arrival_s)?,
        arrival_location: GeoPoint {
            lat: row.get("arrival_lat")?,
            lon: row.get("arrival_lon")?,
        },
        departure_at,
        departure_location,
        notes: row.get("notes")?,
    })
}

/// Insert the arrival half of a record. The unique day index turns a racing
/// duplicate clock-in into a constraint violation instead of a second row.
pub fn insert_presence(conn: &Connection, presence: &Presence) -> AppResult<i64> {
    let result = conn.execute(
        "INSERT INTO presences
            (worker_id, contract_id, day, arrival_at, arrival_lat, arrival_lon, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            presence.worker_id,
            presence.contract_id,
            day_str(presence.day),
            ts(presence.arrival_at),
            presence.arrival_location.lat,
            presence.arrival_location.lon,
            presence.notes,
        ],
    );
    match result {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::AlreadyPointedToday {
                worker_id: presence.worker_id,
                contract_id: presence.contract_id,
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Fill in the departure half and the accumulated notes.
pub fn close_presence(conn: &Connection, presence: &Presence) -> AppResult<()> {
    let departure_at = presence
        .departure_at
        .ok_or_else(|| AppError::Other(format!("presence {} has no departure", presence.id)))?;
    let loc = presence
        .departure_location
        .ok_or_else(|| AppError::Other(format!("presence {} has no departure location", presence.id)))?;
    conn.execute(
        "UPDATE presences
         SET departure_at = ?1, departure_lat = ?2, departure_lon = ?3, notes = ?4
         WHERE id = ?5 AND departure_at IS NULL",
        params![ts(departure_at), loc.lat, loc.lon, presence.notes, presence.id],
    )?;
    Ok(())
}

/// The worker's open record on this contract, if any. Drives the
/// clock-in/clock-out dispatch.
pub fn open_presence(
    conn: &Connection,
    worker_id: i64,
    contract_id: i64,
) -> AppResult<Option<Presence>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM presences
         WHERE worker_id = ?1 AND contract_id = ?2 AND departure_at IS NULL",
    )?;
    let mut rows = stmt.query_map(params![worker_id, contract_id], map_presence)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Any record (open or completed) for the (worker, contract, day) triple.
pub fn presence_for_day(
    conn: &Connection,
    worker_id: i64,
    contract_id: i64,
    day: NaiveDate,
) -> AppResult<Option<Presence>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM presences
         WHERE worker_id = ?1 AND contract_id = ?2 AND day = ?3",
    )?;
    let mut rows = stmt.query_map(params![worker_id, contract_id, day_str(day)], map_presence)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn get_presence(conn: &Connection, id: i64) -> AppResult<Presence> {
    let mut stmt = conn.prepare_cached("SELECT * FROM presences WHERE id = ?1")?;
    let mut rows = stmt.query_map(params![id], map_presence)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(AppError::NotFound("Presence", id)),
    }
}

/// All open records on one contract. Input for the auto-termination sweep.
pub fn open_presences_for_contract(
    conn: &Connection,
    contract_id: i64,
) -> AppResult<Vec<Presence>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM presences
         WHERE contract_id = ?1 AND departure_at IS NULL
         ORDER BY arrival_at ASC",
    )?;
    let rows = stmt.query_map(params![contract_id], map_presence)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn presences_for_contract(conn: &Connection, contract_id: i64) -> AppResult<Vec<Presence>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM presences WHERE contract_id = ?1 ORDER BY arrival_at ASC",
    )?;
    let rows = stmt.query_map(params![contract_id], map_presence)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn presences_for_worker(conn: &Connection, worker_id: i64) -> AppResult<Vec<Presence>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM presences WHERE worker_id = ?1 ORDER BY arrival_at ASC",
    )?;
    let rows = stmt.query_map(params![worker_id], map_presence)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::contracts::{InsertContract, insert_contract};
    use crate::db::directory::{insert_tenant, insert_worker};
    use crate::db::migrate::run_pending_migrations;
    use crate::db::pool::DbPool;
    use crate::utils::time::{parse_local_datetime, tenant_offset};
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        parse_local_datetime(s, tenant_offset(0).unwrap()).unwrap()
    }

    fn record(worker: i64, contract: i64, arrival: &str) -> Presence {
        Presence {
            id: 0,
            worker_id: worker,
            contract_id: contract,
            day: at(arrival).date_naive(),
            arrival_at: at(arrival),
            arrival_location: GeoPoint { lat: 48.85, lon: 2.35 },
            departure_at: None,
            departure_location: None,
            notes: String::new(),
        }
    }

    fn seed_contract(conn: &Connection, tenant: i64, start: &str, end: &str) -> i64 {
        insert_contract(
            conn,
            &InsertContract {
                tenant_id: tenant,
                location: GeoPoint { lat: 48.85, lon: 2.35 },
                start_at: at(start),
                end_at: at(end),
                description: None,
                break_minutes: None,
                is_template: false,
                template_name: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn worker_history_spans_contracts_in_arrival_order() {
        let pool = DbPool::in_memory().unwrap();
        run_pending_migrations(&pool.conn).unwrap();
        let tenant = insert_tenant(&pool.conn, "acme").unwrap();
        let worker = insert_worker(&pool.conn, tenant, "mara", None).unwrap();
        let c1 = seed_contract(&pool.conn, tenant, "2026-07-01 09:00", "2026-07-01 17:00");
        let c2 = seed_contract(&pool.conn, tenant, "2026-07-02 09:00", "2026-07-02 17:00");

        insert_presence(&pool.conn, &record(worker, c2, "2026-07-02 09:00")).unwrap();
        insert_presence(&pool.conn, &record(worker, c1, "2026-07-01 09:05")).unwrap();

        let history = presences_for_worker(&pool.conn, worker).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].contract_id, c1);
        assert_eq!(history[1].contract_id, c2);
    }

    #[test]
    fn second_record_for_the_same_day_hits_the_unique_index() {
        let pool = DbPool::in_memory().unwrap();
        run_pending_migrations(&pool.conn).unwrap();
        let tenant = insert_tenant(&pool.conn, "acme").unwrap();
        let worker = insert_worker(&pool.conn, tenant, "mara", None).unwrap();
        let c = seed_contract(&pool.conn, tenant, "2026-07-01 09:00", "2026-07-01 17:00");

        insert_presence(&pool.conn, &record(worker, c, "2026-07-01 09:00")).unwrap();
        let err = insert_presence(&pool.conn, &record(worker, c, "2026-07-01 09:30")).unwrap_err();
        assert!(matches!(err, AppError::AlreadyPointedToday { .. }));
    }
}
