//! Schedule conflict detection. Two windows conflict iff
//! `existing.start < candidate.end && existing.end > candidate.start`:
//! open-interval overlap, so touching endpoints never conflict.
//! All comparisons happen in UTC.

use crate::db::contracts::find_conflicts;
use crate::errors::{AppError, AppResult};
use crate::models::contract::Contract;
use crate::utils::time::format_local;
use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::Connection;

/// Strict window overlap.
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Fail fast on an inverted or empty window, before any query runs.
pub fn validate_window(
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    offset: FixedOffset,
) -> AppResult<()> {
    if end_at <= start_at {
        return Err(AppError::InvertedWindow {
            start: format_local(start_at, offset),
            end: format_local(end_at, offset),
        });
    }
    Ok(())
}

/// All contracts of `worker_id` overlapping the candidate window, excluding
/// `exclude_contract_id` on the update path. The full list is returned so the
/// caller can report every overlap, not just the first.
pub fn conflicts_for_worker(
    conn: &Connection,
    worker_id: i64,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    exclude_contract_id: Option<i64>,
    offset: FixedOffset,
) -> AppResult<Vec<Contract>> {
    validate_window(start_at, end_at, offset)?;
    find_conflicts(conn, worker_id, start_at, end_at, exclude_contract_id)
}

/// Check one worker's availability, turning a non-empty conflict list into a
/// Conflict error naming each offending contract and its window.
pub fn ensure_no_conflict(
    conn: &Connection,
    worker_id: i64,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    exclude_contract_id: Option<i64>,
    offset: FixedOffset,
) -> AppResult<()> {
    let conflicts =
        conflicts_for_worker(conn, worker_id, start_at, end_at, exclude_contract_id, offset)?;
    if conflicts.is_empty() {
        return Ok(());
    }
    let details = conflicts
        .iter()
        .map(|c| {
            format!(
                "contract {} [{} .. {}]",
                c.id,
                format_local(c.start_at, offset),
                format_local(c.end_at, offset)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    Err(AppError::ScheduleConflict { worker_id, details })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::contracts::{InsertContract, assign_worker, insert_contract};
    use crate::db::directory::{insert_tenant, insert_worker};
    use crate::db::migrate::run_pending_migrations;
    use crate::db::pool::DbPool;
    use crate::models::point::GeoPoint;
    use crate::utils::time::{parse_local_datetime, tenant_offset};

    fn at(s: &str) -> DateTime<Utc> {
        parse_local_datetime(s, tenant_offset(0).unwrap()).unwrap()
    }

    #[test]
    fn overlap_is_symmetric() {
        let (a1, a2) = (at("2026-07-01 09:00"), at("2026-07-01 17:00"));
        let (b1, b2) = (at("2026-07-01 16:00"), at("2026-07-01 20:00"));
        assert!(windows_overlap(a1, a2, b1, b2));
        assert!(windows_overlap(b1, b2, a1, a2));
    }

    #[test]
    fn touching_windows_do_not_overlap() {
        let (a1, a2) = (at("2026-07-01 09:00"), at("2026-07-01 17:00"));
        let (b1, b2) = (at("2026-07-01 17:00"), at("2026-07-01 20:00"));
        assert!(!windows_overlap(a1, a2, b1, b2));
        assert!(!windows_overlap(b1, b2, a1, a2));
        // one minute of overlap does conflict
        let b1 = at("2026-07-01 16:59");
        assert!(windows_overlap(a1, a2, b1, b2));
    }

    #[test]
    fn inverted_window_fails_before_querying() {
        let off = tenant_offset(0).unwrap();
        let err = validate_window(at("2026-07-01 17:00"), at("2026-07-01 09:00"), off)
            .unwrap_err();
        assert!(matches!(err, AppError::InvertedWindow { .. }));
    }

    fn seed(conn: &Connection) -> (i64, i64) {
        run_pending_migrations(conn).unwrap();
        let tenant = insert_tenant(conn, "acme").unwrap();
        let worker = insert_worker(conn, tenant, "mara", None).unwrap();
        let contract = insert_contract(
            conn,
            &InsertContract {
                tenant_id: tenant,
                location: GeoPoint { lat: 48.85, lon: 2.35 },
                start_at: at("2026-07-01 09:00"),
                end_at: at("2026-07-01 17:00"),
                description: None,
                break_minutes: None,
                is_template: false,
                template_name: None,
            },
        )
        .unwrap();
        assign_worker(conn, contract, worker).unwrap();
        (worker, contract)
    }

    #[test]
    fn detects_every_overlapping_contract_and_honors_exclusion() {
        let pool = DbPool::in_memory().unwrap();
        let off = tenant_offset(0).unwrap();
        let (worker, contract) = seed(&pool.conn);

        let found = conflicts_for_worker(
            &pool.conn,
            worker,
            at("2026-07-01 16:00"),
            at("2026-07-01 20:00"),
            None,
            off,
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, contract);

        // the update path excludes the contract being edited
        let found = conflicts_for_worker(
            &pool.conn,
            worker,
            at("2026-07-01 16:00"),
            at("2026-07-01 20:00"),
            Some(contract),
            off,
        )
        .unwrap();
        assert!(found.is_empty());

        // touching the end of the existing window is allowed
        let found = conflicts_for_worker(
            &pool.conn,
            worker,
            at("2026-07-01 17:00"),
            at("2026-07-01 20:00"),
            None,
            off,
        )
        .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn conflict_error_names_the_offending_window() {
        let pool = DbPool::in_memory().unwrap();
        let off = tenant_offset(0).unwrap();
        let (worker, contract) = seed(&pool.conn);

        let err = ensure_no_conflict(
            &pool.conn,
            worker,
            at("2026-07-01 10:00"),
            at("2026-07-01 12:00"),
            None,
            off,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(&format!("contract {}", contract)));
        assert!(msg.contains("2026-07-01 09:00"));
        assert!(msg.contains("2026-07-01 17:00"));
    }
}
