//! Assignment notifications. Delivery is a collaborator behind the
//! `Notifier` trait; everything here is best effort. A failed or skipped
//! notification is logged and never escalates to the operation that
//! triggered it.

use crate::core::geocache::PlaceLookup;
use crate::db::contracts::contracts_starting_between;
use crate::db::directory::get_worker;
use crate::db::log::audit;
use crate::errors::{AppError, AppResult};
use crate::models::contract::Contract;
use crate::models::worker::Worker;
use crate::ui::messages::{info, warning};
use crate::utils::time::{format_local, local_day_bounds};
use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::Connection;

pub trait Notifier {
    fn notify(&self, worker: &Worker, message: &str) -> AppResult<()>;
}

/// Console delivery, standing in for the external SMS gateway.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, worker: &Worker, message: &str) -> AppResult<()> {
        if worker.phone.is_none() {
            return Err(AppError::Other(format!(
                "worker {} has no phone number",
                worker.id
            )));
        }
        info(format!("notify {} <{}>: {}", worker.name, worker.id, message));
        Ok(())
    }
}

/// Swallows everything. Used by tests and by handlers that must stay quiet.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _worker: &Worker, _message: &str) -> AppResult<()> {
        Ok(())
    }
}

pub fn assignment_message(
    contract: &Contract,
    worker: &Worker,
    offset: FixedOffset,
    places: &dyn PlaceLookup,
) -> String {
    let place = places
        .place_name(contract.location)
        .unwrap_or_else(|| contract.location.to_string());
    format!(
        "New contract assigned: {} starts {} and ends {}. Location: {}",
        worker.name,
        format_local(contract.start_at, offset),
        format_local(contract.end_at, offset),
        place
    )
}

/// Notify every worker assigned to `contract`, isolating failures per worker.
pub fn notify_assignment(
    conn: &Connection,
    contract: &Contract,
    notifier: &dyn Notifier,
    offset: FixedOffset,
    places: &dyn PlaceLookup,
) {
    for &worker_id in &contract.worker_ids {
        let worker = match get_worker(conn, worker_id) {
            Ok(w) => w,
            Err(e) => {
                warning(format!("notification skipped, worker {}: {}", worker_id, e));
                continue;
            }
        };
        let message = assignment_message(contract, &worker, offset, places);
        match notifier.notify(&worker, &message) {
            Ok(()) => {
                let _ = audit(
                    conn,
                    "notify",
                    &contract.id.to_string(),
                    &format!("worker {} notified", worker_id),
                );
            }
            Err(e) => {
                warning(format!(
                    "notification failed for worker {} on contract {}: {}",
                    worker_id, contract.id, e
                ));
                let _ = audit(
                    conn,
                    "notify",
                    &contract.id.to_string(),
                    &format!("worker {} failed: {}", worker_id, e),
                );
            }
        }
    }
}

/// Daily trigger: every non-template contract starting on the tenant-local
/// day of `now` produces one notification per assigned worker.
pub fn send_daily_notifications(
    conn: &Connection,
    now: DateTime<Utc>,
    notifier: &dyn Notifier,
    offset: FixedOffset,
    places: &dyn PlaceLookup,
) -> AppResult<usize> {
    let (from, to) = local_day_bounds(now, offset);
    let starting = contracts_starting_between(conn, from, to)?;
    let mut count = 0;
    for contract in &starting {
        notify_assignment(conn, contract, notifier, offset, places);
        count += contract.worker_ids.len();
    }
    audit(
        conn,
        "notify-daily",
        "",
        &format!("{} contract(s), {} worker notification(s)", starting.len(), count),
    )?;
    Ok(count)
}
