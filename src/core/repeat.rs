//! Recurring contract generation: N daily-offset copies of a base contract,
//! duration preserved. A generated day whose start has already passed stops
//! the whole chain (later days would be degenerate too); a schedule conflict
//! skips only that day. Tasks are cloned per generated contract, never shared.

use crate::core::conflict::ensure_no_conflict;
use crate::core::geocache::PlaceLookup;
use crate::core::notify::{Notifier, notify_assignment};
use crate::db::contracts::{
    InsertContract, assign_worker, attach_task, get_contract, insert_contract,
    set_repetition_count,
};
use crate::db::directory::clone_task;
use crate::db::log::audit;
use crate::errors::AppResult;
use crate::models::contract::Contract;
use crate::ui::messages::warning;
use crate::utils::time::local_day;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use rusqlite::Connection;

/// Generate up to `repetition_days` daily siblings of `base`, updating the
/// base contract's repetition count to the number actually created.
/// Returns the generated contracts in day order.
pub fn repeat_contract(
    conn: &Connection,
    base: &Contract,
    repetition_days: i64,
    now: DateTime<Utc>,
    offset: FixedOffset,
    notifier: &dyn Notifier,
    places: &dyn PlaceLookup,
) -> AppResult<Vec<Contract>> {
    let duration = base.duration();
    let mut generated = Vec::new();

    for day in 1..=repetition_days {
        let new_start = base.start_at + Duration::days(day);
        let new_end = new_start + duration;

        if new_start < now {
            warning(format!(
                "repetition of contract {} stopped at day {}: start already in the past",
                base.id, day
            ));
            audit(
                conn,
                "repeat",
                &base.id.to_string(),
                &format!("stopped at day {}: start in the past", day),
            )?;
            break;
        }

        let mut day_failed = false;
        for &worker_id in &base.worker_ids {
            if let Err(e) = ensure_no_conflict(conn, worker_id, new_start, new_end, None, offset)
            {
                warning(format!(
                    "repetition of contract {} skipped day {}: {}",
                    base.id, day, e
                ));
                audit(
                    conn,
                    "repeat",
                    &base.id.to_string(),
                    &format!("day {} skipped: {}", day, e),
                )?;
                day_failed = true;
                break;
            }
        }
        if day_failed {
            continue;
        }

        let sibling_id = insert_contract(
            conn,
            &InsertContract {
                tenant_id: base.tenant_id,
                location: base.location,
                start_at: new_start,
                end_at: new_end,
                description: base.description.as_deref(),
                break_minutes: base.break_minutes,
                is_template: false,
                template_name: None,
            },
        )?;
        for &worker_id in &base.worker_ids {
            assign_worker(conn, sibling_id, worker_id)?;
        }
        for &task_id in &base.task_ids {
            let copy = clone_task(conn, task_id)?;
            attach_task(conn, sibling_id, copy)?;
        }

        let sibling = get_contract(conn, base.tenant_id, sibling_id)?;
        if local_day(sibling.start_at, offset) == local_day(now, offset) {
            notify_assignment(conn, &sibling, notifier, offset, places);
        }
        generated.push(sibling);
    }

    set_repetition_count(conn, base.id, generated.len() as i64)?;
    Ok(generated)
}
