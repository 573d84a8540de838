//! The clock-in/clock-out state machine. One entry point serves both
//! transitions: the existence of an open presence record decides whether a
//! call is an arrival or a departure.
//!
//! States per (worker, contract, calendar day): NoRecord → Arrived → Completed.

use crate::core::geo::distance_meters;
use crate::db::directory::is_worker_in_tenant;
use crate::db::presences::{
    close_presence, get_presence, insert_presence, open_presence, presence_for_day,
};
use crate::db::contracts::get_contract;
use crate::errors::{AppError, AppResult};
use crate::models::contract::Contract;
use crate::models::point::GeoPoint;
use crate::models::presence::Presence;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use rusqlite::Connection;

#[derive(Debug, Clone)]
pub struct PointageRequest {
    pub worker_id: i64,
    pub location: GeoPoint,
    pub notes: Option<String>,
    /// Explicit departure time for the clock-out transition; `now` otherwise.
    pub departure_at: Option<DateTime<Utc>>,
}

/// Spell a positive minute count as "H hour(s) and M minute(s)", dropping
/// the hour clause at zero hours and the minute clause at zero minutes.
fn spell_minutes(total: i64) -> String {
    let hours = total / 60;
    let minutes = total % 60;
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{} hour{}", hours, if hours > 1 { "s" } else { "" }));
        if minutes > 0 {
            out.push_str(&format!(
                " and {} minute{}",
                minutes,
                if minutes > 1 { "s" } else { "" }
            ));
        }
    } else {
        out.push_str(&format!("{} minute{}", minutes, if minutes > 1 { "s" } else { "" }));
    }
    out
}

/// Today's instant carrying the time-of-day of `scheduled`, in tenant time.
/// Lateness and overtime always compare against the schedule projected onto
/// the calendar day of the punch, not the contract's original date.
fn scheduled_today(
    scheduled: DateTime<Utc>,
    at: DateTime<Utc>,
    offset: FixedOffset,
) -> DateTime<Utc> {
    let day = at.with_timezone(&offset).date_naive();
    let tod = scheduled.with_timezone(&offset).time();
    offset
        .from_local_datetime(&day.and_time(tod))
        .single()
        .unwrap_or_else(|| at.with_timezone(&offset))
        .with_timezone(&Utc)
}

fn minutes_offset(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    crate::utils::time::minutes_between(from, to)
}

/// Record a pointage: clock-in when no open record exists, clock-out
/// otherwise. Fails before any state check when the contract does not cover
/// `now`, and before any write when the geofence is violated.
pub fn record_pointage(
    conn: &Connection,
    tenant_id: i64,
    contract_id: i64,
    request: &PointageRequest,
    now: DateTime<Utc>,
    radius_m: f64,
    offset: FixedOffset,
) -> AppResult<Presence> {
    let contract = get_contract(conn, tenant_id, contract_id)?;

    if !contract.is_active_at(now) {
        return Err(AppError::NoActiveContract);
    }

    if !contract.worker_ids.contains(&request.worker_id) {
        return Err(AppError::NotAssigned {
            worker_id: request.worker_id,
            contract_id,
        });
    }

    if !is_worker_in_tenant(conn, request.worker_id, tenant_id)? {
        return Err(AppError::NotFound("Worker", request.worker_id));
    }

    let measured = distance_meters(request.location, contract.location);
    if measured > radius_m {
        return Err(AppError::OutOfRange {
            measured_m: measured.round() as i64,
            allowed_m: radius_m.round() as i64,
        });
    }

    match open_presence(conn, request.worker_id, contract_id)? {
        Some(open) => clock_out(conn, &contract, open, request, now, offset),
        None => clock_in(conn, &contract, request, now, offset),
    }
}

fn clock_in(
    conn: &Connection,
    contract: &Contract,
    request: &PointageRequest,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> AppResult<Presence> {
    let day = now.with_timezone(&offset).date_naive();

    if presence_for_day(conn, request.worker_id, contract.id, day)?.is_some() {
        return Err(AppError::AlreadyPointedToday {
            worker_id: request.worker_id,
            contract_id: contract.id,
        });
    }

    let mut presence = Presence {
        id: 0,
        worker_id: request.worker_id,
        contract_id: contract.id,
        day,
        arrival_at: now,
        arrival_location: request.location,
        departure_at: None,
        departure_location: None,
        notes: request.notes.clone().unwrap_or_default(),
    };

    let delay = minutes_offset(scheduled_today(contract.start_at, now, offset), now);
    if delay > 0 {
        presence.push_note(&format!("Arrival with {} of delay.", spell_minutes(delay)));
    }

    let id = insert_presence(conn, &presence)?;
    get_presence(conn, id)
}

fn clock_out(
    conn: &Connection,
    contract: &Contract,
    mut presence: Presence,
    request: &PointageRequest,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> AppResult<Presence> {
    let departure_at = request.departure_at.unwrap_or(now);
    presence.departure_at = Some(departure_at);
    presence.departure_location = Some(request.location);

    let scheduled_end = scheduled_today(contract.end_at, departure_at, offset);
    let diff = minutes_offset(scheduled_end, departure_at);
    if diff < 0 {
        presence.push_note(&format!(
            "Early departure of {} before scheduled end.",
            spell_minutes(-diff)
        ));
    } else if diff > 0 {
        presence.push_note(&format!("Overtime performed: {}.", spell_minutes(diff)));
    }

    close_presence(conn, &presence)?;
    get_presence(conn, presence.id)
}
