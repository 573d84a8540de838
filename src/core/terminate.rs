//! Auto-termination sweep. Every contract whose end has passed gets its
//! dangling open presences closed at `now`, with the departure location
//! copied from the arrival since no real location is known for a forced
//! closure. The only guard is "departure is null", which makes reruns
//! idempotent: an already-closed record is never touched again.

use crate::db::contracts::expired_contracts;
use crate::db::log::audit;
use crate::db::presences::{close_presence, open_presences_for_contract};
use crate::errors::AppResult;
use crate::ui::messages::info;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

pub const AUTO_STOP_NOTE: &str =
    "Contract automatically stopped by the system at the scheduled time.";

/// Close all open presences on expired, non-template contracts.
/// Returns the number of records closed by this run.
pub fn terminate_expired(conn: &Connection, now: DateTime<Utc>) -> AppResult<usize> {
    let mut closed = 0;

    for contract in expired_contracts(conn, now)? {
        let open = open_presences_for_contract(conn, contract.id)?;
        if open.is_empty() {
            continue;
        }
        for mut presence in open {
            presence.departure_at = Some(now);
            presence.departure_location = Some(presence.arrival_location);
            presence.push_note(AUTO_STOP_NOTE);
            close_presence(conn, &presence)?;
            closed += 1;
        }
        info(format!("contract {} terminated automatically", contract.id));
    }

    audit(conn, "sweep", "", &format!("{} presence record(s) closed", closed))?;
    Ok(closed)
}
