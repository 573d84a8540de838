use crate::cli::commands::{offset_of, open_pool, resolve_now};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::contracts::Engine;
use crate::core::geocache::NoPlaceLookup;
use crate::core::notify::ConsoleNotifier;
use crate::core::pointage::PointageRequest;
use crate::errors::AppResult;
use crate::models::point::GeoPoint;
use crate::ui::messages::success;
use crate::utils::time::{format_local, parse_datetime_arg};

/// Handle the `pointage` command: one endpoint for both clock-in and
/// clock-out, disambiguated by the presence of an open record.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Pointage {
        tenant,
        contract,
        worker,
        location,
        note,
        departure,
    } = &cli.command
    else {
        return Ok(());
    };

    let pool = open_pool(cfg)?;
    let offset = offset_of(cfg)?;
    let now = resolve_now(cli, offset)?;
    let notifier = ConsoleNotifier;
    let places = NoPlaceLookup;
    let engine = Engine {
        conn: &pool.conn,
        offset,
        radius_m: cfg.geofence_radius_m,
        notifier: &notifier,
        places: &places,
    };

    let request = PointageRequest {
        worker_id: *worker,
        location: GeoPoint::from_arg(location)?,
        notes: note.clone(),
        departure_at: departure
            .as_deref()
            .map(|s| parse_datetime_arg(s, offset))
            .transpose()?,
    };

    let presence = engine.record_pointage(*tenant, *contract, &request, now)?;
    match presence.departure_at {
        None => success(format!(
            "clock-in recorded for worker {} at {}",
            presence.worker_id,
            format_local(presence.arrival_at, offset)
        )),
        Some(at) => success(format!(
            "clock-out recorded for worker {} at {}",
            presence.worker_id,
            format_local(at, offset)
        )),
    }
    if !presence.notes.is_empty() {
        println!("notes: {}", presence.notes);
    }
    Ok(())
}
