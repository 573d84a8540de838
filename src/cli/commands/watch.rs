use crate::cli::commands::offset_of;
use crate::config::Config;
use crate::core::geocache::NoPlaceLookup;
use crate::core::notify::{ConsoleNotifier, send_daily_notifications};
use crate::core::scheduler::Ticker;
use crate::core::terminate::terminate_expired;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{error, info};
use chrono::{Timelike, Utc};
use std::time::Duration;

/// Handle the `watch` command: keep the termination sweep and the daily
/// notification trigger running until the process is interrupted. Each tick
/// opens its own connection so the two sweeps never block one another.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let offset = offset_of(cfg)?;
    let database = cfg.database.clone();
    let sweep_db = database.clone();

    let _sweep = Ticker::every(
        Duration::from_secs(cfg.termination_sweep_minutes * 60),
        move || match DbPool::new(&sweep_db) {
            Ok(pool) => {
                if let Err(e) = terminate_expired(&pool.conn, Utc::now()) {
                    error(format!("termination sweep failed: {}", e));
                }
            }
            Err(e) => error(format!("termination sweep could not open db: {}", e)),
        },
    );

    let notify_hour = cfg.daily_notification_hour;
    let mut last_notified_day = None;
    let _daily = Ticker::every(Duration::from_secs(60), move || {
        let now = Utc::now();
        let local = now.with_timezone(&offset);
        if local.hour() < notify_hour || last_notified_day == Some(local.date_naive()) {
            return;
        }
        match DbPool::new(&database) {
            Ok(pool) => {
                match send_daily_notifications(&pool.conn, now, &ConsoleNotifier, offset, &NoPlaceLookup)
                {
                    Ok(_) => last_notified_day = Some(local.date_naive()),
                    Err(e) => error(format!("daily notifications failed: {}", e)),
                }
            }
            Err(e) => error(format!("daily notifications could not open db: {}", e)),
        }
    });

    info(format!(
        "watching: termination sweep every {} min, notifications daily at {:02}:00 (Ctrl-C to stop)",
        cfg.termination_sweep_minutes, notify_hour
    ));
    // park until interrupted; the tickers own the work
    loop {
        std::thread::sleep(Duration::from_secs(3600));
    }
}
