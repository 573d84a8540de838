use crate::cli::commands::{offset_of, open_pool, resolve_now};
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::geocache::NoPlaceLookup;
use crate::core::notify::{ConsoleNotifier, send_daily_notifications};
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `notify-daily` command: run the daily trigger once.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let pool = open_pool(cfg)?;
    let offset = offset_of(cfg)?;
    let now = resolve_now(cli, offset)?;

    let count =
        send_daily_notifications(&pool.conn, now, &ConsoleNotifier, offset, &NoPlaceLookup)?;
    success(format!("{} worker notification(s) attempted", count));
    Ok(())
}
