use crate::cli::commands::{offset_of, open_pool, resolve_now};
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::terminate::terminate_expired;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `sweep` command: run the auto-termination pass once.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let pool = open_pool(cfg)?;
    let offset = offset_of(cfg)?;
    let now = resolve_now(cli, offset)?;

    let closed = terminate_expired(&pool.conn, now)?;
    success(format!("sweep complete: {} presence record(s) closed", closed));
    Ok(())
}
