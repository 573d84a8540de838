pub mod config;
pub mod contract;
pub mod directory;
pub mod init;
pub mod notify;
pub mod pointage;
pub mod sweep;
pub mod template;
pub mod watch;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::time::{parse_datetime_arg, tenant_offset};
use chrono::{DateTime, FixedOffset, Utc};

/// Open the configured database and make sure the schema is current.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;
    Ok(pool)
}

pub(crate) fn offset_of(cfg: &Config) -> AppResult<FixedOffset> {
    tenant_offset(cfg.utc_offset_minutes)
}

/// The wall clock for this invocation: the hidden `--now` override when
/// present (deterministic tests), the system clock otherwise.
pub(crate) fn resolve_now(cli: &Cli, offset: FixedOffset) -> AppResult<DateTime<Utc>> {
    match &cli.now {
        Some(s) => parse_datetime_arg(s, offset),
        None => Ok(Utc::now()),
    }
}
