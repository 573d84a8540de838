use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use rusqlite::Connection;

/// Handle the `init` command: config directory, configuration file and the
/// SQLite database with all pending migrations.
pub fn handle(cli: &Cli) -> AppResult<()> {
    let mut cfg = Config::load();
    if let Some(custom) = &cli.db {
        cfg.database = custom.clone();
    }
    if cli.db.is_none() {
        // only persist the config file for the default database location
        cfg.save()?;
        println!("Config file : {}", Config::config_file().display());
    }
    println!("Database    : {}", &cfg.database);

    let conn = Connection::open(&cfg.database)?;
    init_db(&conn)?;
    success(format!("Database initialized at {}", &cfg.database));

    if let Err(e) = log::audit(&conn, "init", "", "database initialized") {
        warning(format!("failed to write audit log: {}", e));
    }
    Ok(())
}
