//! shiftpoint library root.
//! Exposes the CLI parser, the high-level run() function and the internal
//! modules of the scheduling-and-attendance engine.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Tenant { .. } | Commands::Worker { .. } | Commands::Task { .. } => {
            cli::commands::directory::handle(&cli.command, cfg)
        }
        Commands::Contract { .. } => cli::commands::contract::handle(cli, cfg),
        Commands::Template { .. } => cli::commands::template::handle(cli, cfg),
        Commands::Pointage { .. } => cli::commands::pointage::handle(cli, cfg),
        Commands::Sweep => cli::commands::sweep::handle(cli, cfg),
        Commands::NotifyDaily => cli::commands::notify::handle(cli, cfg),
        Commands::Watch => cli::commands::watch::handle(cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // load config once; apply the optional DB override from the command line
    let mut cfg = Config::load();
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    dispatch(&cli, &cfg)
}
