use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::directory::{insert_task, insert_tenant, insert_worker};
use crate::errors::AppResult;
use crate::models::task::TaskStatus;
use crate::ui::messages::success;

/// Handle `tenant`, `worker` and `task` registration. These are fixtures for
/// the scheduling engine; full CRUD for them lives outside this tool.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let pool = open_pool(cfg)?;
    match cmd {
        Commands::Tenant { name } => {
            let id = insert_tenant(&pool.conn, name)?;
            success(format!("tenant {} registered with id {}", name, id));
        }
        Commands::Worker { tenant, name, phone } => {
            let id = insert_worker(&pool.conn, *tenant, name, phone.as_deref())?;
            success(format!("worker {} registered with id {}", name, id));
        }
        Commands::Task { tenant, title } => {
            let id = insert_task(&pool.conn, *tenant, title, TaskStatus::Pending)?;
            success(format!("task {:?} registered with id {}", title, id));
        }
        _ => {}
    }
    Ok(())
}
