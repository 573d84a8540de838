use crate::cli::commands::{offset_of, open_pool, resolve_now};
use crate::cli::parser::{Cli, Commands, ContractCmd};
use crate::config::Config;
use crate::core::contracts::Engine;
use crate::core::geocache::NoPlaceLookup;
use crate::core::notify::ConsoleNotifier;
use crate::db::contracts::{contracts_for_worker, get_contract, list_contracts};
use crate::db::presences::presences_for_contract;
use crate::errors::{AppError, AppResult};
use crate::models::contract::{ContractPatch, NewContract};
use crate::models::point::GeoPoint;
use crate::ui::messages::success;
use crate::utils::time::{format_local, parse_local_datetime};

/// Handle the `contract` subcommands.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Contract { action } = &cli.command else {
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

    match action {
        ContractCmd::Add {
            tenant,
            location,
            start,
            end,
            description,
            break_minutes,
            workers,
            tasks,
            repeat,
        } => {
            let request = NewContract {
                location: GeoPoint::from_arg(location)?,
                start_at: parse_local_datetime(start, offset)?,
                end_at: parse_local_datetime(end, offset)?,
                description: description.clone(),
                break_minutes: *break_minutes,
                worker_ids: workers.clone(),
                task_ids: tasks.clone(),
                repetition_days: *repeat,
            };
            let created = engine.create_contract(*tenant, &request, now)?;
            for contract in &created {
                success(format!(
                    "contract {} created [{} .. {}]",
                    contract.id,
                    format_local(contract.start_at, offset),
                    format_local(contract.end_at, offset)
                ));
            }
            success(format!("{} contract(s) created", created.len()));
        }

        ContractCmd::Update {
            tenant,
            id,
            location,
            start,
            end,
            description,
            break_minutes,
            workers,
            tasks,
        } => {
            let patch = ContractPatch {
                location: location.as_deref().map(GeoPoint::from_arg).transpose()?,
                start_at: start
                    .as_deref()
                    .map(|s| parse_local_datetime(s, offset))
                    .transpose()?,
                end_at: end
                    .as_deref()
                    .map(|s| parse_local_datetime(s, offset))
                    .transpose()?,
                description: description.clone(),
                break_minutes: *break_minutes,
                worker_ids: if workers.is_empty() { None } else { Some(workers.clone()) },
                task_ids: if tasks.is_empty() { None } else { Some(tasks.clone()) },
            };
            let updated = engine.update_contract(*tenant, *id, &patch)?;
            success(format!(
                "contract {} updated [{} .. {}]",
                updated.id,
                format_local(updated.start_at, offset),
                format_local(updated.end_at, offset)
            ));
        }

        ContractCmd::List { tenant, worker } => {
            let listed = match worker {
                Some(worker_id) => contracts_for_worker(&pool.conn, *worker_id)?
                    .into_iter()
                    .filter(|c| c.tenant_id == *tenant && !c.is_template)
                    .collect(),
                None => list_contracts(&pool.conn, *tenant)?,
            };
            for contract in listed {
                println!(
                    "{} | {} .. {} | workers {:?} | rep {}",
                    contract.id,
                    format_local(contract.start_at, offset),
                    format_local(contract.end_at, offset),
                    contract.worker_ids,
                    contract.repetition_count
                );
            }
        }

        ContractCmd::Show { tenant, id } => {
            let contract = get_contract(&pool.conn, *tenant, *id)?;
            let json = serde_json::to_string_pretty(&contract)
                .map_err(|e| AppError::Other(e.to_string()))?;
            println!("{}", json);
        }

        ContractCmd::Del { tenant, id } => {
            engine.remove_contract(*tenant, *id)?;
            success(format!("contract {} deleted", id));
        }

        ContractCmd::Presences { tenant, id } => {
            get_contract(&pool.conn, *tenant, *id)?;
            let presences = presences_for_contract(&pool.conn, *id)?;
            let json = serde_json::to_string_pretty(&presences)
                .map_err(|e| AppError::Other(e.to_string()))?;
            println!("{}", json);
        }
    }

    Ok(())
}
