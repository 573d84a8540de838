use crate::cli::commands::{offset_of, open_pool};
use crate::cli::parser::{Cli, Commands, TemplateCmd};
use crate::config::Config;
use crate::core::contracts::Engine;
use crate::core::geocache::NoPlaceLookup;
use crate::core::notify::ConsoleNotifier;
use crate::db::contracts::list_templates;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::time::{format_local, parse_local_datetime};

/// Handle the `template` subcommands.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Template { action } = &cli.command else {
        return Ok(());
    };

    let pool = open_pool(cfg)?;
    let offset = offset_of(cfg)?;
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
        TemplateCmd::Save { tenant, contract, name } => {
            let template = engine.save_as_template(*tenant, *contract, name)?;
            success(format!("template {:?} saved with id {}", name, template.id));
        }

        TemplateCmd::Use { tenant, template, workers, start, end } => {
            let start_at = start
                .as_deref()
                .map(|s| parse_local_datetime(s, offset))
                .transpose()?;
            let end_at = end
                .as_deref()
                .map(|s| parse_local_datetime(s, offset))
                .transpose()?;
            let created =
                engine.create_from_template(*tenant, *template, workers, start_at, end_at)?;
            for contract in &created {
                success(format!(
                    "contract {} created for worker {} [{} .. {}]",
                    contract.id,
                    contract.worker_ids.first().copied().unwrap_or_default(),
                    format_local(contract.start_at, offset),
                    format_local(contract.end_at, offset)
                ));
            }
        }

        TemplateCmd::List { tenant } => {
            for template in list_templates(&pool.conn, *tenant)? {
                println!(
                    "{} | {} | {} .. {}",
                    template.id,
                    template.template_name.as_deref().unwrap_or("-"),
                    format_local(template.start_at, offset),
                    format_local(template.end_at, offset)
                );
            }
        }
    }

    Ok(())
}
