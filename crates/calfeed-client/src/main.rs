//! calfeed CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use calfeed_client::cli::{Cli, Command, ConfigAction};
use calfeed_client::commands;
use calfeed_client::commands::events::EventsOptions;
use calfeed_client::commands::export::ExportOptions;
use calfeed_client::config::ClientConfig;
use calfeed_client::error::ClientResult;
use calfeed_core::agenda::{Language, MonthsMode};
use calfeed_core::tracing::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match config.log.tracing_config(cli.debug) {
        Ok(tracing_config) => {
            if let Err(e) = init_tracing(tracing_config) {
                eprintln!("warning: {}", e);
            }
        }
        Err(e) => eprintln!("warning: {}", e),
    }

    let lang = cli
        .lang
        .as_deref()
        .map_or(config.display.lang, Language::from_code);

    match run(cli, &config, &config_path, lang).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = %e, "Command failed");
            eprintln!("error: {}", e.user_message(lang));
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    match cli.config {
        Some(ref path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    }
}

async fn run(cli: Cli, config: &ClientConfig, config_path: &std::path::Path, lang: Language) -> ClientResult<()> {
    match cli.command {
        Command::Events {
            source,
            year,
            months,
            flat,
            json,
        } => {
            let options = EventsOptions {
                source: config.resolve_source(source)?,
                year,
                months: months.map_or(config.display.months, |name| MonthsMode::from_name(&name)),
                lang,
                group_by_month: config.display.group_by_month && !flat,
                json,
            };
            commands::events::run(config, options).await
        }
        Command::Export {
            source,
            uid,
            start,
            year,
        } => {
            let options = ExportOptions {
                source: config.resolve_source(source)?,
                uid,
                start,
                year,
            };
            commands::export::run(config, options).await
        }
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(config, config_path),
            ConfigAction::Validate => commands::config::validate(config),
            ConfigAction::Path => commands::config::path(config_path),
        },
    }
}
