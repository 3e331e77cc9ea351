//! CaseLinker Control - CLI and interactive panel for the scan service

use anyhow::{Context, Result};
use caselink_common::{ClientConfig, ScanClient};
use caselinkctl::cli::{Cli, Commands, ConfigCommands};
use caselinkctl::commands;
use caselinkctl::errors;
use caselinkctl::logging::{self, LogTarget};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::debug;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(errors::exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    let target = if interactive {
        LogTarget::File
    } else {
        LogTarget::Stderr
    };
    // A panel without a log file is still usable
    if let Err(e) = logging::init(target) {
        if !interactive {
            return Err(e);
        }
    }

    let config = load_config(&cli)?;
    debug!("using scan service at {}", config.backend.url);

    let Some(command) = cli.command else {
        return caselinkctl::tui::run(&config).await;
    };

    let client = ScanClient::from_config(&config)?;
    match command {
        Commands::Tui => caselinkctl::tui::run(&config).await,
        Commands::Status { json } => commands::status::run(&client, json).await,
        Commands::Watch {
            interval_ms,
            until_idle,
        } => commands::watch::run(&client, &config, interval_ms, until_idle).await,
        Commands::Start(args) => {
            commands::start::run(&client, &args, config.scan.duration_hours).await
        }
        Commands::Results {
            json,
            view,
            svg,
            backend_view,
        } => {
            commands::results::run(&client, json, view, svg.as_deref(), backend_view.as_deref())
                .await
        }
        Commands::Config { action } => match action {
            ConfigCommands::Show { json } => commands::config::show(&client, json).await,
            ConfigCommands::Set {
                csv,
                threshold,
                year_window,
                geo_window,
                sample_limit,
            } => {
                let args = commands::config::SetArgs {
                    csv,
                    threshold,
                    year_window,
                    geo_window,
                    sample_limit,
                };
                commands::config::set(&client, args).await
            }
        },
        Commands::Test {
            csv,
            sample_limit,
            json,
        } => commands::test::run(&client, csv.as_deref(), sample_limit, json).await,
        Commands::Case { id, json } => commands::case::run(&client, &id, json).await,
    }
}

/// Config file, then `--backend` on top
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("Failed to load client config")?;
    if let Some(url) = &cli.backend {
        config.backend.url = url.clone();
        config.validate()?;
    }
    Ok(config)
}
