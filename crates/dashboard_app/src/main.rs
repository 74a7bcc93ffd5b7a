mod cli;
mod commands;
mod config;
mod effects;
mod render;
mod upload;
mod view;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dashboard_core::{Job, Worker};
use dashboard_engine::SessionSettings;
use dashboard_logging::{dash_info, LogDestination};
use log::LevelFilter;

use cli::{Cli, Command, ViewArgs};
use config::{load_config, DashboardConfig, DEFAULT_CONFIG_FILE};
use view::{run_view, ViewOptions};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let destination = cli.log.map(LogDestination::from).unwrap_or(config.log);
    dashboard_logging::initialize(destination, LevelFilter::Info);
    dash_info!("dashboard {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Jobs(args) => {
            let options = view_options(&config, args, &config.job_url);
            run_view::<Job>(options)
        }
        Command::Workers(args) => {
            let options = view_options(&config, args, &config.worker_url);
            run_view::<Worker>(options)
        }
        Command::Upload(args) => upload::run_upload(&config, args),
    }
}

fn view_options(config: &DashboardConfig, args: ViewArgs, default_url: &str) -> ViewOptions {
    let reconnect = match (&config.reconnect, args.reconnect) {
        (Some(settings), _) => Some(settings.to_config()),
        (None, true) => Some(config::ReconnectSettings::default().to_config()),
        (None, false) => None,
    };

    ViewOptions {
        url: args.url.unwrap_or_else(|| default_url.to_string()),
        page: args.page,
        limit: args.limit.unwrap_or(config.default_limit).max(1),
        sort: args.sort,
        session: SessionSettings {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            reconnect,
        },
    }
}
