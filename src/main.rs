use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;
mod client;
mod commands;
mod config;
mod dates;
mod error;
mod response;
mod service;
mod target;
mod task;
mod url;

use cli::{Cli, Commands};
use config::{Config, LogLevel};

fn setup_logging(log_level: &LogLevel) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zendesk-input")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("zendesk-input.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(match log_level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        });
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Url { page, preview } => commands::url::run(page, preview, &config),
        Commands::Fetch {
            page,
            preview,
            path,
            records,
            format,
        } => commands::fetch::run(
            commands::fetch::FetchOptions {
                page,
                preview,
                path,
                records,
                format: cli::OutputFormat::resolve(format),
            },
            &config,
        ),
        Commands::Subresource { id, name, format } => {
            commands::subresource::run(id, &name, cli::OutputFormat::resolve(format), &config)
        }
        Commands::Check => commands::check::run(&config),
        Commands::Targets { format } => commands::targets::run(cli::OutputFormat::resolve(format)),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref())
        .context("Failed to load configuration")?
        .with_overrides(cli.overrides());

    let log_level = if cli.verbose { LogLevel::Debug } else { config.log_level };
    setup_logging(&log_level).context("Failed to setup logging")?;

    info!("Starting zendesk-input with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
