//! Quire CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use quire_cli::commands;
use quire_cli::logging::{LogConfig, LogFormat, init_logging};
use quire_cli::session::Session;
use quire_document::{DocumentError, Settings};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::summary::{print_inspect, print_saved, print_types};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(error) => {
            tracing::error!("{error:#}");
            eprintln!("error: {error:#}");
            if let Some(suggestion) = suggestion_for(&error) {
                eprintln!("hint: {suggestion}");
            }
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = load_settings(&cli)?;
    match cli.command {
        Command::Inspect { path } => {
            let session = Session::new(settings)?;
            print_inspect(&commands::inspect(&session, &path)?);
        }
        Command::Export(args) => {
            let session = Session::new(settings)?;
            let saved = commands::export(&session, &args.path, &args.output, args.type_tag.as_deref())?;
            print_saved(&saved);
        }
        Command::Resave(args) => {
            if args.backup {
                settings.documents.keep_backup = true;
            }
            let session = Session::new(settings)?;
            print_saved(&commands::resave(&session, &args.path)?);
        }
        Command::Create { path } => {
            let session = Session::new(settings)?;
            print_saved(&commands::create(&session, &path)?);
        }
        Command::Types => {
            let session = Session::new(settings)?;
            print_types(&commands::list_types(&session));
        }
    }
    Ok(())
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(Settings::load()),
    }
}

fn suggestion_for(error: &anyhow::Error) -> Option<String> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<DocumentError>())
        .and_then(DocumentError::suggestion)
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
