//! Storefront-BI CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use sbi_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_export, run_import, run_intake, run_seed, run_sweep, run_sync};
use crate::summary::{
    print_export_summary, print_import_summary, print_sweep_summary, print_sync_summary,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let data_dir = cli.data_dir.clone();
    let result = match &cli.command {
        Command::Intake(args) => run_intake(&data_dir, args).map(|reports| {
            print_import_summary(&reports);
        }),
        Command::Import(args) => run_import(&data_dir, args).map(|reports| {
            print_import_summary(&reports);
        }),
        Command::Sweep(args) => run_sweep(&data_dir, args).map(|report| {
            print_sweep_summary(&report);
        }),
        Command::Sync(args) => run_sync(&data_dir, args).map(|report| {
            print_sync_summary(&report);
        }),
        Command::Export(args) => run_export(&data_dir, args).map(|report| {
            print_export_summary(report.as_ref());
        }),
        Command::SeedDescriptors(args) => run_seed(&data_dir, args).map(|count| {
            println!("Installed {count} descriptor(s).");
        }),
    };

    match result {
        Ok(()) => {}
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    }
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
