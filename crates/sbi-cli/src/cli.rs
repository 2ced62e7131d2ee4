//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sbi",
    version,
    about = "Storefront-BI - legacy export intake and default content sync",
    long_about = "Ingest legacy point-of-sale exports (ZIP archives of DBF tables)\n\
                  into the document store, prune expired packets, and keep the\n\
                  default analytics content in step across deployments."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Data directory holding archives, extractions, and the store snapshot.
    #[arg(long = "data-dir", value_name = "DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register an archive as a data packet and import it.
    Intake(IntakeArgs),

    /// Import packets already registered but not yet processed.
    Import(ImportArgs),

    /// Remove packets older than the retention window.
    Sweep(SweepArgs),

    /// Reconcile default analytics content against a catalog directory.
    Sync(SyncArgs),

    /// Export this deployment's default content as a catalog directory.
    Export(ExportArgs),

    /// Install record-kind descriptors from a JSON file.
    SeedDescriptors(SeedArgs),
}

#[derive(Parser)]
pub struct IntakeArgs {
    /// Path to the ZIP archive to register.
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Code page of the legacy tables (for example cp1250).
    #[arg(long = "code-page", value_name = "LABEL")]
    pub code_page: Option<String>,

    /// Register the packet without importing it.
    #[arg(long = "no-import")]
    pub no_import: bool,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Import only this packet; all unprocessed packets when omitted.
    #[arg(value_name = "PACKET")]
    pub packet: Option<String>,

    /// Code page of the legacy tables (for example cp1250).
    #[arg(long = "code-page", value_name = "LABEL")]
    pub code_page: Option<String>,
}

#[derive(Parser)]
pub struct SweepArgs {
    /// Retention window in days (default 30).
    #[arg(long = "retention-days", value_name = "DAYS")]
    pub retention_days: Option<i64>,
}

#[derive(Parser)]
pub struct SyncArgs {
    /// Directory holding workbook.json, query.json, chart.json, dashboard.json.
    #[arg(value_name = "CATALOG_DIR")]
    pub catalog_dir: PathBuf,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Directory to write the catalog files into.
    #[arg(value_name = "CATALOG_DIR")]
    pub catalog_dir: PathBuf,
}

#[derive(Parser)]
pub struct SeedArgs {
    /// JSON file containing an array of kind descriptors.
    #[arg(value_name = "DESCRIPTORS")]
    pub descriptors: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum LogFormatArg {
    #[default]
    Pretty,
    Compact,
    Json,
}
