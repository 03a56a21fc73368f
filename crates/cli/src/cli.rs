//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::Action;
use observability::LogFormat;
use std::path::PathBuf;

/// Bulk Loader - stream NDJSON documents into a bulk endpoint
#[derive(Parser, Debug)]
#[command(
    name = "bulk-loader",
    author,
    version,
    about = "Concurrent NDJSON bulk loader",
    long_about = "Reads one JSON document per line and writes them through a pool of \n\
                  batching workers to a bulk HTTP endpoint, reporting per-action \n\
                  statistics when the input is exhausted or the run is interrupted."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BULK_LOADER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (json, pretty, compact)
    #[arg(
        long,
        default_value = "pretty",
        global = true,
        env = "BULK_LOADER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load an NDJSON file through the bulk indexer
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "bulk.toml",
        env = "BULK_LOADER_CONFIG"
    )]
    pub config: PathBuf,

    /// NDJSON input, one document per line
    #[arg(short, long, env = "BULK_LOADER_INPUT")]
    pub input: PathBuf,

    /// Bulk action applied to every document
    #[arg(long, value_enum, default_value = "index")]
    pub action: ActionArg,

    /// Top-level document field used as the document id
    #[arg(long, env = "BULK_LOADER_ID_FIELD")]
    pub id_field: Option<String>,

    /// Override the endpoint URL from configuration
    #[arg(long, env = "BULK_LOADER_URL")]
    pub url: Option<String>,

    /// Override the default index from configuration
    #[arg(long, env = "BULK_LOADER_INDEX")]
    pub index: Option<String>,

    /// Override the worker count (0 = number of CPUs)
    #[arg(long, env = "BULK_LOADER_WORKERS")]
    pub workers: Option<usize>,

    /// Seconds to wait for workers to drain after input ends or Ctrl+C
    #[arg(long, default_value = "30", env = "BULK_LOADER_CLOSE_TIMEOUT")]
    pub close_timeout: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "BULK_LOADER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "bulk.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Bulk action selectable on the command line
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionArg {
    Create,
    #[default]
    Index,
    Update,
    Delete,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Create => Action::Create,
            ActionArg::Index => Action::Index,
            ActionArg::Update => Action::Update,
            ActionArg::Delete => Action::Delete,
        }
    }
}
