//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// MQ Dispatcher - dual-cluster message dispatch tier
#[derive(Parser, Debug)]
#[command(
    name = "mq-dispatcher",
    author,
    version,
    about = "Dual-cluster message-queue dispatch tier",
    long_about = "The reliability core of a message-queue dispatch tier.\n\n\
                  Consumes logical queues redundantly from two broker clusters, \n\
                  routes acknowledgments back to the delivering cluster, and \n\
                  persists ingress messages through a tiered-durability write path."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MQ_DISPATCHER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MQ_DISPATCHER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the dispatch pipeline against an in-process broker pair
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "dispatch.toml",
        env = "MQ_DISPATCHER_CONFIG"
    )]
    pub config: PathBuf,

    /// Number of synthetic messages to push through the pipeline
    #[arg(long, default_value = "20", env = "MQ_DISPATCHER_MESSAGE_COUNT")]
    pub message_count: u64,

    /// Drain timeout in seconds (0 = default)
    #[arg(long, default_value = "0", env = "MQ_DISPATCHER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "MQ_DISPATCHER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "dispatch.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "dispatch.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed binding information
    #[arg(long)]
    pub bindings: bool,

    /// Show store configuration
    #[arg(long)]
    pub stores: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
