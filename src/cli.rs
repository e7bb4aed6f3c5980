// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `packhost`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "packhost",
    version,
    about = "Run installed service packs and aggregate their probe results.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the vars file (YAML). Handed to every service pack.
    ///
    /// Default: `config.yml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "config.yml")]
    pub varsfile: String,

    /// Directory holding installed service pack binaries.
    ///
    /// Overrides the vars file and the `PACKHOST_BIN` environment variable.
    #[arg(long, value_name = "PATH")]
    pub binaries_path: Option<String>,

    /// Run every pack installed in the binaries directory, not just those
    /// listed under `Run` in the vars file.
    #[arg(long)]
    pub all: bool,

    /// Ask each service pack for extended output.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PACKHOST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Extra arguments appended verbatim to every pack invocation.
    #[arg(last = true, value_name = "ARGS")]
    pub pack_args: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show installed service packs and which of them are configured to run.
    List,
    /// Print version information for this packhost installation.
    Version,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
