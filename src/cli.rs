// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `readqc`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "readqc",
    version,
    about = "Run FaQCs over paired read files as a dependency-ordered task graph.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `ReadQC.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "ReadQC.toml")]
    pub config: String,

    /// Restrict the run to these samples (may be repeated).
    #[arg(long = "sample", value_name = "NAME")]
    pub samples: Vec<String>,

    /// Override `[config].workers` (concurrent task actions).
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `READQC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task plan, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
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
