//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;
use crate::logging::LogLevel;

/// Authenticated HTTP gateway in front of an Ollama server.
#[derive(Parser)]
#[command(name = "prompt-gateway")]
#[command(about = "Authenticated HTTP gateway for Ollama")]
#[command(version)]
pub struct Cli {
    /// Log level (ignored when RUST_LOG is set)
    #[arg(
        short = 'L',
        long = "loglevel",
        global = true,
        value_enum,
        ignore_case = true,
        default_value = "INFO"
    )]
    pub loglevel: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}
