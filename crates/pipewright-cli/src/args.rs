//! Command-line argument definitions for the Pipewright CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, rule-table and
//! configuration file selection, report format, and logging verbosity.

use clap::{Parser, ValueEnum};

/// Output format for the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Command-line arguments for the Pipewright import tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input PCF file
    #[arg(help = "Path to the input PCF file")]
    pub input: String,

    /// Path to the rule table (TOML); falls back to the configuration file
    #[arg(short, long)]
    pub rules: Option<String>,

    /// Path to write the run report to (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
