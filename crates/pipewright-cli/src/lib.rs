//! CLI logic for the Pipewright import tool.
//!
//! This module contains the core CLI logic for the Pipewright import tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, ReportFormat};

use std::fs;

use log::info;

use pipewright::host::MemoryHost;
use pipewright::report::RunReport;
use pipewright::{ImportError, ImportOptions, Importer};

/// Run the Pipewright CLI application
///
/// Parses the input PCF file, resolves it against the rule table, executes
/// the creation waves against an in-memory host (a dry run: real hosts
/// integrate through the library's `ModelHost` trait), and writes the run
/// report.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `ImportError` for:
/// - File I/O errors
/// - Configuration or rule-table loading errors
/// - Parsing errors
/// - Host errors outside a wave
pub fn run(args: &Args) -> Result<RunReport, ImportError> {
    info!(input_path = args.input.as_str(); "Processing PCF file");

    // Load configuration and the rule table
    let app_config = config::load_config(args.config.as_ref())?;
    let table = config::load_rule_table(args.rules.as_deref(), &app_config)?;

    // Read input file
    let source = fs::read_to_string(&args.input)?;

    // Run the import pipeline against an in-memory host
    let importer = Importer::new(ImportOptions {
        unknown_keywords: app_config.unknown_keywords(),
        waves: app_config.wave_policy(),
    });
    let mut host = MemoryHost::new();
    let report = importer.import(&source, &table, &mut host)?;

    // Write the report
    let rendered = match args.format {
        ReportFormat::Text => report.to_string(),
        ReportFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|err| ImportError::Io(std::io::Error::other(err)))?,
    };
    match &args.output {
        Some(path) => fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }

    info!(clean = report.is_clean(); "Run report written");
    Ok(report)
}
