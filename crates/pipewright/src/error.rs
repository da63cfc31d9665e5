//! Error types for Pipewright operations.
//!
//! [`ImportError`] wraps the fatal error conditions of an import run. Per
//! element failures from configuration resolution and creation are not
//! errors; they travel in the [`RunReport`](pipewright_core::report::RunReport).

use std::io;

use thiserror::Error;

use pipewright_core::host::HostError;
use pipewright_parser::error::ParseError;

/// The main error type for Pipewright operations.
///
/// The `Parse` variant keeps the source text alongside the structured
/// diagnostics so callers can render rich error reports with snippets.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("invalid wave policy: {0}")]
    Policy(String),
}

impl ImportError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
