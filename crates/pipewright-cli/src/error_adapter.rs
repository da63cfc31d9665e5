//! Error adapter for converting ImportError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error
//! types and miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! When a [`pipewright_parser::error::ParseError`] contains multiple
//! diagnostics, each diagnostic is rendered independently with its own
//! source snippet.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use pipewright::ImportError;
use pipewright_parser::Span;
use pipewright_parser::error::{Diagnostic, Severity};

/// Adapter for a single parser diagnostic.
///
/// Wraps a [`Diagnostic`] together with the source text and implements
/// [`MietteDiagnostic`] so the CLI can render labeled snippets.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diag.severity() {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for non-diagnostic [`ImportError`] variants.
///
/// Handles errors without rich location information: I/O errors, host
/// errors, and wave-policy errors.
pub struct PlainErrorAdapter<'a> {
    err: &'a ImportError,
}

impl<'a> PlainErrorAdapter<'a> {
    pub fn new(err: &'a ImportError) -> Self {
        Self { err }
    }
}

impl fmt::Debug for PlainErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.err, f)
    }
}

impl fmt::Display for PlainErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.err, f)
    }
}

impl std::error::Error for PlainErrorAdapter<'_> {}

impl MietteDiagnostic for PlainErrorAdapter<'_> {}

/// One renderable report entry.
pub enum Reportable<'a> {
    Diagnostic(DiagnosticAdapter<'a>),
    Plain(PlainErrorAdapter<'a>),
}

impl fmt::Debug for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(adapter) => fmt::Debug::fmt(adapter, f),
            Reportable::Plain(adapter) => fmt::Debug::fmt(adapter, f),
        }
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(adapter) => fmt::Display::fmt(adapter, f),
            Reportable::Plain(adapter) => fmt::Display::fmt(adapter, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(adapter) => adapter.code(),
            Reportable::Plain(adapter) => adapter.code(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(adapter) => adapter.severity(),
            Reportable::Plain(adapter) => adapter.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(adapter) => adapter.help(),
            Reportable::Plain(adapter) => adapter.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(adapter) => adapter.source_code(),
            Reportable::Plain(adapter) => adapter.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(adapter) => adapter.labels(),
            Reportable::Plain(adapter) => adapter.labels(),
        }
    }
}

/// Split an [`ImportError`] into independently renderable diagnostics.
///
/// A parse error expands into one entry per contained diagnostic, each
/// carrying the source text for snippet rendering; every other variant
/// becomes a single plain entry.
pub fn to_reportables(err: &ImportError) -> Vec<Reportable<'_>> {
    match err {
        ImportError::Parse { err, src } => err
            .diagnostics()
            .iter()
            .map(|diag| Reportable::Diagnostic(DiagnosticAdapter::new(diag, src)))
            .collect(),
        other => vec![Reportable::Plain(PlainErrorAdapter::new(other))],
    }
}

fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipewright_parser::error::{ErrorCode, ParseError};

    #[test]
    fn parse_error_expands_per_diagnostic() {
        let parse_err = ParseError::new(vec![
            Diagnostic::error("first").with_code(ErrorCode::E100),
            Diagnostic::error("second").with_label(Span::new(0..4), "here"),
        ]);
        let err = ImportError::new_parse_error(parse_err, "PIPE\n");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "first");
        assert!(reportables[1].labels().is_some());
    }

    #[test]
    fn io_error_is_a_single_plain_entry() {
        let err = ImportError::Io(std::io::Error::other("disk on fire"));
        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert!(reportables[0].to_string().contains("disk on fire"));
    }
}
