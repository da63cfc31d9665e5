//! End-of-run reporting.
//!
//! Per-element failures from configuration resolution and creation are never
//! fatal; they are collected here so one pass over a file yields a complete
//! diagnosis. The report serializes to JSON for tooling and renders as text
//! for terminals.

use std::fmt;

use serde::Serialize;

use crate::element::ElementKind;
use crate::host::ElementHandle;

/// A non-fatal failure attached to the symbol that caused it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolFailure {
    /// File-local index of the offending symbol.
    pub symbol: usize,
    pub kind: ElementKind,
    pub message: String,
}

impl fmt::Display for SymbolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element {} ({}): {}", self.symbol, self.kind, self.message)
    }
}

/// Summary of one import run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// Number of element symbols parsed from the file.
    pub parsed: usize,
    /// Symbols excluded from resolution and creation (sentinel groups,
    /// pipeline references, headers, material entries).
    pub skipped: usize,
    /// Symbols that matched a rule-table row.
    pub resolved: usize,
    /// Elements successfully created in the host.
    pub created: usize,
    /// Unknown-keyword warnings carried over from parsing.
    pub warnings: Vec<String>,
    /// Symbols no rule-table row matched.
    pub unresolved: Vec<SymbolFailure>,
    /// Symbols the host refused to create.
    pub creation_failures: Vec<SymbolFailure>,
    /// Wave scopes the host failed to commit.
    pub failed_waves: Vec<String>,
    /// Placeholders deleted during cleanup.
    pub placeholders_deleted: usize,
    /// Placeholders cleanup could not delete, still visible in the model.
    pub placeholders_dangling: Vec<ElementHandle>,
}

impl RunReport {
    /// True when every physical symbol resolved, every creation succeeded,
    /// every wave committed, and no placeholder is left dangling.
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
            && self.creation_failures.is_empty()
            && self.failed_waves.is_empty()
            && self.placeholders_dangling.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "parsed elements:      {}", self.parsed)?;
        writeln!(f, "skipped (bookkeeping): {}", self.skipped)?;
        writeln!(f, "resolved:             {}", self.resolved)?;
        writeln!(f, "created:              {}", self.created)?;
        writeln!(f, "placeholders deleted: {}", self.placeholders_deleted)?;

        if !self.warnings.is_empty() {
            writeln!(f, "warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "  - {warning}")?;
            }
        }
        if !self.unresolved.is_empty() {
            writeln!(f, "unresolved configuration:")?;
            for failure in &self.unresolved {
                writeln!(f, "  - {failure}")?;
            }
        }
        if !self.creation_failures.is_empty() {
            writeln!(f, "creation failures:")?;
            for failure in &self.creation_failures {
                writeln!(f, "  - {failure}")?;
            }
        }
        if !self.failed_waves.is_empty() {
            writeln!(f, "waves that failed to commit:")?;
            for wave in &self.failed_waves {
                writeln!(f, "  - {wave}")?;
            }
        }
        if !self.placeholders_dangling.is_empty() {
            writeln!(f, "dangling placeholders:")?;
            for handle in &self.placeholders_dangling {
                writeln!(f, "  - {handle}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report() {
        let report = RunReport {
            parsed: 4,
            skipped: 2,
            resolved: 2,
            created: 2,
            ..RunReport::default()
        };
        assert!(report.is_clean());
    }

    #[test]
    fn dangling_placeholder_is_not_clean() {
        let report = RunReport {
            placeholders_dangling: vec![ElementHandle::new(7)],
            ..RunReport::default()
        };
        assert!(!report.is_clean());
        assert!(report.to_string().contains("#7"));
    }
}
