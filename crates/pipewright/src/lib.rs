//! Pipewright - PCF piping-file import pipeline.
//!
//! Parsing, configuration matching, and dependency-ordered creation
//! scheduling for PCF (Piping Component File) sources. The pipeline turns
//! raw text into created elements inside any host implementing
//! [`ModelHost`](pipewright_core::host::ModelHost):
//!
//! ```text
//! Source Text
//!     ↓ segment + index + extract + keyword dictionary (pipewright-parser)
//! ElementCollection (typed attributes)
//!     ↓ rule-table resolution (config)
//! ElementCollection (representations selected)
//!     ↓ wave scheduling (schedule)
//! Host model elements, placeholders cleaned up
//! ```

pub mod config;
pub mod schedule;

mod error;

pub use pipewright_core::{element, geometry, host, report};
pub use pipewright_parser::{ParseOptions, ParseOutcome, UnknownKeywordPolicy};

pub use error::ImportError;

use log::{debug, info};

use pipewright_core::element::ElementCollection;
use pipewright_core::host::ModelHost;
use pipewright_core::report::RunReport;

use config::{ResolutionSummary, RuleTable};
use schedule::WavePolicy;

/// Options for one import run.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// How the keyword dictionary treats unknown keywords.
    pub unknown_keywords: UnknownKeywordPolicy,
    /// Wave membership and ordering for the creation scheduler.
    pub waves: WavePolicy,
}

/// The import pipeline, configured once and reusable across runs.
///
/// Each run builds its own [`ElementCollection`]; the importer holds no
/// per-run state, so separate runs are fully independent.
///
/// # Examples
///
/// ```no_run
/// use pipewright::{Importer, ImportOptions, config::{Rule, RuleTable}};
/// use pipewright::host::MemoryHost;
///
/// let source = std::fs::read_to_string("design.pcf").unwrap();
/// let table = RuleTable::new(vec![
///     Rule::yielding("Pipe Types", "Standard").matching_kind("PIPE"),
/// ]);
///
/// let importer = Importer::new(ImportOptions::default());
/// let mut host = MemoryHost::new();
/// let report = importer.import(&source, &table, &mut host).unwrap();
/// assert!(report.is_clean());
/// ```
#[derive(Debug, Default)]
pub struct Importer {
    options: ImportOptions,
}

impl Importer {
    /// Create a new importer with the given options.
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    /// Parse PCF source into an element collection with typed attributes.
    ///
    /// Pure with respect to the host; a parse failure means no model
    /// mutation has happened or will happen.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Parse`] for structural or keyword errors.
    pub fn parse(&self, source: &str) -> Result<ParseOutcome, ImportError> {
        let options = ParseOptions {
            unknown_keywords: self.options.unknown_keywords,
        };
        let outcome = pipewright_parser::parse(source, &options)
            .map_err(|err| ImportError::new_parse_error(err, source))?;

        debug!(elements = outcome.elements.len(); "source parsed");
        Ok(outcome)
    }

    /// Resolve every physical symbol against the rule table
    /// (first-match-wins; see [`config::resolve_collection`]).
    pub fn resolve(
        &self,
        table: &RuleTable,
        elements: &mut ElementCollection,
    ) -> ResolutionSummary {
        config::resolve_collection(table, elements)
    }

    /// Run the creation waves against a host.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Policy`] for a malformed wave policy and
    /// [`ImportError::Host`] when the host fails outside a wave (group
    /// begin/assimilate); per-element and per-wave failures are reported
    /// in the outcome instead.
    pub fn commit<H: ModelHost>(
        &self,
        elements: &mut ElementCollection,
        host: &mut H,
    ) -> Result<schedule::ScheduleOutcome, ImportError> {
        self.options.waves.validate().map_err(ImportError::Policy)?;
        Ok(schedule::run_waves(host, &self.options.waves, elements)?)
    }

    /// Run the whole pipeline: parse, resolve, commit, report.
    ///
    /// Per-element failures never abort the run; they are aggregated in the
    /// returned [`RunReport`] so one pass over a file yields a complete
    /// diagnosis.
    pub fn import<H: ModelHost>(
        &self,
        source: &str,
        table: &RuleTable,
        host: &mut H,
    ) -> Result<RunReport, ImportError> {
        info!("starting PCF import");

        let ParseOutcome {
            mut elements,
            warnings,
        } = self.parse(source)?;

        let resolution = self.resolve(table, &mut elements);
        let outcome = self.commit(&mut elements, host)?;

        let report = RunReport {
            parsed: elements.len(),
            skipped: resolution.skipped,
            resolved: resolution.resolved,
            created: outcome.created,
            warnings: warnings.iter().map(|diag| diag.to_string()).collect(),
            unresolved: resolution.failures,
            creation_failures: outcome.creation_failures,
            failed_waves: outcome.failed_waves,
            placeholders_deleted: outcome.placeholders_deleted,
            placeholders_dangling: outcome.placeholders_dangling,
        };

        info!(clean = report.is_clean(), created = report.created; "import finished");
        Ok(report)
    }
}
