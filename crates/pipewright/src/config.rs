//! Configuration rule table and resolver.
//!
//! The rule table is an externally supplied, ordered set of rows mapping
//! attribute predicates to a concrete [`Representation`]. Resolution is an
//! ordered first-match-wins scan: the first row whose predicates are all
//! satisfied by a symbol's attributes selects that symbol's representation.
//! Row order is significant and preserved exactly as supplied; no
//! specificity ranking happens.
//!
//! Symbols in a sentinel pipeline group, and symbols whose kind is a
//! bookkeeping marker, never reach the rule scan.

use log::{debug, trace};
use serde::Deserialize;

use pipewright_core::element::{ElementCollection, ElementSymbol, Representation};
use pipewright_core::report::SymbolFailure;

/// One row of the rule table: predicates plus the resulting representation.
///
/// A predicate column left out matches anything; all present predicates
/// must hold. `kind` and `group` compare against the PCF marker spelling
/// and the group name respectively.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub skey: Option<String>,
    #[serde(default)]
    pub piping_spec: Option<String>,
    #[serde(default)]
    pub bore: Option<f64>,
    /// The host-side family to instantiate.
    pub family: String,
    /// The specific type/size within the family.
    pub variant: String,
}

impl Rule {
    /// Creates a rule with no predicates that yields the given
    /// representation; narrow it with the `matching_*` builders.
    pub fn yielding(family: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            kind: None,
            group: None,
            skey: None,
            piping_spec: None,
            bore: None,
            family: family.into(),
            variant: variant.into(),
        }
    }

    /// Requires the element kind (PCF marker spelling, e.g. `"CAP"`).
    pub fn matching_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Requires the pipeline group name.
    pub fn matching_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Requires the symbol key.
    pub fn matching_skey(mut self, skey: impl Into<String>) -> Self {
        self.skey = Some(skey.into());
        self
    }

    /// Requires the piping spec.
    pub fn matching_piping_spec(mut self, spec: impl Into<String>) -> Self {
        self.piping_spec = Some(spec.into());
        self
    }

    /// Requires the nominal bore.
    pub fn matching_bore(mut self, bore: f64) -> Self {
        self.bore = Some(bore);
        self
    }

    /// True when every present predicate is satisfied by the symbol.
    pub fn matches(&self, symbol: &ElementSymbol) -> bool {
        let attributes = symbol.attributes();

        if let Some(kind) = &self.kind {
            if symbol.kind().as_marker() != kind {
                return false;
            }
        }
        if let Some(group) = &self.group {
            if symbol.group().name() != group {
                return false;
            }
        }
        if let Some(skey) = &self.skey {
            if attributes.skey.as_deref() != Some(skey.as_str()) {
                return false;
            }
        }
        if let Some(spec) = &self.piping_spec {
            if attributes.piping_spec.as_deref() != Some(spec.as_str()) {
                return false;
            }
        }
        if let Some(bore) = self.bore {
            if attributes.nominal_bore() != Some(bore) {
                return false;
            }
        }
        true
    }

    fn representation(&self) -> Representation {
        Representation {
            family: self.family.clone(),
            variant: self.variant.clone(),
        }
    }
}

/// The ordered rule table. Loaded once per run, read-only during
/// resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleTable {
    #[serde(default, rename = "rule")]
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Result of resolving a whole collection against a rule table.
#[derive(Debug, Default)]
pub struct ResolutionSummary {
    /// Symbols that matched a row.
    pub resolved: usize,
    /// Symbols excluded as non-physical bookkeeping.
    pub skipped: usize,
    /// Symbols no row matched, aggregated for the run report.
    pub failures: Vec<SymbolFailure>,
}

/// Resolves every physical symbol against the rule table.
///
/// Failures are collected per symbol, never fatal: one pass over a file
/// yields every missing rule at once. Symbols left without a
/// representation are skipped by the creation scheduler.
pub fn resolve_collection(
    table: &RuleTable,
    elements: &mut ElementCollection,
) -> ResolutionSummary {
    let mut summary = ResolutionSummary::default();

    for symbol in elements.iter_mut() {
        if !symbol.is_physical() {
            summary.skipped += 1;
            continue;
        }

        // First-match-wins over the rows as supplied.
        match table.rules().iter().find(|rule| rule.matches(symbol)) {
            Some(rule) => {
                trace!(
                    symbol = symbol.index(),
                    family = rule.family.as_str(),
                    variant = rule.variant.as_str();
                    "configuration resolved"
                );
                symbol.set_representation(rule.representation());
                summary.resolved += 1;
            }
            None => {
                summary.failures.push(SymbolFailure {
                    symbol: symbol.index(),
                    kind: symbol.kind().clone(),
                    message: "no rule-table row matches this element".to_string(),
                });
            }
        }
    }

    debug!(
        resolved = summary.resolved,
        skipped = summary.skipped,
        unresolved = summary.failures.len();
        "configuration resolution finished"
    );
    summary
}
