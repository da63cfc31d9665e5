//! Dependency-ordered, multi-wave creation scheduling.
//!
//! Certain element kinds cannot be created until others already exist in
//! the host: caps, blind flanges, and olets attach to an already-placed run
//! of pipe, and valves insert into an already-continuous line. The
//! scheduler therefore partitions the collection into ordered waves by
//! kind, commits each wave in its own transactional scope, and finishes
//! with a cleanup scope that deletes every placeholder recorded along the
//! way.
//!
//! Wave membership is policy, not constants: [`WavePolicy::standard`]
//! reproduces the classic four-wave order, and a deserialized policy can
//! reorder or regroup kinds as long as it stays well-formed
//! ([`WavePolicy::validate`]).

use log::{debug, error, info, warn};
use serde::Deserialize;

use pipewright_core::element::{ElementCollection, ElementKind};
use pipewright_core::host::{CreatedElement, ElementHandle, ModelHost};
use pipewright_core::report::SymbolFailure;

/// One wave: a name (used as the transaction scope label) and the kinds it
/// claims. A wave with `remainder = true` claims every kind not named by
/// any other wave.
#[derive(Debug, Clone, Deserialize)]
pub struct Wave {
    pub name: String,
    #[serde(default)]
    pub kinds: Vec<String>,
    #[serde(default)]
    pub remainder: bool,
}

impl Wave {
    /// A wave claiming the listed kinds (PCF marker spellings).
    pub fn kinds(name: impl Into<String>, kinds: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            name: name.into(),
            kinds: kinds.into_iter().map(str::to_string).collect(),
            remainder: false,
        }
    }

    /// A wave claiming every kind not named elsewhere.
    pub fn remainder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kinds: Vec::new(),
            remainder: true,
        }
    }
}

/// The ordered wave table.
#[derive(Debug, Clone, Deserialize)]
pub struct WavePolicy {
    #[serde(default, rename = "wave")]
    waves: Vec<Wave>,
}

impl WavePolicy {
    pub fn new(waves: Vec<Wave>) -> Self {
        Self { waves }
    }

    /// The four-wave order: routed pipes first, then everything
    /// unclaimed, then host-attached terminals, then inline valves.
    pub fn standard() -> Self {
        Self::new(vec![
            Wave::kinds("pipes", ["PIPE"]),
            Wave::remainder("fittings"),
            Wave::kinds("terminals", ["CAP", "FLANGE-BLIND", "OLET"]),
            Wave::kinds("inline", ["VALVE", "VALVE-ANGLE"]),
        ])
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Checks the policy is well-formed: at least one wave, at most one
    /// remainder wave, every wave claims something, and no kind is claimed
    /// twice.
    pub fn validate(&self) -> Result<(), String> {
        if self.waves.is_empty() {
            return Err("wave policy has no waves".to_string());
        }
        if self.waves.iter().filter(|w| w.remainder).count() > 1 {
            return Err("wave policy has more than one remainder wave".to_string());
        }
        let mut claimed: Vec<&str> = Vec::new();
        for wave in &self.waves {
            if !wave.remainder && wave.kinds.is_empty() {
                return Err(format!("wave '{}' claims no kinds", wave.name));
            }
            for kind in &wave.kinds {
                if claimed.contains(&kind.as_str()) {
                    return Err(format!("kind '{kind}' is claimed by more than one wave"));
                }
                claimed.push(kind);
            }
        }
        Ok(())
    }

    /// True when the wave at `position` claims the given kind.
    fn claims(&self, position: usize, kind: &ElementKind) -> bool {
        let wave = &self.waves[position];
        if wave.remainder {
            !self
                .waves
                .iter()
                .any(|other| other.kinds.iter().any(|k| k == kind.as_marker()))
        } else {
            wave.kinds.iter().any(|k| k == kind.as_marker())
        }
    }
}

impl Default for WavePolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// What the scheduler did: counts plus every non-fatal failure.
#[derive(Debug, Default)]
pub struct ScheduleOutcome {
    pub created: usize,
    pub creation_failures: Vec<SymbolFailure>,
    pub failed_waves: Vec<String>,
    pub placeholders_deleted: usize,
    pub placeholders_dangling: Vec<ElementHandle>,
}

/// Realizes every resolved, physical element in the host, wave by wave.
///
/// Within a wave, creation follows the original file order. An individual
/// creation failure is recorded and the wave continues; there are no
/// retries. A wave whose scope fails to open or commit is recorded in
/// `failed_waves` and does not roll back earlier, already-committed waves.
/// After all waves, a final scope deletes every recorded placeholder.
///
/// Results of a wave (created handles, placeholders to delete) are applied
/// to the symbols only once the wave's scope has committed, so a failed
/// commit leaves the collection consistent with the host.
pub fn run_waves<H: ModelHost>(
    host: &mut H,
    policy: &WavePolicy,
    elements: &mut ElementCollection,
) -> Result<ScheduleOutcome, pipewright_core::host::HostError> {
    let mut outcome = ScheduleOutcome::default();

    host.begin_group("Create elements from PCF data")?;

    for (position, wave) in policy.waves().iter().enumerate() {
        let members: Vec<usize> = elements
            .iter()
            .filter(|es| {
                es.is_physical()
                    && es.representation().is_some()
                    && policy.claims(position, es.kind())
            })
            .map(|es| es.index())
            .collect();

        if members.is_empty() {
            debug!(wave = wave.name.as_str(); "wave has no members, skipping");
            continue;
        }

        if let Err(err) = host.begin_scope(&wave.name) {
            error!(wave = wave.name.as_str(), err:% = err; "failed to open wave scope");
            outcome.failed_waves.push(wave.name.clone());
            continue;
        }

        let mut staged: Vec<(usize, CreatedElement)> = Vec::new();
        for index in members {
            let Some(symbol) = elements.get(index) else {
                continue;
            };
            let Some(representation) = symbol.representation() else {
                continue;
            };
            match host.create_element(symbol, representation) {
                Ok(created) => staged.push((index, created)),
                Err(err) => {
                    warn!(symbol = index, err:% = err; "element creation failed");
                    outcome.creation_failures.push(SymbolFailure {
                        symbol: index,
                        kind: symbol.kind().clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        match host.commit_scope() {
            Ok(()) => {
                for (index, created) in staged {
                    let Some(symbol) = elements.get_mut(index) else {
                        continue;
                    };
                    symbol.set_created(created.handle);
                    if let Some(placeholder) = created.placeholder {
                        symbol.set_dummy_to_delete(placeholder);
                    }
                    outcome.created += 1;
                }
                debug!(wave = wave.name.as_str(); "wave committed");
            }
            Err(err) => {
                error!(wave = wave.name.as_str(), err:% = err; "wave failed to commit");
                outcome.failed_waves.push(wave.name.clone());
            }
        }

        // Elements committed so far must be visible to geometric queries
        // before attachment kinds are placed.
        if position == 0 {
            if let Err(err) = host.regenerate() {
                warn!(err:% = err; "host regeneration failed");
            }
        }
    }

    let cleanup = cleanup(host, elements)?;
    outcome.placeholders_deleted = cleanup.deleted;
    outcome.placeholders_dangling = cleanup.dangling;

    host.assimilate_group()?;

    info!(
        created = outcome.created,
        failures = outcome.creation_failures.len(),
        dangling = outcome.placeholders_dangling.len();
        "creation scheduling finished"
    );
    Ok(outcome)
}

/// Result of one placeholder-cleanup pass.
#[derive(Debug, Default)]
pub struct CleanupOutcome {
    pub deleted: usize,
    pub dangling: Vec<ElementHandle>,
}

/// Deletes every placeholder recorded on the collection, in its own scope.
///
/// Per-element deletion failures are logged and reported as dangling, never
/// allowed to abort the rest of the cleanup. A successful deletion clears
/// the symbol's record, so this pass is idempotent: rerunning it after a
/// cancelled run only touches placeholders that are still live.
pub fn cleanup<H: ModelHost>(
    host: &mut H,
    elements: &mut ElementCollection,
) -> Result<CleanupOutcome, pipewright_core::host::HostError> {
    let mut outcome = CleanupOutcome::default();

    if elements.iter().all(|es| es.dummy_to_delete().is_none()) {
        return Ok(outcome);
    }

    host.begin_scope("Delete placeholder elements")?;
    for symbol in elements.iter_mut() {
        let Some(handle) = symbol.dummy_to_delete() else {
            continue;
        };
        match host.delete(handle) {
            Ok(()) => {
                symbol.clear_dummy();
                outcome.deleted += 1;
            }
            Err(err) => {
                error!(symbol = symbol.index(), handle:% = handle, err:% = err;
                    "placeholder deletion failed");
                outcome.dangling.push(handle);
            }
        }
    }
    host.commit_scope()?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_policy_is_valid() {
        assert!(WavePolicy::standard().validate().is_ok());
    }

    #[test]
    fn duplicate_claims_are_rejected() {
        let policy = WavePolicy::new(vec![
            Wave::kinds("a", ["PIPE", "CAP"]),
            Wave::kinds("b", ["CAP"]),
        ]);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn two_remainder_waves_are_rejected() {
        let policy = WavePolicy::new(vec![Wave::remainder("a"), Wave::remainder("b")]);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn remainder_claims_unnamed_kinds_only() {
        let policy = WavePolicy::standard();
        // Wave 1 is the remainder.
        assert!(policy.claims(1, &ElementKind::Elbow));
        assert!(policy.claims(1, &ElementKind::Other("CROSS".to_string())));
        assert!(!policy.claims(1, &ElementKind::Pipe));
        assert!(!policy.claims(1, &ElementKind::Valve));
        assert!(policy.claims(3, &ElementKind::Valve));
    }
}
