//! The narrow capability interface to the target model.
//!
//! The import pipeline never calls host geometry primitives directly; it
//! only creates elements, creates and deletes placeholders, and opens
//! transactional scopes through [`ModelHost`]. A real modeling host
//! implements this trait; [`MemoryHost`] is a complete in-memory
//! implementation used by the test suite and the CLI dry run.
//!
//! Scoping is a group of scopes: one outer group per run
//! ([`ModelHost::begin_group`] / [`ModelHost::assimilate_group`]) containing
//! one scope per creation wave. Within a scope, either all creations become
//! visible at commit or none do.

use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::element::{ElementKind, ElementSymbol, Representation};

/// Opaque identifier of an element inside the host model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors surfaced by a host collaborator.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("creation failed: {0}")]
    Creation(String),

    #[error("delete failed: {0}")]
    Delete(String),

    #[error("transaction scope error: {0}")]
    Scope(String),
}

/// Result of a successful element creation.
///
/// Some hosts must seed certain kinds with a provisional object before the
/// final typed object can be attached; when that happens the placeholder's
/// handle is returned here and the scheduler records it for cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedElement {
    pub handle: ElementHandle,
    pub placeholder: Option<ElementHandle>,
}

/// Capability interface the creation scheduler drives.
pub trait ModelHost {
    /// Opens the outer transaction group for a run.
    fn begin_group(&mut self, name: &str) -> Result<(), HostError>;

    /// Merges all committed scopes of the group into one undoable unit.
    fn assimilate_group(&mut self) -> Result<(), HostError>;

    /// Opens a nested transactional scope (one per creation wave).
    fn begin_scope(&mut self, name: &str) -> Result<(), HostError>;

    /// Commits the open scope, making its creations visible.
    fn commit_scope(&mut self) -> Result<(), HostError>;

    /// Discards the open scope and everything staged inside it.
    fn roll_back_scope(&mut self) -> Result<(), HostError>;

    /// Creates one element from a resolved symbol.
    fn create_element(
        &mut self,
        symbol: &ElementSymbol,
        representation: &Representation,
    ) -> Result<CreatedElement, HostError>;

    /// Creates a provisional object of the given kind.
    fn create_placeholder(&mut self, kind: &ElementKind) -> Result<ElementHandle, HostError>;

    /// Deletes an element by handle.
    fn delete(&mut self, handle: ElementHandle) -> Result<(), HostError>;

    /// Asks the host to regenerate its document so elements committed in
    /// earlier scopes become visible to geometric queries.
    fn regenerate(&mut self) -> Result<(), HostError>;
}

/// One operation recorded by [`MemoryHost`], in commit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    BeginGroup(String),
    AssimilateGroup,
    BeginScope(String),
    CommitScope(String),
    RollBackScope(String),
    Create {
        symbol: usize,
        kind: ElementKind,
        handle: ElementHandle,
    },
    CreatePlaceholder {
        kind: ElementKind,
        handle: ElementHandle,
    },
    Delete(ElementHandle),
    Regenerate,
}

#[derive(Debug, Default)]
struct ScopeJournal {
    name: String,
    ops: Vec<HostOp>,
    created: Vec<ElementHandle>,
    deleted: Vec<(ElementHandle, LiveElement)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LiveElement {
    kind: ElementKind,
    placeholder: bool,
}

/// In-memory [`ModelHost`] with an operation log.
///
/// Honors scope semantics: operations inside an open scope stay staged and
/// only enter the log (and the live element set) at commit; rollback
/// discards them. Fault injection hooks let tests exercise creation
/// failures, placeholder seeding, and commit failures per wave.
#[derive(Debug, Default)]
pub struct MemoryHost {
    next_id: u64,
    log: Vec<HostOp>,
    live: IndexMap<ElementHandle, LiveElement>,
    scope: Option<ScopeJournal>,
    group_open: bool,
    placeholder_kinds: Vec<ElementKind>,
    fail_create_kinds: Vec<ElementKind>,
    fail_commit_scope: Option<String>,
    fail_delete_handles: Vec<ElementHandle>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creating an element of any of these kinds also seeds a placeholder,
    /// returned through [`CreatedElement::placeholder`].
    pub fn with_placeholders_for(mut self, kinds: impl IntoIterator<Item = ElementKind>) -> Self {
        self.placeholder_kinds.extend(kinds);
        self
    }

    /// Creation of these kinds fails with [`HostError::Creation`].
    pub fn with_creation_failure_for(
        mut self,
        kinds: impl IntoIterator<Item = ElementKind>,
    ) -> Self {
        self.fail_create_kinds.extend(kinds);
        self
    }

    /// Committing the scope with this name fails with [`HostError::Scope`].
    pub fn with_commit_failure_for(mut self, scope_name: impl Into<String>) -> Self {
        self.fail_commit_scope = Some(scope_name.into());
        self
    }

    /// Deleting these handles fails with [`HostError::Delete`].
    pub fn with_delete_failure_for(
        mut self,
        handles: impl IntoIterator<Item = ElementHandle>,
    ) -> Self {
        self.fail_delete_handles.extend(handles);
        self
    }

    /// The committed operation log, in commit order.
    pub fn log(&self) -> &[HostOp] {
        &self.log
    }

    /// Handles of all elements currently visible in the model.
    pub fn live_handles(&self) -> Vec<ElementHandle> {
        self.live.keys().copied().collect()
    }

    /// Number of visible placeholder elements.
    pub fn live_placeholders(&self) -> usize {
        self.live.values().filter(|e| e.placeholder).count()
    }

    fn allocate(&mut self) -> ElementHandle {
        self.next_id += 1;
        ElementHandle::new(self.next_id)
    }

    fn record(&mut self, op: HostOp) {
        match self.scope.as_mut() {
            Some(journal) => journal.ops.push(op),
            None => self.log.push(op),
        }
    }
}

impl ModelHost for MemoryHost {
    fn begin_group(&mut self, name: &str) -> Result<(), HostError> {
        if self.group_open {
            return Err(HostError::Scope("group already open".to_string()));
        }
        self.group_open = true;
        self.log.push(HostOp::BeginGroup(name.to_string()));
        Ok(())
    }

    fn assimilate_group(&mut self) -> Result<(), HostError> {
        if !self.group_open {
            return Err(HostError::Scope("no open group".to_string()));
        }
        if self.scope.is_some() {
            return Err(HostError::Scope(
                "cannot assimilate with an open scope".to_string(),
            ));
        }
        self.group_open = false;
        self.log.push(HostOp::AssimilateGroup);
        Ok(())
    }

    fn begin_scope(&mut self, name: &str) -> Result<(), HostError> {
        if self.scope.is_some() {
            return Err(HostError::Scope("scope already open".to_string()));
        }
        self.scope = Some(ScopeJournal {
            name: name.to_string(),
            ops: vec![HostOp::BeginScope(name.to_string())],
            created: Vec::new(),
            deleted: Vec::new(),
        });
        Ok(())
    }

    fn commit_scope(&mut self) -> Result<(), HostError> {
        let journal = self
            .scope
            .take()
            .ok_or_else(|| HostError::Scope("no open scope".to_string()))?;
        if self.fail_commit_scope.as_deref() == Some(journal.name.as_str()) {
            // Injected failure behaves like the host aborting the
            // transaction: staged work is discarded.
            self.log.push(HostOp::RollBackScope(journal.name.clone()));
            for handle in journal.created {
                self.live.shift_remove(&handle);
            }
            for (handle, element) in journal.deleted {
                self.live.insert(handle, element);
            }
            return Err(HostError::Scope(format!(
                "commit of scope '{}' rejected",
                journal.name
            )));
        }
        self.log.extend(journal.ops);
        self.log.push(HostOp::CommitScope(journal.name));
        Ok(())
    }

    fn roll_back_scope(&mut self) -> Result<(), HostError> {
        let journal = self
            .scope
            .take()
            .ok_or_else(|| HostError::Scope("no open scope".to_string()))?;
        for handle in journal.created {
            self.live.shift_remove(&handle);
        }
        for (handle, element) in journal.deleted {
            self.live.insert(handle, element);
        }
        self.log.push(HostOp::RollBackScope(journal.name));
        Ok(())
    }

    fn create_element(
        &mut self,
        symbol: &ElementSymbol,
        representation: &Representation,
    ) -> Result<CreatedElement, HostError> {
        if self.fail_create_kinds.contains(symbol.kind()) {
            return Err(HostError::Creation(format!(
                "host rejected {} ({representation})",
                symbol.kind()
            )));
        }

        let placeholder = if self.placeholder_kinds.contains(symbol.kind()) {
            Some(self.create_placeholder(symbol.kind())?)
        } else {
            None
        };

        let handle = self.allocate();
        self.live.insert(
            handle,
            LiveElement {
                kind: symbol.kind().clone(),
                placeholder: false,
            },
        );
        if let Some(journal) = self.scope.as_mut() {
            journal.created.push(handle);
        }
        debug!(symbol = symbol.index(), handle = handle.raw(); "created element");
        self.record(HostOp::Create {
            symbol: symbol.index(),
            kind: symbol.kind().clone(),
            handle,
        });
        Ok(CreatedElement {
            handle,
            placeholder,
        })
    }

    fn create_placeholder(&mut self, kind: &ElementKind) -> Result<ElementHandle, HostError> {
        let handle = self.allocate();
        self.live.insert(
            handle,
            LiveElement {
                kind: kind.clone(),
                placeholder: true,
            },
        );
        if let Some(journal) = self.scope.as_mut() {
            journal.created.push(handle);
        }
        self.record(HostOp::CreatePlaceholder {
            kind: kind.clone(),
            handle,
        });
        Ok(handle)
    }

    fn delete(&mut self, handle: ElementHandle) -> Result<(), HostError> {
        if self.fail_delete_handles.contains(&handle) {
            return Err(HostError::Delete(format!(
                "host refused to delete {handle}"
            )));
        }
        let element = self
            .live
            .shift_remove(&handle)
            .ok_or_else(|| HostError::Delete(format!("{handle} is not a live element")))?;
        if let Some(journal) = self.scope.as_mut() {
            journal.deleted.push((handle, element));
        }
        self.record(HostOp::Delete(handle));
        Ok(())
    }

    fn regenerate(&mut self) -> Result<(), HostError> {
        self.record(HostOp::Regenerate);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::PipelineGroup;

    fn pipe_symbol(index: usize) -> ElementSymbol {
        ElementSymbol::new(
            index,
            ElementKind::Pipe,
            PipelineGroup::Named("L-1".to_string()),
            index,
        )
    }

    fn representation() -> Representation {
        Representation {
            family: "Pipe Types".to_string(),
            variant: "Standard".to_string(),
        }
    }

    #[test]
    fn committed_scope_is_visible() {
        let mut host = MemoryHost::new();
        host.begin_scope("wave").unwrap();
        host.create_element(&pipe_symbol(0), &representation())
            .unwrap();
        host.commit_scope().unwrap();

        assert_eq!(host.live_handles().len(), 1);
        assert!(matches!(host.log()[0], HostOp::BeginScope(_)));
        assert!(matches!(host.log()[1], HostOp::Create { symbol: 0, .. }));
    }

    #[test]
    fn rolled_back_scope_leaves_nothing() {
        let mut host = MemoryHost::new();
        host.begin_scope("wave").unwrap();
        host.create_element(&pipe_symbol(0), &representation())
            .unwrap();
        host.roll_back_scope().unwrap();

        assert!(host.live_handles().is_empty());
        assert_eq!(host.log(), &[HostOp::RollBackScope("wave".to_string())]);
    }

    #[test]
    fn placeholder_seeding_reports_handle() {
        let mut host = MemoryHost::new().with_placeholders_for([ElementKind::Cap]);
        host.begin_scope("wave").unwrap();
        let symbol = ElementSymbol::new(
            0,
            ElementKind::Cap,
            PipelineGroup::Named("L-1".to_string()),
            0,
        );
        let created = host.create_element(&symbol, &representation()).unwrap();
        host.commit_scope().unwrap();

        let dummy = created.placeholder.expect("cap should seed a placeholder");
        assert_eq!(host.live_placeholders(), 1);

        host.delete(dummy).unwrap();
        assert_eq!(host.live_placeholders(), 0);
    }

    #[test]
    fn commit_failure_discards_staged_work() {
        let mut host = MemoryHost::new().with_commit_failure_for("bad wave");
        host.begin_scope("bad wave").unwrap();
        host.create_element(&pipe_symbol(0), &representation())
            .unwrap();
        assert!(host.commit_scope().is_err());
        assert!(host.live_handles().is_empty());
    }

    #[test]
    fn double_scope_is_rejected() {
        let mut host = MemoryHost::new();
        host.begin_scope("a").unwrap();
        assert!(host.begin_scope("b").is_err());
    }
}
