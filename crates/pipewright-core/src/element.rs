//! The in-memory element model parsed from a PCF file.
//!
//! A PCF file is a sequence of element blocks. Each block starts with a
//! column-0 marker line naming the component kind and continues with
//! indented keyword lines until the next marker. Parsing turns each block
//! into an [`ElementSymbol`]; the full file becomes an [`ElementCollection`]
//! whose order is the file order.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Text
//!     ↓ segment + index + extract   (pipewright-parser)
//! ElementSymbol (raw entries)
//!     ↓ keyword dictionary          (pipewright-parser)
//! ElementSymbol (typed attributes)
//!     ↓ configuration resolver      (pipewright)
//! ElementSymbol (representation selected)
//!     ↓ creation scheduler          (pipewright)
//! Host model elements
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::EndPoint;
use crate::host::ElementHandle;

/// The kind of a PCF element, taken from its block marker line.
///
/// The vocabulary is closed over the component kinds Pipewright knows how
/// to schedule; anything else lands in [`ElementKind::Other`] so vendor
/// extensions survive parsing and can still be matched by rule tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Pipe,
    Elbow,
    Bend,
    Tee,
    Olet,
    Cap,
    ReducerConcentric,
    ReducerEccentric,
    Flange,
    FlangeBlind,
    Valve,
    ValveAngle,
    Gasket,
    Coupling,
    Instrument,
    Support,
    /// `PIPELINE-REFERENCE` marker opening a named pipeline group.
    PipelineReference,
    /// `MATERIALS` marker opening the material list section.
    Materials,
    /// `ITEM-CODE` entry inside the material list.
    ItemCode,
    /// File header markers (`ISOGEN-FILES`, `UNITS-BORE`, ...).
    IsogenFiles,
    UnitsBore,
    UnitsCoOrds,
    UnitsWeight,
    /// Any marker outside the known vocabulary, spelling preserved.
    Other(String),
}

impl ElementKind {
    /// Parses a marker token into a kind. Unknown spellings become
    /// [`ElementKind::Other`]; this never fails.
    pub fn from_marker(token: &str) -> Self {
        match token {
            "PIPE" => Self::Pipe,
            "ELBOW" => Self::Elbow,
            "BEND" => Self::Bend,
            "TEE" => Self::Tee,
            "OLET" => Self::Olet,
            "CAP" => Self::Cap,
            "REDUCER-CONCENTRIC" => Self::ReducerConcentric,
            "REDUCER-ECCENTRIC" => Self::ReducerEccentric,
            "FLANGE" => Self::Flange,
            "FLANGE-BLIND" => Self::FlangeBlind,
            "VALVE" => Self::Valve,
            "VALVE-ANGLE" => Self::ValveAngle,
            "GASKET" => Self::Gasket,
            "COUPLING" => Self::Coupling,
            "INSTRUMENT" => Self::Instrument,
            "SUPPORT" => Self::Support,
            "PIPELINE-REFERENCE" => Self::PipelineReference,
            "MATERIALS" => Self::Materials,
            "ITEM-CODE" => Self::ItemCode,
            "ISOGEN-FILES" => Self::IsogenFiles,
            "UNITS-BORE" => Self::UnitsBore,
            "UNITS-CO-ORDS" => Self::UnitsCoOrds,
            "UNITS-WEIGHT" => Self::UnitsWeight,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the PCF spelling of this kind.
    pub fn as_marker(&self) -> &str {
        match self {
            Self::Pipe => "PIPE",
            Self::Elbow => "ELBOW",
            Self::Bend => "BEND",
            Self::Tee => "TEE",
            Self::Olet => "OLET",
            Self::Cap => "CAP",
            Self::ReducerConcentric => "REDUCER-CONCENTRIC",
            Self::ReducerEccentric => "REDUCER-ECCENTRIC",
            Self::Flange => "FLANGE",
            Self::FlangeBlind => "FLANGE-BLIND",
            Self::Valve => "VALVE",
            Self::ValveAngle => "VALVE-ANGLE",
            Self::Gasket => "GASKET",
            Self::Coupling => "COUPLING",
            Self::Instrument => "INSTRUMENT",
            Self::Support => "SUPPORT",
            Self::PipelineReference => "PIPELINE-REFERENCE",
            Self::Materials => "MATERIALS",
            Self::ItemCode => "ITEM-CODE",
            Self::IsogenFiles => "ISOGEN-FILES",
            Self::UnitsBore => "UNITS-BORE",
            Self::UnitsCoOrds => "UNITS-CO-ORDS",
            Self::UnitsWeight => "UNITS-WEIGHT",
            Self::Other(s) => s,
        }
    }

    /// True for kinds that describe a physical component, as opposed to
    /// file headers, pipeline references, and material bookkeeping.
    pub fn is_component(&self) -> bool {
        !matches!(
            self,
            Self::PipelineReference
                | Self::Materials
                | Self::ItemCode
                | Self::IsogenFiles
                | Self::UnitsBore
                | Self::UnitsCoOrds
                | Self::UnitsWeight
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_marker())
    }
}

/// The logical pipeline group an element belongs to.
///
/// Elements before the first `PIPELINE-REFERENCE` marker belong to the
/// `PRE-PIPELINE` sentinel; elements after the `MATERIALS` marker belong to
/// the `MATERIALS` sentinel. Sentinel groups mark bookkeeping entries that
/// are never instantiated in the model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineGroup {
    PrePipeline,
    Materials,
    Named(String),
}

impl PipelineGroup {
    /// True for the non-physical sentinel groups.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::PrePipeline | Self::Materials)
    }

    /// Returns the group name as it would appear in the file.
    pub fn name(&self) -> &str {
        match self {
            Self::PrePipeline => "PRE-PIPELINE",
            Self::Materials => "MATERIALS",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for PipelineGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Half-open line index range `start..end` delimiting one element's
/// definition block in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    start: usize,
    end: usize,
}

impl LineRange {
    /// Creates a range. `end` is exclusive.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn start(self) -> usize {
        self.start
    }

    pub fn end(self) -> usize {
        self.end
    }

    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// True when the two ranges share at least one line.
    pub fn overlaps(self, other: LineRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One raw keyword line extracted from an element block, before keyword
/// resolution. Entries keep their file order; repeated keywords with
/// cumulative meaning (multiple `END-POINT`s on a routed pipe) rely on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    /// Zero-based line index in the source file.
    pub line: usize,
    /// The leading keyword token, unresolved.
    pub keyword: String,
    /// The remaining whitespace-separated tokens on the line.
    pub args: Vec<String>,
}

/// Typed attributes resolved from an element's raw entries.
///
/// Scalar attributes overwrite on repetition (last wins); `end_points` is
/// cumulative. Unknown keywords retained under the lenient policy land in
/// `extra` in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub end_points: Vec<EndPoint>,
    pub centre_point: Option<EndPoint>,
    pub branch_point: Option<EndPoint>,
    pub angle_point: Option<EndPoint>,
    pub skey: Option<String>,
    pub piping_spec: Option<String>,
    pub material_identifier: Option<String>,
    pub item_code: Option<String>,
    pub description: Option<String>,
    pub unique_id: Option<String>,
    pub weight: Option<f64>,
    pub extra: IndexMap<String, String>,
}

impl Attributes {
    /// The nominal bore of the element: the first end point that declares
    /// one, falling back to the centre point.
    pub fn nominal_bore(&self) -> Option<f64> {
        self.end_points
            .iter()
            .find_map(|ep| ep.bore())
            .or_else(|| self.centre_point.as_ref().and_then(|ep| ep.bore()))
    }
}

/// One piping component instance parsed from the file.
///
/// Created empty by the extractor, filled in by the keyword dictionary and
/// the configuration resolver, and consumed exactly once by the creation
/// scheduler. `kind` is fixed at segmentation and never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSymbol {
    index: usize,
    kind: ElementKind,
    group: PipelineGroup,
    lines: LineRange,
    raw: Vec<RawEntry>,
    attributes: Attributes,
    representation: Option<Representation>,
    created: Option<ElementHandle>,
    dummy_to_delete: Option<ElementHandle>,
}

impl ElementSymbol {
    /// Creates a symbol for a block starting at `start_line`. The range is
    /// left open until the indexing pass closes it.
    pub fn new(index: usize, kind: ElementKind, group: PipelineGroup, start_line: usize) -> Self {
        Self {
            index,
            kind,
            group,
            lines: LineRange::new(start_line, start_line),
            raw: Vec::new(),
            attributes: Attributes::default(),
            representation: None,
            created: None,
            dummy_to_delete: None,
        }
    }

    /// File-local sequential identity (position in the file).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn group(&self) -> &PipelineGroup {
        &self.group
    }

    pub fn lines(&self) -> LineRange {
        self.lines
    }

    /// Closes the definition range at `end` (exclusive).
    pub fn close_range(&mut self, end: usize) {
        self.lines = LineRange::new(self.lines.start(), end);
    }

    /// Raw keyword entries in original line order.
    pub fn raw_entries(&self) -> &[RawEntry] {
        &self.raw
    }

    pub fn push_raw(&mut self, entry: RawEntry) {
        self.raw.push(entry);
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// The concrete representation selected by the configuration resolver,
    /// absent until that stage runs.
    pub fn representation(&self) -> Option<&Representation> {
        self.representation.as_ref()
    }

    pub fn set_representation(&mut self, representation: Representation) {
        self.representation = Some(representation);
    }

    /// Handle of the created model element, once the scheduler has run.
    pub fn created(&self) -> Option<ElementHandle> {
        self.created
    }

    pub fn set_created(&mut self, handle: ElementHandle) {
        self.created = Some(handle);
    }

    /// Placeholder element owned by this symbol until cleanup deletes it.
    pub fn dummy_to_delete(&self) -> Option<ElementHandle> {
        self.dummy_to_delete
    }

    pub fn set_dummy_to_delete(&mut self, handle: ElementHandle) {
        self.dummy_to_delete = Some(handle);
    }

    /// Clears the placeholder record after successful deletion, keeping
    /// cleanup idempotent.
    pub fn clear_dummy(&mut self) {
        self.dummy_to_delete = None;
    }

    /// True when this symbol describes a physical component that should be
    /// configured and created: component kind, non-sentinel group.
    pub fn is_physical(&self) -> bool {
        self.kind.is_component() && !self.group.is_sentinel()
    }
}

/// A concrete component representation selected from the rule table:
/// the host-side family plus the specific variant (type/size) within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Representation {
    pub family: String,
    pub variant: String,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.family, self.variant)
    }
}

/// The insertion-ordered set of all element symbols for one file.
///
/// Order is the file order and is the tie-break for all later stable
/// iteration (within a creation wave, file order decides).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementCollection {
    elements: Vec<ElementSymbol>,
}

impl ElementCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, symbol: ElementSymbol) {
        self.elements.push(symbol);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ElementSymbol> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ElementSymbol> {
        self.elements.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ElementSymbol> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ElementSymbol> {
        self.elements.iter_mut()
    }
}

impl<'a> IntoIterator for &'a ElementCollection {
    type Item = &'a ElementSymbol;
    type IntoIter = std::slice::Iter<'a, ElementSymbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut ElementCollection {
    type Item = &'a mut ElementSymbol;
    type IntoIter = std::slice::IterMut<'a, ElementSymbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_marker_spelling() {
        for marker in ["PIPE", "FLANGE-BLIND", "UNITS-CO-ORDS", "WELDOLET-X"] {
            let kind = ElementKind::from_marker(marker);
            assert_eq!(kind.as_marker(), marker);
        }
    }

    #[test]
    fn unknown_marker_is_other_and_physical() {
        let kind = ElementKind::from_marker("CROSS");
        assert_eq!(kind, ElementKind::Other("CROSS".to_string()));
        assert!(kind.is_component());
    }

    #[test]
    fn sentinel_groups_exclude_symbols() {
        let header = ElementSymbol::new(0, ElementKind::UnitsBore, PipelineGroup::PrePipeline, 0);
        assert!(!header.is_physical());

        let reference = ElementSymbol::new(
            1,
            ElementKind::PipelineReference,
            PipelineGroup::Named("L-100".to_string()),
            1,
        );
        assert!(!reference.is_physical());

        let pipe = ElementSymbol::new(
            2,
            ElementKind::Pipe,
            PipelineGroup::Named("L-100".to_string()),
            2,
        );
        assert!(pipe.is_physical());
    }

    #[test]
    fn attributes_round_trip_through_serde() {
        let mut attributes = Attributes {
            skey: Some("PIPE".to_string()),
            weight: Some(12.5),
            ..Attributes::default()
        };
        attributes
            .extra
            .insert("VENDOR-EXTENSION".to_string(), "some value".to_string());

        let json = serde_json::to_string(&attributes).unwrap();
        let back: Attributes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attributes);
        assert_eq!(
            back.extra.get("VENDOR-EXTENSION").map(String::as_str),
            Some("some value")
        );
    }

    #[test]
    fn line_range_overlap() {
        let a = LineRange::new(0, 4);
        let b = LineRange::new(4, 8);
        let c = LineRange::new(3, 5);
        assert!(!a.overlaps(b));
        assert!(a.overlaps(c));
        assert!(c.overlaps(b));
    }
}
