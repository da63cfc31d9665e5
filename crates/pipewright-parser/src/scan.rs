//! Segmentation and indexing passes over the PCF source lines.
//!
//! PCF element blocks start with a marker line in column 0 naming the
//! element kind; everything indented below a marker belongs to that block.
//! [`segment`] (pass 1) creates one open-range [`ElementSymbol`] per marker
//! in file order, tracking the current pipeline group as it goes.
//! [`index`] (pass 2) closes every symbol's [`LineRange`] at the next
//! marker or end of file and checks the structural invariants.

use log::{debug, trace};

use pipewright_core::element::{ElementCollection, ElementKind, ElementSymbol, PipelineGroup};

use crate::error::{Diagnostic, ErrorCode, ParseError};
use crate::span::Span;

/// One physical line of the source file, with its byte offset for span
/// construction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceLine<'src> {
    pub index: usize,
    pub offset: usize,
    pub text: &'src str,
}

impl SourceLine<'_> {
    /// True when the line is blank or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// True when the line starts an element block (content in column 0).
    pub fn is_marker(&self) -> bool {
        self.text
            .chars()
            .next()
            .is_some_and(|c| !c.is_whitespace())
    }

    /// Byte span of the line's trimmed content.
    pub fn span(&self) -> Span {
        let trimmed = self.text.trim_end();
        let lead = trimmed.len() - trimmed.trim_start().len();
        Span::new(self.offset + lead..self.offset + trimmed.len())
    }
}

/// Splits the source into lines with byte offsets.
pub(crate) fn split_lines(source: &str) -> Vec<SourceLine<'_>> {
    source
        .lines()
        .enumerate()
        .map(|(index, text)| SourceLine {
            index,
            // `str::lines` strips both "\n" and "\r\n"; the slice address
            // gives the offset without guessing the terminator width.
            offset: text.as_ptr() as usize - source.as_ptr() as usize,
            text,
        })
        .collect()
}

/// Pass 1: create one element symbol per marker line, in file order.
///
/// Tracks the current [`PipelineGroup`]: `PRE-PIPELINE` until the first
/// `PIPELINE-REFERENCE` marker, the named group afterwards, and `MATERIALS`
/// once the material list starts. Fails when indented content precedes any
/// marker or the file contains no elements.
pub(crate) fn segment(lines: &[SourceLine<'_>]) -> Result<ElementCollection, ParseError> {
    let mut elements = ElementCollection::new();
    let mut group = PipelineGroup::PrePipeline;

    for line in lines {
        if line.is_blank() {
            continue;
        }
        if !line.is_marker() {
            if elements.is_empty() {
                return Err(Diagnostic::error("content before the first element marker")
                    .with_code(ErrorCode::E101)
                    .with_label(line.span(), "this line belongs to no element")
                    .with_help("every element block must start with a column-0 marker line")
                    .into());
            }
            continue;
        }

        let mut tokens = line.text.split_whitespace();
        let marker = tokens.next().expect("marker line has a first token");
        let kind = ElementKind::from_marker(marker);

        match &kind {
            ElementKind::PipelineReference => {
                let name = tokens.next().ok_or_else(|| {
                    ParseError::from(
                        Diagnostic::error("pipeline reference without a name")
                            .with_code(ErrorCode::E103)
                            .with_label(line.span(), "expected a group identifier here"),
                    )
                })?;
                group = PipelineGroup::Named(name.to_string());
            }
            ElementKind::Materials => {
                group = PipelineGroup::Materials;
            }
            _ => {}
        }

        trace!(line = line.index, marker; "element marker");
        elements.push(ElementSymbol::new(
            elements.len(),
            kind,
            group.clone(),
            line.index,
        ));
    }

    if elements.is_empty() {
        return Err(Diagnostic::error("the file contains no element definitions")
            .with_code(ErrorCode::E100)
            .with_help("a PCF file must declare at least one element marker")
            .into());
    }

    debug!(count = elements.len(); "segmented element markers");
    Ok(elements)
}

/// Pass 2: close every symbol's line range at the next marker or EOF.
///
/// Ranges produced by a single forward scan cannot overlap; an empty range
/// is a fatal structural error.
pub(crate) fn index(
    elements: &mut ElementCollection,
    lines: &[SourceLine<'_>],
) -> Result<(), ParseError> {
    let starts: Vec<usize> = elements.iter().map(|es| es.lines().start()).collect();

    for (position, symbol) in elements.iter_mut().enumerate() {
        let end = starts.get(position + 1).copied().unwrap_or(lines.len());
        symbol.close_range(end);

        if symbol.lines().is_empty() {
            let span = lines
                .get(symbol.lines().start())
                .map(|line| line.span())
                .unwrap_or_default();
            return Err(Diagnostic::error(format!(
                "element {} has an empty definition block",
                symbol.kind()
            ))
            .with_code(ErrorCode::E102)
            .with_label(span, "block closed before it opened")
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_offsets_survive_crlf() {
        let source = "PIPE\r\n    SKEY ABCD\r\nCAP\r\n";
        let lines = split_lines(source);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].offset, 0);
        assert_eq!(lines[1].offset, 6);
        assert_eq!(lines[2].offset, 21);
        assert_eq!(lines[2].text, "CAP");

        // Spans index back into the original source bytes.
        let span = lines[1].span();
        assert_eq!(&source[span.start()..span.end()], "SKEY ABCD");
        let span = lines[2].span();
        assert_eq!(&source[span.start()..span.end()], "CAP");
    }

    #[test]
    fn marker_detection() {
        let lines = split_lines("PIPE\n    END-POINT 0 0 0\n\n");
        assert!(lines[0].is_marker());
        assert!(!lines[1].is_marker());
        assert!(lines[2].is_blank());
    }
}
