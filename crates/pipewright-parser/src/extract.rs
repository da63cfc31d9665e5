//! Extraction pass: tokenize every line of each closed element block.
//!
//! Pass 3 of the parser. For each symbol's [`LineRange`], every indented
//! line is split into a keyword and its argument tokens and stored as a
//! [`RawEntry`] on the symbol, preserving the original line order within
//! the block. Resolution of the keywords themselves happens later in the
//! [`keyword`](crate::keyword) dictionary; this pass stays untyped.

use log::trace;

use pipewright_core::element::{ElementCollection, RawEntry};

use crate::scan::SourceLine;

/// Pass 3: fill every symbol's raw attribute entries from its line range.
pub(crate) fn extract(elements: &mut ElementCollection, lines: &[SourceLine<'_>]) {
    for symbol in elements.iter_mut() {
        let range = symbol.lines();
        // Skip the marker line itself; it was consumed by segmentation.
        for line in &lines[range.start() + 1..range.end()] {
            if line.is_blank() {
                continue;
            }
            let mut tokens = line.text.split_whitespace();
            let Some(keyword) = tokens.next() else {
                continue;
            };
            symbol.push_raw(RawEntry {
                line: line.index,
                keyword: keyword.to_string(),
                args: tokens.map(str::to_string).collect(),
            });
        }
        trace!(
            symbol = symbol.index(),
            kind = symbol.kind().as_marker(),
            entries = symbol.raw_entries().len();
            "extracted element definition"
        );
    }
}
