//! # Pipewright Parser
//!
//! Three-pass parser for PCF (Piping Component File) sources. This crate
//! turns the raw text into a fully keyword-resolved
//! [`ElementCollection`](pipewright_core::element::ElementCollection),
//! without ever touching a target model.
//!
//! ## Usage
//!
//! ```
//! # use pipewright_parser::{parse, ParseOptions, error::ParseError};
//! fn main() -> Result<(), ParseError> {
//!     let source = "\
//! PIPELINE-REFERENCE L-100
//! PIPE
//!     END-POINT 0.0 0.0 0.0 50
//!     END-POINT 1200.0 0.0 0.0 50
//!     PIPING-SPEC CS150
//! ";
//!
//!     let outcome = parse(source, &ParseOptions::default())?;
//!     assert_eq!(outcome.elements.len(), 2);
//!     Ok(())
//! }
//! ```

pub mod error;

mod extract;
mod keyword;
#[cfg(test)]
mod parser_tests;
mod scan;
mod span;
mod value;

pub use keyword::{Keyword, UnknownKeywordPolicy};
pub use span::Span;

use log::info;

use pipewright_core::element::ElementCollection;

use error::{Diagnostic, ParseError};

/// Options controlling keyword resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// How to treat keywords outside the known vocabulary.
    pub unknown_keywords: UnknownKeywordPolicy,
}

/// A successfully parsed file: the element collection plus any warnings
/// accumulated under the lenient unknown-keyword policy.
#[derive(Debug)]
pub struct ParseOutcome {
    pub elements: ElementCollection,
    pub warnings: Vec<Diagnostic>,
}

/// Parse PCF source text into an element collection.
///
/// This is the main entry point for parsing. It orchestrates the pipeline:
///
/// 1. **Segment** - one element symbol per column-0 marker line
/// 2. **Index** - close every symbol's line range at the next marker
/// 3. **Extract** - tokenize block lines into raw attribute entries
/// 4. **Resolve** - apply the keyword dictionary, producing typed attributes
///
/// Parsing is side-effect-free with respect to the target model; a
/// [`ParseError`] always means nothing downstream ran.
///
/// # Errors
///
/// Returns [`ParseError`] for structural errors (no elements, indented
/// content before the first marker, unnamed pipeline reference), malformed
/// keyword arguments, and unknown keywords under
/// [`UnknownKeywordPolicy::Deny`].
pub fn parse(source: &str, options: &ParseOptions) -> Result<ParseOutcome, ParseError> {
    let lines = scan::split_lines(source);

    // Pass 1: segment
    let mut elements = scan::segment(&lines)?;

    // Pass 2: index
    scan::index(&mut elements, &lines)?;

    // Pass 3: extract
    extract::extract(&mut elements, &lines);

    // Keyword resolution
    let warnings = keyword::resolve_collection(&mut elements, &lines, options.unknown_keywords)?;

    info!(elements = elements.len(), warnings = warnings.len(); "parsed PCF source");
    Ok(ParseOutcome { elements, warnings })
}
