//! Error codes for the Pipewright diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E1xx` - structural errors (segmentation and indexing)
//! - `E2xx` - extraction and keyword-resolution errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Structural errors (E1xx)
    // =========================================================================
    /// Empty input.
    ///
    /// The file contains no element-start markers at all.
    E100,

    /// Content before the first marker.
    ///
    /// An indented line appeared before any column-0 kind marker, so it
    /// belongs to no element block.
    E101,

    /// Empty element block.
    ///
    /// An element's line range closed with zero lines.
    E102,

    /// Pipeline reference without a name.
    ///
    /// A `PIPELINE-REFERENCE` marker carried no group identifier.
    E103,

    // =========================================================================
    // Extraction and keyword errors (E2xx)
    // =========================================================================
    /// Malformed keyword argument.
    ///
    /// An argument token could not be parsed as the value the keyword
    /// requires (for example, a non-numeric coordinate).
    E200,

    /// Missing keyword argument.
    ///
    /// A keyword that requires arguments appeared with none.
    E201,

    /// Unknown keyword.
    ///
    /// A keyword outside the known vocabulary, fatal only under the strict
    /// policy.
    E210,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E101").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E210 => "E210",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
