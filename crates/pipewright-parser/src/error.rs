//! Error and diagnostic system for the PCF parser.
//!
//! The system is built around the [`Diagnostic`] type: a single error or
//! warning with an optional error code, labeled source spans, and help
//! text. Fatal diagnostics are wrapped in [`ParseError`] and abort the run
//! before any model mutation; warning diagnostics (unknown keywords under
//! the lenient policy) travel with the parse outcome into the run report.
//!
//! # Example
//!
//! ```
//! # use pipewright_parser::error::{Diagnostic, ErrorCode};
//! # use pipewright_parser::Span;
//! let span = Span::new(42..61);
//!
//! let diag = Diagnostic::error("element block has no kind marker")
//!     .with_code(ErrorCode::E101)
//!     .with_label(span, "indented content before any marker")
//!     .with_help("every element block must start with a column-0 marker line");
//! ```

mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
