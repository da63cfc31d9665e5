//! The keyword dictionary: raw entries to typed attributes.
//!
//! Every top-level keyword inside an element block maps to exactly one
//! handler over the known vocabulary, matched exhaustively with an explicit
//! [`Keyword::Unknown`] fallback arm. Adding a keyword is a compile-time
//! visible change here rather than a silent lookup miss.
//!
//! Handlers are pure data transformation: this stage never touches the
//! target model. Scalar keywords overwrite on repetition and are otherwise
//! idempotent; point keywords with cumulative meaning (`END-POINT` on a
//! routed pipe) append in file order.

use log::warn;

use pipewright_core::element::{ElementCollection, ElementSymbol};

use crate::error::{Diagnostic, ErrorCode, ParseError};
use crate::scan::SourceLine;
use crate::value::{self, ValueError};

/// The known top-level keywords of an element block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    EndPoint,
    CentrePoint,
    Branch1Point,
    AnglePoint,
    PipingSpec,
    Skey,
    Weight,
    MaterialIdentifier,
    ItemCode,
    Description,
    UniqueComponentIdentifier,
    /// Anything outside the known vocabulary; handled per
    /// [`UnknownKeywordPolicy`].
    Unknown,
}

impl Keyword {
    /// Maps a raw keyword token to its dictionary entry.
    pub fn from_token(token: &str) -> Self {
        match token {
            "END-POINT" => Self::EndPoint,
            "CENTRE-POINT" => Self::CentrePoint,
            "BRANCH1-POINT" => Self::Branch1Point,
            "ANGLE-POINT" => Self::AnglePoint,
            "PIPING-SPEC" => Self::PipingSpec,
            "SKEY" => Self::Skey,
            "WEIGHT" => Self::Weight,
            "MATERIAL-IDENTIFIER" => Self::MaterialIdentifier,
            "ITEM-CODE" => Self::ItemCode,
            "DESCRIPTION" => Self::Description,
            "UNIQUE-COMPONENT-IDENTIFIER" => Self::UniqueComponentIdentifier,
            _ => Self::Unknown,
        }
    }
}

/// What to do with keywords outside the known vocabulary.
///
/// The default is [`UnknownKeywordPolicy::Warn`]: real-world PCF files
/// commonly carry vendor extensions, so unknown keywords are recorded as
/// warnings and their raw text retained on the symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeywordPolicy {
    /// Record a warning and retain the raw text in `Attributes::extra`.
    #[default]
    Warn,
    /// Fail the parse with an unknown-keyword error.
    Deny,
}

/// Resolves every raw entry of every symbol through the dictionary.
///
/// Malformed or missing arguments are fatal; they are collected across all
/// symbols so one run reports every offending line at once. On success the
/// accumulated warnings (unknown keywords under the lenient policy) are
/// returned for the run report.
pub(crate) fn resolve_collection(
    elements: &mut ElementCollection,
    lines: &[SourceLine<'_>],
    policy: UnknownKeywordPolicy,
) -> Result<Vec<Diagnostic>, ParseError> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for symbol in elements.iter_mut() {
        resolve_symbol(symbol, lines, policy, &mut errors, &mut warnings);
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ParseError::new(errors))
    }
}

/// Applies every raw entry of one symbol, in file order.
fn resolve_symbol(
    symbol: &mut ElementSymbol,
    lines: &[SourceLine<'_>],
    policy: UnknownKeywordPolicy,
    errors: &mut Vec<Diagnostic>,
    warnings: &mut Vec<Diagnostic>,
) {
    // Entries stay on the symbol so resolution can be re-run; handlers are
    // deterministic over the same raw input.
    let entries = symbol.raw_entries().to_vec();

    for entry in &entries {
        let span = lines
            .get(entry.line)
            .map(|line| line.span())
            .unwrap_or_default();
        let attributes = symbol.attributes_mut();

        match Keyword::from_token(&entry.keyword) {
            Keyword::EndPoint => match value::parse_end_point(&entry.args) {
                Ok(ep) => attributes.end_points.push(ep),
                Err(err) => errors.push(value_diagnostic(&entry.keyword, err, span)),
            },
            Keyword::CentrePoint => match value::parse_end_point(&entry.args) {
                Ok(ep) => attributes.centre_point = Some(ep),
                Err(err) => errors.push(value_diagnostic(&entry.keyword, err, span)),
            },
            Keyword::Branch1Point => match value::parse_end_point(&entry.args) {
                Ok(ep) => attributes.branch_point = Some(ep),
                Err(err) => errors.push(value_diagnostic(&entry.keyword, err, span)),
            },
            Keyword::AnglePoint => match value::parse_end_point(&entry.args) {
                Ok(ep) => attributes.angle_point = Some(ep),
                Err(err) => errors.push(value_diagnostic(&entry.keyword, err, span)),
            },
            Keyword::PipingSpec => {
                set_text(&entry.args, span, &entry.keyword, errors, |text| {
                    attributes.piping_spec = Some(text)
                });
            }
            Keyword::Skey => {
                set_text(&entry.args, span, &entry.keyword, errors, |text| {
                    attributes.skey = Some(text)
                });
            }
            Keyword::Weight => match entry.args.first().map(|t| value::parse_float(t)) {
                Some(Some(weight)) => attributes.weight = Some(weight),
                Some(None) => errors.push(value_diagnostic(
                    &entry.keyword,
                    ValueError::Malformed {
                        expected: "weight",
                        token: entry.args[0].clone(),
                    },
                    span,
                )),
                None => errors.push(value_diagnostic(
                    &entry.keyword,
                    ValueError::Missing("weight"),
                    span,
                )),
            },
            Keyword::MaterialIdentifier => {
                set_text(&entry.args, span, &entry.keyword, errors, |text| {
                    attributes.material_identifier = Some(text)
                });
            }
            Keyword::ItemCode => {
                set_text(&entry.args, span, &entry.keyword, errors, |text| {
                    attributes.item_code = Some(text)
                });
            }
            Keyword::Description => {
                set_text(&entry.args, span, &entry.keyword, errors, |text| {
                    attributes.description = Some(text)
                });
            }
            Keyword::UniqueComponentIdentifier => {
                set_text(&entry.args, span, &entry.keyword, errors, |text| {
                    attributes.unique_id = Some(text)
                });
            }
            Keyword::Unknown => match policy {
                UnknownKeywordPolicy::Warn => {
                    warn!(keyword = entry.keyword.as_str(), line = entry.line; "unknown keyword");
                    warnings.push(
                        Diagnostic::warning(format!("unknown keyword `{}`", entry.keyword))
                            .with_code(ErrorCode::E210)
                            .with_label(span, "not in the known vocabulary"),
                    );
                    attributes
                        .extra
                        .insert(entry.keyword.clone(), entry.args.join(" "));
                }
                UnknownKeywordPolicy::Deny => {
                    errors.push(
                        Diagnostic::error(format!("unknown keyword `{}`", entry.keyword))
                            .with_code(ErrorCode::E210)
                            .with_label(span, "not in the known vocabulary")
                            .with_help(
                                "rerun with the lenient policy to keep vendor extensions",
                            ),
                    );
                }
            },
        }
    }
}

/// Overwrite-on-repeat handler for free-text keywords.
fn set_text(
    args: &[String],
    span: crate::span::Span,
    keyword: &str,
    errors: &mut Vec<Diagnostic>,
    set: impl FnOnce(String),
) {
    if args.is_empty() {
        errors.push(value_diagnostic(
            keyword,
            ValueError::Missing("a value"),
            span,
        ));
    } else {
        set(args.join(" "));
    }
}

fn value_diagnostic(keyword: &str, err: ValueError, span: crate::span::Span) -> Diagnostic {
    match err {
        ValueError::Missing(what) => {
            Diagnostic::error(format!("`{keyword}` is missing {what}"))
                .with_code(ErrorCode::E201)
                .with_label(span, "incomplete keyword arguments")
        }
        ValueError::Malformed { expected, token } => {
            Diagnostic::error(format!("`{keyword}`: `{token}` is not a valid {expected}"))
                .with_code(ErrorCode::E200)
                .with_label(span, "malformed argument")
        }
    }
}
