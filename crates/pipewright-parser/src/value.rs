//! Argument value parsers.
//!
//! Keyword arguments in PCF are whitespace-separated tokens; the numeric
//! ones (coordinates, bores, weights) accept the usual float spellings
//! including exponents. Parsing goes through [`winnow`] so scientific
//! notation and signs behave the same everywhere.

use winnow::{Parser as _, ascii::float, error::ContextError};

use pipewright_core::geometry::{EndPoint, Point3};

/// Why an argument list could not be turned into a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ValueError {
    /// A required argument is missing.
    Missing(&'static str),
    /// A token could not be parsed as the required value.
    Malformed { expected: &'static str, token: String },
}

/// Parses one token as a float. The whole token must be consumed.
pub(crate) fn parse_float(token: &str) -> Option<f64> {
    float::<&str, f64, ContextError>.parse(token).ok()
}

fn required_float(args: &[String], at: usize, what: &'static str) -> Result<f64, ValueError> {
    let token = args.get(at).ok_or(ValueError::Missing(what))?;
    parse_float(token).ok_or_else(|| ValueError::Malformed {
        expected: what,
        token: token.clone(),
    })
}

/// Parses the argument list of a point keyword (`END-POINT`,
/// `CENTRE-POINT`, ...): three coordinates, then an optional bore, then an
/// optional end-preparation token.
pub(crate) fn parse_end_point(args: &[String]) -> Result<EndPoint, ValueError> {
    let x = required_float(args, 0, "x coordinate")?;
    let y = required_float(args, 1, "y coordinate")?;
    let z = required_float(args, 2, "z coordinate")?;

    let mut end_point = EndPoint::new(Point3::new(x, y, z));
    let mut rest = args[3..].iter();

    if let Some(token) = rest.next() {
        match parse_float(token) {
            Some(bore) => end_point = end_point.with_bore(bore),
            // A non-numeric fourth token is already the end preparation.
            None => return Ok(end_point.with_end_prep(token.clone())),
        }
    }
    if let Some(token) = rest.next() {
        end_point = end_point.with_end_prep(token.clone());
    }

    Ok(end_point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_accepts_exponents() {
        assert_eq!(parse_float("1.5E+3"), Some(1500.0));
        assert_eq!(parse_float("-12.25"), Some(-12.25));
        assert_eq!(parse_float("50mm"), None);
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn end_point_with_bore_and_prep() {
        let ep = parse_end_point(&args(&["100", "200.5", "0", "50", "BW"])).unwrap();
        assert_eq!(ep.position().y(), 200.5);
        assert_eq!(ep.bore(), Some(50.0));
        assert_eq!(ep.end_prep(), Some("BW"));
    }

    #[test]
    fn end_point_prep_without_bore() {
        let ep = parse_end_point(&args(&["0", "0", "0", "FL"])).unwrap();
        assert_eq!(ep.bore(), None);
        assert_eq!(ep.end_prep(), Some("FL"));
    }

    #[test]
    fn end_point_missing_coordinate() {
        let err = parse_end_point(&args(&["0", "0"])).unwrap_err();
        assert_eq!(err, ValueError::Missing("z coordinate"));
    }

    #[test]
    fn end_point_malformed_coordinate() {
        let err = parse_end_point(&args(&["0", "abc", "0"])).unwrap_err();
        assert!(matches!(err, ValueError::Malformed { token, .. } if token == "abc"));
    }
}
