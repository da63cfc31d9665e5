//! Unit tests for the three-pass parser and keyword dictionary.

use pipewright_core::element::{ElementKind, PipelineGroup};

use crate::{ParseOptions, ParseOutcome, UnknownKeywordPolicy, parse};

const SIMPLE_FILE: &str = "\
ISOGEN-FILES ISOGEN.FLS
UNITS-BORE MM
UNITS-CO-ORDS MM
PIPELINE-REFERENCE L-100
    DATE-DMY 21-03-16
PIPE
    END-POINT 0.0 0.0 0.0 50
    END-POINT 1200.0 0.0 0.0 50
    PIPING-SPEC CS150
    SKEY PIPE
CAP
    END-POINT 1200.0 0.0 0.0 50
    SKEY CAP
MATERIALS
ITEM-CODE 17
    DESCRIPTION Carbon steel pipe
";

fn parse_default(source: &str) -> ParseOutcome {
    parse(source, &ParseOptions::default()).expect("expected parse to succeed")
}

fn assert_parse_fails(source: &str) {
    assert!(
        parse(source, &ParseOptions::default()).is_err(),
        "expected parsing to fail, but it succeeded"
    );
}

mod segmentation {
    use super::*;

    #[test]
    fn one_symbol_per_marker() {
        let outcome = parse_default(SIMPLE_FILE);
        // Every column-0 line is a marker, including headers and materials.
        assert_eq!(outcome.elements.len(), 8);
    }

    #[test]
    fn kinds_follow_markers() {
        let outcome = parse_default(SIMPLE_FILE);
        let kinds: Vec<_> = outcome.elements.iter().map(|es| es.kind().clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::IsogenFiles,
                ElementKind::UnitsBore,
                ElementKind::UnitsCoOrds,
                ElementKind::PipelineReference,
                ElementKind::Pipe,
                ElementKind::Cap,
                ElementKind::Materials,
                ElementKind::ItemCode,
            ]
        );
    }

    #[test]
    fn groups_track_file_sections() {
        let outcome = parse_default(SIMPLE_FILE);
        let groups: Vec<_> = outcome
            .elements
            .iter()
            .map(|es| es.group().clone())
            .collect();

        assert_eq!(groups[0], PipelineGroup::PrePipeline);
        assert_eq!(groups[2], PipelineGroup::PrePipeline);
        assert_eq!(groups[4], PipelineGroup::Named("L-100".to_string()));
        assert_eq!(groups[5], PipelineGroup::Named("L-100".to_string()));
        assert_eq!(groups[6], PipelineGroup::Materials);
        assert_eq!(groups[7], PipelineGroup::Materials);
    }

    #[test]
    fn only_pipe_and_cap_are_physical() {
        let outcome = parse_default(SIMPLE_FILE);
        let physical: Vec<_> = outcome
            .elements
            .iter()
            .filter(|es| es.is_physical())
            .map(|es| es.kind().clone())
            .collect();
        assert_eq!(physical, vec![ElementKind::Pipe, ElementKind::Cap]);
    }

    #[test]
    fn blank_lines_are_tolerated() {
        let source = "\
PIPELINE-REFERENCE L-1

PIPE
    END-POINT 0 0 0

    END-POINT 1 0 0
";
        let outcome = parse_default(source);
        assert_eq!(outcome.elements.len(), 2);
        let pipe = outcome.elements.get(1).unwrap();
        assert_eq!(pipe.attributes().end_points.len(), 2);
    }
}

mod indexing {
    use super::*;

    #[test]
    fn ranges_are_disjoint_and_ordered() {
        let outcome = parse_default(SIMPLE_FILE);
        let ranges: Vec<_> = outcome.elements.iter().map(|es| es.lines()).collect();

        for window in ranges.windows(2) {
            assert!(!window[0].overlaps(window[1]));
            assert_eq!(window[0].end(), window[1].start());
        }
    }

    #[test]
    fn last_range_reaches_end_of_file() {
        let outcome = parse_default(SIMPLE_FILE);
        let last = outcome.elements.iter().last().unwrap().lines();
        assert_eq!(last.end(), SIMPLE_FILE.lines().count());
    }
}

mod keyword_resolution {
    use super::*;

    #[test]
    fn end_points_accumulate_in_file_order() {
        let outcome = parse_default(SIMPLE_FILE);
        let pipe = outcome.elements.get(4).unwrap();
        let points = &pipe.attributes().end_points;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].position().x(), 0.0);
        assert_eq!(points[1].position().x(), 1200.0);
        assert_eq!(points[1].bore(), Some(50.0));
    }

    #[test]
    fn scalar_keywords_resolve() {
        let outcome = parse_default(SIMPLE_FILE);
        let pipe = outcome.elements.get(4).unwrap();
        assert_eq!(pipe.attributes().piping_spec.as_deref(), Some("CS150"));
        assert_eq!(pipe.attributes().skey.as_deref(), Some("PIPE"));

        let item = outcome.elements.get(7).unwrap();
        assert_eq!(
            item.attributes().description.as_deref(),
            Some("Carbon steel pipe")
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        // Raw entries stay on the symbol; parsing the same source twice
        // must yield identical attributes.
        let first = parse_default(SIMPLE_FILE);
        let second = parse_default(SIMPLE_FILE);
        for (a, b) in first.elements.iter().zip(second.elements.iter()) {
            assert_eq!(a.attributes(), b.attributes());
        }
    }

    #[test]
    fn unknown_keyword_warns_by_default() {
        let source = "\
PIPE
    END-POINT 0 0 0
    VENDOR-EXTENSION some value
";
        let outcome = parse_default(source);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].message().contains("VENDOR-EXTENSION"));

        let pipe = outcome.elements.get(0).unwrap();
        assert_eq!(
            pipe.attributes().extra.get("VENDOR-EXTENSION").map(String::as_str),
            Some("some value")
        );
    }

    #[test]
    fn unknown_keyword_fails_under_deny() {
        let source = "\
PIPE
    VENDOR-EXTENSION some value
";
        let options = ParseOptions {
            unknown_keywords: UnknownKeywordPolicy::Deny,
        };
        assert!(parse(source, &options).is_err());
    }

    #[test]
    fn malformed_coordinate_is_fatal() {
        assert_parse_fails("PIPE\n    END-POINT 0 oops 0\n");
    }

    #[test]
    fn all_malformed_lines_reported_together() {
        let source = "\
PIPE
    END-POINT 0 oops 0
CAP
    WEIGHT heavy
";
        let err = parse(source, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
    }
}

mod malformed_structure {
    use super::*;

    #[test]
    fn empty_file_fails() {
        assert_parse_fails("");
        assert_parse_fails("\n   \n\n");
    }

    #[test]
    fn indented_content_before_first_marker_fails() {
        assert_parse_fails("    END-POINT 0 0 0 50\nPIPE\n");
    }

    #[test]
    fn unnamed_pipeline_reference_fails() {
        assert_parse_fails("PIPELINE-REFERENCE\nPIPE\n    END-POINT 0 0 0\n");
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    const MARKERS: &[&str] = &["PIPE", "ELBOW", "TEE", "CAP", "VALVE", "FLANGE"];

    fn arbitrary_block() -> impl Strategy<Value = String> {
        (
            proptest::sample::select(MARKERS),
            proptest::collection::vec((0..3usize, -1e6..1e6f64, -1e6..1e6f64, -1e6..1e6f64), 0..4),
        )
            .prop_map(|(marker, points)| {
                let mut block = format!("{marker}\n");
                for (blanks, x, y, z) in points {
                    for _ in 0..blanks {
                        block.push('\n');
                    }
                    block.push_str(&format!("    END-POINT {x} {y} {z}\n"));
                }
                block
            })
    }

    proptest! {
        #[test]
        fn ranges_partition_marker_lines(blocks in proptest::collection::vec(arbitrary_block(), 1..20)) {
            let source = blocks.concat();
            let outcome = parse(&source, &ParseOptions::default()).unwrap();

            // One symbol per marker.
            prop_assert_eq!(outcome.elements.len(), blocks.len());

            // Ranges are non-overlapping and leave no gap between blocks.
            let ranges: Vec<_> = outcome.elements.iter().map(|es| es.lines()).collect();
            for window in ranges.windows(2) {
                prop_assert!(!window[0].overlaps(window[1]));
                prop_assert_eq!(window[0].end(), window[1].start());
            }
            prop_assert_eq!(ranges[0].start(), 0);
            prop_assert_eq!(ranges.last().unwrap().end(), source.lines().count());
        }
    }
}
