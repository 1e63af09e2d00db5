use cardmark::parse::{parse_document, serialize_document};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

/// Helper: load a fixture, parse it, serialize it, and assert
/// line-for-line equality; then re-parse the output and assert the
/// documents match.
fn assert_round_trip(fixture_name: &str) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(fixture_name);
    let source = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Could not read fixture {}: {}", fixture_name, e));

    let doc = parse_document(&source)
        .unwrap_or_else(|e| panic!("Could not parse fixture {}: {}", fixture_name, e));
    let output = serialize_document(&doc);

    let source_lines: Vec<String> = source.lines().map(|l| l.to_string()).collect();
    assert_eq!(
        output, source_lines,
        "Round-trip failed for fixture: {}",
        fixture_name
    );

    let reparsed = parse_document(&output.join("\n"))
        .unwrap_or_else(|e| panic!("Could not re-parse output of {}: {}", fixture_name, e));
    assert_eq!(
        reparsed, doc,
        "Re-parse diverged for fixture: {}",
        fixture_name
    );
}

#[test]
fn round_trip_card() {
    assert_round_trip("card.md");
}

#[test]
fn round_trip_nested_lists() {
    assert_round_trip("nested_lists.md");
}

#[test]
fn round_trip_front_matter_only() {
    assert_round_trip("front_matter_only.md");
}

#[test]
fn round_trip_quote_and_code() {
    assert_round_trip("quote_and_code.md");
}
