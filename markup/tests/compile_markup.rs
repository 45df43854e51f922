use std::fs;
use std::path::PathBuf;

use regex::Regex;
use showparse_core::declarations::Declarations;
use showparse_markup::{CompileOptions, compile, compile_with};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("fixture file must be readable")
}

#[test]
fn test_compile_bgp_fixture_yields_three_declarations() {
    let output = compile(&fixture("bgp-markup.txt"));
    assert!(output.is_clean(), "skipped: {:?}", output.skipped);
    assert_eq!(output.compiled.len(), 3);

    let decls = &output.declarations;
    assert_eq!(decls.namespaces(), ["iosxr", "nxos"]);
    assert_eq!(
        decls.show_commands["iosxr"]["show_bgp_neighbors"],
        "show bgp neighbors {neighbor}"
    );
    assert_eq!(
        decls.show_commands["nxos"]["show_bgp_all_all_summary"],
        "show bgp all summary"
    );
}

#[test]
fn test_derived_and_explicit_tags() {
    let output = compile(&fixture("bgp-markup.txt"));
    let decls = &output.declarations;

    // Explicit tags.
    assert!(decls.patterns(Some("iosxr"), "bgp.router-id").is_some());
    assert!(decls.patterns(Some("iosxr"), "bgp.up-time").is_some());
    // Untagged markers derive from the preceding words.
    assert!(decls.patterns(Some("iosxr"), "bgp.local_as_number").is_some());
    assert!(decls.patterns(Some("iosxr"), "bgp.local_as").is_some());
}

#[test]
fn test_manifest_reflects_first_appearance_order() {
    let output = compile(&fixture("bgp-markup.txt"));
    let tags = output.declarations.tags(Some("iosxr"));
    assert_eq!(
        tags,
        [
            "bgp.router-id",
            "bgp.local_as_number",
            "bgp.scan-interval",
            "bgp.table-state",
            "bgp.table-id",
            "bgp.table-version",
            "bgp.neighbor",
            "bgp.remote-as",
            "bgp.local_as",
            "bgp.state",
            "bgp.up-time",
        ]
    );
}

#[test]
fn test_same_tag_across_oses_stays_separate() {
    let output = compile(&fixture("bgp-markup.txt"));
    let decls = &output.declarations;
    let iosxr = decls.patterns(Some("iosxr"), "bgp.router-id").unwrap();
    let nxos = decls.patterns(Some("nxos"), "bgp.router-id").unwrap();
    assert_eq!(iosxr.patterns().len(), 1);
    assert_eq!(nxos.patterns().len(), 1);
}

#[test]
fn test_generated_patterns_match_the_example_output() {
    let output = compile(&fixture("bgp-markup.txt"));
    let decls = &output.declarations;

    for (tag, expected, haystack) in [
        (
            "bgp.router-id",
            "50.1.1.1",
            "BGP router identifier 50.1.1.1, local AS number 100",
        ),
        ("bgp.table-id", "0xe0000000", "Table ID: 0xe0000000"),
        (
            "bgp.state",
            "Established",
            " BGP state = Established, up for 00:42:33",
        ),
        (
            "bgp.up-time",
            "00:42:33",
            " BGP state = Established, up for 00:42:33",
        ),
    ] {
        let entry = decls.patterns(Some("iosxr"), tag).unwrap();
        let re = Regex::new(&entry.patterns()[0]).unwrap();
        let caps = re.captures(haystack).unwrap_or_else(|| {
            panic!("pattern for {tag} should match example line: {}", entry.patterns()[0])
        });
        assert_eq!(&caps[1], expected, "capture for {tag}");
    }
}

#[test]
fn test_compiling_twice_is_byte_identical() {
    let source = fixture("bgp-markup.txt");
    let first = compile(&source).declarations.to_yaml().unwrap();
    let second = compile(&source).declarations.to_yaml().unwrap();
    assert_eq!(first, second);

    // And the YAML parses back to the same declarations.
    let reparsed = Declarations::from_yaml(&first).unwrap();
    assert_eq!(reparsed, compile(&source).declarations);
}

#[test]
fn test_no_os_mode_compiles_flat() {
    let source = fixture("bgp-markup.txt");
    let output = compile_with(
        &source,
        CompileOptions {
            namespaced: false,
            ..CompileOptions::default()
        },
    );
    assert!(output.is_clean());
    // All declarations land in the single no-OS namespace.
    assert!(output.declarations.patterns(None, "bgp.neighbor").is_some());

    let yaml = output.declarations.to_yaml().unwrap();
    let reparsed = Declarations::from_yaml(&yaml).unwrap();
    assert_eq!(reparsed, output.declarations);
}

#[test]
fn test_actual_text_retained_for_verification() {
    let output = compile(&fixture("bgp-markup.txt"));
    let neighbors = output
        .compiled
        .iter()
        .find(|decl| decl.cmd == "show_bgp_neighbors")
        .unwrap();
    assert!(neighbors.actual.contains("BGP neighbor is 50.1.0.2"));
    assert_eq!(neighbors.tags.first().map(String::as_str), Some("bgp.neighbor"));
}
