//! Compiler → registry → engine round trip: declarations generated from
//! annotated markup, loaded into a registry, must recover the literal
//! values of the very example they were derived from.

use std::fs;
use std::path::PathBuf;

use showparse_core::types::Expectation;
use showparse_engine::{ExtractError, NonTabularRequest, ParseContext, PatternRegistry};
use showparse_markup::compile;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("fixture file must be readable")
}

fn context_from_fixture() -> ParseContext {
    let output = compile(&fixture("bgp-markup.txt"));
    assert!(output.is_clean(), "skipped: {:?}", output.skipped);
    let mut registry = PatternRegistry::new();
    registry.extend(&output.declarations).unwrap();
    ParseContext::with_registry(registry)
}

#[test]
fn test_fill_recovers_example_literals() {
    let compiled = compile(&fixture("bgp-markup.txt"));
    let mut ctx = ParseContext::new();
    ctx.registry.extend(&compiled.declarations).unwrap();

    for decl in &compiled.compiled {
        let mut request = NonTabularRequest::new("fixture-device");
        if let Some(os) = &decl.os {
            request = request.os(os.clone());
        }
        for tag in &decl.tags {
            request = request.fill(tag.clone());
        }
        let outcome = request
            .run_on_text(&mut ctx, &decl.actual)
            .unwrap_or_else(|e| panic!("{} should parse its own example: {e}", decl.cmd));
        assert!(outcome.success, "{} against its own example", decl.cmd);
        assert_eq!(outcome.len(), decl.tags.len());
    }
}

#[test]
fn test_round_trip_values_are_the_example_values() {
    let compiled = compile(&fixture("bgp-markup.txt"));
    let mut ctx = ParseContext::new();
    ctx.registry.extend(&compiled.declarations).unwrap();

    let summary = compiled
        .compiled
        .iter()
        .find(|d| d.cmd == "show_bgp_all_all_summary" && d.os.as_deref() == Some("iosxr"))
        .unwrap();

    let outcome = NonTabularRequest::new("router1")
        .os("iosxr")
        .fill("bgp.router-id")
        .fill("bgp.local_as_number")
        .fill("bgp.table-id")
        .fill("bgp.table-version")
        .run_on_text(&mut ctx, &summary.actual)
        .unwrap();

    assert!(outcome.success);
    let record = outcome.record();
    assert_eq!(record.get("bgp.router-id"), Some("50.1.1.1"));
    assert_eq!(record.get("bgp.local_as_number"), Some("100"));
    assert_eq!(record.get("bgp.table-id"), Some("0xe0000000"));
    assert_eq!(record.get("bgp.table-version"), Some("43"));
}

#[test]
fn test_yaml_path_behaves_like_direct_extend() {
    let compiled = compile(&fixture("bgp-markup.txt"));
    let yaml = compiled.declarations.to_yaml().unwrap();

    let mut direct = PatternRegistry::new();
    direct.extend(&compiled.declarations).unwrap();
    let mut via_yaml = PatternRegistry::new();
    via_yaml.extend_from_yaml(&yaml).unwrap();

    assert_eq!(direct.namespaces(), via_yaml.namespaces());
    for os in direct.namespaces() {
        assert_eq!(direct.tag_order(Some(os)), via_yaml.tag_order(Some(os)));
    }
}

#[test]
fn test_validate_against_example_then_mutate_one() {
    let compiled = compile(&fixture("bgp-markup.txt"));
    let mut ctx = ParseContext::new();
    ctx.registry.extend(&compiled.declarations).unwrap();
    let neighbors = compiled
        .compiled
        .iter()
        .find(|d| d.cmd == "show_bgp_neighbors")
        .unwrap();

    let all_matching = NonTabularRequest::new("router1")
        .os("iosxr")
        .expect("bgp.neighbor", Expectation::eq("50.1.0.2"))
        .expect("bgp.remote-as", Expectation::eq(200))
        .expect("bgp.state", Expectation::one_of(["Established", "Active"]))
        .run_on_text(&mut ctx, &neighbors.actual)
        .unwrap();
    assert!(all_matching.success);
    assert!(all_matching.diff.is_empty());

    let one_mutated = NonTabularRequest::new("router1")
        .os("iosxr")
        .expect("bgp.neighbor", Expectation::eq("50.1.0.2"))
        .expect("bgp.remote-as", Expectation::eq(65000))
        .expect("bgp.state", Expectation::one_of(["Established", "Active"]))
        .run_on_text(&mut ctx, &neighbors.actual)
        .unwrap();
    assert!(!one_mutated.success);
    assert_eq!(
        one_mutated.diff,
        "- bgp.remote-as = 65000\n+ bgp.remote-as = 200\n"
    );
}

#[test]
fn test_unknown_tag_aborts_with_registry_error() {
    let mut ctx = context_from_fixture();
    let result = NonTabularRequest::new("router1")
        .os("iosxr")
        .fill("bgp.router-id")
        .fill("ospf.area")
        .run_on_text(&mut ctx, "BGP router identifier 50.1.1.1, local AS number 100");
    assert!(matches!(result, Err(ExtractError::Registry(_))));
}

#[test]
fn test_cross_os_fill_uses_namespaced_patterns() {
    let mut ctx = context_from_fixture();
    let outcome = NonTabularRequest::new("switch1")
        .os("nxos")
        .fill("bgp.router-id")
        .run_on_text(&mut ctx, "BGP router identifier 50.1.1.2, local AS number 100")
        .unwrap();
    assert_eq!(outcome.record().get("bgp.router-id"), Some("50.1.1.2"));
}
