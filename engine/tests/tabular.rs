//! Tabular engine scenarios over realistic show-output shapes.

use showparse_core::table::{TableSpec, strip_trailing_cleaner};
use showparse_engine::{ParseContext, TableRequest};

fn run(spec: &TableSpec, text: &str) -> showparse_core::table::TableEntries {
    let mut ctx = ParseContext::new();
    TableRequest::new("device").run_on_text(&mut ctx, spec, text).unwrap()
}

#[test]
fn test_right_justified_two_column_index() {
    let output = "\
Neighbor        AS MsgRcvd
50.1.0.2       100      63
";
    let spec = TableSpec::new(["Neighbor", "AS", "MsgRcvd"]).with_index(&[0, 1]);
    let entries = run(&spec, output);

    let row = entries.row(&["50.1.0.2", "100"]).unwrap();
    assert_eq!(row.get("neighbor").map(String::as_str), Some("50.1.0.2"));
    assert_eq!(row.get("as").map(String::as_str), Some("100"));
    assert_eq!(row.get("msg_rcvd").map(String::as_str), Some("63"));
    // Exactly the two-level nesting the index asks for.
    assert!(entries.get(&["50.1.0.2"]).unwrap().as_group().is_some());
}

#[test]
fn test_bgp_summary_full_width_table() {
    let output = "\
BGP router identifier 50.1.1.1, local AS number 100

Neighbor        Spk    AS MsgRcvd MsgSent   TblVer  InQ OutQ  Up/Down  St/PfxRcd
50.1.0.2          0   200   12471   12469       43    0    0    3d14h         10
50.1.4.2          0   300    8982    8985       43    0    0    2d07h          5
2001:db8::2       0   400      17      19       43    0    0 00:12:21          1
";
    let spec = TableSpec::new([
        "Neighbor", "Spk", "AS", "MsgRcvd", "MsgSent", "TblVer", "InQ", "OutQ", "Up/Down",
        "St/PfxRcd",
    ]);
    let entries = run(&spec, output);

    assert_eq!(entries.len(), 3);
    let row = entries.row(&["50.1.4.2"]).unwrap();
    assert_eq!(row.get("as").map(String::as_str), Some("300"));
    assert_eq!(row.get("up_down").map(String::as_str), Some("2d07h"));
    assert_eq!(row.get("st_pfx_rcd").map(String::as_str), Some("5"));

    let v6 = entries.row(&["2001:db8::2"]).unwrap();
    assert_eq!(v6.get("up_down").map(String::as_str), Some("00:12:21"));
}

#[test]
fn test_address_family_titles_with_terminal() {
    let output = "\
Address Family: IPv4 Unicast
Neighbor        State
10.0.0.1        Established
10.0.0.2        Idle
Processed 2 neighbors
Address Family: IPv6 Unicast
Neighbor        State
2001:db8::9     Established
Processed 1 neighbors
";
    let spec = TableSpec::new(["Neighbor", "State"])
        .with_title_pattern(r"Address Family: (.+)")
        .with_terminal_pattern(r"^Processed \d+ neighbors");
    let entries = run(&spec, output);

    assert_eq!(
        entries.keys().collect::<Vec<_>>(),
        ["IPv4 Unicast", "IPv6 Unicast"]
    );
    let row = entries.row(&["IPv4 Unicast", "10.0.0.2"]).unwrap();
    assert_eq!(row.get("state").map(String::as_str), Some("Idle"));
    assert!(entries.row(&["IPv6 Unicast", "2001:db8::9"]).is_some());
}

#[test]
fn test_route_table_with_marker_cleaner_and_multi_word_cells() {
    let output = "\
Network            Next Hop         Metric
10.10.0.0/16*>     50.1.0.2              0
10.20.0.0/16       not advertised      100
";
    let spec = TableSpec::stacked(vec![
        vec!["Network".to_string(), "Next Hop".to_string(), "Metric".to_string()],
    ])
    .with_cleaner(0, strip_trailing_cleaner("*>"));
    let entries = run(&spec, output);

    let row = entries.row(&["10.10.0.0/16"]).unwrap();
    assert_eq!(row.get("next_hop").map(String::as_str), Some("50.1.0.2"));

    // Four tokens over three columns: the two-word next hop joins.
    let row = entries.row(&["10.20.0.0/16"]).unwrap();
    assert_eq!(row.get("next_hop").map(String::as_str), Some("not advertised"));
    assert_eq!(row.get("metric").map(String::as_str), Some("100"));
}

#[test]
fn test_preamble_lines_before_header_are_ignored() {
    let output = "\
Load for five secs: 1%/0%
Time source is NTP, 11:12:13.000 UTC

Interface     Status
Gi0/0         up
";
    let spec = TableSpec::new(["Interface", "Status"]);
    let entries = run(&spec, output);
    assert_eq!(entries.len(), 1);
    assert!(entries.row(&["Gi0/0"]).is_some());
}
