use crate::error::{MalformedGraph, ResolveError};
use crate::obsmode::Obsmode;

use super::params::{
    EmptyParameterTable, ParamEntry, ParamMatch, ParameterTable, date_to_mjd, mjd_to_date,
    resolve_parameter,
};
use super::resolve::resolve;
use super::table::{CompTable, GraphRow, GraphTable};

fn row(innode: u32, keyword: &str, outnode: u32, compname: &str, thcompname: &str) -> GraphRow {
    GraphRow {
        innode,
        keyword: keyword.to_string(),
        outnode,
        compname: compname.to_string(),
        thcompname: thcompname.to_string(),
    }
}

/// A small instrument graph shaped like the delivered HST tables: an
/// entry node, per-instrument branches, a parameterized detector node
/// with a default edge, and filter wheels converging on a terminal.
pub(crate) fn fixture_rows() -> Vec<GraphRow> {
    vec![
        row(1, "default", 20, "ota", "clear"),
        row(20, "acs", 30, "clear", "clear"),
        row(20, "stis", 900, "clear", "clear"),
        row(20, "johnson", 70, "clear", "clear"),
        row(30, "wfc1", 40, "acs_wfc_ccd1", "clear"),
        row(30, "wfc2", 41, "acs_wfc_ccd2", "clear"),
        row(40, "default", 50, "clear", "clear"),
        row(40, "mjd#", 50, "acs_wfc_ccd1_mjd", "clear"),
        row(41, "default", 50, "clear", "clear"),
        row(50, "f555w", 60, "acs_f555w", "clear"),
        row(50, "f814w", 60, "acs_f814w", "clear"),
        row(70, "v", 80, "johnson_v", "clear"),
    ]
}

pub(crate) fn fixture_table() -> GraphTable {
    GraphTable::from_rows("fixture", fixture_rows()).unwrap()
}

/// Parameter tables matching the fixture's `acs_wfc_ccd1_mjd` component.
pub(crate) struct FixtureParams;

impl ParameterTable for FixtureParams {
    fn entries(&self, component: &str, keyword: &str) -> Option<Vec<ParamEntry>> {
        if component == "acs_wfc_ccd1_mjd" && keyword == "mjd" {
            Some(vec![
                ParamEntry { value: 52334.0, filename: "ccd1_mjd_52334.fits".into() },
                ParamEntry { value: 55000.0, filename: "ccd1_mjd_55000.fits".into() },
                ParamEntry { value: 57000.0, filename: "ccd1_mjd_57000.fits".into() },
            ])
        } else {
            None
        }
    }

    fn parameterized_keyword(&self, component: &str) -> Option<String> {
        (component == "acs_wfc_ccd1_mjd").then(|| "mjd".to_string())
    }
}

fn resolve_str(obsmode: &str) -> Result<super::resolve::GraphPath, ResolveError> {
    let obsmode = Obsmode::parse(obsmode)?;
    resolve(&fixture_table(), &obsmode)
}

#[test]
fn walks_named_and_default_edges_in_order() {
    let path = resolve_str("acs,wfc1,f555w").unwrap();
    assert_eq!(path.optical, vec!["ota", "acs_wfc_ccd1", "acs_f555w"]);
    assert!(path.captures.is_empty());
    assert!(path.modifiers.is_empty());
}

#[test]
fn token_order_does_not_matter() {
    let a = resolve_str("acs,wfc1,f555w").unwrap();
    let b = resolve_str("f555w,wfc1,acs").unwrap();
    assert_eq!(a.optical, b.optical);
    assert_eq!(a.captures, b.captures);
}

#[test]
fn parameterized_edge_captures_value_and_component() {
    let path = resolve_str("acs,wfc1,mjd#56000,f555w").unwrap();
    assert_eq!(path.optical, vec!["ota", "acs_wfc_ccd1", "acs_wfc_ccd1_mjd", "acs_f555w"]);
    assert_eq!(path.captures.len(), 1);
    assert_eq!(path.captures[0].keyword, "mjd");
    assert_eq!(path.captures[0].value, 56000.0);
    assert_eq!(path.captures[0].component.as_deref(), Some("acs_wfc_ccd1_mjd"));
    assert_eq!(path.capture("mjd"), Some(56000.0));
}

#[test]
fn unused_token_is_unrecognized() {
    let err = resolve_str("acs,wfc1,f555w,bogus").unwrap_err();
    assert_eq!(
        err,
        ResolveError::UnrecognizedKeyword {
            keyword: "bogus".to_string(),
            obsmode: "acs,wfc1,f555w,bogus".to_string(),
        }
    );
}

#[test]
fn halt_without_default_reports_available_keywords() {
    let err = resolve_str("acs").unwrap_err();
    match err {
        ResolveError::IncompleteObsmode { node, available } => {
            assert_eq!(node, 30);
            assert_eq!(available, vec!["wfc1", "wfc2"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn modifier_tokens_survive_the_walk() {
    let path = resolve_str("acs,wfc1,f555w,noota").unwrap();
    assert_eq!(path.modifiers, vec!["noota"]);
}

#[test]
fn resolution_is_deterministic() {
    let first = resolve_str("acs,wfc1,mjd#56000,f814w").unwrap();
    for _ in 0..10 {
        assert_eq!(resolve_str("acs,wfc1,mjd#56000,f814w").unwrap(), first);
    }
}

#[test]
fn duplicate_keyword_at_node_is_rejected() {
    let mut rows = fixture_rows();
    rows.push(row(50, "f555w", 61, "other_f555w", "clear"));
    let err = GraphTable::from_rows("dup", rows).unwrap_err();
    assert_eq!(err, MalformedGraph::DuplicateKeyword { node: 50, keyword: "f555w".to_string() });
}

#[test]
fn duplicate_default_edge_is_rejected() {
    let mut rows = fixture_rows();
    rows.push(row(40, "default", 55, "clear", "clear"));
    let err = GraphTable::from_rows("dup", rows).unwrap_err();
    assert_eq!(err, MalformedGraph::DuplicateKeyword { node: 40, keyword: "default".to_string() });
}

#[test]
fn cycle_is_rejected_at_build_time() {
    let mut rows = fixture_rows();
    rows.push(row(60, "default", 30, "clear", "clear"));
    let err = GraphTable::from_rows("cyclic", rows).unwrap_err();
    assert!(matches!(err, MalformedGraph::Cycle { .. }));
}

#[test]
fn comp_table_maps_components_to_files() {
    let tab = CompTable::from_rows(
        "tmc",
        vec![
            ("acs_f555w".to_string(), "acs_f555w_004_syn.fits".to_string()),
            ("OTA".to_string(), "hst_ota_007_syn.fits".to_string()),
        ],
    );
    assert_eq!(tab.filename("acs_f555w").unwrap(), "acs_f555w_004_syn.fits");
    assert_eq!(tab.filename("ota").unwrap(), "hst_ota_007_syn.fits");
    assert_eq!(
        tab.filename("missing").unwrap_err(),
        ResolveError::UnknownComponent { component: "missing".to_string(), table: "tmc".to_string() },
    );
}

#[test]
fn parameter_exact_match() {
    let m = resolve_parameter(&FixtureParams, "acs_wfc_ccd1_mjd", "mjd", Some(55000.0)).unwrap();
    assert_eq!(m, ParamMatch::Exact { filename: "ccd1_mjd_55000.fits".to_string() });
}

#[test]
fn parameter_bracketing_fraction() {
    let m = resolve_parameter(&FixtureParams, "acs_wfc_ccd1_mjd", "mjd", Some(56000.0)).unwrap();
    match m {
        ParamMatch::Bracketed { lower, upper, fraction } => {
            assert_eq!(lower.value, 55000.0);
            assert_eq!(upper.value, 57000.0);
            assert!((fraction - 0.5).abs() < 1e-12);
        }
        other => panic!("unexpected match: {other:?}"),
    }
}

#[test]
fn parameter_out_of_domain_is_a_hard_error() {
    for value in [1000.0, 99999.0] {
        let err =
            resolve_parameter(&FixtureParams, "acs_wfc_ccd1_mjd", "mjd", Some(value)).unwrap_err();
        assert!(matches!(err, ResolveError::ParameterOutOfRange { min, max, .. }
            if min == 52334.0 && max == 57000.0));
    }
}

#[test]
fn parameter_without_value_uses_latest() {
    let m = resolve_parameter(&FixtureParams, "acs_wfc_ccd1_mjd", "mjd", None).unwrap();
    assert_eq!(m, ParamMatch::Latest { filename: "ccd1_mjd_57000.fits".to_string() });
}

#[test]
fn missing_parameter_table_is_reported() {
    let err = resolve_parameter(&EmptyParameterTable, "acs_f555w", "mjd", Some(1.0)).unwrap_err();
    assert_eq!(
        err,
        ResolveError::MissingParameterTable {
            component: "acs_f555w".to_string(),
            keyword: "mjd".to_string(),
        }
    );
}

#[test]
fn mjd_date_round_trip() {
    let date = mjd_to_date(56000.0).unwrap();
    assert_eq!(date.to_string(), "2012-03-14");
    assert_eq!(date_to_mjd(date), 56000.0);
    assert_eq!(mjd_to_date(0.0).unwrap().to_string(), "1858-11-17");
}

#[test]
fn unreachable_nodes_do_not_fail_the_build() {
    // Node 900 (stis branch) is terminal; adding rows under an island
    // node that nothing points to still builds.
    let mut rows = fixture_rows();
    rows.push(row(500, "island", 501, "clear", "clear"));
    let table = GraphTable::from_rows("islands", rows).unwrap();
    assert!(table.node(500).is_some());
}
