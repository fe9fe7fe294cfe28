use crate::error::LangError;
use crate::graph::table::CompTable;
use crate::graph::tests::{FixtureParams, fixture_table};
use crate::observatory::Observatory;

use super::earley;
use super::grammar::TermSet;
use super::interp::{Interpreter, TraceFactory};
use super::scanner::{TokenKind, rewrite, scan};
use super::tree::ParseTree;

fn kinds(src: &str) -> Vec<TokenKind> {
    scan(src).unwrap().into_iter().map(|t| t.kind).collect()
}

fn parse_src(src: &str) -> ParseTree {
    earley::parse(&scan(src).unwrap(), src.len()).unwrap()
}

fn observatory() -> Observatory<FixtureParams> {
    let optical = CompTable::from_rows(
        "tmc",
        [
            ("ota", "hst_ota_007_syn.fits"),
            ("acs_wfc_ccd1", "acs_wfc_ccd1_019_syn.fits"),
            ("acs_f555w", "acs_f555w_004_syn.fits"),
            ("johnson_v", "johnson_v_004_syn.fits"),
        ]
        .map(|(c, f)| (c.to_string(), f.to_string()))
        .to_vec(),
    );
    let thermal = CompTable::from_rows("tmt", Vec::new());
    Observatory::new(fixture_table(), optical, thermal, FixtureParams)
}

fn interpret(src: &str) -> Result<String, crate::error::Error> {
    Interpreter::standalone(&TraceFactory::new()).interpret(src)
}

#[test]
fn scans_numbers_idents_and_punctuation() {
    use TokenKind::*;
    assert_eq!(
        kinds("rn(bb(5000), band(johnson, v), 17.0, abmag)"),
        vec![
            Ident, LParen, Ident, LParen, Number, RParen, Comma, Ident, LParen, Ident, Comma,
            Ident, RParen, Comma, Number, Comma, Ident, RParen,
        ]
    );

    let toks = scan("1.5e-3 .5 5. 42").unwrap();
    let values: Vec<f64> = toks.iter().filter_map(|t| t.value).collect();
    assert_eq!(values, vec![1.5e-3, 0.5, 5.0, 42.0]);
}

#[test]
fn identifiers_double_as_filenames() {
    let toks = scan("crcalspec$alpha_lyr_stis_010.fits /grp/hst/cdbs/x.fits mjd#56000").unwrap();
    assert!(toks.iter().all(|t| t.kind == TokenKind::Ident));
    assert_eq!(toks[1].text, "/grp/hst/cdbs/x.fits");
}

#[test]
fn slash_is_division_only_between_whitespace() {
    assert_eq!(kinds("a / b"), vec![TokenKind::Ident, TokenKind::Slash, TokenKind::Ident]);
    assert_eq!(kinds("a/b"), vec![TokenKind::Ident]);
    assert_eq!(kinds("a /b"), vec![TokenKind::Ident, TokenKind::Ident]);
}

#[test]
fn quoted_strings_drop_their_quotes() {
    let toks = scan(r#"spec("two words.fits")"#).unwrap();
    assert_eq!(toks[2].kind, TokenKind::Str);
    assert_eq!(toks[2].text, "two words.fits");
}

#[test]
fn percent_escape_rewrites_to_plus() {
    assert_eq!(rewrite("spec(a.fits)%2bspec(b.fits)"), "spec(a.fits)+spec(b.fits)");
}

#[test]
fn lex_error_carries_the_byte_position() {
    assert_eq!(scan("bb(5000) ; 2").unwrap_err(), LangError::Lex { position: 9 });
}

#[test]
fn call_trees_are_shallow() {
    let tree = parse_src("bb(5000)");
    let ParseTree::Node { children, .. } = &tree else {
        panic!("expected a call node");
    };
    assert_eq!(children.len(), 4);
    assert!(matches!(&children[2], ParseTree::Leaf(t) if t.text == "5000"));
    assert_eq!(tree.depth(), 2);
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    // (a) + (2 * b), not ((a + 2) * b)
    let tree = parse_src("a.fits + 2 * b.fits");
    let ParseTree::Node { children, .. } = &tree else {
        panic!("expected an addition node");
    };
    assert!(matches!(&children[0], ParseTree::Leaf(t) if t.text == "a.fits"));
    assert!(matches!(&children[2], ParseTree::Node { .. }));
}

#[test]
fn serialization_reproduces_the_source() {
    for src in [
        "rn(bb(5000),band(johnson,v),17,abmag)",
        "2.5*bb(5000)",
        "spec(a.fits) / 100",
        r#"spec("two words.fits")"#,
    ] {
        assert_eq!(parse_src(src).serialize(), src);
    }
}

#[test]
fn reparsing_the_serialization_preserves_shape() {
    // Whitespace is lost on the round trip; structure is not.
    for src in [
        "rn(bb(5000), band(johnson, v), 17.0, abmag)",
        "icat(k93models, 5770, 0, 4.44) * box(5500, 1)",
        "- bb(5000) + em(3880, 100, 1e-14, flam)",
    ] {
        let tree = parse_src(src);
        assert!(tree.same_shape(&parse_src(&tree.serialize())), "for {src}");
    }
}

#[test]
fn parsing_is_deterministic() {
    let first = parse_src("rn(icat(k93models,5770,0,4.44),band(johnson,v),0.5,vegamag)");
    for _ in 0..10 {
        let again = parse_src("rn(icat(k93models,5770,0,4.44),band(johnson,v),0.5,vegamag)");
        assert!(first.same_shape(&again));
    }
}

#[test]
fn syntax_error_at_the_offending_token() {
    let toks = scan("bb(5000").unwrap();
    match earley::parse(&toks, 7).unwrap_err() {
        LangError::Syntax { position, expected } => {
            assert_eq!(position, 7);
            assert!(expected.contains(TermSet::RPAREN));
            assert!(expected.contains(TermSet::PLUS));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let toks = scan("5 5").unwrap();
    match earley::parse(&toks, 3).unwrap_err() {
        LangError::Syntax { position, expected } => {
            assert_eq!(position, 2);
            assert!(expected.contains(TermSet::STAR));
            assert!(!expected.contains(TermSet::NUMBER));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn interprets_constructor_calls() {
    let cases = [
        ("bb(5000)", "bb(5000)"),
        ("pl(4000,-1.5,flam)", "pl(4000,-1.5,flam)"),
        ("em(3880,100,1e-14,flam)", "em(3880,100,0.00000000000001,flam)"),
        ("box(5500,1)", "box(5500,1)"),
        ("unit(1e-16,photlam)", "unit(0.0000000000000001,photlam)"),
        ("icat(k93models,5770,0,4.44)", "icat(k93models,5770,0,4.44)"),
        ("spec(crcalspec$alpha_lyr_stis_010.fits)", "file(crcalspec$alpha_lyr_stis_010.fits)"),
    ];
    for (src, plan) in cases {
        assert_eq!(interpret(src).unwrap(), plan, "for {src}");
    }
}

#[test]
fn arithmetic_goes_through_the_factory() {
    let cases = [
        ("2.5*bb(5000)", "(2.5 * bb(5000))"),
        ("bb(5000)*2.5", "(2.5 * bb(5000))"),
        ("bb(5000) / 2", "(0.5 * bb(5000))"),
        ("bb(5000)+bb(10000)", "(bb(5000) + bb(10000))"),
        ("bb(10000)-bb(5000)", "(bb(10000) - bb(5000))"),
        ("bb(5000)*box(5500,1)", "(bb(5000) * box(5500,1))"),
        ("-bb(5000)", "(-bb(5000))"),
        ("spec(a.fits)%2bspec(b.fits)", "(file(a.fits) + file(b.fits))"),
    ];
    for (src, plan) in cases {
        assert_eq!(interpret(src).unwrap(), plan, "for {src}");
    }
}

#[test]
fn bare_filename_reads_as_a_spectrum() {
    assert_eq!(
        interpret("crcalspec$alpha_lyr_stis_010.fits").unwrap(),
        "file(crcalspec$alpha_lyr_stis_010.fits)"
    );
}

#[test]
fn bare_number_is_not_a_spectrum() {
    assert_eq!(interpret("42").unwrap_err(), LangError::NotASpectrum.into());
}

#[test]
fn extinction_accepts_either_argument_order() {
    assert_eq!(interpret("ebmvx(0.3,mwdense)").unwrap(), "ebmvx(mwdense,0.3)");
    assert_eq!(interpret("ebmvx(mwdense,0.3)").unwrap(), "ebmvx(mwdense,0.3)");
    // Legacy law name.
    assert_eq!(interpret("ebmvx(0.3,gal3)").unwrap(), "ebmvx(mwavg,0.3)");
}

#[test]
fn redshift_of_null_uses_a_flat_spectrum() {
    assert_eq!(interpret("z(null,0.1)").unwrap(), "z(unit(1,photlam),0.1)");
    assert_eq!(interpret("z(bb(5000),0.1)").unwrap(), "z(bb(5000),0.1)");
}

#[test]
fn name_lookups_reject_unknowns() {
    let cases: [(&str, LangError); 4] = [
        ("foo(5)", LangError::UnknownFunction("foo".to_string())),
        ("unit(1,parsecs)", LangError::UnknownUnit("parsecs".to_string())),
        ("ebmvx(0.3,nosuchlaw)", LangError::UnknownLaw("nosuchlaw".to_string())),
        ("icat(nosuchgrid,5770,0,4.44)", LangError::UnknownCatalog("nosuchgrid".to_string())),
    ];
    for (src, want) in cases {
        assert_eq!(interpret(src).unwrap_err(), want.into(), "for {src}");
    }
}

#[test]
fn arity_and_argument_types_are_checked() {
    assert_eq!(
        interpret("bb(5000,1)").unwrap_err(),
        LangError::WrongArgCount { function: "bb", expected: 1, got: 2 }.into()
    );
    assert_eq!(
        interpret("bb(mwavg)").unwrap_err(),
        LangError::BadArgument { function: "bb", index: 1, expected: "number" }.into()
    );
}

#[test]
fn band_requires_instrument_tables() {
    assert_eq!(interpret("band(johnson,v)").unwrap_err(), LangError::BandUnavailable.into());
}

#[test]
fn band_resolves_through_the_observatory() {
    let obs = observatory();
    let factory = TraceFactory::new();
    let interp = Interpreter::with_observatory(&factory, &obs);
    assert_eq!(
        interp.interpret("band(johnson,v)").unwrap(),
        "band(johnson,v -> [hst_ota_007_syn.fits, johnson_v_004_syn.fits])"
    );
    assert_eq!(
        interp.interpret("rn(bb(5000),band(johnson,v),17,abmag)").unwrap(),
        "rn(bb(5000),band(johnson,v -> [hst_ota_007_syn.fits, johnson_v_004_syn.fits]),17,abmag)"
    );
}

#[test]
fn nested_calls_issue_factory_calls_inside_out() {
    let obs = observatory();
    let factory = TraceFactory::new();
    let interp = Interpreter::with_observatory(&factory, &obs);

    let src = "rn(icat(k93models,5000,-0.5,4.4),band(johnson,v),18,abmag)";
    interp.interpret(src).unwrap();
    let band = "band(johnson,v -> [hst_ota_007_syn.fits, johnson_v_004_syn.fits])";
    assert_eq!(
        factory.calls(),
        vec![
            "icat(k93models,5000,-0.5,4.4)".to_string(),
            band.to_string(),
            format!("rn(icat(k93models,5000,-0.5,4.4),{band},18,abmag)"),
        ]
    );
}

#[test]
fn trace_factory_records_calls_in_order() {
    let factory = TraceFactory::new();
    Interpreter::standalone(&factory).interpret("2*bb(5000)").unwrap();
    assert_eq!(factory.calls(), vec!["bb(5000)", "(2 * bb(5000))"]);
}
