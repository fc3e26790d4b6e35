//! Integration tests: observable behavior of `parse` across whole schemas.
//!
//! Each test builds a schema through the public API only and checks one
//! externally visible property: default idempotence, unknown-key order,
//! mandatory ordering, path qualification, list disciplines, alternatives,
//! scalar/list equivalence, and a complete nested document.

use termcheck_core::{Key, Symbol, Term};
use termcheck_schema::{parse, parse_with, ParseError, ParseOptions, Rule, Schema, TypeTag};

fn obj(pairs: Vec<(&str, Term)>) -> Term {
    Term::map(pairs.into_iter().map(|(k, v)| (Key::text(k), v)))
}

fn ints(values: &[i64]) -> Term {
    Term::List(values.iter().copied().map(Term::Int).collect())
}

fn server_schema() -> Schema {
    Schema::new()
        .field("host", TypeTag::Host)
        .field("port", TypeTag::Port)
        .field("workers", TypeTag::PosInteger)
        .default_value("port", Term::Int(8080))
        .default_value("workers", Term::Int(4))
        .mandatory(["host"])
}

// ---- defaults ----

#[test]
fn test_parsing_accepted_output_again_is_stable() {
    let schema = server_schema();
    let first = parse(&obj(vec![("host", Term::str("Api.Example.org"))]), &schema).unwrap();
    let second = parse(&first.clone().into_term(), &schema).unwrap();
    assert_eq!(first.accepted, second.accepted);
    assert!(second.unknown.is_empty());
}

#[test]
fn test_defaults_fill_only_absent_keys() {
    let out = parse(
        &obj(vec![("host", Term::str("h")), ("port", Term::str("9000"))]),
        &server_schema(),
    )
    .unwrap();
    assert_eq!(out.get("port"), Some(&Term::Int(9000)));
    assert_eq!(out.get("workers"), Some(&Term::Int(4)));
}

#[test]
fn test_empty_input_yields_exactly_the_coerced_defaults() {
    let schema = Schema::new()
        .field("host", TypeTag::Host)
        .field("port", TypeTag::Port)
        .field("mode", TypeTag::Enum(vec![Symbol::intern("fast")]))
        .default_value("host", Term::str("Example.ORG"))
        .default_value("port", Term::str("8080"))
        .default_value("mode", Term::str("fast"));

    let first = parse(&Term::Map(Vec::new()), &schema).unwrap();
    assert_eq!(
        first.accepted,
        vec![
            (Key::sym("host"), Term::str("example.org")),
            (Key::sym("port"), Term::Int(8080)),
            (Key::sym("mode"), Term::atom("fast")),
        ]
    );
    assert!(first.unknown.is_empty());

    let second = parse(&first.clone().into_term(), &schema).unwrap();
    assert_eq!(second.accepted, first.accepted);
}

// ---- unknown keys ----

#[test]
fn test_unknown_keys_in_encounter_order() {
    let input = obj(vec![
        ("zeta", Term::Int(1)),
        ("host", Term::str("h")),
        ("alpha", Term::Int(2)),
        ("mid", Term::Int(3)),
    ]);
    let out = parse(&input, &server_schema()).unwrap();
    assert_eq!(out.unknown, ["zeta", "alpha", "mid"]);
}

#[test]
fn test_unknown_keys_with_warning_enabled_are_still_collected() {
    let options = ParseOptions {
        path: String::new(),
        warn_unknown: true,
    };
    let input = obj(vec![("host", Term::str("h")), ("typo", Term::Int(1))]);
    let out = parse_with(&input, &server_schema(), &options).unwrap();
    assert_eq!(out.unknown, ["typo"]);
}

// ---- mandatory ----

#[test]
fn test_first_declared_mandatory_key_is_reported() {
    let schema = Schema::new()
        .field("a", TypeTag::Any)
        .field("b", TypeTag::Any)
        .field("c", TypeTag::Any)
        .mandatory(["b", "a", "c"]);
    let err = parse(&obj(vec![("c", Term::Int(1))]), &schema).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingField {
            path: "b".to_string()
        }
    );
}

// ---- paths ----

#[test]
fn test_missing_field_two_levels_down() {
    let schema = Schema::new().field(
        "x",
        Schema::new().field(
            "y",
            Schema::new().field("f", TypeTag::Integer).mandatory(["f"]),
        ),
    );
    let input = obj(vec![("x", obj(vec![("y", obj(vec![]))]))]);
    let err = parse(&input, &schema).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingField {
            path: "x.y.f".to_string()
        }
    );
}

#[test]
fn test_nested_failure_is_path_qualified() {
    let schema = Schema::new().field(
        "y",
        Schema::new().field("f", TypeTag::Integer),
    );
    let input = obj(vec![("y", obj(vec![("f", Term::str("not a number"))]))]);
    let err = parse_with(&input, &schema, &ParseOptions::with_path("x")).unwrap_err();
    assert!(matches!(&err, ParseError::Syntax { path, .. } if path == "x.y.f"), "{err}");
    assert_eq!(err.path(), Some("x.y.f"));
}

#[test]
fn test_error_display_names_the_path() {
    let schema = Schema::new().field("port", TypeTag::Port);
    let err = parse(&obj(vec![("port", Term::Int(70000))]), &schema).unwrap_err();
    assert!(err.to_string().contains("port"), "{err}");
}

// ---- lists ----

#[test]
fn test_list_disciplines() {
    let schema = Schema::new()
        .field("ordered", Rule::list(TypeTag::Integer))
        .field("sorted", Rule::slist(TypeTag::Integer))
        .field("unique", Rule::ulist(TypeTag::Integer));
    let input = obj(vec![
        ("ordered", ints(&[3, 1, 2])),
        ("sorted", ints(&[3, 1, 2])),
        ("unique", ints(&[1, 1, 2])),
    ]);
    let out = parse(&input, &schema).unwrap();
    assert_eq!(out.get("ordered"), Some(&ints(&[3, 1, 2])));
    assert_eq!(out.get("sorted"), Some(&ints(&[1, 2, 3])));
    assert_eq!(out.get("unique"), Some(&ints(&[1, 2])));
}

#[test]
fn test_scalar_behaves_like_singleton_list() {
    let schema = Schema::new().field("n", Rule::list(TypeTag::Integer));
    let scalar = parse(&obj(vec![("n", Term::Int(5))]), &schema).unwrap();
    let list = parse(&obj(vec![("n", ints(&[5]))]), &schema).unwrap();
    assert_eq!(scalar.accepted, list.accepted);
}

#[test]
fn test_list_element_error_names_the_field() {
    let schema = Schema::new().field("n", Rule::list(TypeTag::Integer));
    let err = parse(&obj(vec![("n", Term::List(vec![Term::Int(1), Term::Float(0.5)]))]), &schema)
        .unwrap_err();
    assert_eq!(err.path(), Some("n"));
}

#[test]
fn test_printable_integer_list_reads_as_text() {
    // 80 and 443 are printable code points, so the list is one text scalar.
    let schema = Schema::new().field("ports", Rule::list(TypeTag::Port));
    let err = parse(&obj(vec![("ports", ints(&[443, 80]))]), &schema).unwrap_err();
    assert_eq!(err.path(), Some("ports"));
}

// ---- alternatives ----

#[test]
fn test_alternatives_first_match_wins() {
    let schema = Schema::new().field(
        "mode",
        Rule::one_of([
            TypeTag::Enum(vec![Symbol::intern("a")]).into(),
            TypeTag::Binary.into(),
        ]),
    );
    let a = parse(&obj(vec![("mode", Term::str("a"))]), &schema).unwrap();
    assert_eq!(a.get("mode"), Some(&Term::atom("a")));

    let b = parse(&obj(vec![("mode", Term::str("b"))]), &schema).unwrap();
    assert_eq!(b.get("mode"), Some(&Term::bytes(b"b".to_vec())));
}

// ---- end to end ----

fn document_schema() -> Schema {
    Schema::new().field("field1", TypeTag::Integer).field(
        "field2",
        Schema::new().field("field3", TypeTag::Binary).mandatory(["field3"]),
    )
}

#[test]
fn test_end_to_end_accepts_document() {
    let input = obj(vec![
        ("field1", Term::Int(5)),
        ("field2", obj(vec![("field3", Term::str("x"))])),
        ("extra", Term::Int(1)),
    ]);
    let out = parse(&input, &document_schema()).unwrap();
    assert_eq!(
        out.accepted,
        vec![
            (Key::text("field1"), Term::Int(5)),
            (
                Key::text("field2"),
                Term::Map(vec![(Key::text("field3"), Term::bytes(b"x".to_vec()))])
            ),
        ]
    );
    assert_eq!(out.unknown, ["extra"]);
    let paths: Vec<&str> = out.flattened.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(paths, ["field1", "field2", "field2.field3"]);
}

#[test]
fn test_end_to_end_reports_missing_nested_field() {
    let input = obj(vec![("field1", Term::Int(5)), ("field2", obj(vec![]))]);
    let err = parse(&input, &document_schema()).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingField {
            path: "field2.field3".to_string()
        }
    );
}

#[test]
fn test_schema_from_rule_names() {
    let schema = Schema::new()
        .field("level", Rule::named("log_level").unwrap())
        .field("ports", Rule::named("ulist(port)").unwrap());
    let input = obj(vec![
        ("level", Term::str("warning")),
        (
            "ports",
            Term::List(vec![Term::str("443"), Term::str("80"), Term::str("443")]),
        ),
    ]);
    let out = parse(&input, &schema).unwrap();
    assert_eq!(out.get("level"), Some(&Term::Int(5)));
    assert_eq!(out.get("ports"), Some(&ints(&[80, 443])));
    assert!(matches!(
        Rule::named("no_such_rule"),
        Err(ParseError::UnrecognizedRuleTag { .. })
    ));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Unknown keys come back in exactly the order they were supplied.
        #[test]
        fn unknown_keys_keep_encounter_order(
            names in prop::collection::vec("unk_[a-z]{1,6}", 0..8),
        ) {
            let mut pairs = vec![("host", Term::str("h"))];
            pairs.extend(names.iter().map(|n| (n.as_str(), Term::Int(0))));
            let out = parse(&obj(pairs), &server_schema()).unwrap();
            prop_assert_eq!(out.unknown, names);
        }

        /// Accepted output re-parses to itself.
        #[test]
        fn defaults_are_idempotent(port in 1i64..65536, workers in 0i64..64) {
            let input = obj(vec![
                ("host", Term::str("h")),
                ("port", Term::Int(port)),
                ("workers", Term::Int(workers)),
            ]);
            let first = parse(&input, &server_schema()).unwrap();
            let second = parse(&first.clone().into_term(), &server_schema()).unwrap();
            prop_assert_eq!(first.accepted, second.accepted);
        }
    }
}
