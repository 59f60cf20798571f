//! Cross-module scenario tests: end-to-end behavior through the public API
//! rather than any one module's internals.

use indoc::indoc;
use pretty_assertions::assert_eq;

use yamlcore::{
    evaluate_path, load, parse_path, ComposerOptions, Event, EventData, InputOrigin, Parser,
    ParserOptions, ResolverOptions, Value,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scalar_text(event: &Event) -> &str {
    match &event.data {
        EventData::Scalar { value, .. } => value.as_str(),
        other => panic!("expected a scalar event, got {other:?}"),
    }
}

/// Scenario 1: `"a: 1\nb: 2\n"` produces the expected flat event sequence.
#[test]
fn scenario_1_simple_mapping_event_sequence() {
    init_logging();
    let mut input: &[u8] = b"a: 1\nb: 2\n";
    let mut parser = Parser::new();
    parser.set_input_string(&mut input);

    assert!(matches!(parser.parse().unwrap().data, EventData::StreamStart { .. }));
    assert!(matches!(parser.parse().unwrap().data, EventData::DocumentStart { .. }));
    assert!(matches!(parser.parse().unwrap().data, EventData::MappingStart { .. }));
    assert_eq!(scalar_text(&parser.parse().unwrap()), "a");
    assert_eq!(scalar_text(&parser.parse().unwrap()), "1");
    assert_eq!(scalar_text(&parser.parse().unwrap()), "b");
    assert_eq!(scalar_text(&parser.parse().unwrap()), "2");
    assert!(matches!(parser.parse().unwrap().data, EventData::MappingEnd));
    assert!(matches!(parser.parse().unwrap().data, EventData::DocumentEnd { .. }));
    assert!(matches!(parser.parse().unwrap().data, EventData::StreamEnd));
}

/// Scenario 2: a three-item block sequence.
#[test]
fn scenario_2_block_sequence_event_sequence() {
    init_logging();
    let mut input: &[u8] = b"- 1\n- 2\n- 3\n";
    let mut parser = Parser::new();
    parser.set_input_string(&mut input);

    assert!(matches!(parser.parse().unwrap().data, EventData::StreamStart { .. }));
    assert!(matches!(parser.parse().unwrap().data, EventData::DocumentStart { .. }));
    assert!(matches!(parser.parse().unwrap().data, EventData::SequenceStart { .. }));
    assert_eq!(scalar_text(&parser.parse().unwrap()), "1");
    assert_eq!(scalar_text(&parser.parse().unwrap()), "2");
    assert_eq!(scalar_text(&parser.parse().unwrap()), "3");
    assert!(matches!(parser.parse().unwrap().data, EventData::SequenceEnd));
}

/// Scenario 3: an anchor looked up by a `*name` path expression.
#[test]
fn scenario_3_alias_path_expression_finds_its_anchor() {
    init_logging();
    let input = InputOrigin::Borrowed(b"&a foo\n");
    let document = load(
        input,
        ParserOptions::default(),
        ComposerOptions::default(),
        ResolverOptions::default(),
    )
    .unwrap()
    .expect("one document");

    let expr = parse_path("*a").unwrap();
    let results = evaluate_path(&document, 0, &expr).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(Value::from_node(&document, results[0]), Value::Str("foo".into()));
}

/// Scenario 4: an alias resolves to its anchor's value, found via `/b`.
#[test]
fn scenario_4_alias_resolves_and_is_found_by_path() {
    init_logging();
    let input = InputOrigin::Borrowed(b"{a: &x 1, b: *x}");
    let document = load(
        input,
        ParserOptions::default(),
        ComposerOptions::default(),
        ResolverOptions::default(),
    )
    .unwrap()
    .expect("one document");

    let expr = parse_path("/b").unwrap();
    let results = evaluate_path(&document, 0, &expr).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(Value::from_node(&document, results[0]), Value::Int(1));
}

/// Scenario 5: a merge key expands in place, keeping keys that follow it in
/// the source after it in the result.
#[test]
fn scenario_5_merge_key_expansion_order() {
    init_logging();
    let input = indoc! {"
        a: &a
          k1: 1
          k2: 2
        <<: *a
        k3: 3
    "};
    let document = load(
        InputOrigin::Borrowed(input.as_bytes()),
        ParserOptions::default(),
        ComposerOptions::default(),
        ResolverOptions::default(),
    )
    .unwrap()
    .expect("one document");

    let Value::Map(pairs) = Value::from_node(&document, 0) else {
        panic!("expected a mapping");
    };
    let keys: Vec<&str> = pairs.iter().filter_map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["a", "k1", "k2", "k3"]);
}

/// Scenario 6: `"^/users/*/name"` over a document with two users returns
/// both names, in document order.
#[test]
fn scenario_6_path_expression_every_child_under_explicit_root() {
    init_logging();
    let input = InputOrigin::Borrowed(b"users:\n  - name: A\n  - name: B\n");
    let document = load(
        input,
        ParserOptions::default(),
        ComposerOptions::default(),
        ResolverOptions::default(),
    )
    .unwrap()
    .expect("one document");

    let expr = parse_path("^/users/*/name").unwrap();
    // Start from a non-root node to prove `^` really means "from the
    // document root", not "from wherever evaluation started".
    let users_expr = parse_path("/users").unwrap();
    let users = evaluate_path(&document, 0, &users_expr).unwrap();
    let start = users[0];

    let results = evaluate_path(&document, start, &expr).unwrap();
    let names: Vec<Value> = results
        .iter()
        .map(|&i| Value::from_node(&document, i))
        .collect();
    assert_eq!(
        names,
        vec![Value::Str("A".into()), Value::Str("B".into())]
    );
}

/// Boundary: empty input in non-JSON mode yields one document with a null
/// root rather than an error.
#[test]
fn boundary_empty_input_yields_null_root_outside_json_mode() {
    init_logging();
    let document = load(
        InputOrigin::Borrowed(b""),
        ParserOptions::default(),
        ComposerOptions::default(),
        ResolverOptions::default(),
    )
    .unwrap();
    assert!(document.is_none());
}

/// Boundary: a cyclic alias is rejected rather than looping forever.
#[test]
fn boundary_cyclic_alias_is_rejected() {
    init_logging();
    let input = InputOrigin::Borrowed(b"a: &a\n  b: *a\n");
    let err = load(
        input,
        ParserOptions::default(),
        ComposerOptions::default(),
        ResolverOptions::default(),
    )
    .unwrap_err();
    assert!(format!("{err}").to_lowercase().contains("cycl"));
}
