// crates/script-gate-core/tests/rule_set_wire.rs
// ============================================================================
// Module: Rule Set Wire Format Tests
// Description: Decoding and encoding of persisted rule sets.
// Purpose: Ensure the JSON form round-trips and normalizes legacy inputs.
// Dependencies: script-gate-core, serde_json
// ============================================================================
//! ## Overview
//! Covers negation prefixes, argument dispatch shapes, mode handling, and the
//! absent/empty distinction for the `rules` record field.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use script_gate_core::Argument;
use script_gate_core::ConditionKey;
use script_gate_core::ManagedScriptRecord;
use script_gate_core::MatchMode;
use script_gate_core::RuleSet;
use script_gate_core::RuleSetError;
use script_gate_core::RuleShape;
use script_gate_core::Scalar;
use serde_json::json;

#[test]
fn canonical_rule_set_round_trips_unchanged() {
    let wire = json!({
        "is_singular": ["post", "page"],
        "__neg:is_user_logged_in": true,
        "is_page": 42,
        "__mode": "all"
    });
    let rules = RuleSet::from_wire(&wire).expect("decode");
    assert_eq!(rules.mode(), &MatchMode::All);
    assert_eq!(rules.conditions().len(), 3);
    assert_eq!(rules.to_wire(), wire);
}

#[test]
fn mode_key_is_never_a_condition() {
    let rules = RuleSet::from_wire(&json!({"__mode": "all"})).expect("decode");
    assert!(rules.is_empty());
    assert_eq!(RuleShape::of(Some(&rules)), RuleShape::Empty);
}

#[test]
fn missing_mode_defaults_to_any_and_is_not_emitted() {
    let wire = json!({"is_home": true});
    let rules = RuleSet::from_wire(&wire).expect("decode");
    assert_eq!(rules.mode(), &MatchMode::Any);
    assert_eq!(rules.to_wire(), wire);
}

#[test]
fn null_mode_reads_as_default_any() {
    let rules = RuleSet::from_wire(&json!({"is_home": true, "is_search": true, "__mode": null})).expect("decode");
    assert_eq!(rules.mode(), &MatchMode::Any);
    assert_eq!(rules.conditions().len(), 2);
    assert_eq!(rules.to_wire(), json!({"is_home": true, "is_search": true}));
}

#[test]
fn legacy_negation_prefix_normalizes_to_canonical() {
    let rules = RuleSet::from_wire(&json!({"NOT:is_search": true})).expect("decode");
    let (key, _) = rules.conditions().iter().next().expect("condition");
    assert_eq!(key, &ConditionKey::negated("is_search"));
    assert_eq!(rules.to_wire(), json!({"__neg:is_search": true}));
}

#[test]
fn argument_shapes_decode_by_dispatch_rule() {
    let rules = RuleSet::from_wire(&json!({
        "flag": true,
        "null_flag": null,
        "single": "post",
        "falsy": false,
        "list": ["category", "news"],
        "nested": [["x"]],
        "object": {"k": "v"}
    }))
    .expect("decode");
    let get = |name: &str| rules.conditions().get(&ConditionKey::positive(name)).cloned().expect("present");
    assert_eq!(get("flag"), Argument::Flag);
    assert_eq!(get("null_flag"), Argument::Flag);
    assert_eq!(get("single"), Argument::Scalar(Scalar::from("post")));
    assert_eq!(get("falsy"), Argument::Scalar(Scalar::Bool(false)));
    assert_eq!(get("list"), Argument::list(["category", "news"]));
    assert!(matches!(get("nested"), Argument::Malformed(_)));
    assert!(matches!(get("object"), Argument::Malformed(_)));
}

#[test]
fn malformed_arguments_and_unknown_modes_are_preserved() {
    let wire = json!({"is_tax": {"taxonomy": "category"}, "__mode": "most"});
    let rules = RuleSet::from_wire(&wire).expect("decode");
    assert!(matches!(rules.mode(), MatchMode::Unrecognized(_)));
    assert_eq!(rules.to_wire(), wire);
}

#[test]
fn reinserting_a_key_overwrites_in_place() {
    let mut rules = RuleSet::new(MatchMode::Any)
        .with_condition(ConditionKey::positive("a"), Argument::Flag)
        .with_condition(ConditionKey::positive("b"), Argument::Flag);
    let previous = rules.conditions_mut().insert(ConditionKey::positive("a"), Argument::Scalar(Scalar::from(7_i64)));
    assert_eq!(previous, Some(Argument::Flag));
    let order: Vec<String> = rules.conditions().iter().map(|(key, _)| key.to_wire()).collect();
    assert_eq!(order, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(rules.describe(), vec!["a(7)".to_string(), "b".to_string()]);
}

#[test]
fn positive_and_negated_keys_are_distinct() {
    let rules = RuleSet::from_wire(&json!({"a": true, "__neg:a": true})).expect("decode");
    assert_eq!(rules.conditions().len(), 2);
}

#[test]
fn non_object_rule_set_is_rejected() {
    let err = RuleSet::from_wire(&json!(["a"])).expect_err("array rejected");
    assert_eq!(err, RuleSetError::NotAnObject("array"));
}

#[test]
fn record_rules_field_distinguishes_absent_and_empty() {
    let base = json!({"src": "https://example.test/a.js", "transitioned_at": 1});
    let record: ManagedScriptRecord = serde_json::from_value(base.clone()).expect("missing rules");
    assert_eq!(RuleShape::of(record.rules.as_ref()), RuleShape::Absent);

    let mut legacy = base.clone();
    legacy["rules"] = json!([]);
    let record: ManagedScriptRecord = serde_json::from_value(legacy).expect("legacy empty array");
    assert_eq!(RuleShape::of(record.rules.as_ref()), RuleShape::Absent);

    let mut explicit = base.clone();
    explicit["rules"] = json!({});
    let record: ManagedScriptRecord = serde_json::from_value(explicit).expect("empty object");
    assert_eq!(RuleShape::of(record.rules.as_ref()), RuleShape::Empty);

    let mut garbage = base;
    garbage["rules"] = json!("is_home");
    assert!(serde_json::from_value::<ManagedScriptRecord>(garbage).is_err());
}

#[test]
fn absent_rules_are_not_serialized() {
    let record: ManagedScriptRecord =
        serde_json::from_value(json!({"src": "https://example.test/a.js", "transitioned_at": 1})).expect("decode");
    let encoded = serde_json::to_value(&record).expect("encode");
    assert!(encoded.get("rules").is_none());
}
