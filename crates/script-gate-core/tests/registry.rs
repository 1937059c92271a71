// crates/script-gate-core/tests/registry.rs
// ============================================================================
// Module: Predicate Registry Tests
// Description: Registration, resolution, policy, and lint behavior.
// Purpose: Ensure the dispatch table is exact-match and policy-aware.
// Dependencies: script-gate-core, serde_json
// ============================================================================
//! ## Overview
//! Validates predicate registration rules and static rule-set linting.

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

mod support;

use std::collections::BTreeSet;

use script_gate_core::Arity;
use script_gate_core::PredicateAccessPolicy;
use script_gate_core::PredicateRegistry;
use script_gate_core::RegistryError;
use script_gate_core::RuleIssue;
use script_gate_core::Scalar;
use serde_json::json;
use support::FlagContext;
use support::registry;
use support::registry_with_policy;
use support::rules;

fn always(_: &FlagContext, _: &[Scalar]) -> bool {
    true
}

#[test]
fn resolve_is_case_sensitive_exact_match() {
    let registry = registry();
    assert!(registry.resolve("is_frontend").is_some());
    assert!(registry.resolve("IS_FRONTEND").is_none());
    assert!(registry.resolve("is_frontend ").is_none());
    assert_eq!(registry.resolve("post_type_in").map(|predicate| predicate.arity()), Some(Arity::Many));
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut registry = PredicateRegistry::<FlagContext>::default();
    registry.register("a", Arity::None, always).expect("first registration");
    assert_eq!(registry.register("a", Arity::One, always), Err(RegistryError::Duplicate("a".to_string())));
}

#[test]
fn reserved_and_blank_names_are_rejected() {
    let mut registry = PredicateRegistry::<FlagContext>::default();
    for name in ["", "__mode", "__neg:a", "NOT:a", "__private", "has space"] {
        assert_eq!(
            registry.register(name, Arity::None, always),
            Err(RegistryError::InvalidName(name.to_string())),
            "name {name:?}"
        );
    }
}

#[test]
fn denylist_overrides_allowlist() {
    let policy = PredicateAccessPolicy {
        allowlist: Some(BTreeSet::from(["a".to_string(), "b".to_string()])),
        denylist: BTreeSet::from(["b".to_string()]),
    };
    let registry = registry_with_policy(policy);
    assert!(registry.resolve("a").is_some());
    assert!(registry.resolve("b").is_none());
    assert!(registry.resolve("c").is_none());
    assert!(registry.is_registered("b"));
    let listing = registry.describe();
    let b = listing.iter().find(|info| info.name == "b").expect("b listed");
    assert!(!b.allowed);
}

#[test]
fn lint_reports_each_unusable_condition() {
    let policy = PredicateAccessPolicy {
        allowlist: None,
        denylist: BTreeSet::from(["c".to_string()]),
    };
    let registry = registry_with_policy(policy);
    let set = rules(json!({
        "a": true,
        "missing": true,
        "__neg:c": true,
        "b": ["x"],
        "post_type_is": {"bad": true},
        "__mode": "sometimes"
    }));
    let issues = registry.lint(&set);
    assert_eq!(
        issues,
        vec![
            RuleIssue::UnrecognizedMode {
                mode: "\"sometimes\"".to_string(),
            },
            RuleIssue::UnknownPredicate {
                key: "missing".to_string(),
            },
            RuleIssue::BlockedPredicate {
                key: "__neg:c".to_string(),
            },
            RuleIssue::ArityMismatch {
                key: "b".to_string(),
                arity: Arity::None,
                supplied: 1,
            },
            RuleIssue::MalformedArgument {
                key: "post_type_is".to_string(),
            },
        ]
    );
}

#[test]
fn lint_is_clean_for_valid_rules() {
    let registry = registry();
    let set = rules(json!({"a": true, "post_type_is": "post", "post_type_in": ["a", "b", "c"]}));
    assert!(registry.lint(&set).is_empty());
}
