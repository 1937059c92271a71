// crates/script-gate-predicates/tests/builtin_predicates.rs
// ============================================================================
// Module: Built-in Predicate Tests
// Description: Behavior of each built-in predicate over RequestContext.
// Purpose: Pin argument matching for content and visitor predicates.
// Dependencies: script-gate-core, script-gate-predicates, serde_json
// ============================================================================
//! ## Overview
//! Evaluates built-in predicates through the matcher using sparse JSON
//! contexts, the same shape hosts supply.

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

use std::collections::BTreeSet;

use script_gate_core::PredicateAccessPolicy;
use script_gate_core::PredicateRegistry;
use script_gate_core::RuleMatcher;
use script_gate_core::RuleSet;
use script_gate_predicates::RequestContext;
use script_gate_predicates::builtin_registry;
use serde_json::Value;
use serde_json::json;

fn registry() -> PredicateRegistry<RequestContext> {
    builtin_registry(PredicateAccessPolicy::allow_all()).expect("builtin registry")
}

fn holds(registry: &PredicateRegistry<RequestContext>, rules: Value, ctx: Value) -> bool {
    let rules = RuleSet::from_wire(&rules).expect("rules");
    let ctx: RequestContext = serde_json::from_value(ctx).expect("context");
    RuleMatcher::new(registry).evaluate(&rules, &ctx)
}

fn post_context() -> Value {
    json!({
        "comments_open": true,
        "queried": {
            "kind": "post",
            "post_type": "page",
            "id": 12,
            "slug": "about",
            "title": "About Us",
            "template": "templates/wide.php",
            "terms": [
                {"taxonomy": "category", "id": 3, "slug": "news", "name": "News"},
                {"taxonomy": "post_tag", "id": 9, "slug": "launch", "name": "Launch"}
            ]
        }
    })
}

#[test]
fn registry_lists_the_documented_vocabulary() {
    let names: BTreeSet<String> = registry().describe().into_iter().map(|info| info.name).collect();
    for expected in [
        "is_frontend",
        "is_admin",
        "is_user_logged_in",
        "is_logged_out",
        "is_mobile",
        "is_home",
        "is_front_page",
        "is_search",
        "is_404",
        "is_paged",
        "is_privacy_policy",
        "comments_open",
        "is_archive",
        "is_singular",
        "is_page",
        "is_post_type_archive",
        "is_tax",
        "is_category",
        "is_tag",
        "has_term",
        "is_page_template",
        "current_user_can",
    ] {
        assert!(names.contains(expected), "missing {expected}");
    }
    assert_eq!(names.len(), 22);
}

#[test]
fn request_flags_map_to_predicates() {
    let registry = registry();
    assert!(holds(&registry, json!({"is_frontend": true}), json!({})));
    assert!(!holds(&registry, json!({"is_frontend": true}), json!({"admin": true})));
    assert!(holds(&registry, json!({"is_logged_out": true}), json!({})));
    assert!(holds(&registry, json!({"is_user_logged_in": true, "is_mobile": true, "__mode": "all"}), json!({"logged_in": true, "mobile": true})));
    assert!(holds(&registry, json!({"is_404": true}), json!({"not_found": true})));
    assert!(holds(&registry, json!({"comments_open": true}), post_context()));
}

#[test]
fn page_matches_by_id_slug_or_title() {
    let registry = registry();
    for arg in [json!(12), json!("12"), json!("about"), json!("About Us"), json!(true)] {
        assert!(holds(&registry, json!({"is_page": arg.clone()}), post_context()), "arg {arg}");
    }
    assert!(!holds(&registry, json!({"is_page": "contact"}), post_context()));
    assert!(holds(&registry, json!({"is_singular": ["post", "page"]}), post_context()));
    assert!(!holds(&registry, json!({"is_singular": "product"}), post_context()));
}

#[test]
fn has_term_respects_taxonomy_and_blank_term() {
    let registry = registry();
    assert!(holds(&registry, json!({"has_term": ["news", "category"]}), post_context()));
    assert!(holds(&registry, json!({"has_term": [3, "category"]}), post_context()));
    assert!(!holds(&registry, json!({"has_term": ["news", "post_tag"]}), post_context()));
    assert!(holds(&registry, json!({"has_term": ["", "post_tag"]}), post_context()));
    assert!(holds(&registry, json!({"has_term": "Launch"}), post_context()));
    assert!(!holds(&registry, json!({"has_term": ["", "genre"]}), post_context()));
}

#[test]
fn page_template_matches_file() {
    let registry = registry();
    assert!(holds(&registry, json!({"is_page_template": true}), post_context()));
    assert!(holds(&registry, json!({"is_page_template": "templates/wide.php"}), post_context()));
    assert!(!holds(&registry, json!({"is_page_template": "templates/narrow.php"}), post_context()));
    assert!(!holds(&registry, json!({"is_page_template": true}), json!({})));
}

#[test]
fn archives_are_classified() {
    let registry = registry();
    let category = json!({"queried": {"kind": "term", "taxonomy": "category", "id": 4, "slug": "sports", "name": "Sports"}});
    assert!(holds(&registry, json!({"is_archive": true}), category.clone()));
    assert!(holds(&registry, json!({"is_category": true}), category.clone()));
    assert!(holds(&registry, json!({"is_category": "sports"}), category.clone()));
    assert!(!holds(&registry, json!({"is_tag": true}), category.clone()));
    assert!(holds(&registry, json!({"is_tax": "category"}), category.clone()));
    assert!(holds(&registry, json!({"is_tax": ["category", "news", "sports"]}), category));
    let products = json!({"queried": {"kind": "post_type_archive", "post_type": "product"}});
    assert!(holds(&registry, json!({"is_post_type_archive": "product"}), products.clone()));
    assert!(holds(&registry, json!({"is_archive": true}), products));
    assert!(holds(&registry, json!({"is_archive": true}), json!({"queried": {"kind": "date"}})));
    assert!(!holds(&registry, json!({"is_archive": true}), post_context()));
}

#[test]
fn capability_checks_require_an_argument() {
    let registry = registry();
    let editor = json!({"logged_in": true, "capabilities": ["edit_posts"]});
    assert!(holds(&registry, json!({"current_user_can": "edit_posts"}), editor.clone()));
    assert!(!holds(&registry, json!({"current_user_can": "manage_options"}), editor.clone()));
    assert!(!holds(&registry, json!({"current_user_can": true}), editor));
}

#[test]
fn arity_none_rejects_arguments() {
    let registry = registry();
    assert!(!holds(&registry, json!({"is_home": "yes"}), json!({"home": true})));
    assert!(!holds(&registry, json!({"__neg:is_home": "yes"}), json!({"home": false})));
    assert!(holds(&registry, json!({"is_home": true}), json!({"home": true})));
}
