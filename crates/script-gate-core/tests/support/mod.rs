// crates/script-gate-core/tests/support/mod.rs
// ============================================================================
// Module: Script Gate Core Test Support
// Description: Shared fixtures for core integration tests.
// Purpose: Provide a small request context, registry, and recording audit sink.
// Dependencies: script-gate-core
// ============================================================================
//! ## Overview
//! Fixtures used across core integration tests. The context is a flag set so
//! tests control every predicate outcome directly.

#![allow(dead_code, reason = "Shared helpers are not used by every test binary.")]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only helpers may panic on setup failure."
)]

use std::collections::BTreeSet;
use std::sync::Mutex;

use script_gate_core::ActivationAuditEvent;
use script_gate_core::Arity;
use script_gate_core::AuditSink;
use script_gate_core::DiscoveryEntry;
use script_gate_core::ManagedScriptRecord;
use script_gate_core::PredicateAccessPolicy;
use script_gate_core::PredicateRegistry;
use script_gate_core::RuleSet;
use script_gate_core::Scalar;
use script_gate_core::ScriptAsset;
use script_gate_core::ScriptHandle;
use script_gate_core::ScriptObservation;
use serde_json::Value;

/// Request context driven by named flags.
#[derive(Debug, Clone, Default)]
pub struct FlagContext {
    /// Flags that hold for this request.
    pub flags: BTreeSet<String>,
    /// Post type of the queried object.
    pub post_type: Option<String>,
}

impl FlagContext {
    /// Builds a context with the given flags set.
    pub fn with(flags: &[&str]) -> Self {
        Self {
            flags: flags.iter().map(|flag| (*flag).to_string()).collect(),
            post_type: None,
        }
    }

    /// Frontend request with the given extra flags.
    pub fn frontend(flags: &[&str]) -> Self {
        let mut ctx = Self::with(flags);
        ctx.flags.insert("frontend".to_string());
        ctx
    }
}

/// Builds a registry with flag predicates `a`, `b`, `c`, `is_frontend`,
/// a one-arg `post_type_is`, and a many-arg `post_type_in`.
pub fn registry() -> PredicateRegistry<FlagContext> {
    registry_with_policy(PredicateAccessPolicy::allow_all())
}

/// Builds the fixture registry with an access policy.
pub fn registry_with_policy(policy: PredicateAccessPolicy) -> PredicateRegistry<FlagContext> {
    let mut registry = PredicateRegistry::new(policy);
    for name in ["a", "b", "c"] {
        registry
            .register(name, Arity::None, move |ctx: &FlagContext, _args: &[Scalar]| ctx.flags.contains(name))
            .expect("register flag predicate");
    }
    registry
        .register("is_frontend", Arity::None, |ctx: &FlagContext, _args: &[Scalar]| ctx.flags.contains("frontend"))
        .expect("register is_frontend");
    registry
        .register("post_type_is", Arity::One, |ctx: &FlagContext, args: &[Scalar]| {
            match (args.first().and_then(Scalar::as_str), ctx.post_type.as_deref()) {
                (None, Some(_)) => true,
                (Some(wanted), Some(actual)) => wanted == actual,
                _ => false,
            }
        })
        .expect("register post_type_is");
    registry
        .register("post_type_in", Arity::Many, |ctx: &FlagContext, args: &[Scalar]| {
            let Some(actual) = ctx.post_type.as_deref() else {
                return false;
            };
            args.is_empty() || args.iter().any(|arg| arg.as_str() == Some(actual))
        })
        .expect("register post_type_in");
    registry
}

/// Parses a rule set from JSON.
pub fn rules(value: Value) -> RuleSet {
    RuleSet::from_wire(&value).expect("rule set")
}

/// Parses a handle.
pub fn handle(raw: &str) -> ScriptHandle {
    ScriptHandle::parse(raw).expect("handle")
}

/// Builds an observation for a handle.
pub fn observation(raw: &str, src: &str) -> ScriptObservation {
    ScriptObservation {
        handle: handle(raw),
        src: src.to_string(),
        version: Some("1.0".to_string()),
        deps: vec!["jquery".to_string()],
        in_footer: false,
        strategy: script_gate_core::LoadStrategy::None,
    }
}

/// Builds a discovery entry.
pub fn discovery_entry(src: &str, discovered_at: i64) -> DiscoveryEntry {
    DiscoveryEntry {
        asset: ScriptAsset::new(src),
        discovered_at,
    }
}

/// Builds a managed record with optional rules.
pub fn managed_record(src: &str, rules: Option<RuleSet>) -> ManagedScriptRecord {
    ManagedScriptRecord {
        asset: ScriptAsset::new(src),
        discovered_at: None,
        rules,
        transitioned_at: 100,
        updated_at: None,
    }
}

/// Audit sink that keeps every event.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded events.
    events: Mutex<Vec<ActivationAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns `(event, handle)` pairs in record order.
    pub fn events(&self) -> Vec<(&'static str, String)> {
        self.events.lock().unwrap().iter().map(|event| (event.event, event.handle.clone())).collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &ActivationAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
