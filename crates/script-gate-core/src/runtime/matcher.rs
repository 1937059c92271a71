// crates/script-gate-core/src/runtime/matcher.rs
// ============================================================================
// Module: Script Gate Rule Matcher
// Description: Evaluates rule sets against a request context.
// Purpose: Decide whether a script's activation rules match the current request.
// Dependencies: crate::core, crate::runtime::registry
// ============================================================================

//! ## Overview
//! The matcher walks conditions in insertion order and short-circuits like a
//! flat and/or tree:
//!
//! - `any`: the first resolvable condition that holds decides `true`;
//!   conditions whose predicate is unknown are skipped.
//! - `all`: the first condition that is unknown or does not hold decides
//!   `false`.
//! - An unrecognized mode is `false`.
//!
//! A condition whose argument cannot be dispatched, or supplies more
//! arguments than the predicate's arity, evaluates to `false` and is not
//! negated. Absent rules defer to an [`AbsentRulesVerdict`] chosen by the
//! caller; an empty rule set is always `false`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Argument;
use crate::core::ConditionKey;
use crate::core::MatchMode;
use crate::core::RuleSet;
use crate::core::RuleShape;
use crate::runtime::registry::PredicateRegistry;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Predicate consulted when removal rules are absent.
pub const FRONTEND_PREDICATE: &str = "is_frontend";

/// Result applied when a record stores no rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentRulesVerdict {
    /// Fixed result.
    Constant(bool),
    /// Result of a zero-argument predicate; `false` if it cannot resolve.
    Predicate(&'static str),
}

impl AbsentRulesVerdict {
    /// Removals without rules apply on every public-facing request.
    pub const FRONTEND_ONLY: Self = Self::Predicate(FRONTEND_PREDICATE);
    /// Manual additions without rules always load.
    pub const ALWAYS: Self = Self::Constant(true);
}

// ============================================================================
// SECTION: Condition Outcome
// ============================================================================

/// Result of evaluating one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConditionOutcome {
    /// Predicate is unknown or blocked.
    Unresolved,
    /// Predicate evaluated; negation already applied.
    Evaluated(bool),
}

// ============================================================================
// SECTION: Matcher
// ============================================================================

/// Rule evaluator bound to a predicate registry.
#[derive(Debug)]
pub struct RuleMatcher<'r, C> {
    /// Predicate dispatch table.
    registry: &'r PredicateRegistry<C>,
}

impl<C> Clone for RuleMatcher<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for RuleMatcher<'_, C> {}

impl<'r, C> RuleMatcher<'r, C> {
    /// Creates a matcher over a registry.
    #[must_use]
    pub const fn new(registry: &'r PredicateRegistry<C>) -> Self {
        Self {
            registry,
        }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &'r PredicateRegistry<C> {
        self.registry
    }

    /// Evaluates optional rules, applying `absent` when none are stored.
    #[must_use]
    pub fn matches(&self, rules: Option<&RuleSet>, ctx: &C, absent: AbsentRulesVerdict) -> bool {
        match RuleShape::of(rules) {
            RuleShape::Absent => self.absent_verdict(absent, ctx),
            RuleShape::Empty => false,
            RuleShape::NonEmpty(rules) => self.evaluate(rules, ctx),
        }
    }

    /// Evaluates a rule set; an empty set never matches.
    #[must_use]
    pub fn evaluate(&self, rules: &RuleSet, ctx: &C) -> bool {
        if rules.is_empty() {
            return false;
        }
        let mut conditions = rules.conditions().iter();
        match rules.mode() {
            MatchMode::Any => conditions
                .any(|(key, argument)| self.condition(key, argument, ctx) == ConditionOutcome::Evaluated(true)),
            MatchMode::All => conditions
                .all(|(key, argument)| self.condition(key, argument, ctx) == ConditionOutcome::Evaluated(true)),
            MatchMode::Unrecognized(_) => false,
        }
    }

    /// Resolves the default for absent rules; the access policy does not apply.
    fn absent_verdict(&self, absent: AbsentRulesVerdict, ctx: &C) -> bool {
        match absent {
            AbsentRulesVerdict::Constant(value) => value,
            AbsentRulesVerdict::Predicate(name) => {
                self.registry.resolve_registered(name).is_some_and(|predicate| predicate.evaluate(ctx, &[]))
            }
        }
    }

    /// Evaluates one condition.
    fn condition(&self, key: &ConditionKey, argument: &Argument, ctx: &C) -> ConditionOutcome {
        let Some(predicate) = self.registry.resolve(key.predicate()) else {
            return ConditionOutcome::Unresolved;
        };
        let Some(args) = argument.positional() else {
            return ConditionOutcome::Evaluated(false);
        };
        if !predicate.arity().accepts(args.len()) {
            return ConditionOutcome::Evaluated(false);
        }
        let raw = predicate.evaluate(ctx, args);
        ConditionOutcome::Evaluated(raw != key.is_negated())
    }
}
