// crates/script-gate-core/src/runtime/registry.rs
// ============================================================================
// Module: Script Gate Predicate Registry
// Description: Named predicate dispatch table with access policy enforcement.
// Purpose: Resolve condition keys to callable predicates at evaluation time.
// Dependencies: serde, thiserror, crate::core
// ============================================================================

//! ## Overview
//! Predicates are registered by name with a declared [`Arity`] and a pure
//! function of the request context and positional arguments. Registration
//! happens at startup; evaluation only borrows the registry.
//!
//! A [`PredicateAccessPolicy`] can hide predicates from evaluation. A hidden
//! predicate resolves exactly like an unregistered one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Argument;
use crate::core::MODE_KEY;
use crate::core::MatchMode;
use crate::core::RuleSet;
use crate::core::Scalar;
use crate::core::rules::LEGACY_NEGATION_PREFIX;
use crate::core::rules::NEGATION_PREFIX;

// ============================================================================
// SECTION: Arity
// ============================================================================

/// Number of positional arguments a predicate accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// No arguments.
    None,
    /// Zero or one argument.
    One,
    /// Any number of arguments.
    Many,
}

impl Arity {
    /// Returns true when `count` arguments are acceptable.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::None => count == 0,
            Self::One => count <= 1,
            Self::Many => true,
        }
    }

    /// Returns the label used in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::One => "one",
            Self::Many => "many",
        }
    }
}

// ============================================================================
// SECTION: Access Policy
// ============================================================================

/// Predicate allowlist/denylist policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateAccessPolicy {
    /// Optional allowlist of predicate names.
    pub allowlist: Option<BTreeSet<String>>,
    /// Explicit denylist of predicate names.
    pub denylist: BTreeSet<String>,
}

impl PredicateAccessPolicy {
    /// Returns a policy that permits all predicates.
    #[must_use]
    pub const fn allow_all() -> Self {
        Self {
            allowlist: None,
            denylist: BTreeSet::new(),
        }
    }

    /// Returns true when the predicate is allowed by policy.
    #[must_use]
    pub fn is_allowed(&self, name: &str) -> bool {
        if self.denylist.contains(name) {
            return false;
        }
        if let Some(allowlist) = &self.allowlist {
            return allowlist.contains(name);
        }
        true
    }
}

impl Default for PredicateAccessPolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Predicate registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Name is empty, reserved, or unusable as a condition key.
    #[error("invalid predicate name: {0:?}")]
    InvalidName(String),
    /// Name is already registered.
    #[error("predicate already registered: {0}")]
    Duplicate(String),
}

// ============================================================================
// SECTION: Predicates
// ============================================================================

/// Predicate evaluation function.
pub type PredicateFn<C> = dyn Fn(&C, &[Scalar]) -> bool + Send + Sync;

/// Registered predicate.
pub struct Predicate<C> {
    /// Predicate name.
    name: String,
    /// Accepted argument count.
    arity: Arity,
    /// Evaluation function.
    eval: Box<PredicateFn<C>>,
}

impl<C> Predicate<C> {
    /// Returns the predicate name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared arity.
    #[must_use]
    pub const fn arity(&self) -> Arity {
        self.arity
    }

    /// Evaluates the predicate with already-validated arguments.
    #[must_use]
    pub fn evaluate(&self, ctx: &C, args: &[Scalar]) -> bool {
        (self.eval)(ctx, args)
    }
}

impl<C> fmt::Debug for Predicate<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").field("name", &self.name).field("arity", &self.arity).finish()
    }
}

/// Listing entry for a registered predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateInfo {
    /// Predicate name.
    pub name: String,
    /// Accepted argument count.
    pub arity: Arity,
    /// Whether the access policy permits the predicate.
    pub allowed: bool,
}

// ============================================================================
// SECTION: Lint Findings
// ============================================================================

/// Static finding for a rule set checked against a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleIssue {
    /// Condition references an unregistered predicate.
    UnknownPredicate {
        /// Condition key as written.
        key: String,
    },
    /// Condition references a predicate blocked by policy.
    BlockedPredicate {
        /// Condition key as written.
        key: String,
    },
    /// Argument count exceeds the predicate arity.
    ArityMismatch {
        /// Condition key as written.
        key: String,
        /// Declared arity.
        arity: Arity,
        /// Supplied argument count.
        supplied: usize,
    },
    /// Argument cannot be dispatched.
    MalformedArgument {
        /// Condition key as written.
        key: String,
    },
    /// Mode is neither `any` nor `all`.
    UnrecognizedMode {
        /// Mode value as written.
        mode: String,
    },
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPredicate {
                key,
            } => write!(f, "{key}: unknown predicate"),
            Self::BlockedPredicate {
                key,
            } => write!(f, "{key}: predicate blocked by policy"),
            Self::ArityMismatch {
                key,
                arity,
                supplied,
            } => write!(f, "{key}: accepts {} argument(s), {supplied} supplied", arity.as_str()),
            Self::MalformedArgument {
                key,
            } => write!(f, "{key}: argument cannot be dispatched"),
            Self::UnrecognizedMode {
                mode,
            } => write!(f, "unrecognized mode {mode}"),
        }
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Predicate registry with policy enforcement.
pub struct PredicateRegistry<C> {
    /// Predicates keyed by name.
    predicates: BTreeMap<String, Predicate<C>>,
    /// Access control policy for predicate usage.
    policy: PredicateAccessPolicy,
}

impl<C> PredicateRegistry<C> {
    /// Creates an empty registry with the provided policy.
    #[must_use]
    pub const fn new(policy: PredicateAccessPolicy) -> Self {
        Self {
            predicates: BTreeMap::new(),
            policy,
        }
    }

    /// Registers a predicate under a unique name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the name is invalid or already taken.
    pub fn register<F>(&mut self, name: impl Into<String>, arity: Arity, eval: F) -> Result<(), RegistryError>
    where
        F: Fn(&C, &[Scalar]) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        validate_predicate_name(&name)?;
        if self.predicates.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.predicates.insert(
            name.clone(),
            Predicate {
                name,
                arity,
                eval: Box::new(eval),
            },
        );
        Ok(())
    }

    /// Resolves a predicate visible under the access policy.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Predicate<C>> {
        if !self.policy.is_allowed(name) {
            return None;
        }
        self.predicates.get(name)
    }

    /// Resolves a registered predicate, bypassing the access policy.
    ///
    /// Reserved for built-in defaults such as the absent-rules verdict, which
    /// must not change when an operator hides the predicate from rules.
    #[must_use]
    pub fn resolve_registered(&self, name: &str) -> Option<&Predicate<C>> {
        self.predicates.get(name)
    }

    /// Returns true when a predicate is registered, regardless of policy.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Returns the configured policy.
    #[must_use]
    pub const fn policy(&self) -> &PredicateAccessPolicy {
        &self.policy
    }

    /// Lists registered predicates in name order.
    #[must_use]
    pub fn describe(&self) -> Vec<PredicateInfo> {
        self.predicates
            .values()
            .map(|predicate| PredicateInfo {
                name: predicate.name.clone(),
                arity: predicate.arity,
                allowed: self.policy.is_allowed(&predicate.name),
            })
            .collect()
    }

    /// Reports conditions that will never evaluate as written.
    #[must_use]
    pub fn lint(&self, rules: &RuleSet) -> Vec<RuleIssue> {
        let mut issues = Vec::new();
        if let MatchMode::Unrecognized(value) = rules.mode() {
            issues.push(RuleIssue::UnrecognizedMode {
                mode: value.to_string(),
            });
        }
        for (key, argument) in rules.conditions().iter() {
            let wire = key.to_wire();
            let Some(predicate) = self.predicates.get(key.predicate()) else {
                issues.push(RuleIssue::UnknownPredicate {
                    key: wire,
                });
                continue;
            };
            if !self.policy.is_allowed(key.predicate()) {
                issues.push(RuleIssue::BlockedPredicate {
                    key: wire,
                });
                continue;
            }
            match argument {
                Argument::Malformed(_) => issues.push(RuleIssue::MalformedArgument {
                    key: wire,
                }),
                other => {
                    let supplied = other.positional().map_or(0, <[Scalar]>::len);
                    if !predicate.arity.accepts(supplied) {
                        issues.push(RuleIssue::ArityMismatch {
                            key: wire,
                            arity: predicate.arity,
                            supplied,
                        });
                    }
                }
            }
        }
        issues
    }
}

impl<C> fmt::Debug for PredicateRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("predicates", &self.predicates.keys().collect::<Vec<_>>())
            .field("policy", &self.policy)
            .finish()
    }
}

impl<C> Default for PredicateRegistry<C> {
    fn default() -> Self {
        Self::new(PredicateAccessPolicy::default())
    }
}

/// Rejects names that cannot round-trip as condition keys.
fn validate_predicate_name(name: &str) -> Result<(), RegistryError> {
    let reserved = name == MODE_KEY
        || name.starts_with("__")
        || name.starts_with(NEGATION_PREFIX)
        || name.starts_with(LEGACY_NEGATION_PREFIX);
    if name.is_empty() || reserved || name.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
        return Err(RegistryError::InvalidName(name.to_string()));
    }
    Ok(())
}
