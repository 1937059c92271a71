// crates/script-gate-core/src/core/rules.rs
// ============================================================================
// Module: Script Gate Rule Sets
// Description: Rule set model and its JSON wire format.
// Purpose: Represent predicate conditions, negation, arguments, and match mode.
// Dependencies: serde, serde_json, smallvec, thiserror
// ============================================================================

//! ## Overview
//! A [`RuleSet`] is an ordered collection of predicate conditions plus a
//! [`MatchMode`]. On the wire it is a JSON object whose keys are predicate
//! names (optionally prefixed with `__neg:`) and whose values are the
//! predicate arguments; the reserved `__mode` key carries the match mode.
//!
//! Decoding is lenient so that persisted rules survive untouched: unknown
//! modes and arguments that cannot be dispatched are preserved as-is and
//! re-emitted on encode. Evaluation treats them as non-matching.
//!
//! The absence of a rule set is modeled separately from an empty one; see
//! [`RuleShape`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as _;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use smallvec::SmallVec;
use thiserror::Error;

// ============================================================================
// SECTION: Wire Constants
// ============================================================================

/// Reserved key carrying the match mode.
pub const MODE_KEY: &str = "__mode";
/// Canonical negation prefix emitted on encode.
pub const NEGATION_PREFIX: &str = "__neg:";
/// Legacy negation prefix accepted on decode.
pub const LEGACY_NEGATION_PREFIX: &str = "NOT:";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rule set decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleSetError {
    /// Payload was not a JSON object.
    #[error("rule set must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Returns a short name for a JSON value's kind.
#[must_use]
pub const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Scalars and Arguments
// ============================================================================

/// Single positional argument value passed to a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean argument.
    Bool(bool),
    /// Numeric argument.
    Number(Number),
    /// Text argument.
    String(String),
}

impl Scalar {
    /// Returns the scalar as text when it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            Self::Bool(_) | Self::Number(_) => None,
        }
    }

    /// Returns the scalar as an integer when it is an integral number or a
    /// string holding one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(number) => number.as_i64(),
            Self::String(value) => value.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Renders the scalar as display text.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Number(number) => number.to_string(),
            Self::String(value) => value.clone(),
        }
    }

    /// Converts a JSON value into a scalar when it is one.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(Self::Bool(*flag)),
            Value::Number(number) => Some(Self::Number(number.clone())),
            Value::String(text) => Some(Self::String(text.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Converts the scalar into a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(number) => Value::Number(number.clone()),
            Self::String(text) => Value::String(text.clone()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Positional argument list; most predicates take at most two values.
pub type ScalarList = SmallVec<[Scalar; 2]>;

/// Argument attached to a condition.
///
/// `true` and `null` mean "call with no arguments"; a list is spread into
/// positional arguments; any other scalar is passed as the single argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Call the predicate with no arguments.
    Flag,
    /// Call the predicate with one argument.
    Scalar(Scalar),
    /// Call the predicate with the listed positional arguments.
    List(ScalarList),
    /// Value that cannot be dispatched; kept verbatim for round-trip.
    Malformed(Value),
}

impl Argument {
    /// Decodes an argument from its JSON form.
    #[must_use]
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::Null | Value::Bool(true) => Self::Flag,
            Value::Bool(false) | Value::Number(_) | Value::String(_) => {
                Scalar::from_value(value).map_or_else(|| Self::Malformed(value.clone()), Self::Scalar)
            }
            Value::Array(items) => {
                let scalars: Option<ScalarList> = items.iter().map(Scalar::from_value).collect();
                scalars.map_or_else(|| Self::Malformed(value.clone()), Self::List)
            }
            Value::Object(_) => Self::Malformed(value.clone()),
        }
    }

    /// Encodes the argument to its JSON form.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Flag => Value::Bool(true),
            Self::Scalar(scalar) => scalar.to_value(),
            Self::List(items) => Value::Array(items.iter().map(Scalar::to_value).collect()),
            Self::Malformed(value) => value.clone(),
        }
    }

    /// Returns the positional arguments, or `None` when the argument cannot
    /// be dispatched.
    #[must_use]
    pub fn positional(&self) -> Option<&[Scalar]> {
        match self {
            Self::Flag => Some(&[]),
            Self::Scalar(scalar) => Some(std::slice::from_ref(scalar)),
            Self::List(items) => Some(items.as_slice()),
            Self::Malformed(_) => None,
        }
    }

    /// Builds a list argument from scalars.
    #[must_use]
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => Ok(()),
            Self::Scalar(scalar) => write!(f, "({})", scalar.to_text()),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(Scalar::to_text).collect();
                write!(f, "({})", rendered.join(", "))
            }
            Self::Malformed(value) => write!(f, "(<malformed {}>)", json_kind(value)),
        }
    }
}

// ============================================================================
// SECTION: Condition Keys
// ============================================================================

/// Predicate reference with an optional negation marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConditionKey {
    /// Referenced predicate name.
    predicate: String,
    /// Whether the predicate result is inverted.
    negated: bool,
}

impl ConditionKey {
    /// Creates a positive condition key.
    #[must_use]
    pub fn positive(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            negated: false,
        }
    }

    /// Creates a negated condition key.
    #[must_use]
    pub fn negated(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            negated: true,
        }
    }

    /// Parses a wire key, accepting both negation prefixes.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix(NEGATION_PREFIX) {
            return Self::negated(rest);
        }
        if let Some(rest) = raw.strip_prefix(LEGACY_NEGATION_PREFIX) {
            return Self::negated(rest);
        }
        Self::positive(raw)
    }

    /// Encodes the key using the canonical negation prefix.
    #[must_use]
    pub fn to_wire(&self) -> String {
        if self.negated {
            format!("{NEGATION_PREFIX}{}", self.predicate)
        } else {
            self.predicate.clone()
        }
    }

    /// Returns the referenced predicate name.
    #[must_use]
    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// Returns true when the predicate result is inverted.
    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "NOT {}", self.predicate)
        } else {
            f.write_str(&self.predicate)
        }
    }
}

// ============================================================================
// SECTION: Match Mode
// ============================================================================

/// Aggregation mode for a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// At least one resolvable condition must hold.
    #[default]
    Any,
    /// Every condition must resolve and hold.
    All,
    /// Unknown mode value; never matches and is preserved on encode.
    Unrecognized(Value),
}

impl MatchMode {
    /// Decodes a mode value.
    #[must_use]
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::String(text) if text == "any" => Self::Any,
            Value::String(text) if text == "all" => Self::All,
            other => Self::Unrecognized(other.clone()),
        }
    }

    /// Encodes the mode value.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Any => Value::String("any".to_string()),
            Self::All => Value::String("all".to_string()),
            Self::Unrecognized(value) => value.clone(),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::All => f.write_str("all"),
            Self::Unrecognized(value) => write!(f, "unrecognized({value})"),
        }
    }
}

// ============================================================================
// SECTION: Conditions
// ============================================================================

/// Insertion-ordered condition map; re-inserting a key overwrites in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conditions {
    /// Ordered condition entries.
    entries: Vec<(ConditionKey, Argument)>,
}

impl Conditions {
    /// Inserts or overwrites a condition, returning the previous argument.
    pub fn insert(&mut self, key: ConditionKey, argument: Argument) -> Option<Argument> {
        if let Some(slot) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            return Some(std::mem::replace(&mut slot.1, argument));
        }
        self.entries.push((key, argument));
        None
    }

    /// Removes a condition, returning its argument.
    pub fn remove(&mut self, key: &ConditionKey) -> Option<Argument> {
        let index = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns the argument for a condition.
    #[must_use]
    pub fn get(&self, key: &ConditionKey) -> Option<&Argument> {
        self.entries.iter().find(|(existing, _)| existing == key).map(|(_, argument)| argument)
    }

    /// Returns the number of conditions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no conditions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates conditions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConditionKey, &Argument)> {
        self.entries.iter().map(|(key, argument)| (key, argument))
    }
}

// ============================================================================
// SECTION: Rule Sets
// ============================================================================

/// Ordered predicate conditions plus a match mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet {
    /// Conditions in insertion order.
    conditions: Conditions,
    /// Aggregation mode.
    mode: MatchMode,
    /// Whether the mode was explicitly present on the wire.
    mode_declared: bool,
}

impl RuleSet {
    /// Creates an empty rule set with an explicit mode.
    #[must_use]
    pub fn new(mode: MatchMode) -> Self {
        Self {
            conditions: Conditions::default(),
            mode,
            mode_declared: true,
        }
    }

    /// Creates an empty rule set with the implicit default mode.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a condition, builder-style.
    #[must_use]
    pub fn with_condition(mut self, key: ConditionKey, argument: Argument) -> Self {
        self.conditions.insert(key, argument);
        self
    }

    /// Returns the conditions.
    #[must_use]
    pub const fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Returns the conditions for mutation.
    pub const fn conditions_mut(&mut self) -> &mut Conditions {
        &mut self.conditions
    }

    /// Returns the effective match mode.
    #[must_use]
    pub const fn mode(&self) -> &MatchMode {
        &self.mode
    }

    /// Sets an explicit match mode.
    pub fn set_mode(&mut self, mode: MatchMode) {
        self.mode = mode;
        self.mode_declared = true;
    }

    /// Returns true when the rule set has no conditions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Decodes a rule set from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`RuleSetError::NotAnObject`] when the payload is not an object.
    pub fn from_wire(value: &Value) -> Result<Self, RuleSetError> {
        let Value::Object(map) = value else {
            return Err(RuleSetError::NotAnObject(json_kind(value)));
        };
        let mut rules = Self::default();
        for (key, raw) in map {
            if key == MODE_KEY {
                // An explicit null mode reads as the default and is not re-emitted.
                if !raw.is_null() {
                    rules.set_mode(MatchMode::from_wire(raw));
                }
                continue;
            }
            rules.conditions.insert(ConditionKey::from_wire(key), Argument::from_wire(raw));
        }
        Ok(rules)
    }

    /// Encodes the rule set to its JSON form.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        let mut map = Map::new();
        for (key, argument) in self.conditions.iter() {
            map.insert(key.to_wire(), argument.to_wire());
        }
        if self.mode_declared {
            map.insert(MODE_KEY.to_string(), self.mode.to_wire());
        }
        Value::Object(map)
    }

    /// Renders one display line per condition, e.g. `NOT is_tax(category, news)`.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.conditions.iter().map(|(key, argument)| format!("{key}{argument}")).collect()
    }
}

impl Serialize for RuleSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_wire(&value).map_err(D::Error::custom)
    }
}

// ============================================================================
// SECTION: Rule Shape
// ============================================================================

/// Distinguishes absent, empty, and populated rules for a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleShape<'a> {
    /// No rules stored; the caller's default applies.
    Absent,
    /// Explicit rule set with no conditions; never matches.
    Empty,
    /// Rule set with at least one condition.
    NonEmpty(&'a RuleSet),
}

impl<'a> RuleShape<'a> {
    /// Classifies an optional rule set.
    #[must_use]
    pub fn of(rules: Option<&'a RuleSet>) -> Self {
        match rules {
            None => Self::Absent,
            Some(rules) if rules.is_empty() => Self::Empty,
            Some(rules) => Self::NonEmpty(rules),
        }
    }
}

// ============================================================================
// SECTION: Record Field Codec
// ============================================================================

/// Serde helpers for the optional `rules` field of catalog records.
///
/// A missing field, `null`, and an empty JSON array all decode as absent
/// rules. Objects decode as rule sets; anything else rejects the record.
pub mod rules_field {
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::de::Error as _;
    use serde_json::Value;

    use super::RuleSet;
    use super::json_kind;

    /// Deserializes an optional rule set from a record field.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error when the field is neither absent-like
    /// nor an object.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<RuleSet>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match &value {
            Value::Null => Ok(None),
            Value::Array(items) if items.is_empty() => Ok(None),
            Value::Object(_) => RuleSet::from_wire(&value).map(Some).map_err(D::Error::custom),
            other => Err(D::Error::custom(format!(
                "rules must be an object, empty array, or null; found {}",
                json_kind(other)
            ))),
        }
    }
}
