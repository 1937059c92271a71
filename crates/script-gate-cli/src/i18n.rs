// crates/script-gate-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings behind stable message keys.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! Every string the Script Gate CLI prints is looked up by key in a static
//! catalog and formatted through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Placeholder substitutions preserve argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"handle"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
pub(crate) const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "script-gate {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.serialize_failed", "Failed to serialize output: {error}"),
    ("input.kind.rules", "rule set"),
    ("input.kind.context", "request context"),
    ("input.kind.queue", "queue snapshot"),
    ("input.missing", "Missing {kind} input: pass it inline or as a file."),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.parse_failed", "Failed to parse {kind} JSON: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("store.open_failed", "Failed to open catalog store: {error}"),
    ("audit.open_failed", "Failed to open audit log at {path}: {error}"),
    ("registry.build_failed", "Failed to build predicate registry: {error}"),
    ("handle.invalid", "Invalid script handle '{handle}': {error}"),
    ("rules.invalid", "Invalid rule set: {error}"),
    ("rules.check.ok", "Rule set ok ({conditions} conditions)."),
    ("rules.check.issue", "Issue: {issue}"),
    ("rules.set.warning", "Warning: {issue}"),
    ("rules.set.ok", "Rules stored for {handle} in {catalog}."),
    ("rules.clear.ok", "Rules cleared for {handle} in {catalog}."),
    ("catalog.failed", "Catalog operation failed: {error}"),
    ("catalog.dequeue.ok", "Dequeued {handle}."),
    ("catalog.restore.ok", "Restored {handle}."),
    ("catalog.forget.ok", "Forgot {handle}."),
    ("catalog.clear_discovered.ok", "Cleared {count} discovered scripts."),
    ("manual.add.ok", "Registered manual script {handle}."),
    ("manual.update.ok", "Updated manual script {handle}."),
    ("manual.delete.ok", "Deleted manual script {handle}."),
    ("render.discovery_failed", "Discovery failed: {error}"),
    ("render.failed", "Activation failed: {error}"),
];

/// Returns the keyed message catalog.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Looks up `key` and substitutes `args` into its placeholders.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
