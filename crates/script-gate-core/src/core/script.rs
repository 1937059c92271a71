// crates/script-gate-core/src/core/script.rs
// ============================================================================
// Module: Script Gate Script Records
// Description: Script asset metadata, discovery entries, and managed records.
// Purpose: Model the persisted shape of scripts in each catalog.
// Dependencies: serde, thiserror, url, crate::core::{identifiers, rules}
// ============================================================================

//! ## Overview
//! Every catalog stores the same [`ScriptAsset`] core (source URL, version,
//! dependencies, placement, strategy, and optional local file metadata).
//! Discovery entries add a first-seen timestamp; managed records (removed or
//! manual scripts) add optional rules and transition timestamps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::core::identifiers::ScriptHandle;
use crate::core::rules::RuleSet;
use crate::core::rules::rules_field;

// ============================================================================
// SECTION: Load Strategy
// ============================================================================

/// Script loading strategy applied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoadStrategy {
    /// Blocking load.
    #[default]
    None,
    /// Asynchronous load.
    Async,
    /// Deferred load.
    Defer,
}

impl LoadStrategy {
    /// Parses a strategy; anything other than `async` or `defer` is `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "async" => Self::Async,
            "defer" => Self::Defer,
            _ => Self::None,
        }
    }

    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Async => "async",
            Self::Defer => "defer",
        }
    }
}

impl From<String> for LoadStrategy {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<LoadStrategy> for String {
    fn from(value: LoadStrategy) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Dependencies
// ============================================================================

/// Dependency handles stored either as a list or a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependencies {
    /// Ordered dependency list.
    List(Vec<String>),
    /// Comma-separated dependency string.
    Csv(String),
}

impl Default for Dependencies {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Dependencies {
    /// Returns trimmed, non-empty dependency handles in order.
    #[must_use]
    pub fn handles(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::List(items) => items.iter().map(String::as_str).collect(),
            Self::Csv(text) => text.split(',').collect(),
        };
        raw.into_iter().map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
    }
}

// ============================================================================
// SECTION: Script Assets
// ============================================================================

/// Resolved on-disk metadata for a locally hosted script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// File size in bytes.
    pub size_bytes: u64,
    /// Last modification time in unix seconds, when readable.
    pub modified_at: Option<i64>,
}

/// Script metadata shared by every catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptAsset {
    /// Source URL.
    pub src: String,
    /// Version string; empty or missing means no version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Dependency handles.
    #[serde(default)]
    pub deps: Dependencies,
    /// Whether the script loads in the footer.
    #[serde(default)]
    pub in_footer: bool,
    /// Loading strategy.
    #[serde(default)]
    pub strategy: LoadStrategy,
    /// Local file size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Local file modification time in unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<i64>,
}

impl ScriptAsset {
    /// Creates an asset with only a source URL.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            version: None,
            deps: Dependencies::default(),
            in_footer: false,
            strategy: LoadStrategy::None,
            size_bytes: None,
            mtime: None,
        }
    }

    /// Returns the version to register with, treating empty as absent.
    #[must_use]
    pub fn effective_version(&self) -> Option<&str> {
        self.version.as_deref().filter(|version| !version.is_empty())
    }

    /// Applies resolved file metadata.
    pub fn apply_metadata(&mut self, metadata: Option<FileMetadata>) {
        self.size_bytes = metadata.map(|meta| meta.size_bytes);
        self.mtime = metadata.and_then(|meta| meta.modified_at);
    }
}

// ============================================================================
// SECTION: Observations
// ============================================================================

/// A script seen in the host asset queue during a page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptObservation {
    /// Script handle.
    pub handle: ScriptHandle,
    /// Source URL.
    pub src: String,
    /// Version string.
    #[serde(default)]
    pub version: Option<String>,
    /// Dependency handles.
    #[serde(default)]
    pub deps: Vec<String>,
    /// Whether the script loads in the footer.
    #[serde(default)]
    pub in_footer: bool,
    /// Loading strategy.
    #[serde(default)]
    pub strategy: LoadStrategy,
}

impl ScriptObservation {
    /// Converts the observation into an asset without file metadata.
    #[must_use]
    pub fn into_asset(self) -> ScriptAsset {
        ScriptAsset {
            src: self.src,
            version: self.version,
            deps: Dependencies::List(self.deps),
            in_footer: self.in_footer,
            strategy: self.strategy,
            size_bytes: None,
            mtime: None,
        }
    }
}

// ============================================================================
// SECTION: Catalog Records
// ============================================================================

/// Entry in the discovered catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryEntry {
    /// Script metadata.
    #[serde(flatten)]
    pub asset: ScriptAsset,
    /// First-seen time in unix seconds.
    pub discovered_at: i64,
}

/// Entry in the removed or manual catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedScriptRecord {
    /// Script metadata.
    #[serde(flatten)]
    pub asset: ScriptAsset,
    /// First-seen time when the record came from discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_at: Option<i64>,
    /// Optional activation rules; absent means the catalog default applies.
    #[serde(default, deserialize_with = "rules_field::deserialize", skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleSet>,
    /// Time the record entered its catalog, in unix seconds.
    pub transitioned_at: i64,
    /// Time the record was last edited, in unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl ManagedScriptRecord {
    /// Creates a managed record from a discovery entry.
    #[must_use]
    pub fn from_discovery(entry: DiscoveryEntry, rules: Option<RuleSet>, now: i64) -> Self {
        Self {
            asset: entry.asset,
            discovered_at: Some(entry.discovered_at),
            rules,
            transitioned_at: now,
            updated_at: None,
        }
    }
}

// ============================================================================
// SECTION: Manual Script Input
// ============================================================================

/// Operator-supplied fields for registering or updating a manual script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualScriptInput {
    /// Source URL.
    pub src: String,
    /// Version string.
    #[serde(default)]
    pub version: Option<String>,
    /// Dependencies as a list or comma-separated string.
    #[serde(default)]
    pub deps: Dependencies,
    /// Whether the script loads in the footer.
    #[serde(default)]
    pub in_footer: bool,
    /// Loading strategy.
    #[serde(default)]
    pub strategy: LoadStrategy,
}

impl ManualScriptInput {
    /// Converts the input into a normalized asset.
    #[must_use]
    pub fn into_asset(self) -> ScriptAsset {
        ScriptAsset {
            src: self.src.trim().to_string(),
            version: self.version.map(|version| version.trim().to_string()).filter(|version| !version.is_empty()),
            deps: Dependencies::List(self.deps.handles()),
            in_footer: self.in_footer,
            strategy: self.strategy,
            size_bytes: None,
            mtime: None,
        }
    }
}

// ============================================================================
// SECTION: Source URL Validation
// ============================================================================

/// Source URL validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceUrlError {
    /// URL failed to parse.
    #[error("invalid script source url {url:?}: {reason}")]
    Unparseable {
        /// Offending URL.
        url: String,
        /// Parser error.
        reason: String,
    },
    /// URL scheme is not http or https.
    #[error("script source url {url:?} must use http or https")]
    UnsupportedScheme {
        /// Offending URL.
        url: String,
    },
    /// URL has no host.
    #[error("script source url {url:?} has no host")]
    MissingHost {
        /// Offending URL.
        url: String,
    },
}

/// Validates that a script source is an absolute http(s) URL with a host.
///
/// # Errors
///
/// Returns [`SourceUrlError`] when the URL is unusable.
pub fn validate_source_url(raw: &str) -> Result<Url, SourceUrlError> {
    let url = Url::parse(raw).map_err(|err| SourceUrlError::Unparseable {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SourceUrlError::UnsupportedScheme {
            url: raw.to_string(),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(SourceUrlError::MissingHost {
            url: raw.to_string(),
        });
    }
    Ok(url)
}
