// crates/script-gate-config/src/config.rs
// ============================================================================
// Module: Script Gate Configuration
// Description: Configuration loading and validation for Script Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: script-gate-core, script-gate-store-sqlite, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `SCRIPT_GATE_CONFIG`, then
//! `./script-gate.toml`. Every section has defaults, so an empty file is a
//! valid in-memory setup. Invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use script_gate_core::LocalAssetResolver;
use script_gate_core::PredicateAccessPolicy;
use script_gate_store_sqlite::SqliteStoreConfig;
use script_gate_store_sqlite::SqliteStoreMode;
use script_gate_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "script-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SCRIPT_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum entries in each predicate list.
const MAX_PREDICATE_RULES: usize = 256;
/// Default `SQLite` busy timeout in milliseconds.
const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Top-level Script Gate configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptGateConfig {
    /// Site layout used for local file metadata.
    #[serde(default)]
    pub site: SiteConfig,
    /// Catalog store backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// Predicate access policy.
    #[serde(default)]
    pub predicates: PredicatesConfig,
    /// Audit log settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Discovery settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    /// Path the configuration was read from (not deserialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl ScriptGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content =
            std::str::from_utf8(&bytes).map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.source_path = Some(resolved);
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.site.validate()?;
        self.store.validate()?;
        self.predicates.validate()?;
        self.audit.validate()?;
        if self.discovery.resolve_local_metadata && !self.site.is_complete() {
            return Err(ConfigError::Invalid(
                "discovery.resolve_local_metadata requires site_url, content_url, content_dir, and root_dir"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the local metadata resolver when discovery resolves metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the site layout is incomplete or invalid.
    pub fn metadata_resolver(&self) -> Result<Option<LocalAssetResolver>, ConfigError> {
        if !self.discovery.resolve_local_metadata {
            return Ok(None);
        }
        self.site.resolver().map(Some)
    }
}

// ============================================================================
// SECTION: Site
// ============================================================================

/// Public URLs and filesystem roots of the site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    /// Public site URL.
    #[serde(default)]
    pub site_url: Option<String>,
    /// Public URL of the content directory.
    #[serde(default)]
    pub content_url: Option<String>,
    /// Filesystem path of the content directory.
    #[serde(default)]
    pub content_dir: Option<PathBuf>,
    /// Filesystem path of the site root.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
}

impl SiteConfig {
    /// Returns true when every field is set.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.site_url.is_some() && self.content_url.is_some() && self.content_dir.is_some() && self.root_dir.is_some()
    }

    /// Validates site URLs and paths.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(site_url) = &self.site_url {
            parse_site_url("site.site_url", site_url)?;
        }
        if let Some(content_url) = &self.content_url {
            parse_site_url("site.content_url", content_url)?;
        }
        if let Some(content_dir) = &self.content_dir {
            validate_path_string("site.content_dir", &content_dir.to_string_lossy())?;
        }
        if let Some(root_dir) = &self.root_dir {
            validate_path_string("site.root_dir", &root_dir.to_string_lossy())?;
        }
        Ok(())
    }

    /// Builds a resolver from a complete site layout.
    fn resolver(&self) -> Result<LocalAssetResolver, ConfigError> {
        let (Some(site_url), Some(content_url), Some(content_dir), Some(root_dir)) =
            (&self.site_url, &self.content_url, &self.content_dir, &self.root_dir)
        else {
            return Err(ConfigError::Invalid("site layout is incomplete".to_string()));
        };
        Ok(LocalAssetResolver::new(
            parse_site_url("site.site_url", site_url)?,
            parse_site_url("site.content_url", content_url)?,
            content_dir.clone(),
            root_dir.clone(),
        ))
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Catalog store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Returns the sqlite settings when the sqlite backend is selected.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match (self.store_type, &self.path) {
            (StoreType::Sqlite, Some(path)) => Some(SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
            _ => None,
        }
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path =
                    self.path.as_ref().ok_or_else(|| ConfigError::Invalid("sqlite store requires path".to_string()))?;
                validate_path_string("store.path", &path.to_string_lossy())?;
                if self.busy_timeout_ms == 0 {
                    return Err(ConfigError::Invalid("store busy_timeout_ms must be greater than zero".to_string()));
                }
                Ok(())
            }
        }
    }
}

/// Catalog store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use the `SQLite`-backed durable store.
    Sqlite,
}

/// Returns the default busy timeout for sqlite stores.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Predicates
// ============================================================================

/// Predicate access policy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredicatesConfig {
    /// Optional allowlist; when set, only these predicates resolve.
    #[serde(default)]
    pub allowlist: Option<Vec<String>>,
    /// Predicates that never resolve.
    #[serde(default)]
    pub denylist: Vec<String>,
}

impl PredicatesConfig {
    /// Builds the registry access policy.
    #[must_use]
    pub fn policy(&self) -> PredicateAccessPolicy {
        PredicateAccessPolicy {
            allowlist: self.allowlist.as_ref().map(|names| names.iter().map(|name| name.trim().to_string()).collect()),
            denylist: self.denylist.iter().map(|name| name.trim().to_string()).collect(),
        }
    }

    /// Validates list sizes, entries, and overlap.
    fn validate(&self) -> Result<(), ConfigError> {
        let allowlist = self.allowlist.as_deref().unwrap_or_default();
        if allowlist.len() > MAX_PREDICATE_RULES || self.denylist.len() > MAX_PREDICATE_RULES {
            return Err(ConfigError::Invalid("too many predicate allowlist/denylist entries".to_string()));
        }
        if allowlist.iter().chain(&self.denylist).any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Invalid("predicates allowlist/denylist entries must be non-empty".to_string()));
        }
        let denied: BTreeSet<&str> = self.denylist.iter().map(|name| name.trim()).collect();
        if let Some(name) = allowlist.iter().map(|name| name.trim()).find(|name| denied.contains(name)) {
            return Err(ConfigError::Invalid(format!("predicate {name} is both allowed and denied")));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit log configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Emit audit events.
    #[serde(default)]
    pub enabled: bool,
    /// Append events to this file instead of stderr.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates the audit log path.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Discovery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Record unseen scripts during renders.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Resolve size and mtime of same-origin scripts from disk.
    #[serde(default)]
    pub resolve_local_metadata: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            resolve_local_metadata: false,
        }
    }
}

/// Serde default helper.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Parses a site URL, requiring http or https with a host.
fn parse_site_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|err| ConfigError::Invalid(format!("{field} is not a url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::Invalid(format!("{field} must be an http(s) url with a host")));
    }
    Ok(url)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn validate_path_string_rejects_whitespace_only() {
        assert!(validate_path_string("field", "   ").is_err());
    }

    #[test]
    fn validate_path_string_accepts_component_at_max() {
        let path = format!("./{}", "a".repeat(MAX_PATH_COMPONENT_LENGTH));
        assert!(validate_path_string("field", &path).is_ok());
    }

    #[test]
    fn validate_path_string_rejects_component_too_long() {
        let path = format!("./{}", "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1));
        let err = validate_path_string("store.path", &path).unwrap_err();
        assert!(err.to_string().contains("store.path path component too long"));
    }

    #[test]
    fn resolve_path_prefers_explicit_path() {
        let resolved = resolve_path(Some(Path::new("custom.toml"))).unwrap();
        assert_eq!(resolved, PathBuf::from("custom.toml"));
    }

    #[test]
    fn parse_site_url_rejects_non_http_schemes() {
        assert!(parse_site_url("site.site_url", "ftp://example.test").is_err());
        assert!(parse_site_url("site.site_url", "https://example.test/").is_ok());
    }
}
