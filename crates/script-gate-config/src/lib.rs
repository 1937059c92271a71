// crates/script-gate-config/src/lib.rs
// ============================================================================
// Module: Script Gate Config
// Description: Configuration model and validation for Script Gate.
// Purpose: Load `script-gate.toml` with strict limits.
// Dependencies: script-gate-core, script-gate-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is read from a TOML file and validated fail-closed before
//! any store, registry, or resolver is built from it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AuditConfig;
pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::DiscoveryConfig;
pub use config::MAX_CONFIG_FILE_SIZE;
pub use config::PredicatesConfig;
pub use config::ScriptGateConfig;
pub use config::SiteConfig;
pub use config::StoreConfig;
pub use config::StoreType;
