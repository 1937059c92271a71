// crates/script-gate-core/src/core/mod.rs
// ============================================================================
// Module: Script Gate Core Types
// Description: Identifiers, rule sets, script records, and catalogs.
// Purpose: Define the persisted data model shared by every runtime component.
// Dependencies: serde, serde_json, smallvec, thiserror, time, url
// ============================================================================

//! ## Overview
//! Core types are plain data with explicit JSON wire forms. They carry no
//! host or storage behavior; see [`crate::interfaces`] and [`crate::runtime`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod clock;
pub mod identifiers;
pub mod rules;
pub mod script;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::Catalog;
pub use catalog::CatalogEntry;
pub use catalog::CatalogError;
pub use catalog::CatalogKind;
pub use catalog::ManagedCatalog;
pub use catalog::RejectedEntry;
pub use identifiers::HandleError;
pub use identifiers::MAX_HANDLE_LENGTH;
pub use identifiers::ScriptHandle;
pub use rules::Argument;
pub use rules::ConditionKey;
pub use rules::Conditions;
pub use rules::LEGACY_NEGATION_PREFIX;
pub use rules::MODE_KEY;
pub use rules::MatchMode;
pub use rules::NEGATION_PREFIX;
pub use rules::RuleSet;
pub use rules::RuleSetError;
pub use rules::RuleShape;
pub use rules::Scalar;
pub use rules::ScalarList;
pub use script::Dependencies;
pub use script::DiscoveryEntry;
pub use script::FileMetadata;
pub use script::LoadStrategy;
pub use script::ManagedScriptRecord;
pub use script::ManualScriptInput;
pub use script::ScriptAsset;
pub use script::ScriptObservation;
pub use script::SourceUrlError;
pub use script::validate_source_url;
pub use clock::unix_now;
