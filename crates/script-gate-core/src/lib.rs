// crates/script-gate-core/src/lib.rs
// ============================================================================
// Module: Script Gate Core Library
// Description: Public API surface for the Script Gate core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Script Gate core tracks front-end scripts seen on page renders and decides,
//! per request, which managed scripts to remove from or inject into the host's
//! asset queue. Decisions come from stored rule sets evaluated against a
//! request context through a registry of named predicates. Storage and the
//! host queue are reached only through explicit interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use audit::ActivationAuditEvent;
pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use interfaces::AssetQueue;
pub use interfaces::CatalogStore;
pub use interfaces::MetadataResolver;
pub use interfaces::NoMetadataResolver;
pub use interfaces::ScriptRegistration;
pub use interfaces::StoreError;
pub use interfaces::load_catalog;
pub use interfaces::save_catalog;
pub use runtime::AbsentRulesVerdict;
pub use runtime::ActivationPipeline;
pub use runtime::ActivationReport;
pub use runtime::AdminError;
pub use runtime::Arity;
pub use runtime::CatalogAdmin;
pub use runtime::DiscoveryRecorder;
pub use runtime::DiscoveryReport;
pub use runtime::FRONTEND_PREDICATE;
pub use runtime::InMemoryAssetQueue;
pub use runtime::InMemoryCatalogStore;
pub use runtime::LocalAssetResolver;
pub use runtime::PipelineError;
pub use runtime::PredicateAccessPolicy;
pub use runtime::PredicateInfo;
pub use runtime::PredicateRegistry;
pub use runtime::RegistryError;
pub use runtime::RuleIssue;
pub use runtime::RuleMatcher;
pub use runtime::SharedCatalogStore;
pub use runtime::SkippedRecord;
pub use runtime::default_removal_rules;
