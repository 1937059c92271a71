// crates/script-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Script Gate Runtime
// Description: Predicate registry, rule matcher, discovery, pipeline, and admin.
// Purpose: Evaluate activation rules and apply them to catalogs and the queue.
// Dependencies: crate::{audit, core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement rule evaluation and everything that acts on its
//! verdicts. The matcher is pure; discovery, the pipeline, and the admin layer
//! reach storage and the host queue only through [`crate::interfaces`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod admin;
pub mod discovery;
pub mod matcher;
pub mod metadata;
pub mod pipeline;
pub mod queue;
pub mod registry;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use admin::AdminError;
pub use admin::CatalogAdmin;
pub use admin::default_removal_rules;
pub use discovery::DiscoveryRecorder;
pub use discovery::DiscoveryReport;
pub use matcher::AbsentRulesVerdict;
pub use matcher::FRONTEND_PREDICATE;
pub use matcher::RuleMatcher;
pub use metadata::LocalAssetResolver;
pub use pipeline::ActivationPipeline;
pub use pipeline::ActivationReport;
pub use pipeline::PipelineError;
pub use pipeline::SkippedRecord;
pub use queue::InMemoryAssetQueue;
pub use queue::RegisteredScript;
pub use registry::Arity;
pub use registry::Predicate;
pub use registry::PredicateAccessPolicy;
pub use registry::PredicateFn;
pub use registry::PredicateInfo;
pub use registry::PredicateRegistry;
pub use registry::RegistryError;
pub use registry::RuleIssue;
pub use store::InMemoryCatalogStore;
pub use store::SharedCatalogStore;
