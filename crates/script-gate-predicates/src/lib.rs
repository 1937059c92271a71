// crates/script-gate-predicates/src/lib.rs
// ============================================================================
// Module: Script Gate Predicates
// Description: Request context model and built-in predicate vocabulary.
// Purpose: Provide the predicates activation rules are written against.
// Dependencies: script-gate-core, serde
// ============================================================================

//! ## Overview
//! This crate defines [`RequestContext`], the per-request snapshot the host
//! supplies, and registers the built-in predicates that evaluate it. Use
//! [`builtin_registry`] to obtain a ready registry under an access policy.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod builtin;
pub mod context;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builtin::builtin_registry;
pub use builtin::register_builtin_predicates;
pub use context::AuthorContext;
pub use context::PostContext;
pub use context::QueriedObject;
pub use context::RequestContext;
pub use context::TermContext;
pub use context::TermRef;
