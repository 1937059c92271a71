// crates/script-gate-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Script Gate Activation Pipeline
// Description: Applies manual additions and removals to the host queue.
// Purpose: Run the per-request activation pass against stored catalogs.
// Dependencies: thiserror, crate::{audit, core, interfaces, runtime::matcher}
// ============================================================================

//! ## Overview
//! Each request runs two passes over the queue, additions first:
//!
//! 1. Manual additions: every manual record whose rules match (absent rules
//!    always match) is registered and enqueued. Records with an unusable
//!    source URL are skipped individually.
//! 2. Removals: every removed record whose rules match (absent rules match on
//!    frontend requests) is dequeued and deregistered.
//!
//! Running a pass twice against the same queue leaves it unchanged. Catalog
//! entries that failed to decode are reported and skipped. A catalog payload
//! that is not an object fails the whole run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::EVENT_CATALOG_RECORD_REJECTED;
use crate::audit::EVENT_MANUAL_SCRIPT_SKIPPED;
use crate::audit::EVENT_SCRIPT_INJECTED;
use crate::audit::EVENT_SCRIPT_REMOVED;
use crate::audit::emit;
use crate::core::Catalog;
use crate::core::CatalogKind;
use crate::core::LoadStrategy;
use crate::core::ManagedScriptRecord;
use crate::core::ScriptHandle;
use crate::core::validate_source_url;
use crate::interfaces::AssetQueue;
use crate::interfaces::CatalogStore;
use crate::interfaces::ScriptRegistration;
use crate::interfaces::StoreError;
use crate::interfaces::load_catalog;
use crate::runtime::matcher::AbsentRulesVerdict;
use crate::runtime::matcher::RuleMatcher;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Activation pipeline failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Catalog could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Catalog entry skipped during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Catalog holding the entry.
    pub catalog: CatalogKind,
    /// Stored key of the entry.
    pub key: String,
    /// Skip reason.
    pub reason: String,
}

/// Outcome of one or both activation passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Manual scripts registered and enqueued.
    pub injected: Vec<ScriptHandle>,
    /// Scripts dequeued and deregistered.
    pub removed: Vec<ScriptHandle>,
    /// Entries that could not be applied.
    pub skipped: Vec<SkippedRecord>,
}

impl ActivationReport {
    /// Appends another report.
    pub fn merge(&mut self, other: Self) {
        self.injected.extend(other.injected);
        self.removed.extend(other.removed);
        self.skipped.extend(other.skipped);
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Per-request activation pipeline.
pub struct ActivationPipeline<'a, C> {
    /// Rule evaluator.
    matcher: RuleMatcher<'a, C>,
    /// Audit sink.
    audit: &'a dyn AuditSink,
}

impl<'a, C> ActivationPipeline<'a, C> {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(matcher: RuleMatcher<'a, C>, audit: &'a dyn AuditSink) -> Self {
        Self {
            matcher,
            audit,
        }
    }

    /// Loads both managed catalogs and runs additions, then removals.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when either catalog cannot be loaded.
    pub fn run<S, Q>(&self, store: &S, ctx: &C, queue: &mut Q) -> Result<ActivationReport, PipelineError>
    where
        S: CatalogStore + ?Sized,
        Q: AssetQueue + ?Sized,
    {
        let manual: Catalog<ManagedScriptRecord> = load_catalog(store, CatalogKind::Manual)?;
        let removed: Catalog<ManagedScriptRecord> = load_catalog(store, CatalogKind::Removed)?;
        let mut report = self.apply_manual_additions(&manual, ctx, queue);
        report.merge(self.apply_removals(&removed, ctx, queue));
        Ok(report)
    }

    /// Registers and enqueues matching manual scripts.
    pub fn apply_manual_additions<Q>(
        &self,
        manual: &Catalog<ManagedScriptRecord>,
        ctx: &C,
        queue: &mut Q,
    ) -> ActivationReport
    where
        Q: AssetQueue + ?Sized,
    {
        let mut report = self.rejected_entries(manual, CatalogKind::Manual);
        for (handle, record) in manual.iter() {
            if !self.matcher.matches(record.rules.as_ref(), ctx, AbsentRulesVerdict::ALWAYS) {
                continue;
            }
            if let Err(err) = validate_source_url(&record.asset.src) {
                let reason = err.to_string();
                emit(self.audit, EVENT_MANUAL_SCRIPT_SKIPPED, Some(CatalogKind::Manual), handle.as_str(), Some(reason.clone()));
                report.skipped.push(SkippedRecord {
                    catalog: CatalogKind::Manual,
                    key: handle.to_string(),
                    reason,
                });
                continue;
            }
            let deps = record.asset.deps.handles();
            queue.register(
                handle,
                ScriptRegistration {
                    src: &record.asset.src,
                    deps: &deps,
                    version: record.asset.effective_version(),
                    in_footer: record.asset.in_footer,
                },
            );
            queue.enqueue(handle);
            if record.asset.strategy != LoadStrategy::None {
                queue.set_strategy(handle, record.asset.strategy);
            }
            emit(self.audit, EVENT_SCRIPT_INJECTED, Some(CatalogKind::Manual), handle.as_str(), None);
            report.injected.push(handle.clone());
        }
        report
    }

    /// Dequeues and deregisters matching removed scripts.
    pub fn apply_removals<Q>(&self, removed: &Catalog<ManagedScriptRecord>, ctx: &C, queue: &mut Q) -> ActivationReport
    where
        Q: AssetQueue + ?Sized,
    {
        let mut report = self.rejected_entries(removed, CatalogKind::Removed);
        for (handle, record) in removed.iter() {
            if !self.matcher.matches(record.rules.as_ref(), ctx, AbsentRulesVerdict::FRONTEND_ONLY) {
                continue;
            }
            let present = queue.has(handle);
            queue.remove(handle);
            if present {
                emit(self.audit, EVENT_SCRIPT_REMOVED, Some(CatalogKind::Removed), handle.as_str(), None);
                report.removed.push(handle.clone());
            }
        }
        report
    }

    /// Reports entries that failed to decode.
    fn rejected_entries(&self, catalog: &Catalog<ManagedScriptRecord>, kind: CatalogKind) -> ActivationReport {
        let mut report = ActivationReport::default();
        for (key, entry) in catalog.rejected() {
            emit(self.audit, EVENT_CATALOG_RECORD_REJECTED, Some(kind), key, Some(entry.reason.clone()));
            report.skipped.push(SkippedRecord {
                catalog: kind,
                key: key.to_string(),
                reason: entry.reason.clone(),
            });
        }
        report
    }
}
