// crates/script-gate-core/src/runtime/discovery.rs
// ============================================================================
// Module: Script Gate Discovery
// Description: Records scripts observed in the host queue.
// Purpose: Grow the discovered catalog without touching managed scripts.
// Dependencies: crate::{audit, core, interfaces}
// ============================================================================

//! ## Overview
//! Discovery inspects the scripts present in a page's queue and records each
//! handle that no catalog knows yet. A handle already in the discovered,
//! removed, or manual catalog (decoded or not) is left alone, so recording
//! is idempotent. A batch writes the discovered catalog at most once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::audit::AuditSink;
use crate::audit::EVENT_SCRIPT_DISCOVERED;
use crate::audit::emit;
use crate::core::Catalog;
use crate::core::CatalogKind;
use crate::core::DiscoveryEntry;
use crate::core::ManagedScriptRecord;
use crate::core::ScriptHandle;
use crate::core::ScriptObservation;
use crate::interfaces::CatalogStore;
use crate::interfaces::MetadataResolver;
use crate::interfaces::StoreError;
use crate::interfaces::load_catalog;
use crate::interfaces::save_catalog;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Outcome of a discovery batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Handles newly recorded, in observation order.
    pub recorded: Vec<ScriptHandle>,
    /// Observations skipped because a catalog already knows the handle.
    pub known: usize,
}

// ============================================================================
// SECTION: Recorder
// ============================================================================

/// Records observed scripts into the discovered catalog.
pub struct DiscoveryRecorder<'a, S: ?Sized, M: ?Sized> {
    /// Catalog persistence.
    store: &'a S,
    /// Local file metadata source.
    resolver: &'a M,
    /// Audit sink.
    audit: &'a dyn AuditSink,
}

impl<'a, S, M> DiscoveryRecorder<'a, S, M>
where
    S: CatalogStore + ?Sized,
    M: MetadataResolver + ?Sized,
{
    /// Creates a recorder.
    #[must_use]
    pub fn new(store: &'a S, resolver: &'a M, audit: &'a dyn AuditSink) -> Self {
        Self {
            store,
            resolver,
            audit,
        }
    }

    /// Records one observation unless a catalog already knows its handle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a catalog cannot be read or written.
    pub fn record_if_new(&self, observation: ScriptObservation, now: i64) -> Result<bool, StoreError> {
        let report = self.record_all([observation], now)?;
        Ok(!report.recorded.is_empty())
    }

    /// Records every unknown observation, writing the catalog once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a catalog cannot be read or written.
    pub fn record_all<I>(&self, observations: I, now: i64) -> Result<DiscoveryReport, StoreError>
    where
        I: IntoIterator<Item = ScriptObservation>,
    {
        let mut discovered: Catalog<DiscoveryEntry> = load_catalog(self.store, CatalogKind::Discovered)?;
        let removed: Catalog<ManagedScriptRecord> = load_catalog(self.store, CatalogKind::Removed)?;
        let manual: Catalog<ManagedScriptRecord> = load_catalog(self.store, CatalogKind::Manual)?;
        let mut report = DiscoveryReport::default();
        for observation in observations {
            let handle = observation.handle.clone();
            if discovered.contains(&handle) || removed.contains(&handle) || manual.contains(&handle) {
                report.known += 1;
                continue;
            }
            let mut asset = observation.into_asset();
            asset.apply_metadata(self.resolver.resolve(&asset.src));
            discovered.insert(
                handle.clone(),
                DiscoveryEntry {
                    asset,
                    discovered_at: now,
                },
            );
            report.recorded.push(handle);
        }
        if !report.recorded.is_empty() {
            save_catalog(self.store, CatalogKind::Discovered, &discovered)?;
            for handle in &report.recorded {
                emit(self.audit, EVENT_SCRIPT_DISCOVERED, Some(CatalogKind::Discovered), handle.as_str(), None);
            }
        }
        Ok(report)
    }
}
