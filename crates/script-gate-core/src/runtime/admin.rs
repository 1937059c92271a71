// crates/script-gate-core/src/runtime/admin.rs
// ============================================================================
// Module: Script Gate Catalog Administration
// Description: Operator transitions between catalogs and rule editing.
// Purpose: Provide the mutations an administrative surface exposes.
// Dependencies: thiserror, crate::{audit, core, interfaces}
// ============================================================================

//! ## Overview
//! [`CatalogAdmin`] moves scripts between catalogs and edits their rules.
//! Every operation reads the catalogs it touches, validates the request, and
//! writes each changed catalog once. A handle lives in at most one catalog:
//!
//! - `dequeue` moves discovered -> removed with frontend-only default rules.
//! - `restore` drops a removed script; discovery records it again.
//! - `forget` and `clear_discovered` drop discovered entries.
//! - `register_manual`, `update_manual`, and `delete_manual` manage manual
//!   scripts; new manual scripts carry no rules and therefore always load.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::EVENT_CATALOG_TRANSITION;
use crate::audit::emit;
use crate::core::Argument;
use crate::core::Catalog;
use crate::core::CatalogEntry;
use crate::core::CatalogKind;
use crate::core::ConditionKey;
use crate::core::DiscoveryEntry;
use crate::core::ManagedCatalog;
use crate::core::ManagedScriptRecord;
use crate::core::ManualScriptInput;
use crate::core::RuleSet;
use crate::core::ScriptHandle;
use crate::core::SourceUrlError;
use crate::core::validate_source_url;
use crate::interfaces::CatalogStore;
use crate::interfaces::StoreError;
use crate::interfaces::load_catalog;
use crate::interfaces::save_catalog;
use crate::runtime::matcher::FRONTEND_PREDICATE;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog administration failures.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Handle is not present in the catalog.
    #[error("script {handle} not found in {catalog} catalog")]
    NotFound {
        /// Catalog searched.
        catalog: CatalogKind,
        /// Requested handle.
        handle: ScriptHandle,
    },
    /// Handle already exists in a catalog.
    #[error("script {handle} already exists in {catalog} catalog")]
    Duplicate {
        /// Catalog holding the handle.
        catalog: CatalogKind,
        /// Requested handle.
        handle: ScriptHandle,
    },
    /// Source URL is unusable.
    #[error(transparent)]
    InvalidSource(#[from] SourceUrlError),
    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Rules assigned to newly dequeued scripts: remove on frontend requests.
#[must_use]
pub fn default_removal_rules() -> RuleSet {
    RuleSet::empty().with_condition(ConditionKey::positive(FRONTEND_PREDICATE), Argument::Flag)
}

// ============================================================================
// SECTION: Admin
// ============================================================================

/// Administrative catalog operations.
pub struct CatalogAdmin<'a, S: ?Sized> {
    /// Catalog persistence.
    store: &'a S,
    /// Audit sink.
    audit: &'a dyn AuditSink,
}

impl<'a, S> CatalogAdmin<'a, S>
where
    S: CatalogStore + ?Sized,
{
    /// Creates an admin facade over a store.
    #[must_use]
    pub fn new(store: &'a S, audit: &'a dyn AuditSink) -> Self {
        Self {
            store,
            audit,
        }
    }

    /// Loads the discovered catalog.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] when the catalog cannot be loaded.
    pub fn discovered(&self) -> Result<Catalog<DiscoveryEntry>, AdminError> {
        Ok(load_catalog(self.store, CatalogKind::Discovered)?)
    }

    /// Loads a managed catalog.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] when the catalog cannot be loaded.
    pub fn managed(&self, catalog: ManagedCatalog) -> Result<Catalog<ManagedScriptRecord>, AdminError> {
        Ok(load_catalog(self.store, catalog.kind())?)
    }

    /// Moves a discovered script to the removed catalog.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the handle is not discovered or storage fails.
    pub fn dequeue(&self, handle: &ScriptHandle, now: i64) -> Result<ManagedScriptRecord, AdminError> {
        let mut discovered = self.discovered()?;
        let mut removed = self.managed(ManagedCatalog::Removed)?;
        let entry = discovered.remove(handle).ok_or_else(|| not_found(CatalogKind::Discovered, handle))?;
        let record = ManagedScriptRecord::from_discovery(entry, Some(default_removal_rules()), now);
        removed.insert(handle.clone(), record.clone());
        // Discovered goes first: a failed second write loses the entry rather
        // than leaving it in both catalogs.
        save_catalog(self.store, CatalogKind::Discovered, &discovered)?;
        save_catalog(self.store, CatalogKind::Removed, &removed)?;
        self.transition(CatalogKind::Removed, handle, "dequeue");
        Ok(record)
    }

    /// Drops a removed script so the next render rediscovers it. Entries that
    /// failed to decode are dropped too.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the handle is not removed or storage fails.
    pub fn restore(&self, handle: &ScriptHandle) -> Result<CatalogEntry<ManagedScriptRecord>, AdminError> {
        let mut removed = self.managed(ManagedCatalog::Removed)?;
        let record = removed.take(handle).ok_or_else(|| not_found(CatalogKind::Removed, handle))?;
        save_catalog(self.store, CatalogKind::Removed, &removed)?;
        self.transition(CatalogKind::Removed, handle, "restore");
        Ok(record)
    }

    /// Drops a discovered script.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the handle is not discovered or storage fails.
    pub fn forget(&self, handle: &ScriptHandle) -> Result<CatalogEntry<DiscoveryEntry>, AdminError> {
        let mut discovered = self.discovered()?;
        let entry = discovered.take(handle).ok_or_else(|| not_found(CatalogKind::Discovered, handle))?;
        save_catalog(self.store, CatalogKind::Discovered, &discovered)?;
        self.transition(CatalogKind::Discovered, handle, "forget");
        Ok(entry)
    }

    /// Drops every discovered script, returning the number removed.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] when storage fails.
    pub fn clear_discovered(&self) -> Result<usize, AdminError> {
        let mut discovered = self.discovered()?;
        let cleared = discovered.clear();
        save_catalog(self.store, CatalogKind::Discovered, &discovered)?;
        emit(self.audit, EVENT_CATALOG_TRANSITION, Some(CatalogKind::Discovered), "*", Some(format!("clear ({cleared})")));
        Ok(cleared)
    }

    /// Registers a new manual script without rules.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the handle exists in any catalog, the source
    /// URL is invalid, or storage fails.
    pub fn register_manual(
        &self,
        handle: &ScriptHandle,
        input: ManualScriptInput,
        now: i64,
    ) -> Result<ManagedScriptRecord, AdminError> {
        let discovered = self.discovered()?;
        let removed = self.managed(ManagedCatalog::Removed)?;
        let mut manual = self.managed(ManagedCatalog::Manual)?;
        let existing = [
            (CatalogKind::Manual, manual.contains(handle)),
            (CatalogKind::Removed, removed.contains(handle)),
            (CatalogKind::Discovered, discovered.contains(handle)),
        ];
        if let Some((catalog, _)) = existing.into_iter().find(|(_, present)| *present) {
            return Err(AdminError::Duplicate {
                catalog,
                handle: handle.clone(),
            });
        }
        let asset = input.into_asset();
        validate_source_url(&asset.src)?;
        let record = ManagedScriptRecord {
            asset,
            discovered_at: None,
            rules: None,
            transitioned_at: now,
            updated_at: None,
        };
        manual.insert(handle.clone(), record.clone());
        save_catalog(self.store, CatalogKind::Manual, &manual)?;
        self.transition(CatalogKind::Manual, handle, "register");
        Ok(record)
    }

    /// Replaces a manual script's metadata, keeping its rules.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the handle is not a manual script, the
    /// source URL is invalid, or storage fails.
    pub fn update_manual(
        &self,
        handle: &ScriptHandle,
        input: ManualScriptInput,
        now: i64,
    ) -> Result<ManagedScriptRecord, AdminError> {
        let mut manual = self.managed(ManagedCatalog::Manual)?;
        let asset = input.into_asset();
        validate_source_url(&asset.src)?;
        let record = manual.get_mut(handle).ok_or_else(|| not_found(CatalogKind::Manual, handle))?;
        record.asset = asset;
        record.updated_at = Some(now);
        let updated = record.clone();
        save_catalog(self.store, CatalogKind::Manual, &manual)?;
        self.transition(CatalogKind::Manual, handle, "update");
        Ok(updated)
    }

    /// Deletes a manual script, including one whose stored record no longer
    /// decodes.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the handle is not a manual script or storage
    /// fails.
    pub fn delete_manual(&self, handle: &ScriptHandle) -> Result<CatalogEntry<ManagedScriptRecord>, AdminError> {
        let mut manual = self.managed(ManagedCatalog::Manual)?;
        let record = manual.take(handle).ok_or_else(|| not_found(CatalogKind::Manual, handle))?;
        save_catalog(self.store, CatalogKind::Manual, &manual)?;
        self.transition(CatalogKind::Manual, handle, "delete");
        Ok(record)
    }

    /// Returns a managed script's stored rules.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the handle is absent or storage fails.
    pub fn rules(&self, catalog: ManagedCatalog, handle: &ScriptHandle) -> Result<Option<RuleSet>, AdminError> {
        let records = self.managed(catalog)?;
        let record = records.get(handle).ok_or_else(|| not_found(catalog.kind(), handle))?;
        Ok(record.rules.clone())
    }

    /// Replaces a managed script's rules.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the handle is absent or storage fails.
    pub fn replace_rules(
        &self,
        catalog: ManagedCatalog,
        handle: &ScriptHandle,
        rules: RuleSet,
        now: i64,
    ) -> Result<(), AdminError> {
        self.edit_rules(catalog, handle, Some(rules), now, "replace_rules")
    }

    /// Clears a managed script's rules so the catalog default applies.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the handle is absent or storage fails.
    pub fn clear_rules(&self, catalog: ManagedCatalog, handle: &ScriptHandle, now: i64) -> Result<(), AdminError> {
        self.edit_rules(catalog, handle, None, now, "clear_rules")
    }

    /// Writes new rules for a managed script.
    fn edit_rules(
        &self,
        catalog: ManagedCatalog,
        handle: &ScriptHandle,
        rules: Option<RuleSet>,
        now: i64,
        operation: &str,
    ) -> Result<(), AdminError> {
        let mut records = self.managed(catalog)?;
        let record = records.get_mut(handle).ok_or_else(|| not_found(catalog.kind(), handle))?;
        record.rules = rules;
        record.updated_at = Some(now);
        save_catalog(self.store, catalog.kind(), &records)?;
        self.transition(catalog.kind(), handle, operation);
        Ok(())
    }

    /// Emits a transition audit event.
    fn transition(&self, catalog: CatalogKind, handle: &ScriptHandle, operation: &str) {
        emit(self.audit, EVENT_CATALOG_TRANSITION, Some(catalog), handle.as_str(), Some(operation.to_string()));
    }
}

/// Builds a not-found error.
fn not_found(catalog: CatalogKind, handle: &ScriptHandle) -> AdminError {
    AdminError::NotFound {
        catalog,
        handle: handle.clone(),
    }
}
