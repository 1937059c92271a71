// crates/script-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Script Gate In-Memory Store
// Description: In-memory catalog store and a shared store wrapper.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: serde_json, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of [`CatalogStore`]
//! for tests and single-process runs, plus [`SharedCatalogStore`] for
//! selecting a backend at runtime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;

use crate::core::CatalogKind;
use crate::interfaces::CatalogStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory catalog store for tests and single-process runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogStore {
    /// Catalog payloads protected by a mutex.
    catalogs: Arc<Mutex<BTreeMap<CatalogKind, Value>>>,
}

impl InMemoryCatalogStore {
    /// Creates a new in-memory catalog store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalogs: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn read(&self, kind: CatalogKind) -> Result<Option<Value>, StoreError> {
        let guard = self
            .catalogs
            .lock()
            .map_err(|_| StoreError::Io("catalog store mutex poisoned".to_string()))?;
        Ok(guard.get(&kind).cloned())
    }

    fn write(&self, kind: CatalogKind, payload: &Value) -> Result<(), StoreError> {
        self.catalogs
            .lock()
            .map_err(|_| StoreError::Io("catalog store mutex poisoned".to_string()))?
            .insert(kind, payload.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared catalog store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedCatalogStore {
    /// Inner store implementation.
    inner: Arc<dyn CatalogStore + Send + Sync>,
}

impl SharedCatalogStore {
    /// Wraps a catalog store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl CatalogStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn CatalogStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl CatalogStore for SharedCatalogStore {
    fn read(&self, kind: CatalogKind) -> Result<Option<Value>, StoreError> {
        self.inner.read(kind)
    }

    fn write(&self, kind: CatalogKind, payload: &Value) -> Result<(), StoreError> {
        self.inner.write(kind, payload)
    }
}
