// crates/script-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Script Gate Interfaces
// Description: Backend-agnostic interfaces for catalog storage and the host queue.
// Purpose: Define the contract surfaces the runtime uses to reach the outside world.
// Dependencies: serde_json, thiserror, crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the runtime reads and writes catalogs, mutates the
//! host's asset queue, and resolves local file metadata. Implementations must
//! be deterministic and fail closed on storage errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::core::Catalog;
use crate::core::CatalogKind;
use crate::core::FileMetadata;
use crate::core::LoadStrategy;
use crate::core::ScriptHandle;

// ============================================================================
// SECTION: Catalog Store
// ============================================================================

/// Catalog store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("catalog store io error: {0}")]
    Io(String),
    /// Stored payload is corrupted or fails integrity checks.
    #[error("catalog store corruption: {0}")]
    Corrupt(String),
    /// Stored data version is incompatible.
    #[error("catalog store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data or request is invalid.
    #[error("catalog store invalid data: {0}")]
    Invalid(String),
}

/// Key-value persistence for catalog payloads.
///
/// Each catalog is stored as one JSON document; a missing document reads as
/// `None`. Writes replace the whole document.
pub trait CatalogStore {
    /// Reads the raw payload for a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when reading fails.
    fn read(&self, kind: CatalogKind) -> Result<Option<Value>, StoreError>;

    /// Replaces the raw payload for a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when writing fails.
    fn write(&self, kind: CatalogKind, payload: &Value) -> Result<(), StoreError>;
}

/// Loads and decodes a typed catalog.
///
/// # Errors
///
/// Returns [`StoreError::Corrupt`] when the payload is not an object, or the
/// underlying read error.
pub fn load_catalog<R, S>(store: &S, kind: CatalogKind) -> Result<Catalog<R>, StoreError>
where
    R: Serialize + DeserializeOwned,
    S: CatalogStore + ?Sized,
{
    let payload = store.read(kind)?;
    Catalog::decode(payload.as_ref()).map_err(|err| StoreError::Corrupt(format!("{kind}: {err}")))
}

/// Encodes and writes a typed catalog.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] when encoding fails, or the underlying write
/// error.
pub fn save_catalog<R, S>(store: &S, kind: CatalogKind, catalog: &Catalog<R>) -> Result<(), StoreError>
where
    R: Serialize + DeserializeOwned,
    S: CatalogStore + ?Sized,
{
    let payload = catalog.encode().map_err(|err| StoreError::Invalid(format!("{kind}: {err}")))?;
    store.write(kind, &payload)
}

// ============================================================================
// SECTION: Asset Queue
// ============================================================================

/// Script registration request handed to the host queue.
#[derive(Debug, Clone, Copy)]
pub struct ScriptRegistration<'a> {
    /// Source URL.
    pub src: &'a str,
    /// Dependency handles in order.
    pub deps: &'a [String],
    /// Version, or `None` for no version.
    pub version: Option<&'a str>,
    /// Whether the script loads in the footer.
    pub in_footer: bool,
}

/// Host script queue for the current page render.
pub trait AssetQueue {
    /// Returns true when the handle is registered or enqueued.
    fn has(&self, handle: &ScriptHandle) -> bool;

    /// Dequeues and deregisters a handle; a missing handle is a no-op.
    fn remove(&mut self, handle: &ScriptHandle);

    /// Registers a script; an already registered handle is left unchanged.
    fn register(&mut self, handle: &ScriptHandle, registration: ScriptRegistration<'_>);

    /// Enqueues a registered handle for output.
    fn enqueue(&mut self, handle: &ScriptHandle);

    /// Applies a loading strategy to a registered handle.
    fn set_strategy(&mut self, handle: &ScriptHandle, strategy: LoadStrategy);
}

// ============================================================================
// SECTION: Metadata Resolver
// ============================================================================

/// Resolves on-disk metadata for script sources hosted by the site.
pub trait MetadataResolver {
    /// Returns file metadata when `src` maps to a readable local file.
    fn resolve(&self, src: &str) -> Option<FileMetadata>;
}

/// Resolver that never resolves metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadataResolver;

impl MetadataResolver for NoMetadataResolver {
    fn resolve(&self, _src: &str) -> Option<FileMetadata> {
        None
    }
}
