// crates/script-gate-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Catalog Store
// Description: Durable CatalogStore backend using SQLite WAL.
// Purpose: Persist script catalogs across processes.
// Dependencies: script-gate-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`CatalogStore`] that keeps one row per
//! catalog holding the full JSON map. Writes replace the row atomically.
//!
//! [`CatalogStore`]: script_gate_core::CatalogStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_CATALOG_BYTES;
pub use store::SqliteCatalogStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
