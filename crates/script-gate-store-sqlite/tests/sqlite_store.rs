// crates/script-gate-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate SqliteCatalogStore behavior.
// Purpose: Ensure durable persistence, path safety, and corruption handling.
// Dependencies: script-gate-store-sqlite, script-gate-core, rusqlite, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed catalog store. Database contents
//! are treated as untrusted: tampered rows must fail closed.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use rusqlite::Connection;
use rusqlite::params;
use script_gate_core::CatalogAdmin;
use script_gate_core::CatalogKind;
use script_gate_core::CatalogStore;
use script_gate_core::DiscoveryEntry;
use script_gate_core::DiscoveryRecorder;
use script_gate_core::LoadStrategy;
use script_gate_core::ManagedCatalog;
use script_gate_core::NoMetadataResolver;
use script_gate_core::NoopAuditSink;
use script_gate_core::ScriptHandle;
use script_gate_core::ScriptObservation;
use script_gate_core::StoreError;
use script_gate_core::load_catalog;
use script_gate_store_sqlite::SqliteCatalogStore;
use script_gate_store_sqlite::SqliteStoreConfig;
use script_gate_store_sqlite::SqliteStoreError;
use script_gate_store_sqlite::SqliteStoreMode;
use script_gate_store_sqlite::SqliteSyncMode;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn store_for(path: &Path) -> SqliteCatalogStore {
    SqliteCatalogStore::new(SqliteStoreConfig::new(path)).expect("store init")
}

fn observation(handle: &str, src: &str) -> ScriptObservation {
    ScriptObservation {
        handle: ScriptHandle::parse(handle).expect("handle"),
        src: src.to_string(),
        version: Some("1.0".to_string()),
        deps: vec!["jquery".to_string()],
        in_footer: false,
        strategy: LoadStrategy::Defer,
    }
}

// ============================================================================
// SECTION: Persistence
// ============================================================================

#[test]
fn sqlite_store_reads_missing_catalog_as_none() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("catalogs.db"));
    for kind in CatalogKind::ALL {
        assert!(store.read(kind).unwrap().is_none());
        assert!(store.saved_at(kind).unwrap().is_none());
    }
    let catalog = load_catalog::<DiscoveryEntry, _>(&store, CatalogKind::Discovered).unwrap();
    assert!(catalog.is_empty());
}

#[test]
fn sqlite_store_replaces_payload_per_catalog() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("catalogs.db"));
    store.write(CatalogKind::Manual, &json!({"a": {"src": "https://x.test/a.js", "transitioned_at": 1}})).unwrap();
    store.write(CatalogKind::Manual, &json!({"b": {"src": "https://x.test/b.js", "transitioned_at": 2}})).unwrap();
    let payload = store.read(CatalogKind::Manual).unwrap().unwrap();
    assert_eq!(payload, json!({"b": {"src": "https://x.test/b.js", "transitioned_at": 2}}));
    assert!(store.read(CatalogKind::Removed).unwrap().is_none());
    assert!(store.saved_at(CatalogKind::Manual).unwrap().is_some());
}

#[test]
fn sqlite_store_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("catalogs.db");
    {
        let store = store_for(&path);
        let recorder = DiscoveryRecorder::new(&store, &NoMetadataResolver, &NoopAuditSink);
        let report = recorder
            .record_all([observation("tracker", "https://x.test/t.js"), observation("app", "https://x.test/a.js")], 42)
            .unwrap();
        assert_eq!(report.recorded.len(), 2);
        CatalogAdmin::new(&store, &NoopAuditSink).dequeue(&ScriptHandle::parse("tracker").unwrap(), 50).unwrap();
    }
    let reopened = store_for(&path);
    let admin = CatalogAdmin::new(&reopened, &NoopAuditSink);
    let discovered = admin.discovered().unwrap();
    assert_eq!(discovered.len(), 1);
    let app = discovered.get(&ScriptHandle::parse("app").unwrap()).unwrap();
    assert_eq!(app.discovered_at, 42);
    assert_eq!(app.asset.strategy, LoadStrategy::Defer);
    let removed = admin.managed(ManagedCatalog::Removed).unwrap();
    let tracker = removed.get(&ScriptHandle::parse("tracker").unwrap()).unwrap();
    assert_eq!(tracker.transitioned_at, 50);
    assert!(tracker.rules.is_some());
}

#[test]
fn sqlite_store_honors_configured_pragmas() {
    let temp = TempDir::new().unwrap();
    let config = SqliteStoreConfig {
        path: temp.path().join("catalogs.db"),
        busy_timeout_ms: 250,
        journal_mode: SqliteStoreMode::Delete,
        sync_mode: SqliteSyncMode::Normal,
    };
    let store = SqliteCatalogStore::new(config).unwrap();
    store.write(CatalogKind::Removed, &json!({})).unwrap();
    assert_eq!(store.read(CatalogKind::Removed).unwrap(), Some(json!({})));
}

// ============================================================================
// SECTION: Path Validation
// ============================================================================

#[test]
fn sqlite_store_rejects_directory_path() {
    let temp = TempDir::new().unwrap();
    let Err(err) = SqliteCatalogStore::new(SqliteStoreConfig::new(temp.path())) else {
        panic!("expected invalid directory path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_overlong_component() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a".repeat(256));
    let Err(err) = SqliteCatalogStore::new(SqliteStoreConfig::new(path)) else {
        panic!("expected overlong component to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_empty_path() {
    let Err(err) = SqliteCatalogStore::new(SqliteStoreConfig::new("")) else {
        panic!("expected empty path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

// ============================================================================
// SECTION: Integrity
// ============================================================================

#[test]
fn sqlite_store_rejects_unknown_schema_version() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("catalogs.db");
    drop(store_for(&path));
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = ?1", params![99_i64]).unwrap();
    drop(connection);
    let Err(err) = SqliteCatalogStore::new(SqliteStoreConfig::new(&path)) else {
        panic!("expected version mismatch");
    };
    assert!(matches!(err, SqliteStoreError::VersionMismatch(_)));
}

#[test]
fn sqlite_store_fails_closed_on_tampered_payloads() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("catalogs.db");
    let store = store_for(&path);
    store.write(CatalogKind::Discovered, &json!({})).unwrap();
    store.write(CatalogKind::Removed, &json!({})).unwrap();
    let connection = Connection::open(&path).unwrap();
    connection
        .execute("UPDATE catalogs SET payload_json = ?1 WHERE kind = 'discovered'", params![b"[1, 2]".to_vec()])
        .unwrap();
    connection
        .execute("UPDATE catalogs SET payload_json = ?1 WHERE kind = 'removed'", params![b"{not json".to_vec()])
        .unwrap();
    drop(connection);
    assert!(matches!(store.read(CatalogKind::Discovered), Err(StoreError::Corrupt(_))));
    assert!(matches!(store.read(CatalogKind::Removed), Err(StoreError::Corrupt(_))));
}

#[test]
fn sqlite_store_rejects_non_object_writes() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("catalogs.db"));
    let err = store.write(CatalogKind::Manual, &json!(["a"])).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
    assert!(store.read(CatalogKind::Manual).unwrap().is_none());
}

#[test]
fn sqlite_store_is_shareable_across_threads() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("catalogs.db"));
    let handles: Vec<_> = (0 .. 4)
        .map(|index| {
            let store = store.clone();
            std::thread::spawn(move || {
                store.write(CatalogKind::Manual, &json!({(format!("s{index}")): {"src": "https://x.test/s.js", "transitioned_at": index}})).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let payload = store.read(CatalogKind::Manual).unwrap().unwrap();
    assert_eq!(payload.as_object().unwrap().len(), 1);
}
