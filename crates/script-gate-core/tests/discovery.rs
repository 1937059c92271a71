// crates/script-gate-core/tests/discovery.rs
// ============================================================================
// Module: Discovery Recorder Tests
// Description: First-seen recording into the discovered catalog.
// Purpose: Ensure idempotence and cross-catalog exclusivity.
// Dependencies: script-gate-core, serde_json
// ============================================================================
//! ## Overview
//! Discovery must never overwrite an existing entry and must ignore handles
//! already managed by the removed or manual catalogs.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use script_gate_core::Catalog;
use script_gate_core::CatalogAdmin;
use script_gate_core::CatalogKind;
use script_gate_core::CatalogStore;
use script_gate_core::DiscoveryEntry;
use script_gate_core::DiscoveryRecorder;
use script_gate_core::FileMetadata;
use script_gate_core::InMemoryCatalogStore;
use script_gate_core::MetadataResolver;
use script_gate_core::NoMetadataResolver;
use script_gate_core::NoopAuditSink;
use script_gate_core::StoreError;
use script_gate_core::load_catalog;
use serde_json::json;
use support::RecordingAuditSink;
use support::handle;
use support::observation;

struct FixedResolver;

impl MetadataResolver for FixedResolver {
    fn resolve(&self, src: &str) -> Option<FileMetadata> {
        src.contains("/local/").then_some(FileMetadata {
            size_bytes: 2048,
            modified_at: Some(1_700_000_000),
        })
    }
}

fn discovered(store: &InMemoryCatalogStore) -> Catalog<DiscoveryEntry> {
    load_catalog(store, CatalogKind::Discovered).expect("load discovered")
}

#[test]
fn first_observation_wins() {
    let store = InMemoryCatalogStore::new();
    let recorder = DiscoveryRecorder::new(&store, &NoMetadataResolver, &NoopAuditSink);
    assert!(recorder.record_if_new(observation("app", "https://example.test/v1.js"), 10).expect("record"));
    assert!(!recorder.record_if_new(observation("app", "https://example.test/v2.js"), 20).expect("record again"));
    let catalog = discovered(&store);
    assert_eq!(catalog.len(), 1);
    let entry = catalog.get(&handle("app")).expect("entry");
    assert_eq!(entry.asset.src, "https://example.test/v1.js");
    assert_eq!(entry.discovered_at, 10);
}

#[test]
fn managed_handles_are_not_rediscovered() {
    let store = InMemoryCatalogStore::new();
    let audit = RecordingAuditSink::default();
    let recorder = DiscoveryRecorder::new(&store, &NoMetadataResolver, &audit);
    recorder.record_if_new(observation("tracker", "https://example.test/t.js"), 10).expect("record");
    CatalogAdmin::new(&store, &audit).dequeue(&handle("tracker"), 11).expect("dequeue");
    assert!(!recorder.record_if_new(observation("tracker", "https://example.test/t.js"), 12).expect("record"));
    assert!(discovered(&store).get(&handle("tracker")).is_none());
}

#[test]
fn manual_handles_are_not_discovered() {
    let store = InMemoryCatalogStore::new();
    store
        .write(CatalogKind::Manual, &json!({"widget": {"src": "https://cdn.test/w.js", "transitioned_at": 1}}))
        .expect("seed manual");
    let recorder = DiscoveryRecorder::new(&store, &NoMetadataResolver, &NoopAuditSink);
    assert!(!recorder.record_if_new(observation("widget", "https://cdn.test/w.js"), 5).expect("record"));
}

#[test]
fn undecodable_managed_entries_still_block_discovery() {
    let store = InMemoryCatalogStore::new();
    store.write(CatalogKind::Removed, &json!({"legacy": "not a record"})).expect("seed removed");
    let recorder = DiscoveryRecorder::new(&store, &NoMetadataResolver, &NoopAuditSink);
    assert!(!recorder.record_if_new(observation("legacy", "https://example.test/l.js"), 5).expect("record"));
}

#[test]
fn batch_records_new_handles_once_and_audits_them() {
    let store = InMemoryCatalogStore::new();
    let audit = RecordingAuditSink::default();
    let recorder = DiscoveryRecorder::new(&store, &FixedResolver, &audit);
    let report = recorder
        .record_all(
            [
                observation("one", "https://example.test/local/one.js"),
                observation("two", "https://cdn.test/two.js"),
                observation("one", "https://example.test/local/other.js"),
            ],
            30,
        )
        .expect("batch");
    assert_eq!(report.recorded, vec![handle("one"), handle("two")]);
    assert_eq!(report.known, 1);
    let catalog = discovered(&store);
    let one = catalog.get(&handle("one")).expect("one");
    assert_eq!(one.asset.size_bytes, Some(2048));
    assert_eq!(one.asset.mtime, Some(1_700_000_000));
    let two = catalog.get(&handle("two")).expect("two");
    assert_eq!(two.asset.size_bytes, None);
    assert_eq!(two.asset.mtime, None);
    assert_eq!(
        audit.events(),
        vec![("script_discovered", "one".to_string()), ("script_discovered", "two".to_string())]
    );
}

#[test]
fn corrupt_catalog_fails_loudly() {
    let store = InMemoryCatalogStore::new();
    store.write(CatalogKind::Discovered, &json!("oops")).expect("seed");
    let recorder = DiscoveryRecorder::new(&store, &NoMetadataResolver, &NoopAuditSink);
    let err = recorder.record_if_new(observation("app", "https://example.test/a.js"), 1).expect_err("corrupt");
    assert!(matches!(err, StoreError::Corrupt(_)));
}
