// crates/script-gate-core/tests/metadata.rs
// ============================================================================
// Module: Local Asset Metadata Tests
// Description: URL-to-file mapping and metadata reads.
// Purpose: Ensure only same-origin, traversal-free paths resolve.
// Dependencies: script-gate-core, tempfile, url
// ============================================================================
//! ## Overview
//! Builds a throwaway site layout on disk and resolves script URLs against it.

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

use std::fs;

use script_gate_core::LocalAssetResolver;
use script_gate_core::MetadataResolver;
use tempfile::TempDir;
use url::Url;

fn site() -> (TempDir, LocalAssetResolver) {
    let root = tempfile::tempdir().expect("tempdir");
    let content = root.path().join("wp-content");
    fs::create_dir_all(content.join("plugins/demo")).expect("plugin dir");
    fs::create_dir_all(root.path().join("wp-includes/js")).expect("includes dir");
    fs::write(content.join("plugins/demo/app.js"), b"console.log(1);").expect("plugin file");
    fs::write(root.path().join("wp-includes/js/core.js"), b"12345").expect("core file");
    let resolver = LocalAssetResolver::new(
        Url::parse("https://example.test/").expect("site url"),
        Url::parse("https://example.test/wp-content").expect("content url"),
        content,
        root.path().to_path_buf(),
    );
    (root, resolver)
}

#[test]
fn content_url_maps_under_content_dir() {
    let (_root, resolver) = site();
    let meta = resolver.resolve("https://example.test/wp-content/plugins/demo/app.js?ver=1").expect("metadata");
    assert_eq!(meta.size_bytes, 15);
    assert!(meta.modified_at.is_some());
}

#[test]
fn site_relative_paths_fall_back_to_root_dir() {
    let (_root, resolver) = site();
    let meta = resolver.resolve("https://example.test/wp-includes/js/core.js").expect("metadata");
    assert_eq!(meta.size_bytes, 5);
}

#[test]
fn foreign_origins_and_missing_files_resolve_to_nothing() {
    let (_root, resolver) = site();
    assert!(resolver.resolve("https://cdn.test/wp-includes/js/core.js").is_none());
    assert!(resolver.resolve("http://example.test/wp-includes/js/core.js").is_none());
    assert!(resolver.resolve("https://example.test/wp-includes/js/missing.js").is_none());
    assert!(resolver.resolve("https://example.test/wp-includes/js").is_none());
    assert!(resolver.resolve("not a url").is_none());
}

#[test]
fn candidate_paths_stay_under_the_site_root() {
    let (root, resolver) = site();
    for src in [
        "https://example.test/../../etc/passwd",
        "https://example.test/wp-content/%2e%2e/%2e%2e/etc/passwd",
        "https://example.test/wp-content/..%2F..%2Fetc/passwd",
    ] {
        for path in resolver.candidate_paths(src) {
            assert!(path.starts_with(root.path()), "{src} mapped to {}", path.display());
        }
        assert!(resolver.resolve(src).is_none(), "{src} resolved");
    }
}
