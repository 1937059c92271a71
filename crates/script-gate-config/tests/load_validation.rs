//! Load validation tests for script-gate-config.
// crates/script-gate-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: File size, encoding, and parse failures during load.
// Purpose: Ensure configuration loading fails closed.
// =============================================================================

use std::path::PathBuf;

use script_gate_config::ConfigError;
use script_gate_config::MAX_CONFIG_FILE_SIZE;
use script_gate_config::ScriptGateConfig;
use script_gate_config::StoreType;

mod common;

use common::TestResult;
use common::write_config;

#[test]
fn empty_file_loads_defaults() -> TestResult {
    let (_dir, path) = write_config(b"")?;
    let config = ScriptGateConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.store.store_type != StoreType::Memory {
        return Err("expected memory store by default".to_string());
    }
    if !config.discovery.enabled || config.discovery.resolve_local_metadata {
        return Err("unexpected discovery defaults".to_string());
    }
    if config.audit.enabled {
        return Err("audit should default to disabled".to_string());
    }
    if config.source_path.as_deref() != Some(path.as_path()) {
        return Err("source path not recorded".to_string());
    }
    Ok(())
}

#[test]
fn full_file_loads_every_section() -> TestResult {
    let contents = br#"
[site]
site_url = "https://example.test"
content_url = "https://example.test/wp-content"
content_dir = "/srv/site/wp-content"
root_dir = "/srv/site"

[store]
type = "sqlite"
path = "data/catalogs.db"
busy_timeout_ms = 250
journal_mode = "delete"
sync_mode = "normal"

[predicates]
allowlist = ["is_frontend", "is_singular"]
denylist = ["current_user_can"]

[audit]
enabled = true
path = "logs/audit.jsonl"

[discovery]
resolve_local_metadata = true
"#;
    let (_dir, path) = write_config(contents)?;
    let config = ScriptGateConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    let sqlite = config.store.sqlite_config().ok_or("expected sqlite config")?;
    if sqlite.path != PathBuf::from("data/catalogs.db") || sqlite.busy_timeout_ms != 250 {
        return Err(format!("unexpected sqlite config: {sqlite:?}"));
    }
    let policy = config.predicates.policy();
    if !policy.is_allowed("is_singular") || policy.is_allowed("current_user_can") || policy.is_allowed("is_home") {
        return Err("predicate policy not applied".to_string());
    }
    let resolver = config.metadata_resolver().map_err(|err| err.to_string())?;
    if resolver.is_none() {
        return Err("expected a metadata resolver".to_string());
    }
    Ok(())
}

#[test]
fn missing_file_is_io_error() -> TestResult {
    let (dir, _path) = write_config(b"")?;
    let missing = dir.path().join("absent.toml");
    match ScriptGateConfig::load(Some(&missing)) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn oversized_file_is_rejected() -> TestResult {
    let mut contents = b"# ".to_vec();
    contents.resize(MAX_CONFIG_FILE_SIZE + 1, b'a');
    let (_dir, path) = write_config(&contents)?;
    common::assert_invalid(ScriptGateConfig::load(Some(&path)).map(|_| ()), "exceeds size limit")
}

#[test]
fn non_utf8_file_is_rejected() -> TestResult {
    let (_dir, path) = write_config(&[0xff, 0xfe, 0x00])?;
    common::assert_invalid(ScriptGateConfig::load(Some(&path)).map(|_| ()), "utf-8")
}

#[test]
fn malformed_toml_is_parse_error() -> TestResult {
    let (_dir, path) = write_config(b"[store\ntype = ")?;
    match ScriptGateConfig::load(Some(&path)) {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn unknown_store_type_is_parse_error() -> TestResult {
    let (_dir, path) = write_config(b"[store]\ntype = \"redis\"\n")?;
    match ScriptGateConfig::load(Some(&path)) {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn overlong_config_path_is_rejected() -> TestResult {
    let path = PathBuf::from(format!("./{}.toml", "a".repeat(300)));
    common::assert_invalid(ScriptGateConfig::load(Some(&path)).map(|_| ()), "component too long")
}
