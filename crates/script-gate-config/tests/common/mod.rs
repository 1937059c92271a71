// crates/script-gate-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for script-gate-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::PathBuf;

use script_gate_config::ConfigError;
use script_gate_config::ScriptGateConfig;
use tempfile::TempDir;

pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `ScriptGateConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<ScriptGateConfig, String> {
    toml::from_str(toml_str).map_err(|err: toml::de::Error| err.to_string())
}

/// Writes `contents` to a config file inside a fresh temp dir.
pub fn write_config(contents: &[u8]) -> Result<(TempDir, PathBuf), String> {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("script-gate.toml");
    std::fs::write(&path, contents).map_err(|err| err.to_string())?;
    Ok((dir, path))
}

/// Asserts that a validation result failed with a message containing `needle`.
pub fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}
