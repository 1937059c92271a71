// crates/script-gate-cli/src/lib.rs
// ============================================================================
// Module: Script Gate CLI Library
// Description: Shared helpers for the Script Gate command-line interface.
// Purpose: Provide reusable components (i18n) for the CLI binary and tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This library module houses shared CLI utilities, including the message
//! catalog. The binary entry point (`src/main.rs`) imports these helpers to
//! keep all user-facing output consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and translation helpers.
pub mod i18n;
