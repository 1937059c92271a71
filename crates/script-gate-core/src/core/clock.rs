// crates/script-gate-core/src/core/clock.rs
// ============================================================================
// Module: Script Gate Clock
// Description: Wall-clock helpers for catalog timestamps.
// Purpose: Keep clock access at the edges; runtime operations take `now`.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Catalog timestamps are unix seconds. Runtime operations accept `now` as an
//! argument so tests stay deterministic; hosts obtain it from [`unix_now`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Returns the current time in unix seconds.
#[must_use]
pub fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
