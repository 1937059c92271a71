// crates/script-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Script Gate Identifiers
// Description: Validated script handle identifier.
// Purpose: Provide a strongly typed, serializable handle with a stable string form.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`ScriptHandle`] is the unique key of a script across the discovered,
//! removed, and manual catalogs and in the host asset queue. Handles are
//! validated at construction so catalogs and queues never carry empty or
//! whitespace-bearing keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum handle length in bytes.
pub const MAX_HANDLE_LENGTH: usize = 255;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Handle validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    /// Handle was empty.
    #[error("script handle must not be empty")]
    Empty,
    /// Handle exceeded [`MAX_HANDLE_LENGTH`].
    #[error("script handle exceeds {max} bytes (actual: {actual})")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length.
        actual: usize,
    },
    /// Handle contained whitespace or control characters.
    #[error("script handle contains whitespace or control characters: {0:?}")]
    InvalidCharacter(String),
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Unique script handle used as the catalog and queue key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScriptHandle(String);

impl ScriptHandle {
    /// Parses and validates a script handle.
    ///
    /// # Errors
    ///
    /// Returns [`HandleError`] when the handle is empty, too long, or contains
    /// whitespace/control characters.
    pub fn parse(raw: impl Into<String>) -> Result<Self, HandleError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(HandleError::Empty);
        }
        if raw.len() > MAX_HANDLE_LENGTH {
            return Err(HandleError::TooLong {
                max: MAX_HANDLE_LENGTH,
                actual: raw.len(),
            });
        }
        if raw.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
            return Err(HandleError::InvalidCharacter(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for ScriptHandle {
    type Error = HandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for ScriptHandle {
    type Error = HandleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ScriptHandle> for String {
    fn from(value: ScriptHandle) -> Self {
        value.0
    }
}

impl AsRef<str> for ScriptHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
