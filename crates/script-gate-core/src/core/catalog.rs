// crates/script-gate-core/src/core/catalog.rs
// ============================================================================
// Module: Script Gate Catalogs
// Description: Typed handle-keyed catalogs decoded from persisted JSON.
// Purpose: Decode catalogs record-by-record without losing undecodable entries.
// Dependencies: serde, serde_json, thiserror, crate::core::identifiers
// ============================================================================

//! ## Overview
//! A catalog is persisted as one JSON object keyed by script handle. Decoding
//! is per record: entries whose handle or body cannot be decoded are kept as
//! raw JSON in [`Catalog::rejected`] and written back unchanged, so one bad
//! record never hides the rest of the catalog. A payload that is not an
//! object at all is reported as corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::ScriptHandle;
use crate::core::rules::json_kind;

// ============================================================================
// SECTION: Catalog Kinds
// ============================================================================

/// Persisted catalog collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// Scripts seen on the site and not yet managed.
    Discovered,
    /// Scripts to remove from the queue when their rules match.
    Removed,
    /// Operator-added scripts to inject when their rules match.
    Manual,
}

impl CatalogKind {
    /// All catalog kinds in storage order.
    pub const ALL: [Self; 3] = [Self::Discovered, Self::Removed, Self::Manual];

    /// Returns the storage key for the catalog.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Removed => "removed",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalogs whose records carry activation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagedCatalog {
    /// Removed catalog.
    Removed,
    /// Manual catalog.
    Manual,
}

impl ManagedCatalog {
    /// Returns the underlying catalog kind.
    #[must_use]
    pub const fn kind(self) -> CatalogKind {
        match self {
            Self::Removed => CatalogKind::Removed,
            Self::Manual => CatalogKind::Manual,
        }
    }
}

impl fmt::Display for ManagedCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog decoding and encoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Payload was not a JSON object.
    #[error("catalog payload must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    /// A record failed to encode.
    #[error("catalog record {handle} failed to encode: {reason}")]
    Encode {
        /// Record handle.
        handle: String,
        /// Encoder error.
        reason: String,
    },
}

/// Raw entry that failed to decode.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEntry {
    /// Raw JSON value as stored.
    pub raw: Value,
    /// Decode failure reason.
    pub reason: String,
}

/// Entry taken out of a catalog, decoded or not.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntry<R> {
    /// Record that decoded cleanly.
    Decoded(R),
    /// Raw entry that failed to decode.
    Rejected(RejectedEntry),
}

impl<R> CatalogEntry<R> {
    /// Returns the decoded record, if any.
    #[must_use]
    pub fn decoded(self) -> Option<R> {
        match self {
            Self::Decoded(record) => Some(record),
            Self::Rejected(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Handle-keyed catalog of typed records.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog<R> {
    /// Decoded records.
    entries: BTreeMap<ScriptHandle, R>,
    /// Raw entries that failed to decode, keyed by their stored key.
    rejected: BTreeMap<String, RejectedEntry>,
}

impl<R> Default for Catalog<R> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            rejected: BTreeMap::new(),
        }
    }
}

impl<R> Catalog<R> {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a decoded record.
    #[must_use]
    pub fn get(&self, handle: &ScriptHandle) -> Option<&R> {
        self.entries.get(handle)
    }

    /// Returns a decoded record for mutation.
    pub fn get_mut(&mut self, handle: &ScriptHandle) -> Option<&mut R> {
        self.entries.get_mut(handle)
    }

    /// Returns true when the key is present, decoded or rejected.
    #[must_use]
    pub fn contains(&self, handle: &ScriptHandle) -> bool {
        self.entries.contains_key(handle) || self.rejected.contains_key(handle.as_str())
    }

    /// Inserts a record, replacing any decoded or rejected entry at the key.
    pub fn insert(&mut self, handle: ScriptHandle, record: R) -> Option<R> {
        self.rejected.remove(handle.as_str());
        self.entries.insert(handle, record)
    }

    /// Removes a decoded record.
    pub fn remove(&mut self, handle: &ScriptHandle) -> Option<R> {
        self.entries.remove(handle)
    }

    /// Removes the entry at the key, whether decoded or rejected.
    pub fn take(&mut self, handle: &ScriptHandle) -> Option<CatalogEntry<R>> {
        if let Some(record) = self.entries.remove(handle) {
            return Some(CatalogEntry::Decoded(record));
        }
        self.rejected.remove(handle.as_str()).map(CatalogEntry::Rejected)
    }

    /// Returns the number of decoded records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no decoded or rejected entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.rejected.is_empty()
    }

    /// Iterates decoded records in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (&ScriptHandle, &R)> {
        self.entries.iter()
    }

    /// Iterates rejected entries in key order.
    pub fn rejected(&self) -> impl Iterator<Item = (&str, &RejectedEntry)> {
        self.rejected.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Drops every decoded and rejected entry, returning the count removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len() + self.rejected.len();
        self.entries.clear();
        self.rejected.clear();
        removed
    }
}

impl<R> Catalog<R>
where
    R: Serialize + DeserializeOwned,
{
    /// Decodes a catalog; a missing payload is an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotAnObject`] when the payload is not an object.
    pub fn decode(payload: Option<&Value>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        let map = match payload {
            None | Some(Value::Null) => return Ok(catalog),
            Some(Value::Array(items)) if items.is_empty() => return Ok(catalog),
            Some(Value::Object(map)) => map,
            Some(other) => return Err(CatalogError::NotAnObject(json_kind(other))),
        };
        for (key, raw) in map {
            let handle = match ScriptHandle::parse(key.as_str()) {
                Ok(handle) => handle,
                Err(err) => {
                    catalog.reject(key.clone(), raw.clone(), err.to_string());
                    continue;
                }
            };
            match serde_json::from_value::<R>(raw.clone()) {
                Ok(record) => {
                    catalog.entries.insert(handle, record);
                }
                Err(err) => catalog.reject(key.clone(), raw.clone(), err.to_string()),
            }
        }
        Ok(catalog)
    }

    /// Encodes the catalog, re-emitting rejected entries verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Encode`] when a record fails to serialize.
    pub fn encode(&self) -> Result<Value, CatalogError> {
        let mut merged: BTreeMap<&str, Value> = BTreeMap::new();
        for (handle, record) in &self.entries {
            let value = serde_json::to_value(record).map_err(|err| CatalogError::Encode {
                handle: handle.to_string(),
                reason: err.to_string(),
            })?;
            merged.insert(handle.as_str(), value);
        }
        for (key, entry) in &self.rejected {
            merged.entry(key.as_str()).or_insert_with(|| entry.raw.clone());
        }
        let map: Map<String, Value> =
            merged.into_iter().map(|(key, value)| (key.to_string(), value)).collect();
        Ok(Value::Object(map))
    }

    /// Records a raw entry that failed to decode.
    fn reject(&mut self, key: String, raw: Value, reason: String) {
        self.rejected.insert(
            key,
            RejectedEntry {
                raw,
                reason,
            },
        );
    }
}
