// crates/script-gate-core/src/runtime/queue.rs
// ============================================================================
// Module: Script Gate In-Memory Asset Queue
// Description: Serializable asset queue snapshot implementing AssetQueue.
// Purpose: Drive the activation pipeline without a live host.
// Dependencies: serde, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`InMemoryAssetQueue`] mirrors a host script queue: a set of registered
//! scripts plus the ordered list of enqueued handles. Registering an existing
//! handle keeps the first registration, and enqueueing twice keeps a single
//! entry, so repeated pipeline passes converge on the same state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::LoadStrategy;
use crate::core::ScriptHandle;
use crate::core::ScriptObservation;
use crate::interfaces::AssetQueue;
use crate::interfaces::ScriptRegistration;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Script registered with the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredScript {
    /// Source URL.
    pub src: String,
    /// Dependency handles.
    #[serde(default)]
    pub deps: Vec<String>,
    /// Version, when any.
    #[serde(default)]
    pub version: Option<String>,
    /// Whether the script loads in the footer.
    #[serde(default)]
    pub in_footer: bool,
    /// Loading strategy.
    #[serde(default)]
    pub strategy: LoadStrategy,
}

/// In-memory asset queue snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryAssetQueue {
    /// Registered scripts keyed by handle.
    #[serde(default)]
    pub registered: BTreeMap<String, RegisteredScript>,
    /// Enqueued handles in output order.
    #[serde(default)]
    pub enqueued: Vec<String>,
}

impl InMemoryAssetQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the handle is enqueued.
    #[must_use]
    pub fn is_enqueued(&self, handle: &ScriptHandle) -> bool {
        self.enqueued.iter().any(|queued| queued == handle.as_str())
    }

    /// Returns observations for enqueued scripts that are registered and
    /// carry a valid handle, in queue order.
    #[must_use]
    pub fn observations(&self) -> Vec<ScriptObservation> {
        self.enqueued
            .iter()
            .filter_map(|handle| {
                let script = self.registered.get(handle)?;
                let handle = ScriptHandle::parse(handle.as_str()).ok()?;
                Some(ScriptObservation {
                    handle,
                    src: script.src.clone(),
                    version: script.version.clone(),
                    deps: script.deps.clone(),
                    in_footer: script.in_footer,
                    strategy: script.strategy,
                })
            })
            .collect()
    }
}

impl AssetQueue for InMemoryAssetQueue {
    fn has(&self, handle: &ScriptHandle) -> bool {
        self.registered.contains_key(handle.as_str()) || self.is_enqueued(handle)
    }

    fn remove(&mut self, handle: &ScriptHandle) {
        self.enqueued.retain(|queued| queued != handle.as_str());
        self.registered.remove(handle.as_str());
    }

    fn register(&mut self, handle: &ScriptHandle, registration: ScriptRegistration<'_>) {
        self.registered.entry(handle.to_string()).or_insert_with(|| RegisteredScript {
            src: registration.src.to_string(),
            deps: registration.deps.to_vec(),
            version: registration.version.map(str::to_string),
            in_footer: registration.in_footer,
            strategy: LoadStrategy::None,
        });
    }

    fn enqueue(&mut self, handle: &ScriptHandle) {
        if !self.is_enqueued(handle) {
            self.enqueued.push(handle.to_string());
        }
    }

    fn set_strategy(&mut self, handle: &ScriptHandle, strategy: LoadStrategy) {
        if let Some(script) = self.registered.get_mut(handle.as_str()) {
            script.strategy = strategy;
        }
    }
}
