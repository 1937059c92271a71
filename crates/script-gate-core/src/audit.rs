// crates/script-gate-core/src/audit.rs
// ============================================================================
// Module: Script Gate Audit Logging
// Description: Structured audit events for catalog and queue mutations.
// Purpose: Emit JSON-line audit records without a logging framework dependency.
// Dependencies: serde, serde_json, crate::core
// ============================================================================

//! ## Overview
//! Runtime components report queue mutations, skipped records, discoveries,
//! and catalog transitions through an [`AuditSink`]. Sinks are best-effort:
//! write failures never affect the operation being audited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::CatalogKind;

// ============================================================================
// SECTION: Event Names
// ============================================================================

/// A removed-catalog script was dequeued.
pub const EVENT_SCRIPT_REMOVED: &str = "script_removed";
/// A manual script was registered and enqueued.
pub const EVENT_SCRIPT_INJECTED: &str = "script_injected";
/// A manual record was skipped because it is unusable.
pub const EVENT_MANUAL_SCRIPT_SKIPPED: &str = "manual_script_skipped";
/// A stored catalog entry failed to decode.
pub const EVENT_CATALOG_RECORD_REJECTED: &str = "catalog_record_rejected";
/// A new script was recorded in the discovered catalog.
pub const EVENT_SCRIPT_DISCOVERED: &str = "script_discovered";
/// An administrative catalog operation changed a record.
pub const EVENT_CATALOG_TRANSITION: &str = "catalog_transition";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Activation audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Catalog the event concerns, when any.
    pub catalog: Option<CatalogKind>,
    /// Script handle or raw stored key.
    pub handle: String,
    /// Operation or failure detail.
    pub detail: Option<String>,
}

/// Inputs required to construct an audit event.
pub struct ActivationAuditEventParams {
    /// Event identifier.
    pub event: &'static str,
    /// Catalog the event concerns, when any.
    pub catalog: Option<CatalogKind>,
    /// Script handle or raw stored key.
    pub handle: String,
    /// Operation or failure detail.
    pub detail: Option<String>,
}

impl ActivationAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ActivationAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: params.event,
            timestamp_ms,
            catalog: params.catalog,
            handle: params.handle,
            detail: params.detail,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for activation events.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &ActivationAuditEvent);
}

/// Records an event built from its parts.
pub(crate) fn emit(
    sink: &dyn AuditSink,
    event: &'static str,
    catalog: Option<CatalogKind>,
    handle: impl Into<String>,
    detail: Option<String>,
) {
    sink.record(&ActivationAuditEvent::new(ActivationAuditEventParams {
        event,
        catalog,
        handle: handle.into(),
        detail,
    }));
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &ActivationAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &ActivationAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &ActivationAuditEvent) {}
}
