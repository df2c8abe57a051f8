//! Audit events
//!
//! Recording is fire-and-forget: a recorder never fails and never influences
//! the outcome of an upgrade.

use std::fmt;

use chrono::{DateTime, Utc};
use otelcol_api::ObjectRef;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reason code carried by every upgrade event
pub const REASON_UPGRADE: &str = "Upgrade";

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Best-effort structural rewrite
    Normal,
    /// Step stopped for manual intervention
    Warning,
    /// Resource could not be upgraded
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Normal => "Normal",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        })
    }
}

/// Audit event about a collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier
    pub id: Uuid,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Object the event is about
    pub object: ObjectRef,
    /// Severity
    pub severity: Severity,
    /// Machine-readable reason code
    pub reason: String,
    /// Human-readable description
    pub message: String,
}

impl Event {
    /// Create event stamped now
    #[must_use]
    pub fn new(
        object: ObjectRef,
        severity: Severity,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            object,
            severity,
            reason: reason.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.severity, self.reason, self.object, self.message
        )
    }
}

/// Audit sink
pub trait EventRecorder: Send + Sync {
    /// Record an event
    fn record(&self, event: Event);

    /// Record an event built from its parts
    fn event(&self, object: &ObjectRef, severity: Severity, reason: &str, message: &str) {
        self.record(Event::new(object.clone(), severity, reason, message));
    }
}

/// Recorder that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl EventRecorder for NoopRecorder {
    #[inline]
    fn record(&self, _event: Event) {}
}

/// In-memory append-only event log
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    inner: Mutex<Vec<Event>>,
}

impl MemoryRecorder {
    /// Create empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.inner.lock().clone()
    }

    /// Messages of recorded events with `severity`
    #[must_use]
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.inner
            .lock()
            .iter()
            .filter(|e| e.severity == severity)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Number of recorded events
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if nothing was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drain recorded events
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.inner.lock())
    }
}

impl EventRecorder for MemoryRecorder {
    fn record(&self, event: Event) {
        self.inner.lock().push(event);
    }
}

/// Recorder that writes events as log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRecorder;

impl EventRecorder for TracingRecorder {
    fn record(&self, event: Event) {
        match event.severity {
            Severity::Normal => tracing::info!(
                object = %event.object,
                reason = %event.reason,
                "{}",
                event.message
            ),
            Severity::Warning => tracing::warn!(
                object = %event.object,
                reason = %event.reason,
                "{}",
                event.message
            ),
            Severity::Error => tracing::error!(
                object = %event.object,
                reason = %event.reason,
                "{}",
                event.message
            ),
        }
    }
}
