//! Error types for the upgrade engine
//!
//! Classification follows how a failure should be handled by the caller:
//! - Malformed configuration: retried on the next reconcile from the same version
//! - Manual intervention: the chain cannot proceed until an operator fixes the resource
//! - Store conflict: surfaced unchanged, no in-engine retry

use otelcol_api::{Collector, ConfigError, ObjectRef};

/// Error raised by a migration step or the coordinator
#[derive(Debug, thiserror::Error)]
pub enum UpgradeError {
    /// Configuration tree has an unexpected shape
    #[error("malformed configuration: {0}")]
    MalformedConfig(#[source] ConfigError),

    /// Feature cannot be migrated automatically
    #[error("automated update of {component} not possible: {reason}")]
    ManualIntervention {
        /// Offending component or field
        component: String,
        /// Operator-facing explanation
        reason: String,
    },

    /// Resource store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Recorded version is not registered
    #[error("unknown version {0:?}")]
    UnknownVersion(String),

    /// Requested target version is not registered
    #[error("unknown target version {0:?}")]
    UnknownTarget(String),
}

impl UpgradeError {
    /// Create manual intervention error
    #[inline]
    pub fn manual_intervention(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ManualIntervention {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// Check if a later reconcile may succeed without operator action
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::MalformedConfig(_) => true,
            Self::Store(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Check if an operator must change the resource
    #[inline]
    #[must_use]
    pub fn requires_manual_intervention(&self) -> bool {
        matches!(self, Self::ManualIntervention { .. })
    }

    /// Check if the error is an optimistic-concurrency conflict
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_conflict())
    }
}

impl From<ConfigError> for UpgradeError {
    /// Name collisions need an operator; other tree errors are malformed input
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NameCollision { section, from, to } => Self::manual_intervention(
                format!("{section} {from}"),
                format!("cannot be renamed to {to}, which is already defined; merge or remove one of them"),
            ),
            err => Self::MalformedConfig(err),
        }
    }
}

/// Resource store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Object does not exist
    #[error("{0} not found")]
    NotFound(ObjectRef),

    /// Object changed since it was read
    #[error("conflict on {object}: expected revision {expected:?}, found {actual:?}")]
    Conflict {
        /// Object written
        object: ObjectRef,
        /// Revision carried by the write
        expected: String,
        /// Revision held by the store
        actual: String,
    },

    /// Backend failure
    #[error("backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Check if the error is an optimistic-concurrency conflict
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Backend(_))
    }
}

/// Version table errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Table has no entries
    #[error("version table is empty")]
    Empty,

    /// Tag registered twice
    #[error("duplicate version tag {0:?}")]
    DuplicateTag(String),
}

/// Single-resource upgrade failure
///
/// Carries the resource as of the last successful step.
#[derive(Debug, thiserror::Error)]
#[error("couldn't upgrade {} to v{version}: {error}", .collector.object_ref())]
pub struct UpgradeFailure {
    /// Partially-migrated resource
    pub collector: Box<Collector>,
    /// Version whose step failed
    pub version: String,
    /// Underlying error
    #[source]
    pub error: UpgradeError,
}

impl UpgradeFailure {
    /// Create failure
    #[inline]
    pub fn new(collector: Collector, version: impl Into<String>, error: UpgradeError) -> Self {
        Self {
            collector: Box::new(collector),
            version: version.into(),
            error,
        }
    }

    /// Resource as of the last successful step
    #[inline]
    #[must_use]
    pub fn into_collector(self) -> Collector {
        *self.collector
    }
}
