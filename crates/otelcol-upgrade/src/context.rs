//! Per-step upgrade context

use tracing::Span;

use crate::events::EventRecorder;
use crate::store::ResourceStore;

/// Collaborators handed to a migration step
///
/// Built fresh for every step and never persisted.
pub struct UpgradeContext<'a> {
    version: &'a str,
    target: &'a str,
    store: &'a dyn ResourceStore,
    recorder: &'a dyn EventRecorder,
    span: Span,
}

impl<'a> UpgradeContext<'a> {
    /// Create context for the step to `version`
    #[must_use]
    pub fn new(
        version: &'a str,
        target: &'a str,
        store: &'a dyn ResourceStore,
        recorder: &'a dyn EventRecorder,
    ) -> Self {
        Self {
            version,
            target,
            store,
            recorder,
            span: Span::none(),
        }
    }

    /// Attach the diagnostic span of the step
    #[inline]
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Version the step upgrades to
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        self.version
    }

    /// Last version of the walk
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        self.target
    }

    /// Store for migrations that inspect sibling objects
    #[inline]
    #[must_use]
    pub fn store(&self) -> &dyn ResourceStore {
        self.store
    }

    /// Audit sink
    #[inline]
    #[must_use]
    pub fn recorder(&self) -> &dyn EventRecorder {
        self.recorder
    }

    /// Diagnostic span of the step
    #[inline]
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl std::fmt::Debug for UpgradeContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpgradeContext")
            .field("version", &self.version)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
