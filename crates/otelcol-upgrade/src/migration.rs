//! Migration contract
//!
//! A migration rewrites one collector from the previous registered version to
//! its own. Every migration must be idempotent: applied to a collector that is
//! already in the migrated shape it changes nothing and reports nothing.
//! Missing optional structure is never an error.

use async_trait::async_trait;
use otelcol_api::Collector;

use crate::context::UpgradeContext;
use crate::error::UpgradeError;

/// Version-specific transform
///
/// The coordinator hands every call a scratch copy, so edits made before an
/// error are discarded.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Rewrite `collector` and describe what changed
    async fn apply(
        &self,
        ctx: &UpgradeContext<'_>,
        collector: &mut Collector,
    ) -> Result<Changes, UpgradeError>;
}

/// Pure transform: rewrites the collector and records change descriptions
pub type Transform = fn(&mut Collector, &mut Changes) -> Result<(), UpgradeError>;

/// [`Migration`] backed by a pure [`Transform`]
#[derive(Debug, Clone, Copy)]
pub struct FnMigration(Transform);

impl FnMigration {
    /// Wrap a transform
    #[inline]
    #[must_use]
    pub const fn new(transform: Transform) -> Self {
        Self(transform)
    }

    /// Run the transform without a context
    ///
    /// # Errors
    /// Propagates the transform's error.
    pub fn run(&self, collector: &mut Collector) -> Result<Changes, UpgradeError> {
        let mut changes = Changes::new();
        (self.0)(collector, &mut changes)?;
        Ok(changes)
    }
}

#[async_trait]
impl Migration for FnMigration {
    async fn apply(
        &self,
        _ctx: &UpgradeContext<'_>,
        collector: &mut Collector,
    ) -> Result<Changes, UpgradeError> {
        self.run(collector)
    }
}

/// Human-readable change descriptions produced by a step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes(Vec<String>);

impl Changes {
    /// Create empty list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change
    #[inline]
    pub fn push(&mut self, description: impl Into<String>) {
        self.0.push(description.into());
    }

    /// Check if nothing changed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of changes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate descriptions
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Consume into descriptions
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl IntoIterator for Changes {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
