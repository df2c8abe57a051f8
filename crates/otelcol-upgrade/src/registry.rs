//! Version registry
//!
//! Provides [`VersionRegistry`], the ordered chain of upgrade steps. The chain
//! is an array of nodes plus a tag index: walking forward from a tag is a
//! slice of the nodes after it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::migration::{FnMigration, Migration, Transform};
use crate::versions;

/// One registered version and the migration that reaches it
#[derive(Clone)]
pub struct VersionNode {
    tag: String,
    migration: Arc<dyn Migration>,
}

impl VersionNode {
    /// Create node from a migration
    #[must_use]
    pub fn new(tag: impl Into<String>, migration: Arc<dyn Migration>) -> Self {
        Self {
            tag: tag.into(),
            migration,
        }
    }

    /// Create node from a pure transform
    #[must_use]
    pub fn from_fn(tag: impl Into<String>, transform: Transform) -> Self {
        Self::new(tag, Arc::new(FnMigration::new(transform)))
    }

    /// Version tag
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Migration reaching this version
    #[inline]
    #[must_use]
    pub fn migration(&self) -> &dyn Migration {
        self.migration.as_ref()
    }
}

impl fmt::Debug for VersionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionNode").field("tag", &self.tag).finish()
    }
}

/// Immutable ordered chain of versions
#[derive(Debug, Clone)]
pub struct VersionRegistry {
    nodes: Vec<VersionNode>,
    index: HashMap<String, usize>,
}

impl VersionRegistry {
    /// Build from a literal ordered table
    ///
    /// # Errors
    /// Returns error if the table is empty or registers a tag twice
    pub fn new(table: Vec<VersionNode>) -> Result<Self, RegistryError> {
        if table.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut index = HashMap::with_capacity(table.len());
        for (position, node) in table.iter().enumerate() {
            if index.insert(node.tag.clone(), position).is_some() {
                return Err(RegistryError::DuplicateTag(node.tag.clone()));
            }
        }
        Ok(Self {
            nodes: table,
            index,
        })
    }

    /// Create registry with the built-in version chain
    ///
    /// # Errors
    /// Returns error if the built-in table is invalid
    pub fn with_defaults() -> Result<Self, RegistryError> {
        Self::new(versions::default_chain())
    }

    /// Look up a registered version
    #[inline]
    #[must_use]
    pub fn lookup(&self, tag: &str) -> Option<&VersionNode> {
        self.position(tag).map(|i| &self.nodes[i])
    }

    /// Position of a version in the chain
    #[inline]
    #[must_use]
    pub fn position(&self, tag: &str) -> Option<usize> {
        self.index.get(tag).copied()
    }

    /// Nodes after `tag` up to and including the latest
    ///
    /// Returns `None` when `tag` is not registered.
    #[must_use]
    pub fn successors(&self, tag: &str) -> Option<&[VersionNode]> {
        self.position(tag).map(|i| &self.nodes[i + 1..])
    }

    /// Nodes after `from` up to and including `to`
    ///
    /// Returns `None` when either tag is not registered. The walk is empty
    /// when `to` does not come after `from`.
    #[must_use]
    pub fn walk(&self, from: &str, to: &str) -> Option<&[VersionNode]> {
        let start = self.position(from)? + 1;
        let end = self.position(to)? + 1;
        Some(if start < end {
            &self.nodes[start..end]
        } else {
            &[]
        })
    }

    /// Terminal node
    #[inline]
    #[must_use]
    pub fn latest(&self) -> &VersionNode {
        &self.nodes[self.nodes.len() - 1]
    }

    /// Registered tags in chain order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(VersionNode::tag)
    }

    /// Number of registered versions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: construction rejects empty tables
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::Changes;
    use crate::UpgradeError;
    use otelcol_api::Collector;

    fn noop(_: &mut Collector, _: &mut Changes) -> Result<(), UpgradeError> {
        Ok(())
    }

    fn table(tags: &[&str]) -> Vec<VersionNode> {
        tags.iter().map(|tag| VersionNode::from_fn(*tag, noop)).collect()
    }

    #[test]
    fn rejects_empty_and_duplicate_tables() {
        assert_eq!(VersionRegistry::new(Vec::new()).unwrap_err(), RegistryError::Empty);
        assert_eq!(
            VersionRegistry::new(table(&["1", "2", "1"])).unwrap_err(),
            RegistryError::DuplicateTag("1".into())
        );
    }

    #[test]
    fn successors_start_after_tag() {
        let registry = VersionRegistry::new(table(&["a", "b", "c"])).unwrap();
        let walk: Vec<_> = registry.successors("a").unwrap().iter().map(VersionNode::tag).collect();
        assert_eq!(walk, vec!["b", "c"]);
        assert!(registry.successors("c").unwrap().is_empty());
        assert!(registry.successors("z").is_none());
        assert_eq!(registry.latest().tag(), "c");
    }

    #[test]
    fn walk_is_bounded_by_target() {
        let registry = VersionRegistry::new(table(&["a", "b", "c", "d"])).unwrap();
        let walk: Vec<_> = registry.walk("a", "c").unwrap().iter().map(VersionNode::tag).collect();
        assert_eq!(walk, vec!["b", "c"]);
        assert!(registry.walk("c", "b").unwrap().is_empty());
        assert!(registry.walk("a", "z").is_none());
    }

    #[test]
    fn tags_are_opaque() {
        // not lexically sortable
        let registry = VersionRegistry::new(table(&["0.9.0", "0.10.0", "0.2.0-beta"])).unwrap();
        assert_eq!(registry.tags().collect::<Vec<_>>(), vec!["0.9.0", "0.10.0", "0.2.0-beta"]);
    }

    #[test]
    fn default_chain_is_valid() {
        let registry = VersionRegistry::with_defaults().unwrap();
        assert_eq!(registry.len(), 20);
        assert_eq!(registry.tags().next(), Some("0.2.10"));
        assert_eq!(registry.latest().tag(), "0.145.0");
    }
}
