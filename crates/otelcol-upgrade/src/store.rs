//! Resource store contract and in-memory implementation

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use otelcol_api::{Collector, ObjectRef};
use parking_lot::RwLock;

use crate::error::StoreError;

/// Store of collector resources with optimistic concurrency
///
/// Writes carry the `resourceVersion` they were read at and fail with
/// [`StoreError::Conflict`] when the stored object moved on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// List resources carrying every label in `selector`
    async fn list(&self, selector: &BTreeMap<String, String>) -> Result<Vec<Collector>, StoreError>;

    /// Fetch a single resource
    async fn get(&self, object: &ObjectRef) -> Result<Collector, StoreError>;

    /// Replace metadata and spec; the stored status is kept
    async fn update(&self, collector: &Collector) -> Result<Collector, StoreError>;

    /// Replace status; metadata and spec are kept
    async fn update_status(&self, collector: &Collector) -> Result<Collector, StoreError>;
}

/// Store keeping resources in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: RwLock<HashMap<ObjectRef, Collector>>,
    revision: RwLock<u64>,
}

impl InMemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store holding `collectors`
    #[must_use]
    pub fn with_collectors(collectors: impl IntoIterator<Item = Collector>) -> Self {
        let store = Self::new();
        for collector in collectors {
            store.insert(collector);
        }
        store
    }

    /// Insert or replace a resource, assigning a fresh revision
    pub fn insert(&self, mut collector: Collector) -> Collector {
        collector.metadata.resource_version = self.next_revision();
        self.objects
            .write()
            .insert(collector.object_ref(), collector.clone());
        collector
    }

    /// Snapshot of all resources sorted by namespace and name
    #[must_use]
    pub fn snapshot(&self) -> Vec<Collector> {
        let mut items: Vec<Collector> = self.objects.read().values().cloned().collect();
        items.sort_by(|a, b| {
            (&a.metadata.namespace, &a.metadata.name).cmp(&(&b.metadata.namespace, &b.metadata.name))
        });
        items
    }

    /// Number of stored resources
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Check if the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    fn next_revision(&self) -> String {
        let mut revision = self.revision.write();
        *revision += 1;
        revision.to_string()
    }

    fn write(
        &self,
        collector: &Collector,
        apply: impl FnOnce(&mut Collector, &Collector),
    ) -> Result<Collector, StoreError> {
        let object = collector.object_ref();
        let mut objects = self.objects.write();
        let stored = objects
            .get_mut(&object)
            .ok_or_else(|| StoreError::NotFound(object.clone()))?;
        if stored.metadata.resource_version != collector.metadata.resource_version {
            return Err(StoreError::Conflict {
                object,
                expected: collector.metadata.resource_version.clone(),
                actual: stored.metadata.resource_version.clone(),
            });
        }
        apply(stored, collector);
        stored.metadata.resource_version = self.next_revision();
        Ok(stored.clone())
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn list(&self, selector: &BTreeMap<String, String>) -> Result<Vec<Collector>, StoreError> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|c| c.matches_labels(selector))
            .collect())
    }

    async fn get(&self, object: &ObjectRef) -> Result<Collector, StoreError> {
        self.objects
            .read()
            .get(object)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(object.clone()))
    }

    async fn update(&self, collector: &Collector) -> Result<Collector, StoreError> {
        self.write(collector, |stored, incoming| {
            stored.metadata = incoming.metadata.clone();
            stored.spec = incoming.spec.clone();
        })
    }

    async fn update_status(&self, collector: &Collector) -> Result<Collector, StoreError> {
        self.write(collector, |stored, incoming| {
            stored.status = incoming.status.clone();
        })
    }
}
