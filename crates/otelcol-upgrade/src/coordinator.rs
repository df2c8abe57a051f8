//! Upgrade coordinator
//!
//! [`VersionUpgrade`] walks the version chain for one resource
//! ([`VersionUpgrade::managed_instance`]) or for every managed resource in the
//! store ([`VersionUpgrade::managed_instances`]).
//!
//! A single-resource upgrade is an in-memory fold over the chain: each step
//! runs on a scratch copy which replaces the resource only when the step
//! succeeds. The fleet-wide pass isolates failures per resource and persists
//! the body before the status.

use std::sync::Arc;

use otelcol_api::{Collector, ManagementState, ObjectRef, UpgradeStrategy};
use tracing::{debug, error, info, warn, Instrument};

use crate::config::UpgradeConfig;
use crate::context::UpgradeContext;
use crate::error::{StoreError, UpgradeError, UpgradeFailure};
use crate::events::{EventRecorder, Severity, REASON_UPGRADE};
use crate::migration::Changes;
use crate::registry::VersionRegistry;
use crate::store::ResourceStore;

/// Audit message for a resource the fleet-wide pass could not upgrade
pub const FAILURE_MESSAGE: &str = "automated update not possible. Configuration must be corrected manually and CR instance must be re-created.";

/// Upgrade coordinator
pub struct VersionUpgrade {
    registry: Arc<VersionRegistry>,
    store: Arc<dyn ResourceStore>,
    recorder: Arc<dyn EventRecorder>,
    config: UpgradeConfig,
}

impl VersionUpgrade {
    /// Create coordinator with default configuration
    #[must_use]
    pub fn new(
        registry: Arc<VersionRegistry>,
        store: Arc<dyn ResourceStore>,
        recorder: Arc<dyn EventRecorder>,
    ) -> Self {
        Self {
            registry,
            store,
            recorder,
            config: UpgradeConfig::default(),
        }
    }

    /// With configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: UpgradeConfig) -> Self {
        self.config = config;
        self
    }

    /// Registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &UpgradeConfig {
        &self.config
    }

    /// Upgrade one resource to the latest registered version
    ///
    /// # Errors
    /// Returns the resource as of the last successful step together with the
    /// error of the failing step.
    pub async fn managed_instance(&self, collector: Collector) -> Result<Collector, UpgradeFailure> {
        self.upgrade(collector, self.registry.latest().tag()).await
    }

    /// Upgrade one resource up to and including `target`
    ///
    /// # Errors
    /// Returns [`UpgradeError::UnknownTarget`] for an unregistered target,
    /// otherwise as [`VersionUpgrade::managed_instance`].
    pub async fn managed_instance_to(
        &self,
        collector: Collector,
        target: &str,
    ) -> Result<Collector, UpgradeFailure> {
        if self.registry.lookup(target).is_none() {
            return Err(UpgradeFailure::new(
                collector,
                target,
                UpgradeError::UnknownTarget(target.to_string()),
            ));
        }
        self.upgrade(collector, target).await
    }

    async fn upgrade(&self, mut collector: Collector, target: &str) -> Result<Collector, UpgradeFailure> {
        let object = collector.object_ref();
        let current = collector.status.version.clone();

        if current.is_empty() {
            debug!(
                name = %object.name,
                namespace = %object.namespace,
                "no recorded version, assuming instance is up to date"
            );
            return Ok(collector);
        }

        let Some(walk) = self.registry.walk(&current, target) else {
            if self.config.strict_versions {
                return Err(UpgradeFailure::new(
                    collector,
                    current.clone(),
                    UpgradeError::UnknownVersion(current),
                ));
            }
            warn!(
                name = %object.name,
                namespace = %object.namespace,
                version = %current,
                "recorded version is not registered, skipping upgrade"
            );
            return Ok(collector);
        };

        for node in walk {
            let span = tracing::debug_span!(
                "upgrade_step",
                name = %object.name,
                namespace = %object.namespace,
                version = node.tag()
            );
            let ctx = UpgradeContext::new(
                node.tag(),
                target,
                self.store.as_ref(),
                self.recorder.as_ref(),
            )
            .with_span(span.clone());

            let mut scratch = collector.clone();
            let result = node
                .migration()
                .apply(&ctx, &mut scratch)
                .instrument(span.clone())
                .await;

            match result {
                Ok(changes) => {
                    scratch.status.version = node.tag().to_string();
                    self.report(&object, &mut scratch, changes);
                    debug!(parent: &span, "step upgrade");
                    collector = scratch;
                }
                Err(err) => {
                    if err.requires_manual_intervention() {
                        self.recorder.event(
                            &object,
                            Severity::Warning,
                            REASON_UPGRADE,
                            &err.to_string(),
                        );
                    }
                    error!(
                        name = %object.name,
                        namespace = %object.namespace,
                        version = node.tag(),
                        error = %err,
                        "failed to upgrade managed instance"
                    );
                    return Err(UpgradeFailure::new(collector, node.tag(), err));
                }
            }
        }

        self.warn_dangling(&object, &collector);
        debug!(
            name = %object.name,
            namespace = %object.namespace,
            version = %collector.status.version,
            "final version"
        );
        Ok(collector)
    }

    /// Turn step changes into audit events and status messages
    ///
    /// Only the newest `status_message_limit` messages are kept.
    fn report(&self, object: &ObjectRef, collector: &mut Collector, changes: Changes) {
        for change in changes {
            self.recorder
                .event(object, Severity::Normal, REASON_UPGRADE, &change);
            if self.config.record_status_messages {
                collector.status.messages.push(change);
            }
        }
        let messages = &mut collector.status.messages;
        let excess = messages.len().saturating_sub(self.config.status_message_limit);
        messages.drain(..excess);
    }

    fn warn_dangling(&self, object: &ObjectRef, collector: &Collector) {
        match collector.spec.config.dangling_references() {
            Ok(dangling) => {
                for reference in dangling {
                    warn!(
                        name = %object.name,
                        namespace = %object.namespace,
                        reference = %reference,
                        "pipeline references an undefined component"
                    );
                }
            }
            Err(err) => warn!(
                name = %object.name,
                namespace = %object.namespace,
                error = %err,
                "could not check pipeline references"
            ),
        }
    }

    /// Upgrade every managed resource in the store
    ///
    /// Each resource is upgraded and persisted independently; a failure is
    /// recorded in the report and the pass moves on.
    ///
    /// # Errors
    /// Returns error only if listing resources fails.
    pub async fn managed_instances(&self) -> Result<FleetReport, StoreError> {
        info!("looking for managed instances to upgrade");
        let list = self.store.list(&self.config.selector).await?;
        if list.is_empty() {
            info!("no instances to upgrade");
        }

        let mut report = FleetReport::default();
        for original in list {
            let object = original.object_ref();

            if original.spec.management_state == ManagementState::Unmanaged {
                info!(
                    name = %object.name,
                    namespace = %object.namespace,
                    "skipping upgrade because instance is not managed"
                );
                report.skipped.push(object);
                continue;
            }
            if original.spec.upgrade_strategy == UpgradeStrategy::None {
                info!(
                    name = %object.name,
                    namespace = %object.namespace,
                    "skipping instance upgrade due to upgrade strategy"
                );
                report.skipped.push(object);
                continue;
            }

            let upgraded = match self.managed_instance(original.clone()).await {
                Ok(upgraded) => upgraded,
                Err(failure) => {
                    info!(
                        name = %object.name,
                        namespace = %object.namespace,
                        version = %failure.version,
                        "{}",
                        FAILURE_MESSAGE
                    );
                    self.recorder
                        .event(&object, Severity::Error, REASON_UPGRADE, FAILURE_MESSAGE);
                    report.failed.push(FailedInstance {
                        object,
                        error: failure.error,
                    });
                    continue;
                }
            };

            if upgraded == original {
                debug!(name = %object.name, namespace = %object.namespace, "instance is up to date");
                report.unchanged.push(object);
                continue;
            }

            match self.persist(&upgraded).await {
                Ok(stored) => {
                    info!(
                        name = %object.name,
                        namespace = %object.namespace,
                        version = %stored.status.version,
                        "instance upgraded"
                    );
                    report.upgraded.push(object);
                }
                Err(err) => {
                    error!(
                        name = %object.name,
                        namespace = %object.namespace,
                        error = %err,
                        "failed to apply changes to instance"
                    );
                    report.failed.push(FailedInstance {
                        object,
                        error: err.into(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// Write the body, then the status captured before the body write
    async fn persist(&self, upgraded: &Collector) -> Result<Collector, StoreError> {
        let status = upgraded.status.clone();
        let mut stored = self.store.update(upgraded).await?;
        stored.status = status;
        self.store.update_status(&stored).await
    }
}

impl std::fmt::Debug for VersionUpgrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionUpgrade")
            .field("latest", &self.registry.latest().tag())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Outcome of a fleet-wide pass
#[derive(Debug, Default)]
pub struct FleetReport {
    /// Resources upgraded and persisted
    pub upgraded: Vec<ObjectRef>,
    /// Resources already current
    pub unchanged: Vec<ObjectRef>,
    /// Unmanaged resources and resources opted out of upgrades
    pub skipped: Vec<ObjectRef>,
    /// Resources that failed to upgrade or persist
    pub failed: Vec<FailedInstance>,
}

impl FleetReport {
    /// Check if any resource failed
    #[inline]
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Number of listed resources
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.upgraded.len() + self.unchanged.len() + self.skipped.len() + self.failed.len()
    }
}

/// Resource the fleet-wide pass could not upgrade
#[derive(Debug)]
pub struct FailedInstance {
    /// Resource
    pub object: ObjectRef,
    /// Cause
    pub error: UpgradeError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemoryRecorder;
    use crate::registry::VersionNode;
    use crate::store::{InMemoryStore, MockResourceStore};

    fn add_marker(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
        if collector.spec.args.insert("--marker".into(), "on".into()).is_none() {
            changes.push("added marker");
        }
        Ok(())
    }

    fn hard_stop(_: &mut Collector, _: &mut Changes) -> Result<(), UpgradeError> {
        Err(UpgradeError::manual_intervention("jaeger", "remote_sampling was removed"))
    }

    fn registry(table: Vec<VersionNode>) -> Arc<VersionRegistry> {
        Arc::new(VersionRegistry::new(table).unwrap())
    }

    fn marker_registry() -> Arc<VersionRegistry> {
        registry(vec![
            VersionNode::from_fn("1", |_, _| Ok(())),
            VersionNode::from_fn("2", add_marker),
        ])
    }

    fn coordinator(store: Arc<dyn ResourceStore>, recorder: Arc<MemoryRecorder>) -> VersionUpgrade {
        VersionUpgrade::new(marker_registry(), store, recorder)
    }

    #[tokio::test]
    async fn changes_become_events_and_messages() {
        let recorder = Arc::new(MemoryRecorder::new());
        let up = coordinator(Arc::new(InMemoryStore::new()), recorder.clone());

        let res = up
            .managed_instance(Collector::new("a", "default").with_version("1"))
            .await
            .unwrap();
        assert_eq!(res.status.version, "2");
        assert_eq!(res.status.messages, vec!["added marker".to_string()]);
        assert_eq!(recorder.messages(Severity::Normal), vec!["added marker".to_string()]);
    }

    #[tokio::test]
    async fn status_messages_can_be_disabled() {
        let recorder = Arc::new(MemoryRecorder::new());
        let up = coordinator(Arc::new(InMemoryStore::new()), recorder.clone())
            .with_config(UpgradeConfig::default().with_status_messages(false));

        let res = up
            .managed_instance(Collector::new("a", "default").with_version("1"))
            .await
            .unwrap();
        assert!(res.status.messages.is_empty());
        assert_eq!(recorder.len(), 1);
    }

    #[tokio::test]
    async fn status_messages_keep_newest() {
        let up = coordinator(Arc::new(InMemoryStore::new()), Arc::new(MemoryRecorder::new()))
            .with_config(UpgradeConfig::default().with_status_message_limit(2));
        let mut collector = Collector::new("a", "default").with_version("1");
        collector.status.messages = vec!["first".into(), "second".into(), "third".into()];

        let res = up.managed_instance(collector).await.unwrap();
        assert_eq!(res.status.messages, vec!["third".to_string(), "added marker".to_string()]);
    }

    #[tokio::test]
    async fn empty_version_is_left_alone() {
        let up = coordinator(Arc::new(InMemoryStore::new()), Arc::new(MemoryRecorder::new()));
        let collector = Collector::new("a", "default");
        assert_eq!(up.managed_instance(collector.clone()).await.unwrap(), collector);
    }

    #[tokio::test]
    async fn unknown_version_is_current_unless_strict() {
        let collector = Collector::new("a", "default").with_version("0.0.1-typo");

        let lenient = coordinator(Arc::new(InMemoryStore::new()), Arc::new(MemoryRecorder::new()));
        assert_eq!(lenient.managed_instance(collector.clone()).await.unwrap(), collector);

        let strict = coordinator(Arc::new(InMemoryStore::new()), Arc::new(MemoryRecorder::new()))
            .with_config(UpgradeConfig::default().with_strict_versions(true));
        let failure = strict.managed_instance(collector.clone()).await.unwrap_err();
        assert!(matches!(failure.error, UpgradeError::UnknownVersion(_)));
        assert_eq!(*failure.collector, collector);
    }

    #[tokio::test]
    async fn unknown_target_is_rejected() {
        let up = coordinator(Arc::new(InMemoryStore::new()), Arc::new(MemoryRecorder::new()));
        let failure = up
            .managed_instance_to(Collector::new("a", "default").with_version("1"), "9")
            .await
            .unwrap_err();
        assert!(matches!(failure.error, UpgradeError::UnknownTarget(ref t) if t == "9"));
    }

    #[tokio::test]
    async fn hard_stop_emits_warning() {
        let recorder = Arc::new(MemoryRecorder::new());
        let up = VersionUpgrade::new(
            registry(vec![
                VersionNode::from_fn("1", |_, _| Ok(())),
                VersionNode::from_fn("2", add_marker),
                VersionNode::from_fn("3", hard_stop),
            ]),
            Arc::new(InMemoryStore::new()),
            recorder.clone(),
        );

        let failure = up
            .managed_instance(Collector::new("a", "default").with_version("1"))
            .await
            .unwrap_err();
        assert!(failure.error.requires_manual_intervention());
        assert_eq!(failure.version, "3");
        assert_eq!(failure.collector.status.version, "2");
        assert_eq!(recorder.messages(Severity::Warning).len(), 1);
    }

    #[tokio::test]
    async fn list_failure_is_returned() {
        let mut store = MockResourceStore::new();
        store
            .expect_list()
            .returning(|_| Err(StoreError::Backend("unavailable".into())));
        let up = coordinator(Arc::new(store), Arc::new(MemoryRecorder::new()));

        assert!(up.managed_instances().await.is_err());
    }

    #[tokio::test]
    async fn conflict_is_isolated() {
        let mut store = MockResourceStore::new();
        store.expect_list().returning(|_| {
            Ok(vec![
                Collector::new("a", "default").with_version("1"),
                Collector::new("b", "default").with_version("1"),
            ])
        });
        store.expect_update().times(2).returning(|c| {
            if c.metadata.name == "a" {
                Err(StoreError::Conflict {
                    object: c.object_ref(),
                    expected: String::new(),
                    actual: "5".into(),
                })
            } else {
                Ok(c.clone())
            }
        });
        store
            .expect_update_status()
            .times(1)
            .returning(|c| Ok(c.clone()));

        let recorder = Arc::new(MemoryRecorder::new());
        let up = coordinator(Arc::new(store), recorder.clone());
        let report = up.managed_instances().await.unwrap();

        assert_eq!(report.upgraded.len(), 1);
        assert_eq!(report.upgraded[0].name, "b");
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].error.is_conflict());
        assert!(recorder.messages(Severity::Error).is_empty());
    }

    #[tokio::test]
    async fn status_survives_body_update() {
        let mut store = MockResourceStore::new();
        store
            .expect_list()
            .returning(|_| Ok(vec![Collector::new("a", "default").with_version("1")]));
        // the body write hands back the previously stored status
        store.expect_update().returning(|c| {
            let mut stored = c.clone();
            stored.status.version = "1".into();
            stored.status.messages.clear();
            Ok(stored)
        });
        store
            .expect_update_status()
            .withf(|c| c.status.version == "2" && c.status.messages == ["added marker"])
            .times(1)
            .returning(|c| Ok(c.clone()));

        let up = coordinator(Arc::new(store), Arc::new(MemoryRecorder::new()));
        let report = up.managed_instances().await.unwrap();
        assert_eq!(report.upgraded.len(), 1);
    }

    #[tokio::test]
    async fn opted_out_instances_are_skipped() {
        let store = Arc::new(InMemoryStore::with_collectors([
            Collector::new("a", "default")
                .with_version("1")
                .with_management_state(ManagementState::Unmanaged),
            Collector::new("b", "default")
                .with_version("1")
                .with_upgrade_strategy(UpgradeStrategy::None),
            Collector::new("c", "default").with_version("2"),
        ]));
        let up = coordinator(store.clone(), Arc::new(MemoryRecorder::new()));

        let report = up.managed_instances().await.unwrap();
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.unchanged.len(), 1);
        assert_eq!(report.total(), 3);
        assert!(store.snapshot().iter().all(|c| !c.spec.args.contains_key("--marker")));
    }
}
