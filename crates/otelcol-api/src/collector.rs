//! Collector resource model

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigTree;

/// Label identifying resources owned by the operator
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Value of [`MANAGED_BY_LABEL`] on managed resources
pub const MANAGED_BY_VALUE: &str = "opentelemetry-operator";

/// Managed collector resource
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collector {
    /// Object identity and revision
    pub metadata: ObjectMeta,
    /// Desired state
    #[serde(default)]
    pub spec: CollectorSpec,
    /// Observed state
    #[serde(default)]
    pub status: CollectorStatus,
}

impl Collector {
    /// Create a collector in `namespace` carrying the managed-by label
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut metadata = ObjectMeta {
            name: name.into(),
            namespace: namespace.into(),
            ..ObjectMeta::default()
        };
        metadata
            .labels
            .insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());
        Self {
            metadata,
            ..Self::default()
        }
    }

    /// Set configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: ConfigTree) -> Self {
        self.spec.config = config;
        self
    }

    /// Add an argument
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.args.insert(key.into(), value.into());
        self
    }

    /// Set recorded version
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.status.version = version.into();
        self
    }

    /// Set management state
    #[inline]
    #[must_use]
    pub fn with_management_state(mut self, state: ManagementState) -> Self {
        self.spec.management_state = state;
        self
    }

    /// Set upgrade strategy
    #[inline]
    #[must_use]
    pub fn with_upgrade_strategy(mut self, strategy: UpgradeStrategy) -> Self {
        self.spec.upgrade_strategy = strategy;
        self
    }

    /// Reference used for audit events
    #[must_use]
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            name: self.metadata.name.clone(),
            namespace: self.metadata.namespace.clone(),
        }
    }

    /// `true` when every label in `selector` is present with the same value
    #[must_use]
    pub fn matches_labels(&self, selector: &BTreeMap<String, String>) -> bool {
        selector
            .iter()
            .all(|(key, value)| self.metadata.labels.get(key) == Some(value))
    }
}

/// Object identity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Object name
    pub name: String,
    /// Object namespace
    #[serde(default)]
    pub namespace: String,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Optimistic-concurrency revision maintained by the store
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_version: String,
}

/// Desired state of a collector
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorSpec {
    /// Embedded pipeline configuration
    #[serde(default, skip_serializing_if = "ConfigTree::is_empty")]
    pub config: ConfigTree,
    /// Command-line arguments passed to the collector
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, String>,
    /// Whether the operator manages this resource
    #[serde(default)]
    pub management_state: ManagementState,
    /// Whether automatic upgrades apply
    #[serde(default)]
    pub upgrade_strategy: UpgradeStrategy,
}

/// Observed state of a collector
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorStatus {
    /// Version tag recorded after the last successful upgrade step
    #[serde(default)]
    pub version: String,
    /// Human-readable upgrade notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

/// Management state of a collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagementState {
    /// Reconciled and upgraded by the operator
    #[default]
    Managed,
    /// Left alone by the operator
    Unmanaged,
}

/// Upgrade strategy of a collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeStrategy {
    /// Upgraded with every operator release
    #[default]
    Automatic,
    /// Never upgraded automatically
    None,
}

/// Namespaced object reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Object name
    pub name: String,
    /// Object namespace
    pub namespace: String,
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// List of collectors
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectorList {
    /// Items
    #[serde(default)]
    pub items: Vec<Collector>,
}
