//! Testing utilities for the otelcol-upgrade workspace
//!
//! Shared fixtures for collector resources and configuration trees.

#![allow(missing_docs)]

use otelcol_api::{Collector, ConfigTree};

pub const TEST_NAME: &str = "my-instance";
pub const TEST_NAMESPACE: &str = "default";

/// Parse YAML into a tree; blank input is an empty tree
pub fn config(yaml: &str) -> ConfigTree {
    if yaml.trim().is_empty() {
        return ConfigTree::default();
    }
    ConfigTree::from_yaml(yaml).unwrap()
}

/// Managed collector with no recorded version
pub fn collector_with_config(yaml: &str) -> Collector {
    Collector::new(TEST_NAME, TEST_NAMESPACE).with_config(config(yaml))
}

/// Managed collector recorded at `version`
pub fn collector_at(version: &str, yaml: &str) -> Collector {
    collector_with_config(yaml).with_version(version)
}

/// Named managed collector recorded at `version`
pub fn named_collector_at(name: &str, version: &str, yaml: &str) -> Collector {
    Collector::new(name, TEST_NAMESPACE)
        .with_config(config(yaml))
        .with_version(version)
}
