//! Collector Resource Model
//!
//! Typed view of a managed OpenTelemetry Collector resource, with the embedded
//! pipeline configuration kept as a semi-structured tree.
//!
//! # Core Concepts
//!
//! - [`Collector`]: The cluster object (`metadata`, `spec`, `status`)
//! - [`ConfigTree`]: The embedded receivers/processors/exporters/... document
//! - [`Section`]: Top-level component sections and the pipeline lists that reference them
//! - [`ComponentId`]: `kind[/name]` component identifiers
//!
//! # Example
//!
//! ```rust
//! use otelcol_api::{ConfigTree, Section};
//!
//! let mut tree = ConfigTree::from_yaml(
//!     "exporters:\n  otlphttp: {}\nservice:\n  pipelines:\n    traces:\n      exporters: [otlphttp]\n",
//! )
//! .unwrap();
//! let renamed = tree.rename_component_kind(Section::Exporters, "otlphttp", "otlp_http").unwrap();
//! assert_eq!(renamed.len(), 1);
//! assert!(tree.dangling_references().unwrap().is_empty());
//! ```

#![warn(unreachable_pub)]

// Core modules
mod collector;
mod component;
pub mod config;
pub mod tree;

// Re-exports
pub use collector::{
    Collector, CollectorList, CollectorSpec, CollectorStatus, ManagementState, ObjectMeta,
    ObjectRef, UpgradeStrategy, MANAGED_BY_LABEL, MANAGED_BY_VALUE,
};
pub use component::{ComponentId, Section};
pub use config::{ConfigError, ConfigTree, DanglingReference};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
