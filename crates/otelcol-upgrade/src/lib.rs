//! Collector Upgrade Engine
//!
//! Brings managed OpenTelemetry Collector resources recorded at an older
//! version up to the shape the current collector expects:
//! - Walks an ordered chain of registered versions from the recorded one
//! - Applies each version's migration to a scratch copy of the resource
//! - Reports every change as an audit event and a status message
//! - Upgrades a whole fleet with per-resource failure isolation
//!
//! # Core Concepts
//!
//! - [`VersionRegistry`]: Ordered, immutable chain of [`VersionNode`]s
//! - [`Migration`]: Idempotent transform reaching one version
//! - [`VersionUpgrade`]: Coordinator for single-resource and fleet-wide passes
//! - [`ResourceStore`] / [`EventRecorder`]: Persistence and audit seams
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use otelcol_api::{Collector, ConfigTree};
//! use otelcol_upgrade::{InMemoryStore, MemoryRecorder, VersionRegistry, VersionUpgrade};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(VersionRegistry::with_defaults()?);
//! let upgrade = VersionUpgrade::new(
//!     registry,
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(MemoryRecorder::new()),
//! );
//!
//! let config = ConfigTree::from_yaml("exporters:\n  logging:\n    loglevel: debug\n")?;
//! let collector = Collector::new("my-instance", "default")
//!     .with_config(config)
//!     .with_version("0.110.0");
//!
//! let upgraded = upgrade.managed_instance(collector).await?;
//! assert_eq!(upgraded.status.version, "0.145.0");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod feature_gates;
pub mod migration;
pub mod registry;
pub mod store;
pub mod versions;

// Re-exports for convenience
pub use config::{ConfigFileError, UpgradeConfig, DEFAULT_STATUS_MESSAGE_LIMIT};
pub use context::UpgradeContext;
pub use coordinator::{FailedInstance, FleetReport, VersionUpgrade, FAILURE_MESSAGE};
pub use error::{RegistryError, StoreError, UpgradeError, UpgradeFailure};
pub use events::{
    Event, EventRecorder, MemoryRecorder, NoopRecorder, Severity, TracingRecorder, REASON_UPGRADE,
};
pub use migration::{Changes, FnMigration, Migration, Transform};
pub use registry::{VersionNode, VersionRegistry};
pub use store::{InMemoryStore, ResourceStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the upgrade engine
    pub use crate::{
        Changes, EventRecorder, Migration, ResourceStore, UpgradeConfig, UpgradeContext,
        UpgradeError, VersionNode, VersionRegistry, VersionUpgrade,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
