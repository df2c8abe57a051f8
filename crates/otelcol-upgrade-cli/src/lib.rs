//! Offline collector upgrades
//!
//! Runs the fleet-wide upgrade pass against a YAML file holding a
//! `CollectorList` instead of a live cluster.

#![warn(unreachable_pub)]

pub mod file_store;
pub mod report;

pub use file_store::FileStore;
pub use report::render;
