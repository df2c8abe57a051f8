//! Built-in version steps
//!
//! Each module rewrites collectors recorded at the previous version into the
//! shape expected by its own version. Steps are pure transforms; the
//! descriptions they push become audit events and status messages.

use otelcol_api::tree::Map;
use otelcol_api::ComponentId;
use serde_json::Value;

use crate::registry::VersionNode;

mod v0_104_0;
mod v0_105_0;
mod v0_110_0;
mod v0_111_0;
mod v0_113_0;
mod v0_122_0;
mod v0_130_0;
mod v0_145_0;
mod v0_15_0;
mod v0_19_0;
mod v0_24_0;
mod v0_2_10;
mod v0_31_0;
mod v0_36_0;
mod v0_38_0;
mod v0_39_0;
mod v0_41_0;
mod v0_43_0;
mod v0_61_0;
mod v0_9_0;

/// The registered chain, oldest first
#[must_use]
pub fn default_chain() -> Vec<VersionNode> {
    vec![
        VersionNode::from_fn("0.2.10", v0_2_10::upgrade),
        VersionNode::from_fn("0.9.0", v0_9_0::upgrade),
        VersionNode::from_fn("0.15.0", v0_15_0::upgrade),
        VersionNode::from_fn("0.19.0", v0_19_0::upgrade),
        VersionNode::from_fn("0.24.0", v0_24_0::upgrade),
        VersionNode::from_fn("0.31.0", v0_31_0::upgrade),
        VersionNode::from_fn("0.36.0", v0_36_0::upgrade),
        VersionNode::from_fn("0.38.0", v0_38_0::upgrade),
        VersionNode::from_fn("0.39.0", v0_39_0::upgrade),
        VersionNode::from_fn("0.41.0", v0_41_0::upgrade),
        VersionNode::from_fn("0.43.0", v0_43_0::upgrade),
        VersionNode::from_fn("0.61.0", v0_61_0::upgrade),
        VersionNode::from_fn("0.104.0", v0_104_0::upgrade),
        VersionNode::from_fn("0.105.0", v0_105_0::upgrade),
        VersionNode::from_fn("0.110.0", v0_110_0::upgrade),
        VersionNode::from_fn("0.111.0", v0_111_0::upgrade),
        VersionNode::from_fn("0.113.0", v0_113_0::upgrade),
        VersionNode::from_fn("0.122.0", v0_122_0::upgrade),
        VersionNode::from_fn("0.130.0", v0_130_0::upgrade),
        VersionNode::from_fn("0.145.0", v0_145_0::upgrade),
    ]
}

/// Components of `section` with base kind `kind`
fn of_kind<'a>(
    section: &'a mut Map,
    kind: &'a str,
) -> impl Iterator<Item = (&'a String, &'a mut Value)> + 'a {
    section
        .iter_mut()
        .filter(move |(id, _)| ComponentId::kind_of(id) == kind)
}

/// Ids of components of `section` with base kind `kind`
fn ids_of_kind(section: &Map, kind: &str) -> Vec<String> {
    section
        .keys()
        .filter(|id| ComponentId::kind_of(id) == kind)
        .cloned()
        .collect()
}

/// Split `host:port`; IPv6 hosts must be bracketed and come back without brackets
///
/// Returns `None` for a bare host, including an unbracketed IPv6 address.
fn split_host_port(address: &str) -> Option<(&str, &str)> {
    if let Some(rest) = address.strip_prefix('[') {
        let (host, port) = rest.split_once(']')?;
        return Some((host, port.strip_prefix(':')?));
    }
    match address.split_once(':') {
        Some((host, port)) if !port.contains(':') => Some((host, port)),
        _ => None,
    }
}

/// Join a host and port, bracketing IPv6 hosts
fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

#[cfg(test)]
mod testing {
    use otelcol_api::Collector;

    use crate::migration::{Changes, FnMigration, Transform};

    /// Run a transform, panicking on error
    pub(super) fn run(transform: Transform, collector: &mut Collector) -> Changes {
        FnMigration::new(transform).run(collector).unwrap()
    }

    /// Run a transform twice and check the second run is a no-op
    pub(super) fn run_idempotent(transform: Transform, collector: &mut Collector) -> Changes {
        let changes = run(transform, collector);
        let once = collector.clone();
        let again = run(transform, collector);
        assert!(again.is_empty(), "second run reported {again:?}");
        assert_eq!(*collector, once);
        changes
    }
}
