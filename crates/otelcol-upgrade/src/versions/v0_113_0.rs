//! 0.113.0: the internal metrics endpoint defaults to localhost
//!
//! Collectors that never configured it keep serving on all interfaces.

use otelcol_api::{tree, Collector};
use serde_json::Value;

use crate::error::UpgradeError;
use crate::migration::Changes;

const ADDRESS: &str = "0.0.0.0:8888";

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let Some(service) = collector.spec.config.service_mut()? else {
        return Ok(());
    };
    let telemetry = tree::ensure_child_map(service, "telemetry", "service")?;
    let metrics = tree::ensure_child_map(telemetry, "metrics", "service.telemetry")?;

    let configured = |key: &str| metrics.get(key).is_some_and(|v| !v.is_null());
    if configured("address") || configured("readers") {
        return Ok(());
    }
    metrics.insert("address".into(), Value::String(ADDRESS.into()));
    changes.push(format!(
        "upgrade to v0.113.0 set service.telemetry.metrics.address to {ADDRESS} to keep listening on all interfaces"
    ));
    Ok(())
}
