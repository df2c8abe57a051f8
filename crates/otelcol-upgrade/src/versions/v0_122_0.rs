//! 0.122.0: `service.telemetry.metrics.address` was replaced by readers

use otelcol_api::{tree, Collector, ConfigError};
use serde_json::{json, Value};

use super::split_host_port;
use crate::error::UpgradeError;
use crate::migration::Changes;

const PATH: &str = "service.telemetry.metrics";

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let Some(telemetry) = collector.spec.config.telemetry_mut()? else {
        return Ok(());
    };
    let Some(metrics) = tree::child_map_mut(telemetry, "metrics", "service.telemetry")? else {
        return Ok(());
    };
    if metrics.get("readers").is_some_and(|v| !v.is_null()) {
        return Ok(());
    }
    let address = match metrics.get("address") {
        Some(Value::String(address)) if !address.is_empty() => address.clone(),
        Some(Value::String(_) | Value::Null) | None => return Ok(()),
        Some(_) => return Err(ConfigError::unexpected(tree::join(PATH, "address"), "address").into()),
    };

    let malformed = || ConfigError::unexpected(tree::join(PATH, "address"), "host:port address");
    let (host, port) = split_host_port(&address).ok_or_else(malformed)?;
    let port: u16 = port.parse().map_err(|_| malformed())?;
    let host = if host.is_empty() { "0.0.0.0" } else { host };

    tree::remove_key(metrics, "address");
    metrics.insert(
        "readers".into(),
        json!([{ "pull": { "exporter": { "prometheus": { "host": host, "port": port } } } }]),
    );
    changes.push(format!(
        "upgrade to v0.122.0 replaced service.telemetry.metrics.address {address} with a prometheus pull reader"
    ));
    Ok(())
}
