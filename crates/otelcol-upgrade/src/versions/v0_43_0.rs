//! 0.43.0: the metrics address moved from `--metrics-addr` into
//! `service.telemetry.metrics.address`

use otelcol_api::{tree, Collector};
use serde_json::Value;

use crate::error::UpgradeError;
use crate::migration::Changes;

const METRICS_ADDR: &str = "--metrics-addr";

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let Some(address) = collector.spec.args.remove(METRICS_ADDR) else {
        return Ok(());
    };

    let root = collector.spec.config.ensure_root_mut()?;
    let service = tree::ensure_child_map(root, "service", "")?;
    let telemetry = tree::ensure_child_map(service, "telemetry", "service")?;
    let metrics = tree::ensure_child_map(telemetry, "metrics", "service.telemetry")?;
    if metrics.get("address").is_some_and(|a| !a.is_null()) {
        changes.push(
            "upgrade to v0.43.0 dropped the --metrics-addr argument, service.telemetry.metrics.address is already configured",
        );
    } else {
        metrics.insert("address".into(), Value::String(address));
        changes.push("upgrade to v0.43.0 moved the --metrics-addr argument into service.telemetry.metrics.address");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::testing::run_idempotent;
    use otelcol_test_utils::collector_with_config;
    use serde_json::json;

    #[test]
    fn moves_metrics_addr() {
        let mut collector = collector_with_config("service:\n  pipelines: {}\n").with_arg("--metrics-addr", ":8888");
        run_idempotent(upgrade, &mut collector);

        assert!(collector.spec.args.is_empty());
        assert_eq!(
            collector.spec.config.get("/service/telemetry/metrics/address"),
            Some(&json!(":8888"))
        );
    }

    #[test]
    fn keeps_configured_address() {
        let mut collector = collector_with_config(
            "service:\n  telemetry:\n    metrics:\n      address: 0.0.0.0:9999\n",
        )
        .with_arg("--metrics-addr", ":8888");
        run_idempotent(upgrade, &mut collector);

        assert!(collector.spec.args.is_empty());
        assert_eq!(
            collector.spec.config.get("/service/telemetry/metrics/address"),
            Some(&json!("0.0.0.0:9999"))
        );
    }
}
