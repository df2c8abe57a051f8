//! 0.130.0: the prometheus reader appends units to metric names by default
//!
//! Readers that did not choose keep the previous naming.

use otelcol_api::{tree, Collector};
use serde_json::Value;

use crate::error::UpgradeError;
use crate::migration::Changes;

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let Some(telemetry) = collector.spec.config.telemetry_mut()? else {
        return Ok(());
    };
    let Some(metrics) = tree::child_map_mut(telemetry, "metrics", "service.telemetry")? else {
        return Ok(());
    };
    let readers = match metrics.get_mut("readers") {
        Some(Value::Array(readers)) => readers,
        Some(Value::Null) | None => return Ok(()),
        Some(_) => {
            return Err(otelcol_api::ConfigError::unexpected(
                "service.telemetry.metrics.readers",
                "list",
            )
            .into())
        }
    };

    for (i, reader) in readers.iter_mut().enumerate() {
        let Some(prometheus) = reader
            .pointer_mut("/pull/exporter/prometheus")
            .and_then(Value::as_object_mut)
        else {
            continue;
        };
        if prometheus.get("without_units").is_none() {
            prometheus.insert("without_units".into(), Value::Bool(true));
            changes.push(format!(
                "upgrade to v0.130.0 set without_units on prometheus reader {i} to keep metric names unchanged"
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::testing::run_idempotent;
    use otelcol_test_utils::{collector_with_config, config};
    use serde_json::json;

    const READER: &str = r"
service:
  telemetry:
    metrics:
      readers:
        - pull:
            exporter:
              prometheus:
                host: 0.0.0.0
                port: 8888
";

    #[test]
    fn sets_without_units() {
        let mut collector = collector_with_config(READER);
        run_idempotent(upgrade, &mut collector);
        assert_eq!(
            collector
                .spec
                .config
                .get("/service/telemetry/metrics/readers/0/pull/exporter/prometheus/without_units"),
            Some(&json!(true))
        );
    }

    #[test]
    fn explicit_false_is_kept() {
        let yaml = format!("{READER}                without_units: false\n");
        let mut collector = collector_with_config(&yaml);
        assert!(run_idempotent(upgrade, &mut collector).is_empty());
        assert_eq!(collector.spec.config, config(&yaml));
    }

    #[test]
    fn periodic_readers_are_ignored() {
        let yaml = r"
service:
  telemetry:
    metrics:
      readers:
        - periodic:
            exporter:
              otlp:
                endpoint: collector:4317
";
        let mut collector = collector_with_config(yaml);
        assert!(run_idempotent(upgrade, &mut collector).is_empty());
    }
}
