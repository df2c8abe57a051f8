//! 0.145.0: the otlp exporters were renamed after their transport

use otelcol_api::{Collector, Section};

use crate::error::UpgradeError;
use crate::migration::Changes;

const RENAMES: [(&str, &str); 2] = [("otlp", "otlp_grpc"), ("otlphttp", "otlp_http")];

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    for (from, to) in RENAMES {
        let renamed = collector
            .spec
            .config
            .rename_component_kind(Section::Exporters, from, to)?;
        for (old, new) in renamed {
            changes.push(format!("upgrade to v0.145.0 has renamed the {old} exporter to {new}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::testing::run_idempotent;
    use otelcol_test_utils::{collector_with_config, config};
    use pretty_assertions::assert_eq;

    #[test]
    fn renames_exporters_and_references() {
        let mut collector = collector_with_config(
            r"
receivers:
  otlp:
    protocols:
      grpc: {}
exporters:
  otlp:
    endpoint: a:4317
  otlp/production:
    endpoint: b:4317
  otlphttp/backup:
    endpoint: https://c:4318
service:
  pipelines:
    traces:
      receivers: [otlp]
      exporters: [otlp, otlp/production]
    logs:
      receivers: [otlp]
      exporters: [otlphttp/backup]
",
        );
        let changes = run_idempotent(upgrade, &mut collector);

        assert_eq!(changes.len(), 3);
        assert_eq!(
            collector.spec.config,
            config(
                r"
receivers:
  otlp:
    protocols:
      grpc: {}
exporters:
  otlp_grpc:
    endpoint: a:4317
  otlp_grpc/production:
    endpoint: b:4317
  otlp_http/backup:
    endpoint: https://c:4318
service:
  pipelines:
    traces:
      receivers: [otlp]
      exporters: [otlp_grpc, otlp_grpc/production]
    logs:
      receivers: [otlp]
      exporters: [otlp_http/backup]
"
            )
        );
    }

    #[test]
    fn defined_target_name_needs_an_operator() {
        let mut collector = collector_with_config(
            r"
exporters:
  otlp:
    endpoint: old:4317
  otlp_grpc:
    endpoint: new:4317
service:
  pipelines:
    traces:
      exporters: [otlp, otlp_grpc]
",
        );
        let err = crate::migration::FnMigration::new(upgrade)
            .run(&mut collector)
            .unwrap_err();
        assert!(err.requires_manual_intervention());
        assert_eq!(
            collector.spec.config.get("/exporters/otlp_grpc/endpoint"),
            Some(&serde_json::json!("new:4317"))
        );
    }

    #[test]
    fn missing_pipelines_is_handled() {
        let mut collector = collector_with_config("exporters:\n  otlphttp: {}\n");
        run_idempotent(upgrade, &mut collector);
        assert!(collector.spec.config.get("/exporters/otlp_http").is_some());
    }
}
