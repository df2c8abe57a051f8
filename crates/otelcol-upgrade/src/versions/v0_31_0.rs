//! 0.31.0: the jaeger receiver's `remote_sampling.tls_credentials` became
//! `remote_sampling.tls`

use otelcol_api::{tree, Collector, Section};

use super::of_kind;
use crate::error::UpgradeError;
use crate::migration::Changes;

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let Some(receivers) = collector.spec.config.section_mut(Section::Receivers)? else {
        return Ok(());
    };

    for (id, receiver) in of_kind(receivers, "jaeger") {
        let path = tree::join("receivers", id);
        let Some(receiver) = tree::map_of(receiver, &path)? else {
            continue;
        };
        let Some(sampling) = tree::child_map_mut(receiver, "remote_sampling", &path)? else {
            continue;
        };
        if tree::rename_key(sampling, "tls_credentials", "tls") {
            changes.push(format!(
                "upgrade to v0.31.0 has changed the remote_sampling.tls_credentials field name to remote_sampling.tls in {id} receiver"
            ));
        }
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
    fn renames_tls_credentials() {
        let mut collector = collector_with_config(
            r"
receivers:
  jaeger:
    protocols:
      grpc: {}
    remote_sampling:
      endpoint: jaeger-collector:14250
      tls_credentials:
        insecure: true
",
        );
        let changes = run_idempotent(upgrade, &mut collector);

        assert_eq!(changes.len(), 1);
        assert_eq!(
            collector.spec.config.get("/receivers/jaeger/remote_sampling"),
            Some(&json!({"endpoint": "jaeger-collector:14250", "tls": {"insecure": true}}))
        );
    }

    #[test]
    fn jaeger_without_remote_sampling_is_untouched() {
        let mut collector = collector_with_config("receivers:\n  jaeger:\n    protocols:\n      grpc: {}\n");
        let before = collector.clone();
        assert!(run_idempotent(upgrade, &mut collector).is_empty());
        assert_eq!(collector, before);
    }
}
