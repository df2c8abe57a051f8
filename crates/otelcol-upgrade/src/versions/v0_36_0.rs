//! 0.36.0: TLS settings were regrouped
//!
//! The otlp receiver protocols renamed `tls_settings` to `tls`; the otlp
//! exporters moved their top-level TLS keys into a `tls` block.

use otelcol_api::{tree, Collector, Section};

use super::of_kind;
use crate::error::UpgradeError;
use crate::migration::Changes;

const TLS_KEYS: [&str; 8] = [
    "ca_file",
    "cert_file",
    "key_file",
    "min_version",
    "max_version",
    "insecure",
    "insecure_skip_verify",
    "server_name_override",
];

const TLS_EXPORTERS: [&str; 2] = ["otlp", "otlphttp"];

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let config = &mut collector.spec.config;

    if let Some(receivers) = config.section_mut(Section::Receivers)? {
        for (id, receiver) in of_kind(receivers, "otlp") {
            let path = tree::join("receivers", id);
            let Some(receiver) = tree::map_of(receiver, &path)? else {
                continue;
            };
            let Some(protocols) = tree::child_map_mut(receiver, "protocols", &path)? else {
                continue;
            };
            let path = tree::join(&path, "protocols");
            for protocol in ["grpc", "http"] {
                let Some(settings) = tree::child_map_mut(protocols, protocol, &path)? else {
                    continue;
                };
                if tree::rename_key(settings, "tls_settings", "tls") {
                    changes.push(format!(
                        "upgrade to v0.36.0 has changed the tls_settings field name to tls in {protocol} protocol of {id} receiver"
                    ));
                }
            }
        }
    }

    if let Some(exporters) = config.section_mut(Section::Exporters)? {
        for kind in TLS_EXPORTERS {
            for (id, exporter) in of_kind(exporters, kind) {
                let path = tree::join("exporters", id);
                let Some(exporter) = tree::map_of(exporter, &path)? else {
                    continue;
                };
                let moved = tree::take_keys(exporter, &TLS_KEYS);
                if moved.is_empty() {
                    continue;
                }
                tree::ensure_child_map(exporter, "tls", &path)?.extend(moved);
                changes.push(format!(
                    "upgrade to v0.36.0 move tls config i.e. ca_file, key_file, cert_file, min_version, max_version to tls.* in {id} exporter"
                ));
            }
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
    fn regroups_tls_settings() {
        let mut collector = collector_with_config(
            r"
receivers:
  otlp/mtls:
    protocols:
      grpc:
        endpoint: mysite.local:55690
        tls_settings:
          client_ca_file: client.pem
          cert_file: server.crt
          key_file: server.key
      http:
        endpoint: mysite.local:55690
        tls_settings:
          client_ca_file: client.pem
          cert_file: server.crt
          key_file: server.key
exporters:
  otlp:
    endpoint: example.com
    ca_file: /var/lib/mycert.pem
    insecure_skip_verify: true
service:
  pipelines:
    traces:
      receivers: [otlp/mtls]
      exporters: [otlp]
",
        );
        let changes = run_idempotent(upgrade, &mut collector);

        assert_eq!(
            collector.spec.config,
            config(
                r"
receivers:
  otlp/mtls:
    protocols:
      grpc:
        endpoint: mysite.local:55690
        tls:
          client_ca_file: client.pem
          cert_file: server.crt
          key_file: server.key
      http:
        endpoint: mysite.local:55690
        tls:
          client_ca_file: client.pem
          cert_file: server.crt
          key_file: server.key
exporters:
  otlp:
    endpoint: example.com
    tls:
      ca_file: /var/lib/mycert.pem
      insecure_skip_verify: true
service:
  pipelines:
    traces:
      receivers: [otlp/mtls]
      exporters: [otlp]
"
            )
        );
        let changes: Vec<_> = changes.iter().collect();
        assert!(changes.contains(
            &"upgrade to v0.36.0 has changed the tls_settings field name to tls in grpc protocol of otlp/mtls receiver"
        ));
        assert!(changes.contains(
            &"upgrade to v0.36.0 has changed the tls_settings field name to tls in http protocol of otlp/mtls receiver"
        ));
        assert!(changes.contains(
            &"upgrade to v0.36.0 move tls config i.e. ca_file, key_file, cert_file, min_version, max_version to tls.* in otlp exporter"
        ));
    }

    #[test]
    fn exporter_without_tls_keys_is_untouched() {
        let mut collector = collector_with_config("exporters:\n  otlp:\n    endpoint: example.com\n");
        let before = collector.clone();
        assert!(run_idempotent(upgrade, &mut collector).is_empty());
        assert_eq!(collector, before);
    }
}
