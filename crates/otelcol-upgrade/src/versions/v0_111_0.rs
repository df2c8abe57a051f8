//! 0.111.0: the logging exporter was replaced by the debug exporter

use otelcol_api::{tree, Collector, ConfigError, Section};
use serde_json::Value;

use crate::error::UpgradeError;
use crate::migration::Changes;

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let config = &mut collector.spec.config;
    let renamed = config.rename_component_kind(Section::Exporters, "logging", "debug")?;
    if renamed.is_empty() {
        return Ok(());
    }

    let Some(exporters) = config.section_mut(Section::Exporters)? else {
        return Ok(());
    };
    for (old, new) in renamed {
        changes.push(format!("upgrade to v0.111.0 has renamed the {old} exporter to {new}"));

        let path = tree::join("exporters", &new);
        let Some(exporter) = exporters.get_mut(&new) else {
            continue;
        };
        let Some(exporter) = tree::map_of(exporter, &path)? else {
            continue;
        };
        let Some(level) = tree::remove_key(exporter, "loglevel") else {
            continue;
        };
        let verbosity = match level.as_str() {
            Some("debug") => "detailed",
            Some("info") => "normal",
            Some("warn" | "error") => "basic",
            _ => return Err(ConfigError::unexpected(tree::join(&path, "loglevel"), "log level").into()),
        };
        exporter.insert("verbosity".into(), Value::String(verbosity.into()));
        changes.push(format!(
            "upgrade to v0.111.0 has replaced loglevel with verbosity {verbosity} in {new} exporter"
        ));
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
    fn renames_logging_to_debug() {
        let mut collector = collector_with_config(
            r"
exporters:
  logging:
    loglevel: debug
  logging/quiet:
    loglevel: warn
    sampling_initial: 5
service:
  pipelines:
    traces:
      exporters: [logging, logging/quiet]
",
        );
        run_idempotent(upgrade, &mut collector);

        assert_eq!(
            collector.spec.config,
            config(
                r"
exporters:
  debug:
    verbosity: detailed
  debug/quiet:
    verbosity: basic
    sampling_initial: 5
service:
  pipelines:
    traces:
      exporters: [debug, debug/quiet]
"
            )
        );
    }

    #[test]
    fn unknown_loglevel_is_malformed() {
        let mut collector = collector_with_config("exporters:\n  logging:\n    loglevel: loud\n");
        let err = crate::migration::FnMigration::new(upgrade)
            .run(&mut collector)
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
