//! 0.19.0: `queued_retry` was removed and the resource processor lost
//! `type` and `labels` in favour of `attributes`

use otelcol_api::tree::{self, Map};
use otelcol_api::{Collector, ConfigError, Section};
use serde_json::{json, Value};

use super::{ids_of_kind, of_kind};
use crate::error::UpgradeError;
use crate::migration::Changes;

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let config = &mut collector.spec.config;
    let Some(processors) = config.section_mut(Section::Processors)? else {
        return Ok(());
    };

    for (id, processor) in of_kind(processors, "resource") {
        let path = tree::join("processors", id);
        let processor = match processor {
            Value::Object(processor) => processor,
            // default configuration
            Value::Null | Value::String(_) => continue,
            _ => return Err(ConfigError::unexpected(path, "map").into()),
        };

        if let Some(typ) = tree::remove_key(processor, "type") {
            attributes_mut(processor, &path)?.push(upsert("opencensus.type", typ));
            changes.push(format!(
                "upgrade to v0.19.0 migrated the property 'type' for processor {id:?}"
            ));
        }

        if let Some(labels) = tree::remove_key(processor, "labels") {
            let labels = match labels {
                Value::Object(labels) => labels,
                Value::Null => Map::new(),
                _ => return Err(ConfigError::unexpected(tree::join(&path, "labels"), "map").into()),
            };
            let attributes = attributes_mut(processor, &path)?;
            for (key, value) in labels {
                attributes.push(upsert(&key, value));
            }
            changes.push(format!(
                "upgrade to v0.19.0 migrated the property 'labels' for processor {id:?}"
            ));
        }
    }

    for id in ids_of_kind(processors, "queued_retry") {
        config.remove_component(Section::Processors, &id)?;
        changes.push(format!("upgrade to v0.19.0 removed the processor {id:?}"));
    }
    Ok(())
}

fn upsert(key: &str, value: Value) -> Value {
    json!({ "action": "upsert", "key": key, "value": value })
}

fn attributes_mut<'a>(processor: &'a mut Map, path: &str) -> Result<&'a mut Vec<Value>, ConfigError> {
    let slot = processor
        .entry("attributes")
        .or_insert_with(|| Value::Array(Vec::new()));
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(attributes) => Ok(attributes),
        _ => Err(ConfigError::unexpected(tree::join(path, "attributes"), "list")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::testing::run_idempotent;
    use otelcol_test_utils::{collector_with_config, config};
    use pretty_assertions::assert_eq;

    #[test]
    fn removes_queued_retry_and_its_references() {
        let mut collector = collector_with_config(
            r"
processors:
  queued_retry: {}
  queued_retry/second: {}
  batch: {}
service:
  pipelines:
    traces:
      processors: [queued_retry, batch, queued_retry/second]
",
        );
        let changes = run_idempotent(upgrade, &mut collector);

        assert_eq!(changes.len(), 2);
        assert_eq!(
            collector.spec.config,
            config(
                r"
processors:
  batch: {}
service:
  pipelines:
    traces:
      processors: [batch]
"
            )
        );
    }

    #[test]
    fn moves_type_and_labels_into_attributes() {
        let mut collector = collector_with_config(
            r"
processors:
  resource:
    type: container
    labels:
      zone: eu
  resource/default: ''
",
        );
        let changes = run_idempotent(upgrade, &mut collector);

        assert_eq!(
            changes.iter().collect::<Vec<_>>(),
            vec![
                "upgrade to v0.19.0 migrated the property 'type' for processor \"resource\"",
                "upgrade to v0.19.0 migrated the property 'labels' for processor \"resource\"",
            ]
        );
        assert_eq!(
            collector.spec.config,
            config(
                r"
processors:
  resource:
    attributes:
    - action: upsert
      key: opencensus.type
      value: container
    - action: upsert
      key: zone
      value: eu
  resource/default: ''
"
            )
        );
    }

    #[test]
    fn rejects_non_list_attributes() {
        let mut collector = collector_with_config(
            r"
processors:
  resource:
    type: container
    attributes: broken
",
        );
        let err = crate::migration::FnMigration::new(upgrade)
            .run(&mut collector)
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
