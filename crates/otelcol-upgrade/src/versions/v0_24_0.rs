//! 0.24.0: the health_check extension takes a single `endpoint` instead of
//! `port`

use otelcol_api::{tree, Collector, ConfigError, Section};
use serde_json::Value;

use super::{join_host_port, of_kind, split_host_port};
use crate::error::UpgradeError;
use crate::migration::Changes;

const DEFAULT_HOST: &str = "0.0.0.0";

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let Some(extensions) = collector.spec.config.section_mut(Section::Extensions)? else {
        return Ok(());
    };

    for (id, extension) in of_kind(extensions, "health_check") {
        let path = tree::join("extensions", id);
        let Some(extension) = tree::map_of(extension, &path)? else {
            continue;
        };
        let port = match extension.get("port") {
            None | Some(Value::Null) => continue,
            Some(Value::Number(port)) => port.to_string(),
            Some(Value::String(port)) => port.clone(),
            Some(_) => return Err(ConfigError::unexpected(tree::join(&path, "port"), "port").into()),
        };

        let host = match extension.get("endpoint").and_then(Value::as_str) {
            Some(endpoint) if !endpoint.is_empty() => match split_host_port(endpoint) {
                Some((host, existing)) if existing.chars().all(|c| c.is_ascii_digit()) => host.to_string(),
                _ => endpoint
                    .strip_prefix('[')
                    .and_then(|h| h.strip_suffix(']'))
                    .unwrap_or(endpoint)
                    .to_string(),
            },
            _ => DEFAULT_HOST.to_string(),
        };

        tree::remove_key(extension, "port");
        extension.insert("endpoint".into(), Value::String(join_host_port(&host, &port)));
        changes.push(format!(
            "upgrade to v0.24.0 merged the port into the endpoint of extension {id:?}"
        ));
    }
    Ok(())
}
