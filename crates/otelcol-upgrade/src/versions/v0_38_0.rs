//! 0.38.0: logging is configured through `service.telemetry.logs` instead of
//! command-line arguments

use otelcol_api::{tree, Collector};
use serde_json::Value;

use crate::error::UpgradeError;
use crate::migration::Changes;

const LOG_PROFILE: &str = "--log-profile";
const LOG_FORMAT: &str = "--log-format";
const LOG_LEVEL: &str = "--log-level";

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let args = &mut collector.spec.args;
    let profile = args.remove(LOG_PROFILE);
    let format = args.remove(LOG_FORMAT);
    let level = args.remove(LOG_LEVEL);
    if profile.is_none() && format.is_none() && level.is_none() {
        return Ok(());
    }

    let root = collector.spec.config.ensure_root_mut()?;
    let service = tree::ensure_child_map(root, "service", "")?;
    let telemetry = tree::ensure_child_map(service, "telemetry", "service")?;
    if telemetry.get("logs").is_some_and(|logs| !logs.is_null()) {
        changes.push(
            "upgrade to v0.38.0 dropped the logging arguments, service.telemetry.logs is already configured",
        );
        return Ok(());
    }

    let logs = tree::ensure_child_map(telemetry, "logs", "service.telemetry")?;
    if let Some(profile) = profile {
        logs.insert("development".into(), Value::Bool(profile != "prod"));
    }
    if let Some(format) = format {
        logs.insert("encoding".into(), Value::String(format));
    }
    if let Some(level) = level {
        logs.insert("level".into(), Value::String(level));
    }
    changes.push("upgrade to v0.38.0 moved the logging arguments into service.telemetry.logs");
    Ok(())
}
