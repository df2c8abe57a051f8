//! 0.61.0: the jaeger receiver dropped `remote_sampling`
//!
//! The setting moved to a separate extension with a different shape, so the
//! step stops and asks for manual intervention instead of dropping it.

use otelcol_api::{tree, Collector, Section};
use serde_json::Value;

use super::of_kind;
use crate::error::UpgradeError;
use crate::migration::Changes;

pub(super) fn upgrade(collector: &mut Collector, _changes: &mut Changes) -> Result<(), UpgradeError> {
    let Some(receivers) = collector.spec.config.section_mut(Section::Receivers)? else {
        return Ok(());
    };

    for (id, receiver) in of_kind(receivers, "jaeger") {
        let Some(receiver) = tree::map_of(receiver, &tree::join("receivers", id))? else {
            continue;
        };
        if receiver.get("remote_sampling").is_some_and(|v| !Value::is_null(v)) {
            return Err(UpgradeError::manual_intervention(
                format!("receiver {id}"),
                "jaeger remote_sampling is no longer supported, configure the jaegerremotesampling extension instead",
            ));
        }
    }
    Ok(())
}
