//! 0.9.0: the opencensus exporter no longer accepts `reconnection_delay`

use otelcol_api::{tree, Collector, Section};

use super::of_kind;
use crate::error::UpgradeError;
use crate::migration::Changes;

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let Some(exporters) = collector.spec.config.section_mut(Section::Exporters)? else {
        return Ok(());
    };

    for (id, exporter) in of_kind(exporters, "opencensus") {
        let Some(exporter) = tree::map_of(exporter, &tree::join("exporters", id))? else {
            continue;
        };
        if tree::remove_key(exporter, "reconnection_delay").is_some() {
            changes.push(format!(
                "upgrade to v0.9.0 removed the property reconnection_delay for exporter {id:?}"
            ));
        }
    }
    Ok(())
}
