//! 0.39.0: memory_limiter lost `ballast_size_mib` and the httpd receiver was
//! renamed to apache

use otelcol_api::{tree, Collector, Section};

use super::of_kind;
use crate::error::UpgradeError;
use crate::migration::Changes;

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let config = &mut collector.spec.config;

    if let Some(processors) = config.section_mut(Section::Processors)? {
        for (id, processor) in of_kind(processors, "memory_limiter") {
            let Some(processor) = tree::map_of(processor, &tree::join("processors", id))? else {
                continue;
            };
            if tree::remove_key(processor, "ballast_size_mib").is_some() {
                changes.push(format!(
                    "upgrade to v0.39.0 has dropped the ballast_size_mib field name from {id} processor"
                ));
            }
        }
    }

    for (old, new) in config.rename_component_kind(Section::Receivers, "httpd", "apache")? {
        changes.push(format!("upgrade to v0.39.0 has renamed the {old} receiver to {new}"));
    }
    Ok(())
}
