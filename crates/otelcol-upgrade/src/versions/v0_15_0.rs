//! 0.15.0: the metrics flags were removed from the collector command line

use otelcol_api::Collector;

use crate::error::UpgradeError;
use crate::migration::Changes;

const REMOVED_ARGS: [&str; 2] = ["--new-metrics", "--legacy-metrics"];

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    for arg in REMOVED_ARGS {
        if collector.spec.args.remove(arg).is_some() {
            changes.push(format!("upgrade to v0.15.0 dropped the deprecated {arg} argument"));
        }
    }
    Ok(())
}
