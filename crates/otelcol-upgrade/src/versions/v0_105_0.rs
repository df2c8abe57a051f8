//! 0.105.0: `confmap.unifyEnvVarExpansion` can no longer be disabled

use otelcol_api::Collector;

use crate::error::UpgradeError;
use crate::feature_gates::remove_feature_gate;
use crate::migration::Changes;

const GATE: &str = "-confmap.unifyEnvVarExpansion";

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    if remove_feature_gate(&mut collector.spec.args, GATE) {
        changes.push(format!("upgrade to v0.105.0 removed the feature gate {GATE}"));
    }
    Ok(())
}
