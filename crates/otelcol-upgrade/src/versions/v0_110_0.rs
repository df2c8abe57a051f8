//! 0.110.0: `component.UseLocalHostAsDefaultHost` can no longer be disabled

use otelcol_api::Collector;

use crate::error::UpgradeError;
use crate::feature_gates::remove_feature_gate;
use crate::migration::Changes;

const GATE: &str = "-component.UseLocalHostAsDefaultHost";

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    if remove_feature_gate(&mut collector.spec.args, GATE) {
        changes.push(format!("upgrade to v0.110.0 removed the feature gate {GATE}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::testing::run_idempotent;
    use otelcol_test_utils::collector_with_config;

    #[test]
    fn removes_gate() {
        let mut collector = collector_with_config("")
            .with_arg("feature-gates", "+foo,-component.UseLocalHostAsDefaultHost");
        let changes = run_idempotent(upgrade, &mut collector);
        assert_eq!(changes.len(), 1);
        assert_eq!(collector.spec.args["feature-gates"], "+foo");
    }
}
