//! 0.104.0: components default to listening on localhost
//!
//! The gate is disabled so existing collectors keep listening on all
//! interfaces.

use otelcol_api::Collector;

use crate::error::UpgradeError;
use crate::feature_gates::add_feature_gate;
use crate::migration::Changes;

const GATE: &str = "-component.UseLocalHostAsDefaultHost";

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    if add_feature_gate(&mut collector.spec.args, GATE) {
        changes.push(format!(
            "upgrade to v0.104.0 added the feature gate {GATE} to keep listening on all interfaces"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::testing::run_idempotent;
    use otelcol_test_utils::collector_with_config;

    #[test]
    fn disables_localhost_default() {
        let mut collector = collector_with_config("").with_arg("feature-gates", "+foo");
        run_idempotent(upgrade, &mut collector);
        assert_eq!(
            collector.spec.args["feature-gates"],
            "+foo,-component.UseLocalHostAsDefaultHost"
        );
    }

    #[test]
    fn explicit_enable_is_kept() {
        let mut collector =
            collector_with_config("").with_arg("feature-gates", "+component.UseLocalHostAsDefaultHost");
        assert!(run_idempotent(upgrade, &mut collector).is_empty());
    }
}
