//! Baseline: the first registered version

use otelcol_api::Collector;

use crate::error::UpgradeError;
use crate::migration::Changes;

pub(super) fn upgrade(_collector: &mut Collector, _changes: &mut Changes) -> Result<(), UpgradeError> {
    Ok(())
}
