//! Plain-text rendering of a fleet pass

use std::fmt::Write;

use otelcol_upgrade::{Event, FleetReport};

/// Render the outcome of a pass followed by its audit events
#[must_use]
pub fn render(report: &FleetReport, events: &[Event]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Upgrade Report");
    let _ = writeln!(out, "==============");
    let _ = writeln!(out, "  Upgraded: {}", report.upgraded.len());
    let _ = writeln!(out, "  Unchanged: {}", report.unchanged.len());
    let _ = writeln!(out, "  Skipped: {}", report.skipped.len());
    let _ = writeln!(out, "  Failed: {}", report.failed.len());

    for failed in &report.failed {
        let _ = writeln!(out, "  ✗ {}: {}", failed.object, failed.error);
    }
    if !events.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Events:");
        for event in events {
            let _ = writeln!(out, "  {event}");
        }
    }
    out
}
