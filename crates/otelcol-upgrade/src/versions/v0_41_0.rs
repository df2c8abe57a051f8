//! 0.41.0: the otlp receiver's HTTP CORS settings moved into a `cors` block

use otelcol_api::{tree, Collector, Section};

use super::of_kind;
use crate::error::UpgradeError;
use crate::migration::Changes;

const CORS_KEYS: [(&str, &str); 2] = [
    ("cors_allowed_origins", "allowed_origins"),
    ("cors_allowed_headers", "allowed_headers"),
];

pub(super) fn upgrade(collector: &mut Collector, changes: &mut Changes) -> Result<(), UpgradeError> {
    let Some(receivers) = collector.spec.config.section_mut(Section::Receivers)? else {
        return Ok(());
    };

    for (id, receiver) in of_kind(receivers, "otlp") {
        let path = tree::join("receivers", id);
        let Some(receiver) = tree::map_of(receiver, &path)? else {
            continue;
        };
        let Some(protocols) = tree::child_map_mut(receiver, "protocols", &path)? else {
            continue;
        };
        let path = tree::join(&path, "protocols");
        let Some(http) = tree::child_map_mut(protocols, "http", &path)? else {
            continue;
        };
        let path = tree::join(&path, "http");

        let mut moved = Vec::new();
        for (old, new) in CORS_KEYS {
            if let Some(value) = tree::remove_key(http, old) {
                moved.push((new, value));
            }
        }
        if moved.is_empty() {
            continue;
        }
        let cors = tree::ensure_child_map(http, "cors", &path)?;
        for (key, value) in moved {
            cors.insert(key.to_string(), value);
        }
        changes.push(format!(
            "upgrade to v0.41.0 has re-structured the cors_allowed_origins and cors_allowed_headers inside {id} receiver config into the cors block"
        ));
    }
    Ok(())
}
