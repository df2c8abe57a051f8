//! Named structural edits over configuration maps
//!
//! Every helper takes the dotted path of the map it operates on so that a
//! wrong-kind value can be reported with its location.

use serde_json::Value;

use crate::config::ConfigError;

/// Map node of the configuration tree
pub type Map = serde_json::Map<String, Value>;

/// Join a dotted path with a child key
#[must_use]
pub fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// View a value as a map
///
/// `null` is treated as absent.
///
/// # Errors
/// Returns [`ConfigError::UnexpectedKind`] when the value is neither `null` nor a map.
pub fn map_of<'a>(value: &'a mut Value, path: &str) -> Result<Option<&'a mut Map>, ConfigError> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(ConfigError::unexpected(path, "map")),
    }
}

/// Read-only variant of [`map_of`]
///
/// # Errors
/// Returns [`ConfigError::UnexpectedKind`] when the value is neither `null` nor a map.
pub fn map_ref<'a>(value: &'a Value, path: &str) -> Result<Option<&'a Map>, ConfigError> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(ConfigError::unexpected(path, "map")),
    }
}

/// Optional child map
///
/// # Errors
/// Returns [`ConfigError::UnexpectedKind`] when the child exists and is not a map.
pub fn child_map_mut<'a>(
    map: &'a mut Map,
    key: &str,
    path: &str,
) -> Result<Option<&'a mut Map>, ConfigError> {
    match map.get_mut(key) {
        Some(value) => map_of(value, &join(path, key)),
        None => Ok(None),
    }
}

/// Child map, created empty when absent or `null`
///
/// # Errors
/// Returns [`ConfigError::UnexpectedKind`] when the child exists and is not a map.
pub fn ensure_child_map<'a>(
    map: &'a mut Map,
    key: &str,
    path: &str,
) -> Result<&'a mut Map, ConfigError> {
    let slot = map.entry(key).or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(child) => Ok(child),
        _ => Err(ConfigError::unexpected(join(path, key), "map")),
    }
}

/// Move the value under `from` to `to`
///
/// An existing value under `to` is replaced. Returns `false` when `from` is absent.
pub fn rename_key(map: &mut Map, from: &str, to: &str) -> bool {
    if from == to {
        return false;
    }
    match map.remove(from) {
        Some(value) => {
            map.insert(to.to_string(), value);
            true
        }
        None => false,
    }
}

/// Remove a key, returning its value
pub fn remove_key(map: &mut Map, key: &str) -> Option<Value> {
    map.remove(key)
}

/// Move the listed keys that are present into a new map
pub fn take_keys(map: &mut Map, keys: &[&str]) -> Map {
    let mut taken = Map::new();
    for key in keys {
        if let Some(value) = map.remove(*key) {
            taken.insert((*key).to_string(), value);
        }
    }
    taken
}

/// String entries of a reference list
///
/// # Errors
/// Returns [`ConfigError::UnexpectedKind`] when the value is not a list of strings.
pub fn string_list_mut<'a>(
    value: &'a mut Value,
    path: &str,
) -> Result<Option<&'a mut Vec<Value>>, ConfigError> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => {
            if items.iter().all(Value::is_string) {
                Ok(Some(items))
            } else {
                Err(ConfigError::unexpected(path, "list of strings"))
            }
        }
        _ => Err(ConfigError::unexpected(path, "list of strings")),
    }
}
