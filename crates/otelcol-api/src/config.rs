//! Semi-structured collector configuration
//!
//! The embedded pipeline configuration is kept as a JSON value tree so that
//! migrations can rewrite shapes the typed model does not know about.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::component::{ComponentId, Section};
use crate::tree::{self, Map};

/// Embedded collector configuration
///
/// Serializes exactly as the underlying document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree(Value);

impl ConfigTree {
    /// Wrap an existing value
    #[inline]
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(yaml).map_err(ConfigError::InvalidYaml)?;
        Ok(Self(value))
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid
    #[inline]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json).map_err(ConfigError::InvalidJson)?;
        Ok(Self(value))
    }

    /// Serialize to YAML string
    ///
    /// # Errors
    /// Returns error if serialization fails
    #[inline]
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(&self.0).map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    /// Serialize to JSON string
    ///
    /// # Errors
    /// Returns error if serialization fails (rare for JSON)
    #[inline]
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(&self.0).map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    /// Underlying value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Consume into the underlying value
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// `true` for a `null` document or an empty map
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Get a value by JSON pointer; `null` counts as absent
    ///
    /// # Examples
    /// ```
    /// # use otelcol_api::ConfigTree;
    /// let tree = ConfigTree::from_yaml("extensions:\n  health_check:\n    port: 13133\n").unwrap();
    /// assert_eq!(tree.get("/extensions/health_check/port").and_then(|v| v.as_u64()), Some(13133));
    /// assert!(tree.get("/extensions/zpages").is_none());
    /// ```
    #[inline]
    #[must_use]
    pub fn get(&self, pointer: &str) -> Option<&Value> {
        self.0.pointer(pointer).filter(|value| !value.is_null())
    }

    /// Top-level map
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when the document is not a map.
    pub fn root(&self) -> Result<Option<&Map>, ConfigError> {
        tree::map_ref(&self.0, "config")
    }

    /// Mutable top-level map
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when the document is not a map.
    pub fn root_mut(&mut self) -> Result<Option<&mut Map>, ConfigError> {
        tree::map_of(&mut self.0, "config")
    }

    /// Mutable top-level map, turning a `null` document into an empty map
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when the document is not a map.
    pub fn ensure_root_mut(&mut self) -> Result<&mut Map, ConfigError> {
        if self.0.is_null() {
            self.0 = Value::Object(Map::new());
        }
        match &mut self.0 {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigError::unexpected("config", "map")),
        }
    }

    /// Component section, if present
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when the section is not a map.
    pub fn section(&self, section: Section) -> Result<Option<&Map>, ConfigError> {
        match self.root()?.and_then(|root| root.get(section.key())) {
            Some(value) => tree::map_ref(value, section.key()),
            None => Ok(None),
        }
    }

    /// Mutable component section, if present
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when the section is not a map.
    pub fn section_mut(&mut self, section: Section) -> Result<Option<&mut Map>, ConfigError> {
        match self.root_mut()? {
            Some(root) => tree::child_map_mut(root, section.key(), ""),
            None => Ok(None),
        }
    }

    /// `service` block, if present
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when `service` is not a map.
    pub fn service(&self) -> Result<Option<&Map>, ConfigError> {
        match self.root()?.and_then(|root| root.get("service")) {
            Some(value) => tree::map_ref(value, "service"),
            None => Ok(None),
        }
    }

    /// Mutable `service` block, if present
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when `service` is not a map.
    pub fn service_mut(&mut self) -> Result<Option<&mut Map>, ConfigError> {
        match self.root_mut()? {
            Some(root) => tree::child_map_mut(root, "service", ""),
            None => Ok(None),
        }
    }

    /// Mutable `service.pipelines`, if present
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when a level on the path is not a map.
    pub fn pipelines_mut(&mut self) -> Result<Option<&mut Map>, ConfigError> {
        match self.service_mut()? {
            Some(service) => tree::child_map_mut(service, "pipelines", "service"),
            None => Ok(None),
        }
    }

    /// Mutable `service.telemetry`, if present
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when a level on the path is not a map.
    pub fn telemetry_mut(&mut self) -> Result<Option<&mut Map>, ConfigError> {
        match self.service_mut()? {
            Some(service) => tree::child_map_mut(service, "telemetry", "service"),
            None => Ok(None),
        }
    }

    /// Rename every component of `section` whose base kind is `from`
    ///
    /// Bare and qualified identifiers are renamed together with every
    /// reference to them. Returns the `(old, new)` identifier pairs.
    ///
    /// Nothing is renamed when any new identifier is already defined.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when the section or a
    /// reference list has the wrong shape, and [`ConfigError::NameCollision`]
    /// when a new identifier is taken.
    pub fn rename_component_kind(
        &mut self,
        section: Section,
        from: &str,
        to: &str,
    ) -> Result<Vec<(String, String)>, ConfigError> {
        let Some(components) = self.section_mut(section)? else {
            return Ok(Vec::new());
        };

        let renamed: Vec<(String, String)> = components
            .keys()
            .filter(|key| ComponentId::kind_of(key) == from)
            .map(|key| (key.clone(), format!("{to}{}", &key[from.len()..])))
            .collect();
        if renamed.is_empty() || from == to {
            return Ok(Vec::new());
        }
        if let Some((old, new)) = renamed.iter().find(|(_, new)| components.contains_key(new)) {
            return Err(ConfigError::NameCollision {
                section: section.key(),
                from: old.clone(),
                to: new.clone(),
            });
        }
        for (old, new) in &renamed {
            tree::rename_key(components, old, new);
        }

        {
            let lookup: HashMap<&str, &str> = renamed
                .iter()
                .map(|(old, new)| (old.as_str(), new.as_str()))
                .collect();
            for list in self.reference_lists_mut(section)? {
                for entry in list.iter_mut() {
                    if let Some(new) = entry.as_str().and_then(|id| lookup.get(id)) {
                        *entry = Value::String((*new).to_string());
                    }
                }
            }
        }
        Ok(renamed)
    }

    /// Remove a component and every reference to it
    ///
    /// Returns `true` when anything was removed.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when the section or a
    /// reference list has the wrong shape.
    pub fn remove_component(&mut self, section: Section, id: &str) -> Result<bool, ConfigError> {
        let mut removed = match self.section_mut(section)? {
            Some(components) => tree::remove_key(components, id).is_some(),
            None => false,
        };
        for list in self.reference_lists_mut(section)? {
            let before = list.len();
            list.retain(|entry| entry.as_str() != Some(id));
            removed |= list.len() != before;
        }
        Ok(removed)
    }

    /// Pipeline and service references without a matching component
    ///
    /// # Errors
    /// Returns [`ConfigError::UnexpectedKind`] when the tree has the wrong shape.
    pub fn dangling_references(&self) -> Result<Vec<DanglingReference>, ConfigError> {
        let mut dangling = Vec::new();
        let Some(service) = self.service()? else {
            return Ok(dangling);
        };

        let defined = |section: Section, id: &str| -> Result<bool, ConfigError> {
            Ok(self
                .section(section)?
                .is_some_and(|components| components.contains_key(id)))
        };

        if let Some(extensions) = service.get("extensions") {
            for id in string_entries(extensions, "service.extensions")? {
                if !defined(Section::Extensions, id)? {
                    dangling.push(DanglingReference::new(None, "extensions", id));
                }
            }
        }

        let pipelines = match service.get("pipelines") {
            Some(value) => tree::map_ref(value, "service.pipelines")?,
            None => None,
        };
        for (name, pipeline) in pipelines.into_iter().flatten() {
            let path = tree::join("service.pipelines", name);
            let Some(pipeline) = tree::map_ref(pipeline, &path)? else {
                continue;
            };
            for (list, sections) in [
                ("receivers", &[Section::Receivers, Section::Connectors][..]),
                ("processors", &[Section::Processors][..]),
                ("exporters", &[Section::Exporters, Section::Connectors][..]),
            ] {
                let Some(entries) = pipeline.get(list) else {
                    continue;
                };
                for id in string_entries(entries, &tree::join(&path, list))? {
                    let mut found = false;
                    for section in sections {
                        found |= defined(*section, id)?;
                    }
                    if !found {
                        dangling.push(DanglingReference::new(Some(name.clone()), list, id));
                    }
                }
            }
        }
        Ok(dangling)
    }

    /// Reference lists that may point into `section`
    fn reference_lists_mut(&mut self, section: Section) -> Result<Vec<&mut Vec<Value>>, ConfigError> {
        let mut lists = Vec::new();
        let Some(service) = self.service_mut()? else {
            return Ok(lists);
        };

        if section == Section::Extensions {
            if let Some(value) = service.get_mut("extensions") {
                if let Some(list) = tree::string_list_mut(value, "service.extensions")? {
                    lists.push(list);
                }
            }
            return Ok(lists);
        }

        let Some(pipelines) = tree::child_map_mut(service, "pipelines", "service")? else {
            return Ok(lists);
        };
        for (name, pipeline) in pipelines.iter_mut() {
            let path = tree::join("service.pipelines", name);
            let Some(pipeline) = tree::map_of(pipeline, &path)? else {
                continue;
            };
            for (list_name, value) in pipeline.iter_mut() {
                if !section.pipeline_lists().contains(&list_name.as_str()) {
                    continue;
                }
                if let Some(list) = tree::string_list_mut(value, &tree::join(&path, list_name))? {
                    lists.push(list);
                }
            }
        }
        Ok(lists)
    }
}

impl From<Value> for ConfigTree {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn string_entries<'a>(value: &'a Value, path: &str) -> Result<Vec<&'a str>, ConfigError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| ConfigError::unexpected(path, "list of strings"))
            })
            .collect(),
        _ => Err(ConfigError::unexpected(path, "list of strings")),
    }
}

/// A reference that names no defined component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Pipeline holding the reference; `None` for `service.extensions`
    pub pipeline: Option<String>,
    /// Reference list (`receivers`, `processors`, `exporters`, `extensions`)
    pub list: String,
    /// Referenced identifier
    pub id: String,
}

impl DanglingReference {
    fn new(pipeline: Option<String>, list: &str, id: &str) -> Self {
        Self {
            pipeline,
            list: list.to_string(),
            id: id.to_string(),
        }
    }
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pipeline {
            Some(pipeline) => write!(f, "{} in pipeline {} {}", self.id, pipeline, self.list),
            None => write!(f, "{} in service {}", self.id, self.list),
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Document is not valid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Document is not valid YAML
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Document could not be emitted
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A rename would replace an existing component
    #[error("cannot rename {section} {from} to {to}: {to} is already defined")]
    NameCollision {
        /// Section key
        section: &'static str,
        /// Identifier being renamed
        from: String,
        /// Identifier already in use
        to: String,
    },

    /// A node exists but has the wrong kind
    #[error("expected {expected} at {path}")]
    UnexpectedKind {
        /// Dotted location of the node
        path: String,
        /// Kind the caller required
        expected: &'static str,
    },
}

impl ConfigError {
    /// Wrong-kind error at `path`
    #[must_use]
    pub fn unexpected(path: impl Into<String>, expected: &'static str) -> Self {
        Self::UnexpectedKind {
            path: path.into(),
            expected,
        }
    }
}
