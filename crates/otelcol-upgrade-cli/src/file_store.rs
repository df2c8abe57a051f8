//! YAML file backed resource store

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use otelcol_api::CollectorList;
use otelcol_upgrade::InMemoryStore;
use tracing::debug;

/// Collectors loaded from a YAML `CollectorList` file
///
/// The resources live in an [`InMemoryStore`] while the pass runs and are
/// written back with [`FileStore::save`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    store: Arc<InMemoryStore>,
}

impl FileStore {
    /// Load every collector in `path`
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not a collector list
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let list: CollectorList = serde_yaml::from_str(&raw)
            .with_context(|| format!("{} is not a collector list", path.display()))?;
        debug!(path = %path.display(), items = list.items.len(), "loaded collectors");

        Ok(Self {
            path,
            store: Arc::new(InMemoryStore::with_collectors(list.items)),
        })
    }

    /// Backing store
    #[inline]
    #[must_use]
    pub fn store(&self) -> Arc<InMemoryStore> {
        Arc::clone(&self.store)
    }

    /// Source file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents as YAML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> Result<String> {
        let list = CollectorList {
            items: self.store.snapshot(),
        };
        serde_yaml::to_string(&list).context("failed to serialize collectors")
    }

    /// Write the current contents back to the source file
    ///
    /// # Errors
    /// Returns error if serialization or the write fails
    pub fn save(&self) -> Result<()> {
        let yaml = self.to_yaml()?;
        std::fs::write(&self.path, yaml)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}
