use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, Product};
use crate::selection::SelectionStore;

/// Storage key for the persisted selection (`<key>.json` in the data
/// directory).
pub const STORAGE_KEY: &str = "selectedProducts";

/// Persists the selection across sessions.
///
/// Only product ids are written; they are re-resolved against the freshly
/// loaded catalog on the next start, so renamed or removed catalog entries
/// can never resurface with stale attributes.
#[derive(Debug, Clone)]
pub struct SelectionStorage {
    path: PathBuf,
}

impl SelectionStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(format!("{STORAGE_KEY}.json")),
        }
    }

    /// Default platform data directory for glow.
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glow")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the selected ids. Called after every mutating action and after
    /// each chat exchange completes.
    pub fn save(&self, selection: &SelectionStore) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let ids: Vec<u32> = selection.all().iter().map(|product| product.id).collect();
        let content = serde_json::to_string(&ids)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Read the stored ids and resolve them against `catalog`.
    ///
    /// A missing or malformed file is treated as "no stored selection"; ids
    /// that no longer resolve are dropped. Never fails startup.
    pub fn load(&self, catalog: &Catalog) -> Vec<Product> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::warn!("failed to read stored selection at {:?}: {err}", self.path);
                return Vec::new();
            }
        };

        let ids: Vec<u32> = match serde_json::from_str(&content) {
            Ok(ids) => ids,
            Err(err) => {
                tracing::warn!("malformed stored selection at {:?}: {err}", self.path);
                return Vec::new();
            }
        };

        let mut products = Vec::new();
        for id in ids {
            match catalog.get(id) {
                Some(product) => products.push(product.clone()),
                None => tracing::warn!("stored selection id {id} no longer in catalog; dropped"),
            }
        }
        products
    }
}
