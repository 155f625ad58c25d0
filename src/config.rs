use serde::Deserialize;
use std::{env, path::PathBuf};

use crate::storage::SelectionStorage;

/// Public chat-completion relay used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://divine-frog-0677.huangyx1113.workers.dev";

const DEFAULT_CATALOG_PATH: &str = "products.json";

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct GlowConfig {
    /// Chat-completion endpoint URL.
    pub endpoint: String,
    /// Path to the product catalog JSON document.
    pub catalog_path: PathBuf,
    /// Directory holding the persisted selection.
    pub data_dir: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api: Option<ApiSection>,
    catalog: Option<CatalogSection>,
    storage: Option<StorageSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSection {
    endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageSection {
    dir: Option<PathBuf>,
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut i = 0;

    while i < value.len() {
        if value[i..].starts_with("${") {
            let start = i + 2;
            if let Some(end_rel) = value[start..].find('}') {
                let end = start + end_rel;
                let var = &value[start..end];
                if !var.is_empty() {
                    let replacement = env::var(var).unwrap_or_default();
                    out.push_str(&replacement);
                }
                i = end + 1;
                continue;
            }
        }

        let ch = value[i..].chars().next().unwrap_or('\0');
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}

impl GlowConfig {
    /// Load `~/.glow/config.toml` if present and overlay it on the defaults.
    /// A missing or unparseable file is not an error.
    pub fn resolve() -> Self {
        let file = Self::load_file().unwrap_or_default();

        let endpoint = file
            .api
            .and_then(|api| api.endpoint)
            .map(|raw| expand_env_vars(&raw))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let catalog_path = file
            .catalog
            .and_then(|catalog| catalog.path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH));

        let data_dir = file
            .storage
            .and_then(|storage| storage.dir)
            .unwrap_or_else(SelectionStorage::default_dir);

        Self {
            endpoint,
            catalog_path,
            data_dir,
        }
    }

    fn load_file() -> Option<ConfigFile> {
        let path = config_path()?;
        if !path.exists() {
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return None;
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                None
            }
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".glow").join("config.toml"))
}
