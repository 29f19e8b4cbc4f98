//! Folio configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "folio.toml";

/// Top-level configuration (folio.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub i18n: I18nConfig,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file on disk
    #[default]
    File,
    /// Lives for one process only
    Memory,
    /// Nothing is kept
    None,
}

/// Where preferences are persisted
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Storage file; defaults to `<data dir>/folio/storage.json`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("folio").join("storage.json")))
    }
}

/// Defaults used when nothing is stored yet
#[derive(Debug, Deserialize, Serialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_theme")]
    pub default_theme: String,
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_language() -> String {
    "EN".to_string()
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            default_theme: default_theme(),
            default_language: default_language(),
        }
    }
}

/// Extra translation catalogs loaded over the built-in ones
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct I18nConfig {
    #[serde(default)]
    pub catalogs: Vec<CatalogConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CatalogConfig {
    pub locale: String,
    pub path: PathBuf,
}

impl FolioConfig {
    /// Load configuration from a file or a directory containing folio.toml.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            tracing::debug!("no config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let mut config: FolioConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        // Relative paths are relative to the config file.
        if let Some(base) = config_path.parent() {
            if let Some(p) = config.storage.path.as_mut() {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
            for catalog in &mut config.i18n.catalogs {
                if catalog.path.is_relative() {
                    catalog.path = base.join(&catalog.path);
                }
            }
        }

        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
