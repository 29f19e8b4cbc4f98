//! Application context
//!
//! Owns one store per preference kind plus the string and project tables, and
//! is handed to every command. Nothing here is global; tests build their own.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use folio_content::ProjectCatalog;
use folio_core::{
    FileStorage, Language, MemoryStorage, NullStorage, PreferenceStore, PreferenceValue, Storage,
    Theme,
};
use folio_i18n::{TranslationTable, Translator};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::{FolioConfig, StorageBackend};

/// Attribute the theme is mirrored to on the document root.
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// Document-level attributes driven by preferences.
#[derive(Clone, Debug, Default)]
pub struct DocumentAttributes {
    attrs: Arc<Mutex<IndexMap<String, String>>>,
}

impl DocumentAttributes {
    pub fn set(&self, name: &str, value: &str) {
        self.attrs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.attrs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

pub struct AppContext {
    pub theme: PreferenceStore,
    pub language: PreferenceStore,
    pub translations: TranslationTable,
    pub projects: ProjectCatalog,
    pub document: DocumentAttributes,
}

impl AppContext {
    /// Build the context from configuration.
    pub fn from_config(config: &FolioConfig) -> Result<Self> {
        let storage = open_storage(config);

        let theme_def = Theme::definition()
            .with_default(&config.preferences.default_theme.to_ascii_lowercase())
            .context("Invalid preferences.default_theme")?;
        let language_def = Language::definition()
            .with_default(&config.preferences.default_language.to_ascii_uppercase())
            .context("Invalid preferences.default_language")?;

        let mut translations = TranslationTable::builtin()?;
        for catalog in &config.i18n.catalogs {
            translations
                .load_yaml_file(&catalog.locale, &catalog.path)
                .with_context(|| format!("Failed to load catalog {}", catalog.path.display()))?;
        }

        Ok(Self::assemble(
            PreferenceStore::init(theme_def, Arc::clone(&storage)),
            PreferenceStore::init(language_def, storage),
            translations,
            ProjectCatalog::builtin()?,
        ))
    }

    /// Context over the given storage with built-in defaults and tables.
    pub fn with_storage(storage: Arc<dyn Storage>) -> Result<Self> {
        Ok(Self::assemble(
            PreferenceStore::for_kind::<Theme>(Arc::clone(&storage)),
            PreferenceStore::for_kind::<Language>(storage),
            TranslationTable::builtin()?,
            ProjectCatalog::builtin()?,
        ))
    }

    fn assemble(
        theme: PreferenceStore,
        language: PreferenceStore,
        translations: TranslationTable,
        projects: ProjectCatalog,
    ) -> Self {
        let document = DocumentAttributes::default();
        let attrs = document.clone();
        theme
            .subscribe(move |value| attrs.set(THEME_ATTRIBUTE, value))
            .detach();

        Self {
            theme,
            language,
            translations,
            projects,
            document,
        }
    }

    /// Translator for the current language.
    pub fn translator(&self) -> Translator<'_> {
        self.translations.translator(&self.language.get())
    }

    /// Translate a key in the current language.
    pub fn t(&self, key: &str) -> String {
        self.translator().t(key).to_string()
    }
}

fn open_storage(config: &FolioConfig) -> Arc<dyn Storage> {
    match config.storage.backend {
        StorageBackend::File => match config.storage.resolved_path() {
            Some(path) => {
                debug!("using storage file {}", path.display());
                Arc::new(FileStorage::new(path))
            }
            None => {
                warn!("no data directory found, preferences will not be kept");
                Arc::new(MemoryStorage::new())
            }
        },
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::None => Arc::new(NullStorage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn theme_changes_update_document_attribute() {
        let ctx = AppContext::with_storage(Arc::new(MemoryStorage::new())).unwrap();
        assert_eq!(ctx.document.get(THEME_ATTRIBUTE).as_deref(), Some("dark"));

        ctx.theme.set("light").unwrap();
        assert_eq!(ctx.document.get(THEME_ATTRIBUTE).as_deref(), Some("light"));

        ctx.theme.toggle();
        assert_eq!(ctx.document.get(THEME_ATTRIBUTE).as_deref(), Some("dark"));
    }

    #[test]
    fn translation_follows_language() {
        let ctx = AppContext::with_storage(Arc::new(MemoryStorage::new())).unwrap();
        assert_eq!(ctx.t("nav.home"), "Home");

        ctx.language.toggle();
        assert_eq!(ctx.t("nav.home"), "Beranda");
        assert_eq!(ctx.t("nav.nonexistent"), "nav.nonexistent");
    }

    #[test]
    fn config_defaults_and_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FolioConfig::default();
        config.storage.path = Some(dir.path().join("storage.json"));
        config.preferences.default_theme = "Light".into();
        config.preferences.default_language = "id".into();

        let ctx = AppContext::from_config(&config).unwrap();
        assert_eq!(ctx.theme.get(), "light");
        assert_eq!(ctx.language.get(), "ID");

        ctx.theme.set("dark").unwrap();
        let again = AppContext::from_config(&config).unwrap();
        assert_eq!(again.theme.get(), "dark");
    }

    #[test]
    fn bad_default_is_reported() {
        let mut config = FolioConfig::default();
        config.storage.backend = StorageBackend::None;
        config.preferences.default_theme = "sepia".into();
        assert!(AppContext::from_config(&config).is_err());
    }

    #[test]
    fn extra_catalogs_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fr.yaml");
        fs::write(&path, "nav:\n  home: \"Accueil\"\n").unwrap();

        let mut config = FolioConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.i18n.catalogs.push(CatalogConfig {
            locale: "fr".into(),
            path,
        });

        let ctx = AppContext::from_config(&config).unwrap();
        assert_eq!(ctx.translations.resolve("FR", "nav.home"), "Accueil");
    }
}
