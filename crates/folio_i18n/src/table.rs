use std::fs;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::catalog::{Catalog, Entry};
use crate::locale::normalize_locale;
use crate::I18nError;

const BUILTIN_CATALOGS: [(&str, &str); 2] = [
    ("EN", include_str!("../locales/EN.yaml")),
    ("ID", include_str!("../locales/ID.yaml")),
];

/// Locale code -> nested string catalog.
#[derive(Clone, Debug, Default)]
pub struct TranslationTable {
    locales: IndexMap<String, Catalog>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled `EN` and `ID` catalogs.
    pub fn builtin() -> Result<Self, I18nError> {
        let mut table = Self::new();
        for (locale, src) in BUILTIN_CATALOGS {
            table.load_yaml_str(locale, src)?;
        }
        Ok(table)
    }

    /// Install a catalog, replacing any existing one for the locale.
    pub fn insert_locale(&mut self, locale: &str, catalog: Catalog) {
        let loc = normalize_locale(locale);
        debug!(locale = %loc, keys = catalog.key_paths().len(), "loaded catalog");
        self.locales.insert(loc, catalog);
    }

    /// Parse and install a YAML catalog for a locale.
    pub fn load_yaml_str(&mut self, locale: &str, src: &str) -> Result<(), I18nError> {
        let catalog = Catalog::parse_yaml(locale, src)?;
        self.insert_locale(locale, catalog);
        Ok(())
    }

    /// Read, parse and install a YAML catalog file for a locale.
    pub fn load_yaml_file(&mut self, locale: &str, path: &Path) -> Result<(), I18nError> {
        let src = fs::read_to_string(path).map_err(|source| I18nError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_yaml_str(locale, &src)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    pub fn catalog(&self, locale: &str) -> Option<&Catalog> {
        self.locales.get(&normalize_locale(locale))
    }

    /// Look up a dotted key, `None` unless it ends at a non-empty string.
    pub fn lookup(&self, locale: &str, dotted_key: &str) -> Option<&str> {
        let mut node = self.catalog(locale)?;
        let mut segments = dotted_key.split('.').peekable();
        while let Some(seg) = segments.next() {
            let entry = node.get(seg)?;
            if segments.peek().is_none() {
                return entry.as_text().filter(|s| !s.is_empty());
            }
            node = entry.as_group()?;
        }
        None
    }

    /// Translate a dotted key, falling back to the key itself.
    ///
    /// Missing segments, unknown locales, paths ending at a group and empty
    /// strings all yield `dotted_key` unchanged, so gaps stay visible.
    pub fn resolve<'a>(&'a self, locale: &str, dotted_key: &'a str) -> &'a str {
        match self.lookup(locale, dotted_key) {
            Some(s) => s,
            None => {
                trace!(locale, key = dotted_key, "missing translation");
                dotted_key
            }
        }
    }

    /// Every string leaf path of a locale, in source order.
    pub fn key_paths(&self, locale: &str) -> Vec<String> {
        self.catalog(locale)
            .map(Catalog::key_paths)
            .unwrap_or_default()
    }

    /// Compare locales against each other.
    ///
    /// Every locale should provide every key any other locale provides.
    pub fn check_parity(&self) -> ParityReport {
        let mut all: IndexSet<String> = IndexSet::new();
        let per_locale: Vec<(&str, IndexSet<String>)> = self
            .locales
            .iter()
            .map(|(loc, cat)| {
                let keys: IndexSet<String> = cat.key_paths().into_iter().collect();
                all.extend(keys.iter().cloned());
                (loc.as_str(), keys)
            })
            .collect();

        let mut missing = IndexMap::new();
        for (loc, keys) in per_locale {
            let gaps: Vec<String> = all.iter().filter(|k| !keys.contains(*k)).cloned().collect();
            if !gaps.is_empty() {
                missing.insert(loc.to_string(), gaps);
            }
        }
        ParityReport { missing }
    }

    /// Bind the table to a locale.
    pub fn translator(&self, locale: &str) -> Translator<'_> {
        Translator {
            table: self,
            locale: normalize_locale(locale),
        }
    }
}

/// Key paths each locale lacks relative to the union of all locales.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParityReport {
    pub missing: IndexMap<String, Vec<String>>,
}

impl ParityReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn missing_in(&self, locale: &str) -> &[String] {
        self.missing
            .get(&normalize_locale(locale))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// A [`TranslationTable`] bound to one locale.
#[derive(Clone, Debug)]
pub struct Translator<'a> {
    table: &'a TranslationTable,
    locale: String,
}

impl<'a> Translator<'a> {
    pub fn t<'k>(&self, dotted_key: &'k str) -> &'k str
    where
        'a: 'k,
    {
        self.table.resolve(&self.locale, dotted_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> TranslationTable {
        let mut t = TranslationTable::new();
        t.load_yaml_str(
            "EN",
            r#"
nav:
  home: "Home"
  about: "About"
empty: ""
"#,
        )
        .unwrap();
        t.load_yaml_str(
            "id",
            r#"
nav:
  home: "Beranda"
"#,
        )
        .unwrap();
        t
    }

    #[test]
    fn resolves_leaves() {
        let t = table();
        assert_eq!(t.resolve("EN", "nav.home"), "Home");
        assert_eq!(t.resolve("ID", "nav.home"), "Beranda");
        assert_eq!(t.resolve("en", "nav.about"), "About");
    }

    #[test]
    fn falls_back_to_key() {
        let t = table();
        assert_eq!(t.resolve("EN", "nav.nonexistent"), "nav.nonexistent");
        assert_eq!(t.resolve("EN", "nav"), "nav");
        assert_eq!(t.resolve("EN", "nav.home.deeper"), "nav.home.deeper");
        assert_eq!(t.resolve("EN", "nav..home"), "nav..home");
        assert_eq!(t.resolve("EN", ""), "");
        assert_eq!(t.resolve("EN", "empty"), "empty");
        assert_eq!(t.resolve("FR", "nav.home"), "nav.home");
    }

    #[test]
    fn later_load_replaces_locale() {
        let mut t = table();
        t.load_yaml_str("EN", "nav:\n  home: \"Start\"\n").unwrap();
        assert_eq!(t.resolve("EN", "nav.home"), "Start");
        assert_eq!(t.resolve("EN", "nav.about"), "nav.about");
    }

    #[test]
    fn parity_lists_gaps_per_locale() {
        let report = table().check_parity();
        assert!(!report.is_complete());
        assert_eq!(report.missing_in("ID"), ["nav.about", "empty"]);
        assert!(report.missing_in("EN").is_empty());
    }

    #[test]
    fn translator_uses_bound_locale() {
        let t = table();
        let tr = t.translator("id");
        assert_eq!(tr.t("nav.home"), "Beranda");
        assert_eq!(tr.t("nav.about"), "nav.about");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fr.yaml");
        fs::write(&path, "nav:\n  home: \"Accueil\"\n").unwrap();

        let mut t = table();
        t.load_yaml_file("fr", &path).unwrap();
        assert_eq!(t.resolve("FR", "nav.home"), "Accueil");

        let err = t
            .load_yaml_file("de", &dir.path().join("missing.yaml"))
            .unwrap_err();
        assert!(matches!(err, I18nError::Io { .. }));
    }
}
