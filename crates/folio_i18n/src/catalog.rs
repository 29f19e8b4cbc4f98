use indexmap::IndexMap;
use serde_yaml::Value;

use crate::I18nError;

const MAX_CATALOG_ENTRIES: usize = 10_000;
const MAX_DEPTH: usize = 16;
const MAX_KEY_BYTES: usize = 128;
const MAX_VALUE_BYTES: usize = 16 * 1024;

/// A node in a locale's string tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    Text(String),
    Group(Catalog),
}

impl Entry {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Entry::Text(s) => Some(s),
            Entry::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Catalog> {
        match self {
            Entry::Group(g) => Some(g),
            Entry::Text(_) => None,
        }
    }
}

/// The strings of one locale, nested by key segment. Keeps source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    entries: IndexMap<String, Entry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, segment: &str) -> Option<&Entry> {
        self.entries.get(segment)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every string leaf as a dotted path, in source order.
    pub fn key_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_paths(self, &mut String::new(), &mut out);
        out
    }

    /// Parse a YAML mapping of string leaves and nested mappings.
    pub fn parse_yaml(locale: &str, src: &str) -> Result<Self, I18nError> {
        let value: Value = serde_yaml::from_str(src).map_err(|source| I18nError::Yaml {
            locale: locale.to_string(),
            source,
        })?;

        let mut parser = Parser {
            locale,
            leaves: 0,
        };
        match value {
            Value::Mapping(map) => parser.group(map, "", 0),
            // An empty document is an empty catalog.
            Value::Null => Ok(Catalog::new()),
            _ => Err(parser.error("top level must be a mapping".to_string())),
        }
    }
}

fn collect_paths(catalog: &Catalog, prefix: &mut String, out: &mut Vec<String>) {
    for (key, entry) in &catalog.entries {
        let len = prefix.len();
        if !prefix.is_empty() {
            prefix.push('.');
        }
        prefix.push_str(key);
        match entry {
            Entry::Text(_) => out.push(prefix.clone()),
            Entry::Group(g) => collect_paths(g, prefix, out),
        }
        prefix.truncate(len);
    }
}

fn is_valid_segment(key: &str) -> bool {
    let mut it = key.chars();
    match it.next() {
        Some(c) if c.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    it.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

struct Parser<'a> {
    locale: &'a str,
    leaves: usize,
}

impl Parser<'_> {
    fn error(&self, msg: String) -> I18nError {
        I18nError::Catalog {
            locale: self.locale.to_string(),
            msg,
        }
    }

    fn group(
        &mut self,
        map: serde_yaml::Mapping,
        path: &str,
        depth: usize,
    ) -> Result<Catalog, I18nError> {
        if depth >= MAX_DEPTH {
            return Err(self.error(format!("`{path}` nests deeper than {MAX_DEPTH} levels")));
        }

        let mut catalog = Catalog::new();
        for (k, v) in map {
            let Some(key) = k.as_str() else {
                return Err(self.error(format!("keys under `{path}` must be strings")));
            };
            if !is_valid_segment(key) {
                return Err(self.error(format!(
                    "invalid key `{key}` (allowed: [A-Za-z0-9][A-Za-z0-9_-]*)"
                )));
            }
            if key.len() > MAX_KEY_BYTES {
                return Err(self.error(format!(
                    "key `{key}` is too long (max {MAX_KEY_BYTES} bytes)"
                )));
            }
            let full = if path.is_empty() {
                key.to_string()
            } else {
                format!("{path}.{key}")
            };

            let entry = match v {
                Value::String(s) => {
                    if s.len() > MAX_VALUE_BYTES {
                        return Err(self.error(format!(
                            "value for `{full}` is too long (max {MAX_VALUE_BYTES} bytes)"
                        )));
                    }
                    self.leaves += 1;
                    if self.leaves > MAX_CATALOG_ENTRIES {
                        return Err(
                            self.error(format!("too many entries (max {MAX_CATALOG_ENTRIES})"))
                        );
                    }
                    Entry::Text(s)
                }
                Value::Mapping(m) => Entry::Group(self.group(m, &full, depth + 1)?),
                _ => {
                    return Err(
                        self.error(format!("value for `{full}` must be a string or mapping"))
                    )
                }
            };
            catalog.entries.insert(key.to_string(), entry);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_nested_and_list_paths() {
        let src = r#"
nav:
  home: "Home"
  about: "About"
contact:
  form:
    send: "Send"
  footer: "Bye"
"#;
        let cat = Catalog::parse_yaml("EN", src).unwrap();
        assert_eq!(
            cat.key_paths(),
            vec!["nav.home", "nav.about", "contact.form.send", "contact.footer"]
        );
        let nav = cat.get("nav").and_then(Entry::as_group).unwrap();
        assert_eq!(nav.get("home").and_then(Entry::as_text), Some("Home"));
    }

    #[test]
    fn empty_document_is_empty_catalog() {
        assert!(Catalog::parse_yaml("EN", "").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_string_leaves() {
        let err = Catalog::parse_yaml("EN", "count: 3\n").unwrap_err();
        assert!(matches!(err, I18nError::Catalog { .. }));

        let err = Catalog::parse_yaml("EN", "items:\n  - a\n").unwrap_err();
        assert!(matches!(err, I18nError::Catalog { .. }));
    }

    #[test]
    fn rejects_dotted_or_blank_keys() {
        let err = Catalog::parse_yaml("EN", "\"nav.home\": x\n").unwrap_err();
        assert!(matches!(err, I18nError::Catalog { .. }));

        let err = Catalog::parse_yaml("EN", "\"bad key\": x\n").unwrap_err();
        assert!(matches!(err, I18nError::Catalog { .. }));
    }

    #[test]
    fn top_level_must_be_mapping() {
        let err = Catalog::parse_yaml("EN", "just a string").unwrap_err();
        assert!(matches!(err, I18nError::Catalog { .. }));

        let err = Catalog::parse_yaml("EN", "a: [unclosed").unwrap_err();
        assert!(matches!(err, I18nError::Yaml { .. }));
    }

    #[test]
    fn nesting_is_limited() {
        let mut src = String::new();
        for depth in 0..=MAX_DEPTH {
            src.push_str(&"  ".repeat(depth));
            src.push_str("k:\n");
        }
        src.push_str(&"  ".repeat(MAX_DEPTH + 1));
        src.push_str("leaf: x\n");
        let err = Catalog::parse_yaml("EN", &src).unwrap_err();
        assert!(matches!(err, I18nError::Catalog { .. }));
    }
}
