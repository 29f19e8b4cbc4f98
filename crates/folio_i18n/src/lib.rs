//! Folio localization
//!
//! UI strings live in one nested catalog per locale (`nav.home`,
//! `contact.form.send`, ...). Lookup walks the dotted key one segment at a
//! time and, when nothing is found, returns the key itself so untranslated
//! strings show up in the rendered page instead of disappearing.
//!
//! ```rust
//! use folio_i18n::TranslationTable;
//!
//! let table = TranslationTable::builtin().unwrap();
//! assert_eq!(table.resolve("EN", "nav.home"), "Home");
//! assert_eq!(table.resolve("ID", "nav.home"), "Beranda");
//! assert_eq!(table.resolve("EN", "nav.nonexistent"), "nav.nonexistent");
//! ```

mod catalog;
mod error;
mod locale;
mod table;

pub use catalog::{Catalog, Entry};
pub use error::I18nError;
pub use locale::normalize_locale;
pub use table::{ParityReport, TranslationTable, Translator};

/// Translate `dotted_key` for `locale`, falling back to the key.
pub fn resolve<'a>(table: &'a TranslationTable, locale: &str, dotted_key: &'a str) -> &'a str {
    table.resolve(locale, dotted_key)
}
