use folio_i18n::{resolve, TranslationTable};
use pretty_assertions::assert_eq;

#[test]
fn builtin_locales_are_complete() {
    let table = TranslationTable::builtin().unwrap();
    assert_eq!(table.locales().collect::<Vec<_>>(), vec!["EN", "ID"]);

    let report = table.check_parity();
    assert!(report.is_complete(), "missing keys: {:?}", report.missing);
    assert_eq!(table.key_paths("EN"), table.key_paths("ID"));
}

#[test]
fn shared_keys_resolve_to_text_everywhere() {
    let table = TranslationTable::builtin().unwrap();
    for key in table.key_paths("EN") {
        for locale in ["EN", "ID"] {
            let text = table.resolve(locale, &key);
            assert!(!text.is_empty());
            assert_ne!(text, key, "{locale} has no text for {key}");
        }
    }
}

#[test]
fn absent_keys_come_back_unchanged() {
    let table = TranslationTable::builtin().unwrap();
    for locale in ["EN", "ID", "FR", ""] {
        for key in ["nav.nonexistent", "contact.form", "nav", "x.y.z"] {
            assert_eq!(resolve(&table, locale, key), key);
        }
    }
}

#[test]
fn known_strings() {
    let table = TranslationTable::builtin().unwrap();
    assert_eq!(table.resolve("EN", "nav.home"), "Home");
    assert_eq!(table.resolve("ID", "nav.home"), "Beranda");
    assert_eq!(table.resolve("EN", "nav.nonexistent"), "nav.nonexistent");
    assert_eq!(table.resolve("ID", "contact.form.send"), "Kirim Pesan");
    assert_eq!(table.resolve("EN", "home.greeting"), "Hi, I'm");
    assert_eq!(table.translator("id").t("experience.internship"), "Magang");
}
