/// Normalize locale codes for table keys and lookup.
///
/// - Trims whitespace.
/// - Converts `_` to `-`.
/// - Upper-cases, so `en` and `EN` name the same table.
pub fn normalize_locale(s: &str) -> String {
    s.trim().replace('_', "-").to_ascii_uppercase()
}
