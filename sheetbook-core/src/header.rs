//! Header-name normalization shared by the read and write paths.

use unicode_normalization::UnicodeNormalization;

/// Normalize a header cell or request field name.
///
/// Trims surrounding whitespace and strips combining marks after canonical
/// decomposition, so `Descrição` becomes `Descricao`. Case is preserved.
pub fn normalize_field_name(name: &str) -> String {
    name.trim()
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

/// Compare two field names the way column resolution does.
pub fn field_names_match(a: &str, b: &str) -> bool {
    normalize_field_name(a).eq_ignore_ascii_case(&normalize_field_name(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_accents() {
        assert_eq!(normalize_field_name("Descrição"), "Descricao");
        assert_eq!(normalize_field_name("Mês"), "Mes");
        assert_eq!(normalize_field_name("  Tag 1 "), "Tag 1");
    }

    #[test]
    fn test_plain_names_unchanged() {
        assert_eq!(normalize_field_name("Valor"), "Valor");
        assert_eq!(normalize_field_name(""), "");
    }

    #[test]
    fn test_match_is_case_and_accent_insensitive() {
        assert!(field_names_match("descricao", "Descrição"));
        assert!(field_names_match("MES", "Mês"));
        assert!(!field_names_match("Tag 1", "Tag 2"));
    }
}
