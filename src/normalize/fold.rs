use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Strip diacritics: decompose to base letters + combining marks, drop the marks, re-compose.
pub fn fold_accents(text: &str) -> String {
    text.nfd()
        .filter(|&c| !is_combining_mark(c))
        .nfc()
        .collect()
}

/// Uppercase, accent-fold and trim a raw name into the form the grammars match against.
pub(crate) fn canonical_form(text: &str) -> String {
    fold_accents(&text.to_uppercase()).trim().to_string()
}
