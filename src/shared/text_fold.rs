//! Accent folding shared by header matching and address preparation.
//!
//! Decomposes to NFD and drops combining marks, so `DIRECCIÓN` and `DIRECCION`
//! compare equal and `Ñ` folds to `N`.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Remove diacritics from `text`, keeping every base character.
pub fn fold_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Uppercase, accent-free, whitespace-free key for comparing column headers.
pub fn header_key(header: &str) -> String {
    fold_accents(header)
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}
