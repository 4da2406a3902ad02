//! Label normalization helpers.
//!
//! Source exports mix cases, accents, and free-form punctuation in their
//! headers. Everything that compares or renames labels goes through these
//! helpers so `"Velocità Max (km/h)"` and `"velocita_max_km_h"` land on the
//! same canonical token.

use std::borrow::Cow;

/// Strips combining accents from Latin letters, leaving other characters
/// untouched. ASCII input is returned without allocating.
pub fn fold_accents(input: &str) -> Cow<'_, str> {
    if input.is_ascii() {
        return Cow::Borrowed(input);
    }
    let folded: String = input.chars().map(fold_char).collect();
    Cow::Owned(folded)
}

fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ç' => 'c',
        'ñ' => 'n',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'Ý' => 'Y',
        'Ç' => 'C',
        'Ñ' => 'N',
        other => other,
    }
}

/// The key a label is matched against: trimmed, accent-folded, lowercased.
pub fn match_key(label: &str) -> String {
    fold_accents(label.trim()).to_lowercase()
}

/// Snake-cases a header label: accents folded first, then every run of
/// characters outside `[0-9a-zA-Z]` collapses to a single underscore, with
/// edge underscores trimmed. `"Prezzo Listino (€)"` -> `"prezzo_listino"`.
pub fn snake_label(label: &str) -> String {
    let folded = fold_accents(label);
    let mut out = String::with_capacity(folded.len());
    let mut pending_sep = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}
