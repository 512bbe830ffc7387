//! Text folding for tag and name lookups.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text into a lookup key: strip diacritics, lowercase, collapse
/// whitespace runs and trim. `"Été "` and `"ete"` fold to the same key.
pub fn fold(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fold a tag label harvested from an external aggregate. Unlike [`fold`],
/// a single leading `#` is dropped. Returns `None` when nothing is left.
pub fn normalize_tag(label: &str) -> Option<String> {
    let folded = fold(label);
    let key = folded.strip_prefix('#').unwrap_or(&folded).trim_start();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}
