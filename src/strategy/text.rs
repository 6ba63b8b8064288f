//! Text cleanup helpers shared by the extraction strategies

use scraper::{ElementRef, Html, Selector};
use unicode_normalization::UnicodeNormalization;

/// Trimmed text content of an element
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match, or an empty string when nothing matches
pub fn first_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Trimmed text of every match, in document order
pub fn all_texts(document: &Html, selector: &Selector) -> Vec<String> {
    document.select(selector).map(element_text).collect()
}

/// Collapses runs of spaces, tabs and newlines into single spaces and trims
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Folds accented letters to their base letter, then keeps only ASCII
///
/// Source labels carry stray non-breaking spaces and formatting marks.
/// Canonical decomposition splits `é` into `e` plus a combining accent, so
/// only the accent is dropped.
pub fn strip_non_ascii(text: &str) -> String {
    text.nfd().filter(char::is_ascii).collect()
}

/// Parses a level label such as `"Cantrip"` or `"5th"`
///
/// Returns 0 for cantrips, the number in front of the two-character ordinal
/// suffix otherwise, and -1 when the label cannot be read.
pub fn parse_level(label: &str) -> i32 {
    let label = label.trim();

    if label.eq_ignore_ascii_case("cantrip") {
        return 0;
    }

    let count = label.chars().count();
    if count < 2 {
        return -1;
    }

    let number: String = label.chars().take(count - 2).collect();
    number.parse().unwrap_or(-1)
}
