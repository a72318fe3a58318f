//! Text normalization: strip punctuation, collapse whitespace, lowercase.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Replace anything that isn't a word character or whitespace with a space,
/// squeeze whitespace runs to a single space, trim, lowercase.
pub fn clean(text: &str) -> String {
    let spaced = NON_WORD.replace_all(text, " ");
    let squeezed = WHITESPACE.replace_all(&spaced, " ");
    squeezed.trim().to_lowercase()
}
