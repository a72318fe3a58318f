//! Extractive summarization by term-frequency sentence ranking.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Words that carry no topical weight.
const STOP_WORDS: &[&str] = &[
    "the", "and", "is", "in", "it", "to", "of", "for", "with", "as", "that", "on", "at", "by",
    "an", "be", "this", "are",
];

/// Paragraph line width.
const WRAP_WIDTH: usize = 80;

/// A paragraph closes once it holds at least this many sentences...
const PARAGRAPH_MIN_SENTENCES: usize = 2;
/// ...and is longer than this many characters.
const PARAGRAPH_MIN_CHARS: usize = 150;

static CITATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\](?:\[.*?\])?").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Remove reference markers like `[10]` or `[12][dead link]`.
pub fn strip_citations(text: &str) -> String {
    CITATION.replace_all(text, "").into_owned()
}

/// Pick the `count` most representative sentences of `text`, keep them in
/// their original order, and lay them out as wrapped paragraphs.
pub fn summarize(text: &str, count: usize) -> String {
    let text = strip_citations(text);
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    let sentences = split_sentences(text);
    if sentences.len() <= count {
        return sentences.join("\n\n");
    }

    let weights = term_weights(text);
    let scores: Vec<f64> = sentences
        .iter()
        .map(|sentence| {
            words(sentence)
                .iter()
                .map(|w| weights.get(w).copied().unwrap_or(0.0))
                .sum()
        })
        .collect();

    // Stable sort: equal scores keep the earlier sentence first.
    let mut ranked: Vec<usize> = (0..sentences.len()).collect();
    ranked.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));
    let mut chosen: Vec<usize> = ranked.into_iter().take(count).collect();
    chosen.sort_unstable();

    let top: Vec<&str> = chosen.iter().map(|&i| sentences[i]).collect();
    paragraphs(&top)
        .iter()
        .map(|p| wrap(p, WRAP_WIDTH))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Split after `.`, `?` or `!` followed by whitespace, except after
/// abbreviations like `e.g.` or `Mr.`.
fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let (offset, c) = chars[i];
        if !c.is_whitespace() || !matches!(chars[i - 1].1, '.' | '?' | '!') {
            continue;
        }
        if is_abbreviation(&chars[..i]) {
            continue;
        }
        let sentence = text[start..offset].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = offset;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Does the text before a candidate break end in `x.y.` or `Ab.`?
fn is_abbreviation(before: &[(usize, char)]) -> bool {
    let n = before.len();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    if n >= 4 {
        let [a, dot, b, _] = [before[n - 4].1, before[n - 3].1, before[n - 2].1, before[n - 1].1];
        if is_word(a) && dot == '.' && is_word(b) {
            return true;
        }
    }
    if n >= 3 {
        let [upper, lower, dot] = [before[n - 3].1, before[n - 2].1, before[n - 1].1];
        if upper.is_ascii_uppercase() && lower.is_ascii_lowercase() && dot == '.' {
            return true;
        }
    }
    false
}

/// Lowercased words with punctuation deleted.
fn words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Term frequency over the whole text, stop words removed, scaled so the
/// most frequent word weighs 1.0.
fn term_weights(text: &str) -> HashMap<String, f64> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in words(text) {
        if !STOP_WORDS.contains(&word.as_str()) {
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let max = counts.values().copied().max().unwrap_or(1) as f64;
    counts
        .into_iter()
        .map(|(word, count)| (word, count as f64 / max))
        .collect()
}

fn paragraphs(sentences: &[&str]) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for sentence in sentences {
        current.push(*sentence);
        let joined = current.join(" ");
        if current.len() >= PARAGRAPH_MIN_SENTENCES && joined.chars().count() > PARAGRAPH_MIN_CHARS {
            paragraphs.push(joined);
            current.clear();
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
}

/// Greedy word wrap. Paragraphs that already fit are returned as-is.
fn wrap(paragraph: &str, width: usize) -> String {
    if paragraph.chars().count() <= width {
        return paragraph.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line: Vec<&str> = Vec::new();
    let mut line_len = 0;

    for word in paragraph.split_whitespace() {
        let word_len = word.chars().count();
        // line_len counts one separator per word already on the line
        if !line.is_empty() && line_len + word_len > width {
            lines.push(line.join(" "));
            line.clear();
            line_len = 0;
        }
        line.push(word);
        line_len += word_len + 1;
    }
    if !line.is_empty() {
        lines.push(line.join(" "));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "Rust is a systems programming language. \
        Rust guarantees memory safety without a garbage collector. \
        The weather was pleasant yesterday. \
        Memory safety in Rust comes from ownership and borrowing. \
        Cats sleep a lot.";

    #[test]
    fn strips_citations() {
        assert_eq!(strip_citations("Fact.[10] More[12][dead link]."), "Fact. More.");
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        assert_eq!(
            split_sentences("One. Two? Three! Four"),
            vec!["One.", "Two?", "Three!", "Four"]
        );
    }

    #[test]
    fn does_not_split_after_abbreviations() {
        assert_eq!(
            split_sentences("Ask Mr. Smith, e.g. today. Then leave."),
            vec!["Ask Mr. Smith, e.g. today.", "Then leave."]
        );
    }

    #[test]
    fn short_text_is_returned_sentence_per_paragraph() {
        assert_eq!(summarize("First one. Second one.", 3), "First one.\n\nSecond one.");
    }

    #[test]
    fn empty_text_gives_empty_summary() {
        assert_eq!(summarize("", 3), "");
        assert_eq!(summarize("   ", 3), "");
    }

    #[test]
    fn keeps_the_most_topical_sentences_in_order() {
        let summary = summarize(ARTICLE, 2);
        assert!(summary.contains("Rust guarantees memory safety"));
        assert!(summary.contains("ownership and borrowing"));
        assert!(!summary.contains("Cats"));
        assert!(!summary.contains("weather"));
        let first = summary.find("guarantees").unwrap();
        let second = summary.find("ownership").unwrap();
        assert!(first < second);
    }

    #[test]
    fn respects_requested_count() {
        let summary = summarize(ARTICLE, 1);
        assert_eq!(
            summary,
            "Rust guarantees memory safety without a garbage collector."
        );
        assert_eq!(summary.matches('.').count(), 1);
    }

    #[test]
    fn ties_prefer_earlier_sentences() {
        let summary = summarize("Alpha beta. Gamma delta. Epsilon zeta.", 1);
        assert_eq!(summary, "Alpha beta.");
    }

    #[test]
    fn long_paragraphs_are_wrapped() {
        let wrapped = wrap(&"word ".repeat(40), 80);
        assert!(wrapped.lines().count() > 1);
        for line in wrapped.lines() {
            assert!(line.chars().count() <= 80, "line too long: {line:?}");
        }
    }

    #[test]
    fn wrap_leaves_short_paragraphs_alone() {
        assert_eq!(wrap("short line", 80), "short line");
    }

    #[test]
    fn wrap_never_emits_empty_leading_line() {
        let long_word = "x".repeat(100);
        let wrapped = wrap(&format!("{long_word} tail"), 80);
        assert!(wrapped.starts_with('x'));
    }

    #[test]
    fn paragraphs_break_after_long_pairs() {
        let a = "a".repeat(80);
        let b = "b".repeat(80);
        let c = "c".repeat(10);
        let grouped = paragraphs(&[a.as_str(), b.as_str(), c.as_str()]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[1], c);
    }
}
