//! Unicode and layout normalization of article text

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static ARTIFACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:編集|要出典|\d+|注\s*\d+|[a-z])\]").expect("artifact pattern")
});

/// Apply Unicode NFKC normalization
pub fn nfkc(text: &str) -> String {
    text.nfkc().collect()
}

/// Remove edit links and footnote markers (`[編集]`, `[3]`, `[要出典]`)
pub fn strip_wiki_artifacts(text: &str) -> String {
    ARTIFACT_RE.replace_all(text, "").into_owned()
}

/// Collapse runs of whitespace, including U+3000, to a single space
pub fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Remove every occurrence of the configured words
pub fn remove_words(text: &str, words: &[String]) -> String {
    let mut out = text.to_string();
    for word in words.iter().filter(|w| !w.is_empty()) {
        if out.contains(word.as_str()) {
            out = out.replace(word.as_str(), "");
        }
    }
    out
}

fn is_halfwidth_kana(ch: char) -> bool {
    ('\u{FF61}'..='\u{FF9F}').contains(&ch)
}

fn fullwidth_alnum_to_ascii(ch: char) -> Option<char> {
    match ch {
        '０'..='９' | 'Ａ'..='Ｚ' | 'ａ'..='ｚ' => char::from_u32(ch as u32 - 0xFEE0),
        _ => None,
    }
}

/// Half-width katakana become full-width; full-width Latin letters and
/// digits become ASCII.
pub fn unify_width(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut kana_run = String::new();

    for ch in text.chars() {
        if is_halfwidth_kana(ch) {
            kana_run.push(ch);
            continue;
        }
        if !kana_run.is_empty() {
            // Sound marks compose with the preceding kana
            out.extend(kana_run.nfkc());
            kana_run.clear();
        }
        out.push(fullwidth_alnum_to_ascii(ch).unwrap_or(ch));
    }
    if !kana_run.is_empty() {
        out.extend(kana_run.nfkc());
    }
    out
}

/// Ordered text clean-up applied to every section body and infobox cell
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    exclude_words: Vec<String>,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Words removed after whitespace collapsing
    pub fn with_exclude_words(mut self, words: Vec<String>) -> Self {
        self.exclude_words = words;
        self
    }

    /// NFKC, artifact stripping, whitespace collapsing, exclude-word
    /// removal, then width unification.
    pub fn normalize(&self, text: &str) -> String {
        let text = nfkc(text);
        let text = strip_wiki_artifacts(&text);
        let mut text = collapse_whitespace(&text);
        if !self.exclude_words.is_empty() {
            text = collapse_whitespace(&remove_words(&text, &self.exclude_words));
        }
        unify_width(&text)
    }
}
