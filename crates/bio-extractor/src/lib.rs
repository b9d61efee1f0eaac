//! Bio Extractor - Timeline and relationship extraction
//!
//! Works on the flattened sections produced by the parser:
//! - Timeline events, activity periods, and turning points
//! - Rule and lexicon based entity recognition
//! - Fuzzy person-name resolution
//! - Pairwise relation inference through a swappable classifier
//! - Achievements with the subject's age at the time

use bio_core::{EntityCategory, Result};
use serde::{Deserialize, Serialize};

/// Extracted entity from text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    pub text: String,
    pub category: EntityCategory,
    /// Byte offsets into the analysed text
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
}

/// Trait for entity extractors
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>>;
}

pub mod achievements;
pub mod context;
pub mod ner;
pub mod relation;
pub mod resolve;
pub mod timeline;

pub use achievements::extract_achievements;
pub use context::{AnalyzerContext, EntityAnalysis};
pub use ner::{count_entities, RuleBasedNer};
pub use relation::{
    KeywordRelationClassifier, PersonRelationExtractor, RelationClassifier,
    UnknownRelationClassifier,
};
pub use resolve::{partial_ratio, ratio, NameResolver};
pub use timeline::{analyze, TimelineBuilder};

/// Split text into sentences ending at any of `terminators`.
///
/// Returns each sentence with its byte range; the terminator stays with its
/// sentence and surrounding whitespace is trimmed. A `.` followed by a digit
/// is a decimal point, not a terminator.
pub(crate) fn split_sentences<'a>(
    text: &'a str,
    terminators: &[char],
) -> Vec<(usize, &'a str)> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        let decimal_point =
            ch == '.' && chars.peek().is_some_and(|(_, next)| next.is_ascii_digit());
        if terminators.contains(&ch) && !decimal_point {
            let end = idx + ch.len_utf8();
            push_trimmed(text, start, end, &mut sentences);
            start = end;
        }
    }
    push_trimmed(text, start, text.len(), &mut sentences);
    sentences
}

fn push_trimmed<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<(usize, &'a str)>) {
    let raw = &text[start..end];
    let leading = raw.len() - raw.trim_start().len();
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        out.push((start + leading, trimmed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_keeps_offsets() {
        let text = "1879年に生まれた。 翌年移住した！最後";
        let sentences = split_sentences(text, &['。', '！']);
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].1, "1879年に生まれた。");
        assert_eq!(sentences[1].1, "翌年移住した！");
        let (offset, sentence) = sentences[1];
        assert_eq!(&text[offset..offset + sentence.len()], sentence);
        assert_eq!(sentences[2].1, "最後");
    }

    #[test]
    fn test_split_sentences_on_ascii_period() {
        let sentences = split_sentences("質量は1.5倍になった.翌年帰国した.", &['。', '.']);
        let texts: Vec<&str> = sentences.iter().map(|(_, s)| *s).collect();
        assert_eq!(texts, vec!["質量は1.5倍になった.", "翌年帰国した."]);
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("", &['。']).is_empty());
        assert_eq!(split_sentences("。。", &['。']).len(), 2);
    }
}
