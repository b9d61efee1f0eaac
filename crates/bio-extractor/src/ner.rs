//! Named Entity Recognition (NER) module
//!
//! Rule-based recognition for Japanese biography text:
//! - Regex patterns for katakana names, honorific-marked kanji names,
//!   organizations and places by suffix, and dates
//! - A person lexicon for names the patterns miss (configured names,
//!   relatives listed in the infobox)
//!
//! Lexicon hits outrank pattern hits on the same span, so a person found by
//! both sources is counted once.

use std::collections::{HashMap, HashSet};

use bio_core::{EntityCategory, EntityCounts, Result};
use regex::Regex;

use crate::{EntityExtractor, ExtractedEntity};

/// Characters allowed inside a proper noun; dates are kept out
const NOUN_CHARS: &str = r"[\p{Han}\p{Katakana}ー々--年月日]";

const LEXICON_CONFIDENCE: f32 = 0.95;

// ============================================================================
// Rule-based NER
// ============================================================================

/// Dictionary entry for entity matching
#[derive(Debug, Clone)]
pub struct DictionaryEntry {
    pub term: String,
    pub category: EntityCategory,
    pub aliases: Vec<String>,
}

/// Rule-based NER using regex patterns and a lexicon
pub struct RuleBasedNer {
    /// Pattern rules (regex -> category); group 1, when present, is the entity
    patterns: Vec<(Regex, EntityCategory, f32)>,
    /// Dictionary of known terms
    dictionary: HashMap<String, DictionaryEntry>,
}

impl RuleBasedNer {
    /// Create a recognizer with the default Japanese biography rules
    pub fn new() -> Self {
        let mut ner = Self {
            patterns: Vec::new(),
            dictionary: HashMap::new(),
        };
        ner.init_patterns();
        ner
    }

    fn init_patterns(&mut self) {
        // Dates
        self.add_pattern(r"\d{4}年(?:\d{1,2}月(?:\d{1,2}日)?)?", EntityCategory::Date, 0.95);
        self.add_pattern(
            r"(?:令和|平成|昭和|大正|明治)(?:元|\d{1,2})年(?:\d{1,2}月(?:\d{1,2}日)?)?",
            EntityCategory::Date,
            0.95,
        );

        // Persons: katakana names joined by a middle dot, kanji names with an honorific
        self.add_pattern(
            r"[\p{Katakana}ー]{2,}(?:[・=＝][\p{Katakana}ー]{2,})+",
            EntityCategory::Person,
            0.85,
        );
        self.add_pattern(
            r"(\p{Han}{2,4})(?:氏|博士|教授|先生|夫人|伯爵|男爵)",
            EntityCategory::Person,
            0.8,
        );

        // Organizations by suffix
        self.add_pattern(
            &format!(
                r"{}{{1,15}}(?:大学|研究所|学会|協会|財団|会社|学院|高等学校|ギムナジウム|アカデミー|委員会|特許局|省|庁)",
                NOUN_CHARS
            ),
            EntityCategory::Organization,
            0.8,
        );

        // Places by suffix
        self.add_pattern(
            &format!(
                r"{}{{1,12}}(?:王国|帝国|共和国|合衆国|連邦|都|道|府|県|州|市|町|村)",
                NOUN_CHARS
            ),
            EntityCategory::Location,
            0.75,
        );
    }

    /// Add a regex pattern
    fn add_pattern(&mut self, pattern: &str, category: EntityCategory, confidence: f32) {
        match Regex::new(pattern) {
            Ok(regex) => self.patterns.push((regex, category, confidence)),
            Err(e) => tracing::warn!("Skipping invalid entity pattern {}: {}", pattern, e),
        }
    }

    /// Add a dictionary term
    pub fn add_term(&mut self, term: &str, category: EntityCategory, aliases: Vec<&str>) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        let entry = DictionaryEntry {
            term: term.to_string(),
            category,
            aliases: aliases
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        };
        self.dictionary.insert(term.to_string(), entry);
    }

    /// Add person names to the lexicon
    pub fn with_persons<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.add_term(name.as_ref(), EntityCategory::Person, Vec::new());
        }
        self
    }

    pub fn lexicon_size(&self) -> usize {
        self.dictionary.len()
    }

    /// Extract entities using pattern matching
    fn extract_by_patterns(&self, text: &str) -> Vec<ExtractedEntity> {
        let mut entities = Vec::new();

        for (regex, category, confidence) in &self.patterns {
            for caps in regex.captures_iter(text) {
                let Some(mat) = caps.get(1).or_else(|| caps.get(0)) else {
                    continue;
                };
                entities.push(ExtractedEntity {
                    text: mat.as_str().to_string(),
                    category: *category,
                    start: mat.start(),
                    end: mat.end(),
                    confidence: *confidence,
                });
            }
        }

        entities
    }

    /// Extract entities using dictionary lookup
    fn extract_by_dictionary<'a>(
        &'a self,
        text: &str,
        extra: impl Iterator<Item = (&'a str, EntityCategory)>,
    ) -> Vec<ExtractedEntity> {
        let terms = self
            .dictionary
            .values()
            .flat_map(|entry| {
                std::iter::once(entry.term.as_str())
                    .chain(entry.aliases.iter().map(String::as_str))
                    .map(move |term| (term, entry.category))
            })
            .chain(extra);

        let mut entities = Vec::new();
        for (term, category) in terms {
            for (start, matched) in text.match_indices(term) {
                entities.push(ExtractedEntity {
                    text: matched.to_string(),
                    category,
                    start,
                    end: start + matched.len(),
                    confidence: LEXICON_CONFIDENCE,
                });
            }
        }
        entities
    }

    /// Extract entities, also matching the page-specific `persons`
    pub fn extract_with_persons(&self, text: &str, persons: &[String]) -> Vec<ExtractedEntity> {
        let mut entities = self.extract_by_patterns(text);
        let extra = persons
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| (name, EntityCategory::Person));
        entities.extend(self.extract_by_dictionary(text, extra));
        self.deduplicate(entities)
    }

    /// Remove overlapping entities, keeping the longest then most confident
    fn deduplicate(&self, mut entities: Vec<ExtractedEntity>) -> Vec<ExtractedEntity> {
        // Sort by start position, then confidence and length (descending)
        entities.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.confidence.total_cmp(&a.confidence))
                .then((b.end - b.start).cmp(&(a.end - a.start)))
        });

        let mut result = Vec::new();
        let mut covered: HashSet<usize> = HashSet::new();

        for entity in entities {
            let overlaps = (entity.start..entity.end).any(|i| covered.contains(&i));
            if !overlaps {
                covered.extend(entity.start..entity.end);
                result.push(entity);
            }
        }

        result.sort_by_key(|e| e.start);
        result
    }
}

impl Default for RuleBasedNer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor for RuleBasedNer {
    fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>> {
        Ok(self.extract_with_persons(text, &[]))
    }
}

/// Frequency table of entity surfaces per category
pub fn count_entities(entities: &[ExtractedEntity]) -> EntityCounts {
    let mut counts = EntityCounts::new();
    for entity in entities {
        counts.increment(entity.category, entity.text.as_str());
    }
    counts
}
