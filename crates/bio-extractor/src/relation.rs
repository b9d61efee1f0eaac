//! Relation extraction between persons
//!
//! Pairs every two resolved person mentions in a sentence and asks a
//! [`RelationClassifier`] for the relation type. The keyword classifier is a
//! heuristic: it looks at the predicate text around the pair and will
//! mislabel sentences with several clauses. Output is deterministic for a
//! given input.

use std::collections::HashSet;

use bio_core::{EntityCategory, PersonRelation, RelationKind};

use crate::resolve::NameResolver;
use crate::{split_sentences, ExtractedEntity};

const SENTENCE_TERMINATORS: &[char] = &['。', '！', '？', '!', '?', '\n'];

// ============================================================================
// Classifiers
// ============================================================================

/// Strategy deciding the relation of two persons from the predicate text
pub trait RelationClassifier: Send + Sync {
    /// `predicate` is the text governing the pair, `None` when there is none
    fn classify_relation(&self, predicate: Option<&str>, first: &str, second: &str)
        -> RelationKind;

    fn name(&self) -> &'static str;
}

/// Relation classifier based on predicate keywords
pub struct KeywordRelationClassifier {
    /// Relation rules (keywords -> relation)
    rules: Vec<(Vec<String>, RelationKind)>,
}

impl KeywordRelationClassifier {
    pub fn new() -> Self {
        let mut classifier = Self { rules: Vec::new() };
        classifier.init_rules();
        classifier
    }

    fn init_rules(&mut self) {
        self.add_rule(&["結婚", "妻", "夫", "配偶", "婚約", "再婚"], RelationKind::Spouse);
        self.add_rule(
            &["父", "母", "息子", "娘", "長男", "長女", "次男", "次女"],
            RelationKind::ParentChild,
        );
        self.add_rule(&["師事", "指導", "弟子", "門下", "教え"], RelationKind::Mentor);
        self.add_rule(&["共同", "同僚", "協力", "共著", "共に"], RelationKind::Colleague);
    }

    fn add_rule(&mut self, keywords: &[&str], relation: RelationKind) {
        self.rules
            .push((keywords.iter().map(|s| s.to_string()).collect(), relation));
    }
}

impl Default for KeywordRelationClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationClassifier for KeywordRelationClassifier {
    fn classify_relation(
        &self,
        predicate: Option<&str>,
        _first: &str,
        _second: &str,
    ) -> RelationKind {
        let Some(predicate) = predicate else {
            return RelationKind::Unknown;
        };

        // Earliest keyword in the predicate wins; rule order breaks ties
        let mut best: Option<(usize, &RelationKind)> = None;
        for (keywords, relation) in &self.rules {
            for keyword in keywords {
                if let Some(pos) = predicate.find(keyword.as_str()) {
                    if best.map_or(true, |(p, _)| pos < p) {
                        best = Some((pos, relation));
                    }
                }
            }
        }

        best.map(|(_, relation)| relation.clone())
            .unwrap_or(RelationKind::Unknown)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Classifier that never commits to a relation type
#[derive(Debug, Default, Clone, Copy)]
pub struct UnknownRelationClassifier;

impl RelationClassifier for UnknownRelationClassifier {
    fn classify_relation(
        &self,
        _predicate: Option<&str>,
        _first: &str,
        _second: &str,
    ) -> RelationKind {
        RelationKind::Unknown
    }

    fn name(&self) -> &'static str {
        "unknown"
    }
}

// ============================================================================
// Extraction
// ============================================================================

struct Mention<'a> {
    name: &'a str,
    start: usize,
    end: usize,
}

/// Pairs person mentions per sentence and classifies each pair
pub struct PersonRelationExtractor {
    classifier: Box<dyn RelationClassifier>,
    include_unknown: bool,
}

impl PersonRelationExtractor {
    pub fn new(classifier: Box<dyn RelationClassifier>) -> Self {
        Self {
            classifier,
            include_unknown: true,
        }
    }

    pub fn with_include_unknown(mut self, include: bool) -> Self {
        self.include_unknown = include;
        self
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Extract relations from `text`, whose person entities carry byte offsets into it
    pub fn extract(
        &self,
        text: &str,
        entities: &[ExtractedEntity],
        resolver: &NameResolver,
    ) -> Vec<PersonRelation> {
        let mut relations = Vec::new();
        let mut seen: HashSet<(String, String, RelationKind)> = HashSet::new();

        for (offset, sentence) in split_sentences(text, SENTENCE_TERMINATORS) {
            let sentence_end = offset + sentence.len();
            let mentions = self.sentence_mentions(entities, resolver, offset, sentence_end);
            if mentions.len() < 2 {
                continue;
            }

            for (i, first) in mentions.iter().enumerate() {
                for second in &mentions[i + 1..] {
                    let predicate = predicate_span(text, first, second, sentence_end);
                    let relation =
                        self.classifier
                            .classify_relation(predicate, first.name, second.name);

                    if relation.is_unknown() && !self.include_unknown {
                        continue;
                    }

                    let key = if first.name <= second.name {
                        (first.name.to_string(), second.name.to_string(), relation.clone())
                    } else {
                        (second.name.to_string(), first.name.to_string(), relation.clone())
                    };
                    if seen.insert(key) {
                        relations.push(PersonRelation::new(first.name, second.name, relation));
                    }
                }
            }
        }

        tracing::debug!(
            "Extracted {} relations with {} classifier",
            relations.len(),
            self.classifier.name()
        );
        relations
    }

    /// Resolved person mentions inside one sentence, one per canonical name
    fn sentence_mentions<'r>(
        &self,
        entities: &[ExtractedEntity],
        resolver: &'r NameResolver,
        start: usize,
        end: usize,
    ) -> Vec<Mention<'r>> {
        let mut mentions: Vec<Mention<'r>> = Vec::new();
        for entity in entities {
            if entity.category != EntityCategory::Person
                || entity.start < start
                || entity.end > end
            {
                continue;
            }
            // Unresolved mentions are dropped
            let Some(name) = resolver.resolve(&entity.text) else {
                continue;
            };
            if mentions.iter().any(|m| m.name == name) {
                continue;
            }
            mentions.push(Mention {
                name,
                start: entity.start,
                end: entity.end,
            });
        }
        mentions.sort_by_key(|m| m.start);
        mentions
    }
}

impl Default for PersonRelationExtractor {
    fn default() -> Self {
        Self::new(Box::new(KeywordRelationClassifier::new()))
    }
}

/// Text after the later mention, or between the two when nothing follows
fn predicate_span<'t>(
    text: &'t str,
    first: &Mention<'_>,
    second: &Mention<'_>,
    sentence_end: usize,
) -> Option<&'t str> {
    let trim = |s: &'t str| s.trim_matches(|c: char| c.is_whitespace() || SENTENCE_TERMINATORS.contains(&c));

    let after = trim(&text[second.end..sentence_end]);
    if !after.is_empty() {
        return Some(after);
    }
    let between = trim(&text[first.end..second.start.max(first.end)]);
    (!between.is_empty()).then_some(between)
}
