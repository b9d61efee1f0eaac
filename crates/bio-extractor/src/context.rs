//! Shared analyzer state for entity and relation extraction
//!
//! Built once from [`NetworkConfig`] before any page is processed and only
//! borrowed afterwards.

use bio_core::config::{ClassifierKind, NetworkConfig};
use bio_core::{EntityCounts, PersonRelation, Section};
use serde::{Deserialize, Serialize};

use crate::ner::{count_entities, RuleBasedNer};
use crate::relation::{
    KeywordRelationClassifier, PersonRelationExtractor, RelationClassifier,
    UnknownRelationClassifier,
};
use crate::resolve::NameResolver;
use crate::ExtractedEntity;

/// Entities and relations of one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityAnalysis {
    pub entities: EntityCounts,
    pub relations: Vec<PersonRelation>,
}

/// Recognizer, name resolution threshold, and relation strategy
pub struct AnalyzerContext {
    ner: RuleBasedNer,
    relations: PersonRelationExtractor,
    fuzzy_threshold: f64,
}

impl AnalyzerContext {
    pub fn new(config: &NetworkConfig) -> Self {
        let classifier: Box<dyn RelationClassifier> = match config.classifier {
            ClassifierKind::Keyword => Box::new(KeywordRelationClassifier::new()),
            ClassifierKind::Unknown => Box::new(UnknownRelationClassifier),
        };
        let ner = RuleBasedNer::new().with_persons(&config.person_lexicon);

        tracing::info!(
            "Analyzer ready: {} lexicon names, {} classifier, threshold {}",
            ner.lexicon_size(),
            classifier.name(),
            config.fuzzy_threshold
        );

        Self {
            ner,
            relations: PersonRelationExtractor::new(classifier)
                .with_include_unknown(config.include_unknown),
            fuzzy_threshold: config.fuzzy_threshold,
        }
    }

    /// Entities in `text`, matching `persons` (e.g. infobox relatives) as well
    pub fn recognize(&self, text: &str, persons: &[String]) -> Vec<ExtractedEntity> {
        self.ner.extract_with_persons(text, persons)
    }

    /// Resolver over the recognized persons; `preferred` names win their clusters
    pub fn resolver(&self, preferred: &[String], counts: &EntityCounts) -> NameResolver {
        NameResolver::new(self.fuzzy_threshold)
            .with_names(preferred)
            .with_counts(counts)
    }

    /// Relations between the person entities of `text`
    pub fn relations(
        &self,
        text: &str,
        entities: &[ExtractedEntity],
        preferred: &[String],
    ) -> Vec<PersonRelation> {
        let resolver = self.resolver(preferred, &count_entities(entities));
        self.relations.extract(text, entities, &resolver)
    }

    /// Run recognition and relation inference over the concatenated sections.
    ///
    /// `persons` are matched as names and keep their spelling as canonical names.
    pub fn analyze_sections(&self, sections: &[Section], persons: &[String]) -> EntityAnalysis {
        let text = sections
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let entities = self.recognize(&text, persons);
        let relations = self.relations(&text, &entities, persons);

        EntityAnalysis {
            entities: count_entities(&entities),
            relations,
        }
    }
}

impl Default for AnalyzerContext {
    fn default() -> Self {
        Self::new(&NetworkConfig::default())
    }
}
