//! One-page extraction pipeline

use bio_core::config::AppConfig;
use bio_core::{
    Achievement, CanonicalField, EntityCounts, InfoboxRecord, PageImage, PersonRelation, Result,
    Section, TimelineAnalysis, TimelineEvent,
};
use bio_extractor::{extract_achievements, AnalyzerContext, TimelineBuilder};
use bio_graph::{GraphSummary, NetworkAnalysis, RelationGraph};
use bio_normalizer::{extract_parents, normalize_infobox};
use bio_parser::{extract_images, extract_infobox, filter_categories, SectionExtractor, WikiPage};
use serde::{Deserialize, Serialize};

/// Everything extracted from one article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub subject: String,
    pub title: String,
    pub infobox: InfoboxRecord,
    pub sections: Vec<Section>,
    pub timeline: Vec<TimelineEvent>,
    pub analysis: TimelineAnalysis,
    pub entities: EntityCounts,
    pub relations: Vec<PersonRelation>,
    pub network: NetworkAnalysis,
    pub graph: GraphSummary,
    pub achievements: Vec<Achievement>,
    pub images: Vec<PageImage>,
    pub categories: Vec<String>,
}

/// Stages configured once and reused for every page
pub struct Pipeline {
    sections: SectionExtractor,
    timeline: TimelineBuilder,
    analyzer: AnalyzerContext,
    range: (Option<i32>, Option<i32>),
}

impl Pipeline {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            sections: SectionExtractor::from_config(&config.extraction),
            timeline: TimelineBuilder::from_config(config.timeline.clone()),
            analyzer: AnalyzerContext::new(&config.network),
            range: (None, None),
        }
    }

    /// Restrict the filtered timeline view to an inclusive year range
    pub fn with_range(mut self, start: Option<i32>, end: Option<i32>) -> Self {
        self.range = (start, end);
        self
    }

    /// Parse `html` and run every stage on it
    pub fn process_html(
        &self,
        title: &str,
        html: &str,
        categories: Option<&[String]>,
    ) -> Result<Profile> {
        let page = WikiPage::parse(title, html)?;
        Ok(self.process(&page, categories))
    }

    /// Run every stage on a parsed page.
    ///
    /// Categories default to the page's own category links.
    pub fn process(&self, page: &WikiPage, categories: Option<&[String]>) -> Profile {
        tracing::info!("Processing page: {}", page.title());

        let sections = self.sections.extract(page);
        let infobox = normalize_infobox(&extract_infobox(page));
        let subject = infobox.subject().to_string();

        let timeline = self.timeline.build(&sections);
        let analysis = self.timeline.analyze(&timeline, self.range.0, self.range.1);

        // The subject, its last name part, and infobox relatives are matched in the prose too
        let mut persons = vec![subject.clone()];
        if let Some((_, last)) = subject.rsplit_once('・') {
            persons.push(last.to_string());
        }
        persons.extend(infobox.family_relations().into_iter().map(|(_, name)| name));
        let entity_analysis = self.analyzer.analyze_sections(&sections, &persons);

        let full_text = sections
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let parents = extract_parents(&full_text);

        let mut graph = RelationGraph::from_relations(&entity_analysis.relations);
        graph.add_infobox_relations(&infobox);
        graph.add_parents(&subject, &parents);

        let birth_year = infobox
            .date(CanonicalField::BirthDate)
            .and_then(|d| d.year.get());
        let death_year = infobox
            .date(CanonicalField::DeathDate)
            .and_then(|d| d.year.get());
        let achievements = extract_achievements(&sections, birth_year, death_year);

        let categories = match categories {
            Some(given) => filter_categories(given),
            None => filter_categories(&page.categories()),
        };

        tracing::info!(
            "Extracted {} sections, {} events, {} relations for {}",
            sections.len(),
            timeline.len(),
            graph.edge_count(),
            subject
        );

        Profile {
            title: page.title().to_string(),
            network: graph.analyze(Some(&subject)),
            graph: graph.summary(),
            subject,
            infobox,
            sections,
            timeline,
            analysis,
            entities: entity_analysis.entities,
            relations: entity_analysis.relations,
            achievements,
            images: extract_images(page),
            categories,
        }
    }
}
