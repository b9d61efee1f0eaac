//! Relationship graph construction and queries

use std::collections::{BTreeMap, BTreeSet, HashMap};

use bio_core::{InfoboxRecord, PersonRelation, RelationKind};
use bio_normalizer::Parents;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::centrality::{betweenness_centrality, degree_centrality};
use crate::{Centrality, GraphSummary, NetworkAnalysis};

/// Undirected person graph; each pair has one edge carrying every relation label seen
pub struct RelationGraph {
    graph: UnGraph<String, BTreeSet<RelationKind>>,
    node_index: HashMap<String, NodeIndex>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            node_index: HashMap::new(),
        }
    }

    /// Build a graph from relation triples
    pub fn from_relations<'a>(relations: impl IntoIterator<Item = &'a PersonRelation>) -> Self {
        let mut graph = Self::new();
        for relation in relations {
            graph.add_relation(&relation.source, &relation.target, relation.relation.clone());
        }
        graph
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_index.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        self.node_index.insert(name.to_string(), index);
        index
    }

    /// Add a person without relations
    pub fn add_person(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.node(name);
        }
    }

    /// Add a relation; returns `false` when the labeled edge already exists
    /// or the relation is a self-loop
    pub fn add_relation(&mut self, source: &str, target: &str, relation: RelationKind) -> bool {
        let (source, target) = (source.trim(), target.trim());
        if source.is_empty() || target.is_empty() || source == target {
            tracing::debug!("Skipping relation {} - {} ({})", source, target, relation);
            return false;
        }

        let a = self.node(source);
        let b = self.node(target);
        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph[edge].insert(relation),
            None => {
                self.graph.add_edge(a, b, BTreeSet::from([relation]));
                true
            }
        }
    }

    /// Edges from the infobox subject to each spouse, child, and parent, labeled with the field
    pub fn add_infobox_relations(&mut self, record: &InfoboxRecord) -> usize {
        let mut added = 0;
        for (field, name) in record.family_relations() {
            let label = RelationKind::Label(field.label().to_string());
            added += usize::from(self.add_relation(record.subject(), &name, label));
        }
        added
    }

    /// Edges to the father and mother named in the article prose
    pub fn add_parents(&mut self, subject: &str, parents: &Parents) -> usize {
        let mut added = 0;
        if let Some(father) = &parents.father {
            added += usize::from(self.add_relation(subject, father, RelationKind::Label("父".to_string())));
        }
        if let Some(mother) = &parents.mother {
            added += usize::from(self.add_relation(subject, mother, RelationKind::Label("母".to_string())));
        }
        added
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of labeled relations
    pub fn edge_count(&self) -> usize {
        self.graph.edge_weights().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Distinct neighbors of `name` in name order; empty for an unknown person
    pub fn neighbors(&self, name: &str) -> Vec<String> {
        let Some(&index) = self.node_index.get(name) else {
            return Vec::new();
        };
        let neighbors: BTreeSet<&str> = self
            .graph
            .neighbors(index)
            .map(|n| self.graph[n].as_str())
            .collect();
        neighbors.into_iter().map(str::to_string).collect()
    }

    /// Persons in relations of each type, leaving out `exclude`
    pub fn relations_by_type(&self, exclude: Option<&str>) -> BTreeMap<RelationKind, Vec<String>> {
        let mut grouped: BTreeMap<RelationKind, BTreeSet<&str>> = BTreeMap::new();
        for edge in self.graph.edge_indices() {
            let Some((a, b)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            for relation in &self.graph[edge] {
                let persons = grouped.entry(relation.clone()).or_default();
                for name in [self.graph[a].as_str(), self.graph[b].as_str()] {
                    if Some(name) != exclude {
                        persons.insert(name);
                    }
                }
            }
        }
        grouped
            .into_iter()
            .map(|(relation, persons)| {
                (relation, persons.into_iter().map(str::to_string).collect())
            })
            .collect()
    }

    pub fn centrality(&self) -> Centrality {
        if self.is_empty() {
            return Centrality::default();
        }
        Centrality {
            degree_centrality: degree_centrality(&self.graph),
            betweenness_centrality: betweenness_centrality(&self.graph),
        }
    }

    /// Relation triples in insertion order, one per label
    pub fn relations(&self) -> Vec<PersonRelation> {
        self.graph
            .edge_indices()
            .filter_map(|edge| {
                let (a, b) = self.graph.edge_endpoints(edge)?;
                Some(
                    self.graph[edge]
                        .iter()
                        .map(move |relation| {
                            PersonRelation::new(&self.graph[a], &self.graph[b], relation.clone())
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .flatten()
            .collect()
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            nodes: self.graph.node_weights().cloned().collect(),
            edges: self.relations(),
            centrality: self.centrality(),
        }
    }

    /// Neighbors, grouped relations, and centrality from `target`'s point of view
    pub fn analyze(&self, target: Option<&str>) -> NetworkAnalysis {
        tracing::info!(
            "Analyzing network of {} persons, {} relations",
            self.node_count(),
            self.edge_count()
        );
        NetworkAnalysis {
            related_persons: target.map(|t| self.neighbors(t)).unwrap_or_default(),
            relations_by_type: self.relations_by_type(target),
            centrality: self.centrality(),
        }
    }
}

impl Default for RelationGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bio_core::{CanonicalField, ChildEntry, FieldValue, PeriodEntry};
    use pretty_assertions::assert_eq;

    fn sample() -> RelationGraph {
        let relations = vec![
            PersonRelation::new("アインシュタイン", "ミレヴァ・マリッチ", RelationKind::Spouse),
            PersonRelation::new("ボーア", "アインシュタイン", RelationKind::Unknown),
            PersonRelation::new("アインシュタイン", "ボーア", RelationKind::Unknown),
            PersonRelation::new("ボーア", "ハイゼンベルク", RelationKind::Mentor),
        ];
        RelationGraph::from_relations(&relations)
    }

    #[test]
    fn test_simple_graph() {
        let graph = sample();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);

        let mut graph = graph;
        assert!(graph.add_relation("ミレヴァ・マリッチ", "アインシュタイン", RelationKind::Colleague));
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.neighbors("アインシュタイン").len(), 2);
        assert!(!graph.add_relation("ボーア", "ボーア", RelationKind::Unknown));
    }

    #[test]
    fn test_neighbors() {
        let graph = sample();
        assert_eq!(
            graph.neighbors("アインシュタイン"),
            vec!["ボーア", "ミレヴァ・マリッチ"]
        );
        assert!(graph.neighbors("プランク").is_empty());
    }

    #[test]
    fn test_relations_by_type_excludes_target() {
        let graph = sample();
        let grouped = graph.relations_by_type(Some("アインシュタイン"));

        assert_eq!(grouped[&RelationKind::Spouse], vec!["ミレヴァ・マリッチ"]);
        assert_eq!(grouped[&RelationKind::Unknown], vec!["ボーア"]);
        assert_eq!(grouped[&RelationKind::Mentor], vec!["ハイゼンベルク", "ボーア"]);
    }

    #[test]
    fn test_infobox_and_parent_edges() {
        let mut fields = BTreeMap::new();
        fields.insert(
            CanonicalField::Spouse,
            FieldValue::Periods(vec![PeriodEntry {
                names: vec!["ミレヴァ・マリッチ".to_string()],
                start: Some(1903),
                end: Some(1919),
            }]),
        );
        fields.insert(
            CanonicalField::Children,
            FieldValue::Children(vec![ChildEntry {
                name: Some("ハンス・アルベルト".to_string()),
                birth_year: Some(1904),
                death_year: Some(1973),
                death_year_uncertain: false,
            }]),
        );
        let record = InfoboxRecord::new("アインシュタイン", fields, BTreeMap::new());

        let mut graph = RelationGraph::new();
        assert_eq!(graph.add_infobox_relations(&record), 2);
        let parents = Parents {
            father: Some("ヘルマン".to_string()),
            mother: None,
        };
        assert_eq!(graph.add_parents("アインシュタイン", &parents), 1);

        let grouped = graph.relations_by_type(Some("アインシュタイン"));
        assert_eq!(
            grouped[&RelationKind::Label("配偶者".to_string())],
            vec!["ミレヴァ・マリッチ"]
        );
        assert_eq!(
            grouped[&RelationKind::Label("子供".to_string())],
            vec!["ハンス・アルベルト"]
        );
        assert_eq!(grouped[&RelationKind::Label("父".to_string())], vec!["ヘルマン"]);
    }

    #[test]
    fn test_summary_json() {
        let graph = sample();
        let json = serde_json::to_value(graph.summary()).unwrap();

        assert_eq!(json["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(json["edges"].as_array().unwrap().len(), 3);
        assert_eq!(json["edges"][0]["relation"], "spouse");
        assert!(json["centrality"]["degree_centrality"]["ボーア"].is_number());
        assert!(json["centrality"]["betweenness_centrality"]["ボーア"].is_number());
    }

    #[test]
    fn test_analyze_absent_target() {
        let graph = sample();
        let analysis = graph.analyze(Some("プランク"));
        assert!(analysis.related_persons.is_empty());
        assert_eq!(analysis.centrality.degree_centrality.len(), 4);

        let empty = RelationGraph::new().analyze(None);
        assert_eq!(empty, NetworkAnalysis::default());
    }
}
