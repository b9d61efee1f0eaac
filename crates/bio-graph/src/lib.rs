//! Bio Graph - Person relationship network
//!
//! Holds relations mined from prose and infobox family fields in an
//! undirected petgraph graph, and derives:
//! - neighbor lookup for a person
//! - degree and betweenness centrality
//! - persons grouped by relation type

use std::collections::BTreeMap;

use bio_core::{PersonRelation, RelationKind};
use serde::{Deserialize, Serialize};

pub mod centrality;
pub mod network;

pub use centrality::{betweenness_centrality, degree_centrality};
pub use network::RelationGraph;

/// Centrality scores per person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Centrality {
    pub degree_centrality: BTreeMap<String, f64>,
    pub betweenness_centrality: BTreeMap<String, f64>,
}

/// Serializable view of the whole graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub nodes: Vec<String>,
    /// One entry per relation label between a pair
    pub edges: Vec<PersonRelation>,
    pub centrality: Centrality,
}

/// The network as seen from one person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkAnalysis {
    pub related_persons: Vec<String>,
    pub relations_by_type: BTreeMap<RelationKind, Vec<String>>,
    pub centrality: Centrality,
}
