//! Centrality measures over an undirected graph

use std::collections::{BTreeMap, VecDeque};

use petgraph::graph::{NodeIndex, UnGraph};

/// Degree centrality: distinct neighbors over `n - 1`; a lone node scores 1.0
pub fn degree_centrality<N: AsRef<str>, E>(graph: &UnGraph<N, E>) -> BTreeMap<String, f64> {
    let n = graph.node_count();
    graph
        .node_indices()
        .map(|node| {
            let score = if n <= 1 {
                1.0
            } else {
                graph.neighbors(node).count() as f64 / (n - 1) as f64
            };
            (graph[node].as_ref().to_string(), score)
        })
        .collect()
}

/// Betweenness centrality (Brandes), normalized by `1 / ((n - 1)(n - 2))`.
///
/// Graphs with two nodes or fewer score 0 everywhere.
pub fn betweenness_centrality<N: AsRef<str>, E>(graph: &UnGraph<N, E>) -> BTreeMap<String, f64> {
    let n = graph.node_count();
    let mut scores = vec![0.0_f64; n];

    for source in graph.node_indices() {
        accumulate_from(graph, source, &mut scores);
    }

    let scale = if n > 2 {
        1.0 / ((n - 1) * (n - 2)) as f64
    } else {
        0.0
    };

    graph
        .node_indices()
        .map(|node| (graph[node].as_ref().to_string(), scores[node.index()] * scale))
        .collect()
}

/// Single-source shortest paths by BFS, then dependency accumulation
fn accumulate_from<N, E>(graph: &UnGraph<N, E>, source: NodeIndex, scores: &mut [f64]) {
    let n = graph.node_count();
    let mut stack: Vec<NodeIndex> = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0_f64; n];
    let mut distance: Vec<Option<usize>> = vec![None; n];

    sigma[source.index()] = 1.0;
    distance[source.index()] = Some(0);

    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        stack.push(v);
        let Some(dv) = distance[v.index()] else {
            continue;
        };
        for w in graph.neighbors(v) {
            if distance[w.index()].is_none() {
                distance[w.index()] = Some(dv + 1);
                queue.push_back(w);
            }
            if distance[w.index()] == Some(dv + 1) {
                sigma[w.index()] += sigma[v.index()];
                predecessors[w.index()].push(v);
            }
        }
    }

    let mut delta = vec![0.0_f64; n];
    while let Some(w) = stack.pop() {
        for &v in &predecessors[w.index()] {
            delta[v.index()] += sigma[v.index()] / sigma[w.index()] * (1.0 + delta[w.index()]);
        }
        if w != source {
            scores[w.index()] += delta[w.index()];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(names: &[&str]) -> UnGraph<String, ()> {
        let mut graph = UnGraph::new_undirected();
        let nodes: Vec<_> = names.iter().map(|n| graph.add_node(n.to_string())).collect();
        for pair in nodes.windows(2) {
            graph.add_edge(pair[0], pair[1], ());
        }
        graph
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_degree_centrality_star() {
        let mut graph: UnGraph<String, ()> = UnGraph::new_undirected();
        let hub = graph.add_node("hub".to_string());
        for name in ["a", "b", "c"] {
            let leaf = graph.add_node(name.to_string());
            graph.add_edge(hub, leaf, ());
        }

        let degree = degree_centrality(&graph);
        assert!(close(degree["hub"], 1.0));
        assert!(close(degree["a"], 1.0 / 3.0));
    }

    #[test]
    fn test_single_node() {
        let graph = path_graph(&["solo"]);
        assert!(close(degree_centrality(&graph)["solo"], 1.0));
        assert!(close(betweenness_centrality(&graph)["solo"], 0.0));
    }

    #[test]
    fn test_betweenness_path() {
        let graph = path_graph(&["a", "b", "c"]);
        let betweenness = betweenness_centrality(&graph);
        assert!(close(betweenness["b"], 1.0));
        assert!(close(betweenness["a"], 0.0));

        let graph = path_graph(&["a", "b", "c", "d"]);
        let betweenness = betweenness_centrality(&graph);
        // b lies on a-c and a-d: 2 pairs of 3
        assert!(close(betweenness["b"], 2.0 / 3.0));
        assert!(close(betweenness["c"], 2.0 / 3.0));
    }

    #[test]
    fn test_betweenness_split_paths() {
        // a-b-d and a-c-d: b and c each carry half of a-d
        let mut graph: UnGraph<String, ()> = UnGraph::new_undirected();
        let [a, b, c, d] = ["a", "b", "c", "d"].map(|n| graph.add_node(n.to_string()));
        graph.add_edge(a, b, ());
        graph.add_edge(a, c, ());
        graph.add_edge(b, d, ());
        graph.add_edge(c, d, ());

        let betweenness = betweenness_centrality(&graph);
        assert!(close(betweenness["b"], 1.0 / 6.0));
        assert!(close(betweenness["a"], 1.0 / 6.0));
    }

    #[test]
    fn test_empty_graph() {
        let graph: UnGraph<String, ()> = UnGraph::new_undirected();
        assert!(degree_centrality(&graph).is_empty());
        assert!(betweenness_centrality(&graph).is_empty());
    }
}
