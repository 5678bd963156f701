//! Prerequisite distances across the curriculum graph.
//!
//! The map is built once per graph snapshot and shared read-only between
//! syncs. Rebuilding means constructing a fresh map and swapping it in.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::TopicGraph;
use crate::model::{TopicEdge, TopicNode};

/// `distances[x][y] = d` iff `y` is a prerequisite of `x` at graph distance `d`.
///
/// Every topic is its own prerequisite at distance 0. A missing entry means
/// there is no prerequisite relationship at all, not an infinite distance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestryMap {
    distances: HashMap<String, HashMap<String, u32>>,
}

impl AncestryMap {
    /// Distance from `topic` back to its prerequisite `ancestor`, if any.
    pub fn distance(&self, topic: &str, ancestor: &str) -> Option<u32> {
        self.distances.get(topic)?.get(ancestor).copied()
    }

    /// All prerequisites of `topic` (itself included) with their distances.
    pub fn ancestors_of(&self, topic: &str) -> Option<&HashMap<String, u32>> {
        self.distances.get(topic)
    }

    /// Every topic known to the map, in no particular order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.distances.keys().map(String::as_str)
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.distances.contains_key(topic)
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// Build the ancestry map with one breadth-first walk per node over the
/// child → parent relation.
///
/// The first depth at which a topic is reached is its shortest distance and
/// is never overwritten. Edges naming unknown slugs are ignored here; call
/// [`TopicGraph::validate`] (or [`resolve_ancestry`]) to reject them.
pub fn resolve(nodes: &[TopicNode], edges: &[TopicEdge]) -> AncestryMap {
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        parents
            .entry(edge.child.as_str())
            .or_default()
            .push(edge.parent.as_str());
    }

    let mut distances = HashMap::with_capacity(nodes.len());
    for node in nodes {
        let start = node.slug.as_str();
        let mut seen: HashMap<String, u32> = HashMap::new();
        seen.insert(start.to_string(), 0);

        let mut queue = VecDeque::from([(start, 0u32)]);
        while let Some((slug, depth)) = queue.pop_front() {
            for parent in parents.get(slug).into_iter().flatten() {
                if !seen.contains_key(*parent) {
                    seen.insert(parent.to_string(), depth + 1);
                    queue.push_back((*parent, depth + 1));
                }
            }
        }

        distances.insert(node.slug.clone(), seen);
    }

    AncestryMap { distances }
}

/// Validate the graph, then resolve its ancestry.
pub fn resolve_ancestry(graph: &TopicGraph) -> Result<AncestryMap, GraphError> {
    graph.validate()?;
    let map = resolve(&graph.nodes, &graph.edges);
    tracing::debug!(
        topics = map.len(),
        edges = graph.edges.len(),
        "resolved topic ancestry"
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::default_curriculum;
    use proptest::prelude::*;

    fn chain() -> TopicGraph {
        TopicGraph::new(
            vec![
                TopicNode::new(1, "implementation"),
                TopicNode::new(2, "sortings"),
                TopicNode::new(3, "searching"),
            ],
            vec![
                TopicEdge::new("implementation", "sortings"),
                TopicEdge::new("sortings", "searching"),
            ],
        )
    }

    #[test]
    fn chain_distances() {
        let map = resolve_ancestry(&chain()).unwrap();
        assert_eq!(map.distance("searching", "searching"), Some(0));
        assert_eq!(map.distance("searching", "sortings"), Some(1));
        assert_eq!(map.distance("searching", "implementation"), Some(2));
        // Wrong direction: sortings is not a prerequisite of implementation.
        assert_eq!(map.distance("implementation", "sortings"), None);
        assert_eq!(map.ancestors_of("implementation").unwrap().len(), 1);
    }

    #[test]
    fn shortest_path_wins_with_multiple_parents() {
        // a -> b -> c -> d and a -> d: a is at distance 1 from d, not 3.
        let g = TopicGraph::new(
            ["a", "b", "c", "d"]
                .iter()
                .enumerate()
                .map(|(i, s)| TopicNode::new(i as u32, s))
                .collect(),
            vec![
                TopicEdge::new("a", "b"),
                TopicEdge::new("b", "c"),
                TopicEdge::new("c", "d"),
                TopicEdge::new("a", "d"),
            ],
        );
        let map = resolve_ancestry(&g).unwrap();
        assert_eq!(map.distance("d", "a"), Some(1));
        assert_eq!(map.distance("d", "b"), Some(2));
        assert_eq!(map.distance("d", "c"), Some(1));
    }

    #[test]
    fn default_curriculum_tree_dp() {
        let map = resolve_ancestry(&default_curriculum()).unwrap();
        assert_eq!(map.len(), 18);
        assert_eq!(map.distance("tree dp", "trees"), Some(1));
        assert_eq!(map.distance("tree dp", "dynamic programming"), Some(1));
        assert_eq!(map.distance("tree dp", "greedy"), Some(2));
        assert_eq!(map.distance("tree dp", "graphs"), Some(2));
        // implementation -> greedy -> dp -> tree dp is 3 hops,
        // implementation -> data structures -> graphs -> trees -> tree dp is 4.
        assert_eq!(map.distance("tree dp", "implementation"), Some(3));
        assert_eq!(map.distance("searching", "data structures"), Some(1));
        assert_eq!(map.distance("geometry", "strings"), None);
    }

    #[test]
    fn cyclic_graph_is_rejected() {
        let g = TopicGraph::new(
            vec![TopicNode::new(1, "a"), TopicNode::new(2, "b")],
            vec![TopicEdge::new("a", "b"), TopicEdge::new("b", "a")],
        );
        assert!(matches!(
            resolve_ancestry(&g),
            Err(GraphError::Cycle { .. })
        ));
    }

    #[test]
    fn empty_graph() {
        let map = resolve(&[], &[]);
        assert!(map.is_empty());
        assert_eq!(map.distance("x", "x"), None);
    }

    /// Independent all-pairs reference: BFS from every node over parent edges
    /// using a plain adjacency matrix.
    fn brute_force(n: usize, edges: &[(usize, usize)]) -> Vec<Vec<Option<u32>>> {
        let mut adj = vec![vec![false; n]; n];
        for &(p, c) in edges {
            adj[c][p] = true;
        }
        (0..n)
            .map(|start| {
                let mut dist = vec![None; n];
                dist[start] = Some(0);
                let mut frontier = vec![start];
                let mut depth = 0;
                while !frontier.is_empty() {
                    depth += 1;
                    let mut next = Vec::new();
                    for &u in &frontier {
                        for v in 0..n {
                            if adj[u][v] && dist[v].is_none() {
                                dist[v] = Some(depth);
                                next.push(v);
                            }
                        }
                    }
                    frontier = next;
                }
                dist
            })
            .collect()
    }

    /// Random DAG: edges only go from a lower index to a higher one.
    fn dag_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (1usize..9).prop_flat_map(|n| {
            let pairs = proptest::collection::vec((0..n, 0..n), 0..(n * 2));
            pairs.prop_map(move |raw| {
                let edges = raw
                    .into_iter()
                    .filter(|(a, b)| a != b)
                    .map(|(a, b)| (a.min(b), a.max(b)))
                    .collect();
                (n, edges)
            })
        })
    }

    proptest! {
        #[test]
        fn matches_brute_force_on_random_dags((n, edges) in dag_strategy()) {
            let nodes: Vec<TopicNode> =
                (0..n).map(|i| TopicNode::new(i as u32, &format!("t{i}"))).collect();
            let topic_edges: Vec<TopicEdge> = edges
                .iter()
                .map(|(p, c)| TopicEdge::new(&format!("t{p}"), &format!("t{c}")))
                .collect();
            let graph = TopicGraph::new(nodes, topic_edges);
            let map = resolve_ancestry(&graph).unwrap();
            let expected = brute_force(n, &edges);

            for x in 0..n {
                prop_assert_eq!(map.distance(&format!("t{x}"), &format!("t{x}")), Some(0));
                for y in 0..n {
                    prop_assert_eq!(
                        map.distance(&format!("t{x}"), &format!("t{y}")),
                        expected[x][y]
                    );
                }
            }
        }
    }
}
