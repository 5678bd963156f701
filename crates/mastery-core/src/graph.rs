//! Curriculum graph snapshot and its load-time validation.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::model::{TopicEdge, TopicNode};

/// Topics and prerequisite edges as returned by a graph provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicGraph {
    #[serde(default)]
    pub nodes: Vec<TopicNode>,
    #[serde(default)]
    pub edges: Vec<TopicEdge>,
}

impl TopicGraph {
    pub fn new(nodes: Vec<TopicNode>, edges: Vec<TopicEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Look up a node by slug.
    pub fn node(&self, slug: &str) -> Option<&TopicNode> {
        self.nodes.iter().find(|n| n.slug == slug)
    }

    /// Check that slugs are unique, edges only name known topics, and the
    /// prerequisite relation is acyclic.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut slugs = HashSet::new();
        for node in &self.nodes {
            if !slugs.insert(node.slug.as_str()) {
                return Err(GraphError::DuplicateTopic(node.slug.clone()));
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.parent, &edge.child] {
                if !slugs.contains(endpoint.as_str()) {
                    return Err(GraphError::UnknownTopic {
                        parent: edge.parent.clone(),
                        child: edge.child.clone(),
                        unknown: endpoint.clone(),
                    });
                }
            }
            if edge.parent == edge.child {
                return Err(GraphError::SelfLoop(edge.parent.clone()));
            }
        }

        // Kahn's algorithm: whatever cannot be peeled off sits on or behind a cycle.
        let mut indegree: HashMap<&str, usize> = slugs.iter().map(|s| (*s, 0)).collect();
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            children
                .entry(edge.parent.as_str())
                .or_default()
                .push(edge.child.as_str());
            if let Some(d) = indegree.get_mut(edge.child.as_str()) {
                *d += 1;
            }
        }

        let mut queue: VecDeque<&str> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(s, _)| *s)
            .collect();
        let mut ordered = 0usize;
        while let Some(slug) = queue.pop_front() {
            ordered += 1;
            for child in children.get(slug).into_iter().flatten() {
                if let Some(d) = indegree.get_mut(child) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push_back(*child);
                    }
                }
            }
        }

        if ordered < slugs.len() {
            let mut topics: Vec<String> = indegree
                .into_iter()
                .filter(|(_, d)| *d > 0)
                .map(|(s, _)| s.to_string())
                .collect();
            topics.sort();
            return Err(GraphError::Cycle { topics });
        }

        Ok(())
    }
}

/// Prerequisite edges of the built-in curriculum, parent first.
const DEFAULT_EDGES: &[(&str, &str)] = &[
    ("implementation", "ad hoc"),
    ("implementation", "sortings"),
    ("implementation", "data structures"),
    ("implementation", "greedy"),
    ("implementation", "math"),
    ("implementation", "strings"),
    ("sortings", "two pointers"),
    ("sortings", "searching"),
    ("data structures", "searching"),
    ("data structures", "graphs"),
    ("greedy", "dynamic programming"),
    ("math", "advanced math"),
    ("math", "geometry"),
    ("strings", "advanced strings"),
    ("searching", "meet in the middle"),
    ("dynamic programming", "tree dp"),
    ("trees", "tree dp"),
    ("graphs", "advanced graphs"),
    ("graphs", "trees"),
];

const DEFAULT_TOPICS: &[&str] = &[
    "implementation",
    "ad hoc",
    "sortings",
    "two pointers",
    "searching",
    "meet in the middle",
    "greedy",
    "math",
    "advanced math",
    "geometry",
    "graphs",
    "advanced graphs",
    "trees",
    "strings",
    "advanced strings",
    "data structures",
    "dynamic programming",
    "tree dp",
];

/// The built-in competitive-programming curriculum.
pub fn default_curriculum() -> TopicGraph {
    let nodes = DEFAULT_TOPICS
        .iter()
        .enumerate()
        .map(|(i, slug)| TopicNode::new(i as u32 + 1, slug))
        .collect();
    let edges = DEFAULT_EDGES
        .iter()
        .map(|(parent, child)| TopicEdge::new(parent, child))
        .collect();
    TopicGraph { nodes, edges }
}
