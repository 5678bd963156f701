//! TOML curriculum parser.
//!
//! Loads topic graphs from curriculum files and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::graph::TopicGraph;
use crate::model::{display_name_for, TopicEdge, TopicNode};

/// Intermediate TOML structure for curriculum files.
#[derive(Debug, Deserialize)]
struct TomlCurriculum {
    #[serde(default)]
    topics: Vec<TomlTopic>,
    #[serde(default)]
    edges: Vec<TomlEdge>,
}

#[derive(Debug, Deserialize)]
struct TomlTopic {
    slug: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TomlEdge {
    parent: String,
    child: String,
}

/// Parse and validate a curriculum file.
pub fn parse_curriculum(path: &Path) -> Result<TopicGraph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read curriculum file: {}", path.display()))?;

    parse_curriculum_str(&content, path)
}

/// Parse and validate a curriculum from a TOML string.
pub fn parse_curriculum_str(content: &str, source_path: &Path) -> Result<TopicGraph> {
    let parsed: TomlCurriculum = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let nodes = parsed
        .topics
        .into_iter()
        .enumerate()
        .map(|(i, t)| TopicNode {
            id: t.id.unwrap_or(i as u32 + 1),
            display_name: t.name.unwrap_or_else(|| display_name_for(&t.slug)),
            slug: t.slug,
        })
        .collect();

    let edges = parsed
        .edges
        .into_iter()
        .map(|e| TopicEdge {
            parent: e.parent,
            child: e.child,
        })
        .collect();

    let graph = TopicGraph { nodes, edges };
    graph
        .validate()
        .with_context(|| format!("invalid curriculum: {}", source_path.display()))?;
    Ok(graph)
}

/// Render a graph back into curriculum TOML.
pub fn to_curriculum_toml(graph: &TopicGraph) -> String {
    let mut out = String::new();
    for node in &graph.nodes {
        out.push_str("[[topics]]\n");
        out.push_str(&format!("slug = {:?}\n", node.slug));
        out.push_str(&format!("name = {:?}\n\n", node.display_name));
    }
    for edge in &graph.edges {
        out.push_str("[[edges]]\n");
        out.push_str(&format!("parent = {:?}\n", edge.parent));
        out.push_str(&format!("child = {:?}\n\n", edge.child));
    }
    out
}
