//! Curriculum graph sources.

use std::path::PathBuf;

use async_trait::async_trait;

use mastery_core::graph::{default_curriculum, TopicGraph};
use mastery_core::parser::parse_curriculum;
use mastery_core::traits::GraphProvider;

/// The built-in competitive-programming roadmap.
pub struct BuiltinGraphProvider;

#[async_trait]
impl GraphProvider for BuiltinGraphProvider {
    fn name(&self) -> &str {
        "builtin"
    }

    async fn load_graph(&self) -> anyhow::Result<TopicGraph> {
        Ok(default_curriculum())
    }
}

/// A curriculum TOML file, re-read on every load.
pub struct FileGraphProvider {
    path: PathBuf,
    name: String,
}

impl FileGraphProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl GraphProvider for FileGraphProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load_graph(&self) -> anyhow::Result<TopicGraph> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || parse_curriculum(&path)).await?
    }
}

/// A fixed in-memory graph.
pub struct StaticGraphProvider {
    graph: TopicGraph,
}

impl StaticGraphProvider {
    pub fn new(graph: TopicGraph) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl GraphProvider for StaticGraphProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn load_graph(&self) -> anyhow::Result<TopicGraph> {
        Ok(self.graph.clone())
    }
}
