//! The `mastery graph` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use mastery_core::ancestry::resolve_ancestry;
use mastery_core::traits::GraphProvider;
use mastery_providers::{BuiltinGraphProvider, FileGraphProvider};

pub async fn execute(curriculum: Option<PathBuf>, topic: Option<String>) -> Result<()> {
    let provider: Box<dyn GraphProvider> = match curriculum {
        Some(path) => Box::new(FileGraphProvider::new(path)),
        None => Box::new(BuiltinGraphProvider),
    };
    let graph = provider.load_graph().await?;
    let ancestry = resolve_ancestry(&graph)?;

    if let Some(topic) = topic {
        let Some(ancestors) = ancestry.ancestors_of(&topic) else {
            anyhow::bail!("unknown topic '{topic}' in {}", provider.name());
        };

        let mut ancestors: Vec<(&String, &u32)> = ancestors.iter().collect();
        ancestors.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));

        let mut table = Table::new();
        table.set_header(vec!["Topic", "Distance", "Credit share"]);
        for (slug, distance) in ancestors {
            let name = graph
                .node(slug)
                .map_or_else(|| slug.clone(), |n| n.display_name.clone());
            table.add_row(vec![
                name,
                distance.to_string(),
                format!(
                    "{:.1}%",
                    mastery_core::credit::propagation_multiplier(*distance) * 100.0
                ),
            ]);
        }
        println!("{table}");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Topic", "Name", "Prerequisites", "Ancestors"]);
    for node in &graph.nodes {
        let parents: Vec<&str> = graph
            .edges
            .iter()
            .filter(|e| e.child == node.slug)
            .map(|e| e.parent.as_str())
            .collect();
        let ancestors = ancestry
            .ancestors_of(&node.slug)
            .map_or(0, |a| a.len().saturating_sub(1));
        table.add_row(vec![
            node.slug.clone(),
            node.display_name.clone(),
            parents.join(", "),
            ancestors.to_string(),
        ]);
    }
    println!("{table}");
    println!(
        "{}: {} topics, {} edges, no cycles",
        provider.name(),
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(())
}
