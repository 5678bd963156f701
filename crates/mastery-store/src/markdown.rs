//! Markdown report generator, for pasting into issues and chat.

use anyhow::{Context, Result};
use std::path::Path;

use mastery_core::model::display_name_for;
use mastery_core::record::LearnerRecord;

use crate::html::{ranked_topics, retention};

/// Render one learner's stored mastery as a Markdown table.
pub fn to_markdown(record: &LearnerRecord) -> String {
    let topics = ranked_topics(record);
    let mut md = String::new();

    md.push_str(&format!("## Topic mastery: {}\n\n", record.learner));
    md.push_str(&format!(
        "**Last synced:** {} | **Bins:** {}\n\n",
        record.last_synced.format("%Y-%m-%d %H:%M UTC"),
        record.bin_count()
    ));

    md.push_str("| Topic | Current | Peak | Retained |\n");
    md.push_str("|-------|---------|------|----------|\n");
    for (slug, topic) in &topics {
        if topic.peak == 0.0 {
            continue;
        }
        md.push_str(&format!(
            "| {} | {:.1} | {:.1} | {:.0}% |\n",
            display_name_for(slug),
            topic.current,
            topic.peak,
            retention(topic) * 100.0
        ));
    }

    let unscored: Vec<String> = topics
        .iter()
        .filter(|(_, t)| t.peak == 0.0)
        .map(|(slug, _)| display_name_for(slug))
        .collect();
    if !unscored.is_empty() {
        md.push_str(&format!("\n_Not yet scored:_ {}\n", unscored.join(", ")));
    }

    md
}

/// Write a Markdown report to a file.
pub fn write_markdown_report(record: &LearnerRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_markdown(record))
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}
