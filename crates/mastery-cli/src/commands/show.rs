//! The `mastery show` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use comfy_table::Table;

use mastery_core::model::display_name_for;
use mastery_core::traits::MasterySink;
use mastery_providers::load_config_from;
use mastery_store::JsonFileStore;

use super::print_record;

pub async fn execute(
    handle: String,
    topic: Option<String>,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonFileStore::new(&config.store_dir);

    let Some(record) = store.load(&handle).await? else {
        anyhow::bail!(
            "no stored mastery for '{handle}' in {}. Run: mastery sync --handle {handle}",
            config.store_dir.display()
        );
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let Some(topic) = topic else {
        println!(
            "{} (last synced {})",
            record.learner,
            record.last_synced.format("%Y-%m-%d %H:%M UTC")
        );
        print_record(&record);
        return Ok(());
    };

    let Some(stored) = record.topics.get(&topic) else {
        anyhow::bail!("topic '{topic}' has no stored mastery for '{handle}'");
    };
    println!(
        "{}: current {:.1}, peak {:.1}",
        display_name_for(&topic),
        stored.current,
        stored.peak
    );

    let width_secs = i64::from(config.bucket_width_days) * 86_400;
    let mut table = Table::new();
    table.set_header(vec!["Bucket", "Starts", "Score", "Solves"]);
    for (idx, bin) in record.bins.get(&topic).into_iter().flatten() {
        let starts = Utc
            .timestamp_opt(idx * width_secs, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            idx.to_string(),
            starts,
            format!("{:.1}", bin.state.score),
            bin.state.credits.len().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
