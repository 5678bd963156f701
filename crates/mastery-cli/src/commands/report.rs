//! The `mastery report` command.

use std::path::PathBuf;

use anyhow::Result;

use mastery_core::traits::MasterySink;
use mastery_providers::load_config_from;
use mastery_store::html::write_html_report;
use mastery_store::markdown::write_markdown_report;
use mastery_store::JsonFileStore;

pub async fn execute(
    handle: String,
    output: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonFileStore::new(&config.store_dir);

    let Some(record) = store.load(&handle).await? else {
        anyhow::bail!("no stored mastery for '{handle}'. Run: mastery sync --handle {handle}");
    };

    match format.as_str() {
        "html" => write_html_report(&record, &output)?,
        "markdown" | "md" => write_markdown_report(&record, &output)?,
        other => anyhow::bail!("unknown format '{other}' (expected html or markdown)"),
    }
    eprintln!("Report written to: {}", output.display());
    Ok(())
}
