//! The `mastery sync` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;

use mastery_core::engine::MasterySnapshot;
use mastery_core::error::SyncError;
use mastery_core::sync::{MasteryService, SyncOutcome, SyncReporter};
use mastery_core::traits::HistoryProvider;
use mastery_providers::{create_graph_provider, create_history_provider, load_config_from};
use mastery_store::JsonFileStore;

use super::{mastery_table, print_record};

/// Console progress reporter.
struct ConsoleReporter;

impl SyncReporter for ConsoleReporter {
    fn on_sync_start(&self, learner: &str) {
        eprintln!("  Syncing: {learner}");
    }

    fn on_sync_complete(&self, outcome: &SyncOutcome) {
        eprintln!(
            "  Done: {} ({} solved, {} topics, {} bins, {}ms)",
            outcome.learner,
            outcome.solved,
            outcome.topics_scored,
            outcome.bins_written,
            outcome.elapsed.as_millis()
        );
    }

    fn on_sync_error(&self, learner: &str, error: &SyncError) {
        let mut message = error.to_string();
        let mut cause = std::error::Error::source(error);
        while let Some(e) = cause {
            message.push_str(&format!(": {e}"));
            cause = e.source();
        }
        eprintln!("  ERROR: {learner}: {message}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} synced, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    handles: Vec<String>,
    config_path: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    anyhow::ensure!(!handles.is_empty(), "at least one --handle is required");

    let config = load_config_from(config_path.as_deref())?;
    anyhow::ensure!(config.parallelism >= 1, "parallelism must be at least 1");

    let history: Arc<dyn HistoryProvider> = Arc::from(create_history_provider(&config.history)?);
    let store = Arc::new(JsonFileStore::new(&config.store_dir));
    let graph = create_graph_provider(&config);

    let service = MasteryService::from_graph_provider(
        graph.as_ref(),
        history,
        store,
        config.tag_map(),
        config.sync_config(),
    )
    .await?;
    tracing::info!(
        curriculum = graph.name(),
        topics = service.ancestry().len(),
        "curriculum loaded"
    );

    if dry_run {
        for handle in &handles {
            let (snapshot, history) = service.compute(handle, Utc::now()).await?;
            println!("{handle}");
            print_snapshot(&snapshot);
            println!(
                "{} solved, {} incomplete. Dry run: nothing stored.\n",
                history.solved(),
                history.incomplete()
            );
        }
        return Ok(());
    }

    if let [handle] = handles.as_slice() {
        let outcome = service.sync(handle).await?;
        if let Some(record) = service.stored(handle).await? {
            print_record(&record);
        }
        println!(
            "Synced {}: {} solved, {} incomplete, {} bins written ({}ms). Stored in {}",
            outcome.learner,
            outcome.solved,
            outcome.incomplete,
            outcome.bins_written,
            outcome.elapsed.as_millis(),
            config.store_dir.display()
        );
        return Ok(());
    }

    let results = service.sync_many(&handles, &ConsoleReporter).await;
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} syncs failed", results.len());
    }
    Ok(())
}

fn print_snapshot(snapshot: &MasterySnapshot) {
    let (table, unscored) = mastery_table(snapshot.results.iter().map(|(slug, result)| {
        let bins = snapshot.bins.get(slug).map_or(0, |b| b.len());
        (slug.as_str(), *result, bins)
    }));
    println!("{table}");
    if unscored > 0 {
        println!("{unscored} topics not yet scored.");
    }
}
