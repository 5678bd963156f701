//! Sync orchestrator.
//!
//! Pulls a learner's history, normalizes and scores it against the shared
//! ancestry map, and hands the snapshot to the sink as one unit.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::ancestry::{resolve_ancestry, AncestryMap};
use crate::classify::{normalize_history, NormalizedHistory, TagMap};
use crate::engine::{compute_mastery, MasterySnapshot, DEFAULT_BUCKET_WIDTH_DAYS};
use crate::error::SyncError;
use crate::record::LearnerRecord;
use crate::traits::{GraphProvider, HistoryProvider, MasterySink};

/// Configuration for the sync service.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Width of a scoring bucket in days.
    pub bucket_width_days: u32,
    /// Maximum concurrent syncs in [`MasteryService::sync_many`].
    pub parallelism: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            bucket_width_days: DEFAULT_BUCKET_WIDTH_DAYS,
            parallelism: 4,
        }
    }
}

/// Summary of one committed sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub snapshot_id: Uuid,
    pub learner: String,
    /// Topics with a non-zero peak.
    pub topics_scored: usize,
    pub bins_written: usize,
    pub solved: usize,
    pub incomplete: usize,
    pub elapsed: Duration,
}

/// Progress reporting for batch syncs.
pub trait SyncReporter: Send + Sync {
    fn on_sync_start(&self, learner: &str);
    fn on_sync_complete(&self, outcome: &SyncOutcome);
    fn on_sync_error(&self, learner: &str, error: &SyncError);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl SyncReporter for NoopReporter {
    fn on_sync_start(&self, _: &str) {}
    fn on_sync_complete(&self, _: &SyncOutcome) {}
    fn on_sync_error(&self, _: &str, _: &SyncError) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Owns the shared ancestry map and runs syncs against it.
pub struct MasteryService {
    history: Arc<dyn HistoryProvider>,
    sink: Arc<dyn MasterySink>,
    ancestry: RwLock<Arc<AncestryMap>>,
    tag_map: TagMap,
    config: SyncConfig,
}

impl MasteryService {
    pub fn new(
        history: Arc<dyn HistoryProvider>,
        sink: Arc<dyn MasterySink>,
        ancestry: AncestryMap,
        tag_map: TagMap,
        config: SyncConfig,
    ) -> Self {
        Self {
            history,
            sink,
            ancestry: RwLock::new(Arc::new(ancestry)),
            tag_map,
            config,
        }
    }

    /// Load the curriculum from `graph`, resolve its ancestry, and build a service.
    pub async fn from_graph_provider(
        graph: &dyn GraphProvider,
        history: Arc<dyn HistoryProvider>,
        sink: Arc<dyn MasterySink>,
        tag_map: TagMap,
        config: SyncConfig,
    ) -> Result<Self, SyncError> {
        let ancestry = load_ancestry(graph).await?;
        Ok(Self::new(history, sink, ancestry, tag_map, config))
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The ancestry map syncs currently run against.
    pub fn ancestry(&self) -> Arc<AncestryMap> {
        let guard = self.ancestry.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the ancestry map. Syncs already running keep the map they started with.
    pub fn swap_ancestry(&self, ancestry: AncestryMap) {
        let mut guard = self
            .ancestry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(ancestry);
    }

    /// Reload the curriculum and swap in a freshly resolved map.
    ///
    /// On failure the current map stays in place.
    pub async fn rebuild_ancestry(&self, graph: &dyn GraphProvider) -> Result<(), SyncError> {
        let ancestry = load_ancestry(graph).await?;
        tracing::info!(
            source = graph.name(),
            topics = ancestry.len(),
            "rebuilt topic ancestry"
        );
        self.swap_ancestry(ancestry);
        Ok(())
    }

    /// Fetch and score a learner's history without persisting anything.
    pub async fn compute(
        &self,
        learner: &str,
        now: DateTime<Utc>,
    ) -> Result<(MasterySnapshot, NormalizedHistory), SyncError> {
        let raw = self
            .history
            .fetch_history(learner)
            .await
            .map_err(|source| SyncError::Fetch {
                learner: learner.to_string(),
                source,
            })?;

        let history = normalize_history(&raw, &self.tag_map);
        tracing::debug!(
            learner,
            attempts = raw.len(),
            solved = history.solved(),
            incomplete = history.incomplete(),
            "normalized history"
        );

        let ancestry = self.ancestry();
        let snapshot = compute_mastery(
            learner,
            &history.submissions,
            &ancestry,
            self.config.bucket_width_days,
            now,
        )?;
        Ok((snapshot, history))
    }

    /// Sync a learner as of the current time.
    pub async fn sync(&self, learner: &str) -> Result<SyncOutcome, SyncError> {
        self.sync_at(learner, Utc::now()).await
    }

    /// Sync a learner as of `now`: fetch, score, then commit in one unit.
    pub async fn sync_at(
        &self,
        learner: &str,
        now: DateTime<Utc>,
    ) -> Result<SyncOutcome, SyncError> {
        let start = Instant::now();
        tracing::info!(learner, provider = self.history.name(), "sync started");

        let (snapshot, history) = self.compute(learner, now).await?;

        self.sink
            .commit(&snapshot)
            .await
            .map_err(|source| SyncError::Persist {
                learner: learner.to_string(),
                source,
            })?;

        let outcome = SyncOutcome {
            snapshot_id: snapshot.id,
            learner: learner.to_string(),
            topics_scored: snapshot.results.values().filter(|r| r.peak > 0.0).count(),
            bins_written: snapshot.bin_count(),
            solved: history.solved(),
            incomplete: history.incomplete(),
            elapsed: start.elapsed(),
        };
        tracing::info!(
            learner,
            topics = outcome.topics_scored,
            bins = outcome.bins_written,
            solved = outcome.solved,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "sync committed"
        );
        Ok(outcome)
    }

    /// Sync several learners concurrently, at most `parallelism` at a time.
    ///
    /// Each learner succeeds or fails on its own; results come back in
    /// completion order.
    pub async fn sync_many(
        &self,
        learners: &[String],
        reporter: &dyn SyncReporter,
    ) -> Vec<(String, Result<SyncOutcome, SyncError>)> {
        let start = Instant::now();
        let now = Utc::now();

        let results: Vec<(String, Result<SyncOutcome, SyncError>)> = stream::iter(learners)
            .map(|learner| async move {
                reporter.on_sync_start(learner);
                (learner.clone(), self.sync_at(learner, now).await)
            })
            .buffer_unordered(self.config.parallelism.max(1))
            .collect()
            .await;

        let mut failed = 0usize;
        for (learner, result) in &results {
            match result {
                Ok(outcome) => reporter.on_sync_complete(outcome),
                Err(e) => {
                    tracing::error!(learner = %learner, error = ?e, "sync failed");
                    reporter.on_sync_error(learner, e);
                    failed += 1;
                }
            }
        }
        reporter.on_batch_complete(
            results.len(),
            results.len() - failed,
            failed,
            start.elapsed(),
        );

        results
    }

    /// Everything the sink holds for `learner`.
    pub async fn stored(&self, learner: &str) -> anyhow::Result<Option<LearnerRecord>> {
        self.sink.load(learner).await
    }

    /// Stored current mastery of `topic`, if the learner has been synced.
    pub async fn current_mastery(&self, learner: &str, topic: &str) -> anyhow::Result<Option<f64>> {
        Ok(self
            .stored(learner)
            .await?
            .and_then(|r| r.mastery(topic))
            .map(|m| m.current))
    }

    /// Stored all-time peak of `topic`, if the learner has been synced.
    pub async fn peak_mastery(&self, learner: &str, topic: &str) -> anyhow::Result<Option<f64>> {
        Ok(self
            .stored(learner)
            .await?
            .and_then(|r| r.mastery(topic))
            .map(|m| m.peak))
    }
}

async fn load_ancestry(graph: &dyn GraphProvider) -> Result<AncestryMap, SyncError> {
    let topics = graph
        .load_graph()
        .await
        .map_err(|source| SyncError::GraphLoad { source })?;
    Ok(resolve_ancestry(&topics)?)
}
