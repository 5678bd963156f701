//! Persisted per-learner mastery state and the upsert rules sinks apply.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::MasterySnapshot;
use crate::model::{BinState, MasteryResult};

/// Stored mastery of one topic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub current: f64,
    /// Never decreases across syncs.
    pub peak: f64,
    pub last_updated: DateTime<Utc>,
}

/// Stored bin of one (topic, bucket) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinRecord {
    #[serde(flatten)]
    pub state: BinState,
    pub last_updated: DateTime<Utc>,
}

/// Everything persisted for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerRecord {
    pub learner: String,
    pub last_synced: DateTime<Utc>,
    /// Snapshot that last touched this record.
    pub last_snapshot: Uuid,
    #[serde(default)]
    pub topics: BTreeMap<String, TopicRecord>,
    #[serde(default)]
    pub bins: BTreeMap<String, BTreeMap<i64, BinRecord>>,
}

impl LearnerRecord {
    pub fn from_snapshot(snapshot: &MasterySnapshot) -> Self {
        let mut record = Self {
            learner: snapshot.learner.clone(),
            last_synced: snapshot.computed_at,
            last_snapshot: snapshot.id,
            topics: BTreeMap::new(),
            bins: BTreeMap::new(),
        };
        record.apply(snapshot);
        record
    }

    /// Upsert a snapshot into this record.
    ///
    /// Keyed by topic and by (topic, bucket). On conflict the peak is the
    /// larger of stored and new; current and bin contents are overwritten.
    /// Rows the snapshot does not mention are left as they are.
    pub fn apply(&mut self, snapshot: &MasterySnapshot) {
        let at = snapshot.computed_at;

        for (topic, result) in &snapshot.results {
            self.topics
                .entry(topic.clone())
                .and_modify(|stored| {
                    stored.current = result.current;
                    stored.peak = stored.peak.max(result.peak);
                    stored.last_updated = at;
                })
                .or_insert(TopicRecord {
                    current: result.current,
                    peak: result.peak,
                    last_updated: at,
                });
        }

        for (topic, buckets) in &snapshot.bins {
            let stored = self.bins.entry(topic.clone()).or_default();
            for (idx, state) in buckets {
                stored.insert(
                    *idx,
                    BinRecord {
                        state: state.clone(),
                        last_updated: at,
                    },
                );
            }
        }

        self.last_synced = at;
        self.last_snapshot = snapshot.id;
    }

    /// Stored current/peak for `topic`.
    pub fn mastery(&self, topic: &str) -> Option<MasteryResult> {
        self.topics.get(topic).map(|t| MasteryResult {
            current: t.current,
            peak: t.peak,
        })
    }

    pub fn bin_count(&self) -> usize {
        self.bins.values().map(BTreeMap::len).sum()
    }
}
