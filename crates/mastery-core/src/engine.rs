//! Mastery computation over a learner's normalized submissions.
//!
//! Pure and synchronous: given submissions, an ancestry map, a bucket width
//! and "now", the result is fully determined.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ancestry::AncestryMap;
use crate::credit::solve_attributes;
use crate::decay::{aggregate_across_time, bucket_index};
use crate::error::MasteryError;
use crate::interval::aggregate_bin;
use crate::model::{BinState, MasteryResult, Submission};

/// Default bucket width in days.
pub const DEFAULT_BUCKET_WIDTH_DAYS: u32 = 14;

/// Everything one sync computed for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterySnapshot {
    /// Unique identifier of this computation.
    pub id: Uuid,
    pub learner: String,
    pub computed_at: DateTime<Utc>,
    pub bucket_width_days: u32,
    /// Bucket index the decay sequence was anchored at.
    pub current_bucket: i64,
    /// One entry per topic in the ancestry map.
    pub results: BTreeMap<String, MasteryResult>,
    /// Populated buckets per topic. Topics with no credit have no entry.
    pub bins: BTreeMap<String, BTreeMap<i64, BinState>>,
}

impl MasterySnapshot {
    /// Total number of (topic, bucket) bins.
    pub fn bin_count(&self) -> usize {
        self.bins.values().map(BTreeMap::len).sum()
    }

    pub fn result(&self, topic: &str) -> Option<MasteryResult> {
        self.results.get(topic).copied()
    }
}

/// Group submissions by absolute bucket index.
pub fn bin_submissions(
    submissions: &[Submission],
    width_days: u32,
) -> BTreeMap<i64, Vec<&Submission>> {
    let mut bins: BTreeMap<i64, Vec<&Submission>> = BTreeMap::new();
    for sub in submissions {
        bins.entry(bucket_index(sub.solved_at, width_days))
            .or_default()
            .push(sub);
    }
    bins
}

/// Bucket score for `topic` from the submissions of one bucket.
pub fn topic_interval_state<'a, I>(topic: &str, submissions: I, ancestry: &AncestryMap) -> BinState
where
    I: IntoIterator<Item = &'a Submission>,
{
    let attributes: Vec<_> = submissions
        .into_iter()
        .filter_map(|sub| solve_attributes(sub, topic, ancestry))
        .collect();
    aggregate_bin(&attributes)
}

/// Scores from `present` back to the oldest populated bucket, 0.0 for gaps.
pub fn decay_sequence(states: &BTreeMap<i64, BinState>, present: i64) -> Vec<f64> {
    let Some(oldest) = states.keys().next().copied() else {
        return Vec::new();
    };
    (oldest..=present)
        .rev()
        .map(|idx| states.get(&idx).map_or(0.0, |s| s.score))
        .collect()
}

/// Compute current/peak mastery for every topic in `ancestry`.
///
/// A bucket is kept for a topic only if its score is positive. The decay
/// sequence is anchored at the bucket containing `now`, or at the newest
/// populated bucket if a solve is dated after `now`.
pub fn compute_mastery(
    learner: &str,
    submissions: &[Submission],
    ancestry: &AncestryMap,
    bucket_width_days: u32,
    now: DateTime<Utc>,
) -> Result<MasterySnapshot, MasteryError> {
    if bucket_width_days == 0 {
        return Err(MasteryError::InvalidBucketWidth(bucket_width_days));
    }

    let binned = bin_submissions(submissions, bucket_width_days);
    let current_bucket = bucket_index(now, bucket_width_days);

    let mut results = BTreeMap::new();
    let mut bins = BTreeMap::new();

    for topic in ancestry.topics() {
        let states: BTreeMap<i64, BinState> = binned
            .iter()
            .map(|(idx, subs)| {
                (
                    *idx,
                    topic_interval_state(topic, subs.iter().copied(), ancestry),
                )
            })
            .filter(|(_, state)| state.score > 0.0)
            .collect();

        let Some(newest) = states.keys().next_back().copied() else {
            results.insert(topic.to_string(), MasteryResult::default());
            continue;
        };

        let present = current_bucket.max(newest);
        let result = aggregate_across_time(&decay_sequence(&states, present));
        tracing::debug!(
            learner,
            topic,
            buckets = states.len(),
            current = result.current,
            peak = result.peak,
            "scored topic"
        );

        results.insert(topic.to_string(), result);
        bins.insert(topic.to_string(), states);
    }

    Ok(MasterySnapshot {
        id: Uuid::new_v4(),
        learner: learner.to_string(),
        computed_at: now,
        bucket_width_days,
        current_bucket,
        results,
        bins,
    })
}
