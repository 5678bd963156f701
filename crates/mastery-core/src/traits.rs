//! Collaborator traits: where the curriculum graph and solve history come
//! from, and where sync results go.
//!
//! Implemented by the `mastery-providers` and `mastery-store` crates.

use async_trait::async_trait;

use crate::engine::MasterySnapshot;
use crate::graph::TopicGraph;
use crate::model::RawAttempt;
use crate::record::LearnerRecord;

/// Source of the current curriculum graph snapshot.
#[async_trait]
pub trait GraphProvider: Send + Sync {
    /// Human-readable source name (e.g. "builtin", a file path).
    fn name(&self) -> &str;

    /// Load every topic and prerequisite edge.
    async fn load_graph(&self) -> anyhow::Result<TopicGraph>;
}

/// Upstream judge that knows a learner's submission history.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Human-readable provider name (e.g. "codeforces").
    fn name(&self) -> &str;

    /// Every attempt the learner made, in any order.
    async fn fetch_history(&self, learner: &str) -> anyhow::Result<Vec<RawAttempt>>;
}

/// Destination for sync results.
///
/// `commit` must be all-or-nothing: either every topic and bin row of the
/// snapshot becomes visible, or none does.
#[async_trait]
pub trait MasterySink: Send + Sync {
    /// Upsert one snapshot atomically (see [`LearnerRecord::apply`]).
    async fn commit(&self, snapshot: &MasterySnapshot) -> anyhow::Result<()>;

    /// Everything stored for `learner`, if anything.
    async fn load(&self, learner: &str) -> anyhow::Result<Option<LearnerRecord>>;
}
