//! Error types for graph loading, scoring, and sync.
//!
//! Defined in `mastery-core` so callers can classify failures (upstream fetch
//! vs. persistence vs. bad curriculum) without string matching.

use thiserror::Error;

/// Problems found while validating a curriculum graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two nodes share the same slug.
    #[error("duplicate topic slug: {0}")]
    DuplicateTopic(String),

    /// An edge names a slug that is not a node of the graph.
    #[error("edge {parent} -> {child} references unknown topic '{unknown}'")]
    UnknownTopic {
        parent: String,
        child: String,
        unknown: String,
    },

    /// A topic is listed as its own direct prerequisite.
    #[error("topic '{0}' is listed as its own prerequisite")]
    SelfLoop(String),

    /// The prerequisite relation is not acyclic.
    #[error("prerequisite cycle through topics: {}", topics.join(", "))]
    Cycle { topics: Vec<String> },
}

/// Errors from the pure scoring functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MasteryError {
    /// Buckets must be at least one day wide.
    #[error("bucket width must be at least 1 day, got {0}")]
    InvalidBucketWidth(u32),
}

/// Errors that abort a sync. Nothing is persisted when any of these occur.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The history provider could not be reached or its response could not be decoded.
    #[error("failed to fetch history for '{learner}'")]
    Fetch {
        learner: String,
        #[source]
        source: anyhow::Error,
    },

    /// The curriculum graph could not be loaded or failed validation.
    #[error("failed to load curriculum graph")]
    GraphLoad {
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Compute(#[from] MasteryError),

    /// The sink rejected the snapshot; the transaction was rolled back.
    #[error("failed to persist mastery for '{learner}'")]
    Persist {
        learner: String,
        #[source]
        source: anyhow::Error,
    },
}

impl SyncError {
    /// Returns `true` if the failure came from an upstream collaborator
    /// (history or graph provider) rather than from this process.
    pub fn is_upstream(&self) -> bool {
        matches!(self, SyncError::Fetch { .. } | SyncError::GraphLoad { .. })
    }
}
