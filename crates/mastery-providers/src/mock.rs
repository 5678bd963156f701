//! Mock history provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use mastery_core::model::RawAttempt;
use mastery_core::traits::HistoryProvider;

use crate::error::ProviderError;

/// A history provider that serves canned attempt lists without network calls.
///
/// Unknown learners yield [`ProviderError::LearnerNotFound`].
pub struct MockHistoryProvider {
    /// Learner → attempts returned for them.
    histories: HashMap<String, Vec<RawAttempt>>,
    /// When set, every fetch fails with a transient network error.
    failure: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last learner requested.
    last_learner: Mutex<Option<String>>,
}

impl MockHistoryProvider {
    /// Create a mock with the given learner→attempts mappings.
    pub fn new(histories: HashMap<String, Vec<RawAttempt>>) -> Self {
        Self {
            histories,
            failure: None,
            call_count: AtomicU32::new(0),
            last_learner: Mutex::new(None),
        }
    }

    /// Create a mock that knows a single learner.
    pub fn with_history(learner: &str, attempts: Vec<RawAttempt>) -> Self {
        Self::new(HashMap::from([(learner.to_string(), attempts)]))
    }

    /// Create a mock whose every fetch fails.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(HashMap::new())
        }
    }

    /// Replace the attempts served for `learner`.
    pub fn set_history(&mut self, learner: &str, attempts: Vec<RawAttempt>) {
        self.histories.insert(learner.to_string(), attempts);
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last learner requested from this provider.
    pub fn last_learner(&self) -> Option<String> {
        self.last_learner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl HistoryProvider for MockHistoryProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_history(&self, learner: &str) -> anyhow::Result<Vec<RawAttempt>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_learner.lock().unwrap_or_else(|e| e.into_inner()) = Some(learner.to_string());

        if let Some(message) = &self.failure {
            return Err(ProviderError::NetworkError(message.clone()).into());
        }

        self.histories
            .get(learner)
            .cloned()
            .ok_or_else(|| ProviderError::LearnerNotFound(learner.to_string()).into())
    }
}
