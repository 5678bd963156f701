//! In-memory store, for tests and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use mastery_core::engine::MasterySnapshot;
use mastery_core::record::LearnerRecord;
use mastery_core::traits::MasterySink;

/// Keeps every learner's record in a map behind a single lock.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, LearnerRecord>>,
    commits: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful commits.
    pub fn commit_count(&self) -> u32 {
        self.commits.load(Ordering::Relaxed)
    }

    pub fn learners(&self) -> Vec<String> {
        let mut learners: Vec<String> = self.lock().keys().cloned().collect();
        learners.sort();
        learners
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, LearnerRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl MasterySink for MemoryStore {
    async fn commit(&self, snapshot: &MasterySnapshot) -> anyhow::Result<()> {
        self.lock()
            .entry(snapshot.learner.clone())
            .and_modify(|record| record.apply(snapshot))
            .or_insert_with(|| LearnerRecord::from_snapshot(snapshot));
        self.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn load(&self, learner: &str) -> anyhow::Result<Option<LearnerRecord>> {
        Ok(self.lock().get(learner).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mastery_core::model::MasteryResult;
    use std::collections::BTreeMap;

    fn snapshot(learner: &str, current: f64, peak: f64) -> MasterySnapshot {
        MasterySnapshot {
            id: uuid::Uuid::new_v4(),
            learner: learner.to_string(),
            computed_at: Utc::now(),
            bucket_width_days: 14,
            current_bucket: 0,
            results: BTreeMap::from([("math".to_string(), MasteryResult { current, peak })]),
            bins: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn commit_and_merge() {
        let store = MemoryStore::new();
        store.commit(&snapshot("a", 5.0, 10.0)).await.unwrap();
        store.commit(&snapshot("a", 1.0, 4.0)).await.unwrap();
        store.commit(&snapshot("b", 2.0, 3.0)).await.unwrap();

        let a = store.load("a").await.unwrap().unwrap();
        assert_eq!(a.mastery("math"), Some(MasteryResult { current: 1.0, peak: 10.0 }));
        assert_eq!(store.commit_count(), 3);
        assert_eq!(store.learners(), vec!["a", "b"]);
        assert!(store.load("c").await.unwrap().is_none());
    }
}
