//! JSON file store: one pretty-printed record per learner.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use mastery_core::engine::MasterySnapshot;
use mastery_core::record::LearnerRecord;
use mastery_core::traits::MasterySink;

/// Stores each learner's [`LearnerRecord`] as `<dir>/<learner>.json`.
///
/// Commits read the stored record, merge the snapshot into it, and replace
/// the file through a temporary sibling and a rename, so readers see either
/// the old record or the new one.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `learner`'s record.
    pub fn path_for(&self, learner: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(learner)))
    }

    /// Every learner with a stored record, sorted.
    pub async fn learners(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to list {}", self.dir.display()))
            }
        };

        let mut learners = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(record) = read_record(&path).await? {
                    learners.push(record.learner);
                }
            }
        }
        learners.sort();
        Ok(learners)
    }
}

/// Bytes outside `[A-Za-z0-9_-]` are written as `%XX`, so distinct learners
/// always get distinct files.
fn file_stem(learner: &str) -> String {
    let mut stem = String::with_capacity(learner.len());
    for byte in learner.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}

async fn read_record(path: &Path) -> Result<Option<LearnerRecord>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
    };
    let record = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse learner record {}", path.display()))?;
    Ok(Some(record))
}

#[async_trait]
impl MasterySink for JsonFileStore {
    async fn commit(&self, snapshot: &MasterySnapshot) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(&snapshot.learner);

        let record = match read_record(&path).await? {
            Some(record) if record.learner != snapshot.learner => {
                anyhow::bail!(
                    "{} holds learner '{}', refusing to merge '{}'",
                    path.display(),
                    record.learner,
                    snapshot.learner
                );
            }
            Some(mut record) => {
                record.apply(snapshot);
                record
            }
            None => LearnerRecord::from_snapshot(snapshot),
        };

        let json = serde_json::to_string_pretty(&record).context("failed to serialize record")?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create store dir {}", self.dir.display()))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;

        tracing::debug!(
            learner = %snapshot.learner,
            path = %path.display(),
            topics = record.topics.len(),
            bins = record.bin_count(),
            "stored learner record"
        );
        Ok(())
    }

    async fn load(&self, learner: &str) -> Result<Option<LearnerRecord>> {
        read_record(&self.path_for(learner)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mastery_core::model::{BinState, MasteryResult};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn snapshot(learner: &str, at: i64, current: f64, peak: f64, bucket: i64) -> MasterySnapshot {
        let mut results = BTreeMap::new();
        results.insert("graphs".to_string(), MasteryResult { current, peak });
        results.insert("geometry".to_string(), MasteryResult::default());
        let mut bins = BTreeMap::new();
        bins.insert(
            "graphs".to_string(),
            BTreeMap::from([(
                bucket,
                BinState {
                    score: peak,
                    credits: vec![peak * 1.5],
                    multipliers: vec![1.0],
                },
            )]),
        );
        MasterySnapshot {
            id: uuid::Uuid::new_v4(),
            learner: learner.to_string(),
            computed_at: Utc.timestamp_opt(at, 0).unwrap(),
            bucket_width_days: 14,
            current_bucket: bucket,
            results,
            bins,
        }
    }

    #[tokio::test]
    async fn commit_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(store.load("tourist").await.unwrap().is_none());

        let snap = snapshot("tourist", 1_000, 400.0, 500.0, 3);
        store.commit(&snap).await.unwrap();

        let record = store.load("tourist").await.unwrap().unwrap();
        assert_eq!(record.learner, "tourist");
        assert_eq!(record.last_snapshot, snap.id);
        assert_eq!(record.mastery("graphs").unwrap().peak, 500.0);
        assert_eq!(record.bin_count(), 1);
        assert!(!dir.path().join("tourist.json.tmp").exists());
    }

    #[tokio::test]
    async fn commits_merge_with_stored_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store
            .commit(&snapshot("tourist", 1_000, 400.0, 500.0, 3))
            .await
            .unwrap();
        store
            .commit(&snapshot("tourist", 2_000, 100.0, 200.0, 4))
            .await
            .unwrap();

        let graphs = store
            .load("tourist")
            .await
            .unwrap()
            .unwrap()
            .mastery("graphs")
            .unwrap();
        assert_eq!(graphs.current, 100.0);
        assert_eq!(graphs.peak, 500.0);

        let record = store.load("tourist").await.unwrap().unwrap();
        assert_eq!(record.bin_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_commits_do_not_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .commit(&snapshot("petr", 1_000 + i, 10.0, 100.0 + i as f64, i))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let record = store.load("petr").await.unwrap().unwrap();
        assert_eq!(record.bin_count(), 8);
        assert_eq!(record.mastery("graphs").unwrap().peak, 107.0);
    }

    #[tokio::test]
    async fn corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.path_for("tourist"), "{ not json").unwrap();

        let err = store.load("tourist").await.unwrap_err();
        assert!(err.to_string().contains("failed to parse learner record"));
        assert!(store
            .commit(&snapshot("tourist", 1, 1.0, 1.0, 1))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn lists_learners() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        assert!(store.learners().await.unwrap().is_empty());

        for learner in ["Um_nik", "tourist"] {
            store
                .commit(&snapshot(learner, 1, 1.0, 1.0, 1))
                .await
                .unwrap();
        }
        assert_eq!(store.learners().await.unwrap(), vec!["Um_nik", "tourist"]);
    }

    #[test]
    fn file_stems_are_sanitized() {
        assert_eq!(file_stem("tourist"), "tourist");
        assert_eq!(file_stem("Um_nik"), "Um_nik");
        assert_eq!(file_stem("../etc/passwd"), "%2E%2E%2Fetc%2Fpasswd");
        assert_eq!(file_stem("a b/c"), "a%20b%2Fc");
        assert_eq!(file_stem("100%"), "100%25");
    }

    #[tokio::test]
    async fn similar_handles_get_separate_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        for (learner, peak) in [("x", 900.0), (".x", 100.0), ("a b", 300.0), ("a_b", 400.0)] {
            store
                .commit(&snapshot(learner, 1, peak, peak, 1))
                .await
                .unwrap();
        }

        for (learner, peak) in [("x", 900.0), (".x", 100.0), ("a b", 300.0), ("a_b", 400.0)] {
            let record = store.load(learner).await.unwrap().unwrap();
            assert_eq!(record.learner, learner);
            assert_eq!(record.mastery("graphs").unwrap().peak, peak);
        }
        assert_eq!(store.learners().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn commit_refuses_a_record_for_another_learner() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let foreign = LearnerRecord::from_snapshot(&snapshot("petr", 1, 50.0, 900.0, 1));
        std::fs::write(
            store.path_for("tourist"),
            serde_json::to_string(&foreign).unwrap(),
        )
        .unwrap();

        let err = store
            .commit(&snapshot("tourist", 2, 10.0, 10.0, 2))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("refusing to merge 'tourist'"));

        let stored = store.load("tourist").await.unwrap().unwrap();
        assert_eq!(stored.learner, "petr");
        assert_eq!(stored.bin_count(), 1);
    }
}
