//! Mapping judge tags to curriculum topics, and turning raw attempt history
//! into first-solve submissions.
//!
//! The tag table is configuration data: the default below can be extended or
//! overridden without touching the scoring code.

use std::collections::{BTreeMap, HashMap};

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ProblemStatus, RawAttempt, Submission};

/// Judge tag → curriculum topic slug.
const DEFAULT_TAG_TABLE: &[(&str, &str)] = &[
    // foundation
    ("implementation", "implementation"),
    ("brute force", "implementation"),
    ("constructive algorithms", "ad hoc"),
    ("sortings", "sortings"),
    ("two pointers", "two pointers"),
    // searching
    ("binary search", "searching"),
    ("ternary search", "searching"),
    ("divide and conquer", "searching"),
    ("meet-in-the-middle", "meet in the middle"),
    ("greedy", "greedy"),
    // math
    ("math", "math"),
    ("number theory", "math"),
    ("combinatorics", "math"),
    ("matrices", "math"),
    ("probabilities", "math"),
    ("fft", "advanced math"),
    ("chinese remainder theorem", "advanced math"),
    ("geometry", "geometry"),
    // graphs
    ("graphs", "graphs"),
    ("dfs and similar", "graphs"),
    ("shortest paths", "graphs"),
    ("dsu", "graphs"),
    ("flows", "advanced graphs"),
    ("graph matchings", "advanced graphs"),
    ("2-sat", "advanced graphs"),
    ("trees", "trees"),
    // strings
    ("strings", "strings"),
    ("hashing", "strings"),
    ("string suffix structures", "advanced strings"),
    ("data structures", "data structures"),
    ("bitmasks", "data structures"),
    ("dp", "dynamic programming"),
];

/// Synthesize `topic` when a problem carries every tag in `all_of`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeRule {
    pub all_of: Vec<String>,
    pub topic: String,
}

/// Tag classification table plus composite-topic rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMap {
    tags: HashMap<String, String>,
    composites: Vec<CompositeRule>,
}

impl Default for TagMap {
    fn default() -> Self {
        Self {
            tags: DEFAULT_TAG_TABLE
                .iter()
                .map(|(tag, topic)| (tag.to_string(), topic.to_string()))
                .collect(),
            composites: vec![CompositeRule {
                all_of: vec!["trees".into(), "dp".into()],
                topic: "tree dp".into(),
            }],
        }
    }
}

impl TagMap {
    /// An empty table with no composite rules.
    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
            composites: Vec::new(),
        }
    }

    /// Add or replace tag mappings.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (tag, topic) in overrides {
            self.tags.insert(tag.into(), topic.into());
        }
        self
    }

    pub fn with_composite(mut self, rule: CompositeRule) -> Self {
        self.composites.push(rule);
        self
    }

    pub fn topic_for(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    /// Every topic slug the table can produce.
    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = self
            .tags
            .values()
            .map(String::as_str)
            .chain(self.composites.iter().map(|c| c.topic.as_str()))
            .collect();
        topics.sort_unstable();
        topics.dedup();
        topics
    }

    /// Curriculum topics for a problem's judge tags, de-duplicated in first-seen
    /// order, followed by any composite topics. Unknown tags are skipped.
    pub fn classify<S: AsRef<str>>(&self, tags: &[S]) -> Vec<String> {
        let mut slugs: Vec<String> = Vec::new();
        for tag in tags {
            if let Some(topic) = self.topic_for(tag.as_ref()) {
                if !slugs.iter().any(|s| s == topic) {
                    slugs.push(topic.to_string());
                }
            }
        }

        for rule in &self.composites {
            let applies = rule
                .all_of
                .iter()
                .all(|required| tags.iter().any(|t| t.as_ref() == required));
            if applies && !slugs.contains(&rule.topic) {
                slugs.push(rule.topic.clone());
            }
        }

        slugs
    }
}

/// First-solve submissions plus the solved/incomplete status of every problem touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedHistory {
    pub submissions: Vec<Submission>,
    pub statuses: BTreeMap<String, ProblemStatus>,
}

impl NormalizedHistory {
    pub fn solved(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| **s == ProblemStatus::Solved)
            .count()
    }

    pub fn incomplete(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| **s == ProblemStatus::Incomplete)
            .count()
    }
}

/// Group raw attempts by problem and keep each problem's first accepted attempt.
///
/// Attempts are ordered by submission time, not by the order the judge
/// returned them; `attempts` counts every try up to and including the first
/// accepted one. Problems that were never accepted are reported as
/// [`ProblemStatus::Incomplete`] and produce no submission.
pub fn normalize_history(attempts: &[RawAttempt], tag_map: &TagMap) -> NormalizedHistory {
    let mut by_problem: BTreeMap<String, Vec<&RawAttempt>> = BTreeMap::new();
    for attempt in attempts {
        by_problem
            .entry(attempt.problem.key())
            .or_default()
            .push(attempt);
    }

    let mut history = NormalizedHistory::default();
    for (problem_id, mut group) in by_problem {
        group.sort_by_key(|a| a.created_at);

        let first_ok = group
            .iter()
            .position(|a| a.verdict.as_ref().is_some_and(|v| v.is_accepted()));

        let Some(pos) = first_ok else {
            history
                .statuses
                .insert(problem_id, ProblemStatus::Incomplete);
            continue;
        };

        let solve = group[pos];
        let Some(solved_at) = Utc.timestamp_opt(solve.created_at, 0).single() else {
            tracing::warn!(
                problem = %problem_id,
                created_at = solve.created_at,
                "skipping solve with out-of-range timestamp"
            );
            continue;
        };

        history
            .statuses
            .insert(problem_id.clone(), ProblemStatus::Solved);
        history.submissions.push(Submission {
            problem_id,
            rating: solve.problem.rating.unwrap_or(0),
            attempts: pos as u32 + 1,
            topic_slugs: tag_map.classify(&solve.problem.tags),
            solved_at,
        });
    }

    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProblemRef, Verdict};

    fn attempt(contest: u32, index: &str, verdict: Verdict, at: i64, tags: &[&str]) -> RawAttempt {
        RawAttempt {
            verdict: Some(verdict),
            problem: ProblemRef {
                contest_id: Some(contest),
                index: index.into(),
                name: format!("Problem {contest}{index}"),
                rating: Some(1400),
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
            created_at: at,
        }
    }

    #[test]
    fn classify_maps_and_dedupes() {
        let map = TagMap::default();
        let topics = map.classify(&["math", "number theory", "greedy", "interactive"]);
        assert_eq!(topics, vec!["math", "greedy"]);
    }

    #[test]
    fn classify_synthesizes_tree_dp() {
        let map = TagMap::default();
        let topics = map.classify(&["dp", "trees", "dfs and similar"]);
        assert_eq!(topics, vec!["dynamic programming", "trees", "graphs", "tree dp"]);

        let only_trees = map.classify(&["trees"]);
        assert!(!only_trees.contains(&"tree dp".to_string()));
    }

    #[test]
    fn overrides_extend_the_table() {
        let map = TagMap::default().with_overrides([("games", "math"), ("dp", "greedy")]);
        assert_eq!(map.topic_for("games"), Some("math"));
        assert_eq!(map.topic_for("dp"), Some("greedy"));
        assert!(map.topics().contains(&"tree dp"));
    }

    #[test]
    fn first_accepted_attempt_wins() {
        let map = TagMap::default();
        // Judge returns newest first; normalization must not rely on that.
        let raw = vec![
            attempt(1520, "F", Verdict::Ok, 400, &["binary search"]),
            attempt(1520, "F", Verdict::Ok, 300, &["binary search"]),
            attempt(1520, "F", Verdict::WrongAnswer, 200, &["binary search"]),
            attempt(1520, "F", Verdict::TimeLimitExceeded, 100, &["binary search"]),
        ];
        let history = normalize_history(&raw, &map);
        assert_eq!(history.submissions.len(), 1);
        let sub = &history.submissions[0];
        assert_eq!(sub.problem_id, "1520F");
        assert_eq!(sub.attempts, 3);
        assert_eq!(sub.solved_at.timestamp(), 300);
        assert_eq!(sub.topic_slugs, vec!["searching"]);
        assert_eq!(history.solved(), 1);
    }

    #[test]
    fn unsolved_problems_are_incomplete() {
        let map = TagMap::default();
        let raw = vec![
            attempt(1, "A", Verdict::WrongAnswer, 10, &["math"]),
            attempt(1, "A", Verdict::RuntimeError, 20, &["math"]),
            attempt(2, "B", Verdict::Ok, 30, &["math"]),
        ];
        let history = normalize_history(&raw, &map);
        assert_eq!(history.submissions.len(), 1);
        assert_eq!(history.statuses.get("1A"), Some(&ProblemStatus::Incomplete));
        assert_eq!(history.statuses.get("2B"), Some(&ProblemStatus::Solved));
        assert_eq!(history.incomplete(), 1);
    }

    #[test]
    fn pending_verdicts_do_not_count_as_solves() {
        let map = TagMap::default();
        let mut pending = attempt(3, "C", Verdict::Ok, 5, &["greedy"]);
        pending.verdict = None;
        let history = normalize_history(&[pending], &map);
        assert!(history.submissions.is_empty());
        assert_eq!(history.incomplete(), 1);
    }

    #[test]
    fn contestless_problems_with_same_letter_stay_apart() {
        let map = TagMap::default();
        let gym = |name: &str, verdict: Verdict, at: i64| {
            let mut raw = attempt(0, "A", verdict, at, &["math"]);
            raw.problem.contest_id = None;
            raw.problem.name = name.into();
            raw
        };
        let raw = vec![
            gym("Two Arrays", Verdict::WrongAnswer, 10),
            gym("Two Arrays", Verdict::Ok, 20),
            gym("Circle Game", Verdict::Ok, 15),
        ];
        let history = normalize_history(&raw, &map);
        assert_eq!(history.solved(), 2);
        let attempts: BTreeMap<&str, u32> = history
            .submissions
            .iter()
            .map(|s| (s.problem_id.as_str(), s.attempts))
            .collect();
        assert_eq!(attempts["A:Two Arrays"], 2);
        assert_eq!(attempts["A:Circle Game"], 1);
    }

    #[test]
    fn unrated_and_untagged_problems_still_normalize() {
        let map = TagMap::default();
        let mut raw = attempt(4, "D", Verdict::Ok, 50, &["interactive"]);
        raw.problem.rating = None;
        let history = normalize_history(&[raw], &map);
        let sub = &history.submissions[0];
        assert_eq!(sub.rating, 0);
        assert!(sub.topic_slugs.is_empty());
        assert_eq!(sub.attempts, 1);
    }
}
