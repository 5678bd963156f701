//! Core data model types for the mastery engine.
//!
//! Curriculum topics and edges, normalized submissions, and the per-bucket
//! and per-topic results the scoring functions produce.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A node of the curriculum graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicNode {
    /// Numeric identifier (stable within one graph snapshot).
    pub id: u32,
    /// Stable unique key used everywhere else.
    pub slug: String,
    /// Human-readable name.
    pub display_name: String,
}

impl TopicNode {
    /// Create a node whose display name is derived from the slug.
    pub fn new(id: u32, slug: &str) -> Self {
        Self {
            id,
            slug: slug.to_string(),
            display_name: display_name_for(slug),
        }
    }
}

/// A prerequisite edge: `parent` must be learned before `child`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicEdge {
    pub parent: String,
    pub child: String,
}

impl TopicEdge {
    pub fn new(parent: &str, child: &str) -> Self {
        Self {
            parent: parent.to_string(),
            child: child.to_string(),
        }
    }
}

/// Title-case a slug, with a couple of hand-picked abbreviations.
pub fn display_name_for(slug: &str) -> String {
    match slug {
        "tree dp" => return "Tree DP".to_string(),
        "dynamic programming" => return "DP".to_string(),
        _ => {}
    }

    slug.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// A learner's first accepted attempt at a problem, tagged with curriculum topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Problem identifier (e.g. "1520F").
    pub problem_id: String,
    /// Problem difficulty rating. Unrated problems carry 0.
    pub rating: u32,
    /// Tries up to and including the first success (at least 1).
    pub attempts: u32,
    /// Curriculum topics the problem maps to, including composite topics.
    pub topic_slugs: Vec<String>,
    /// When the first accepted attempt was made.
    pub solved_at: DateTime<Utc>,
}

/// Credit one submission carries toward one target topic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveAttributes {
    /// Rating after the attempts penalty.
    pub base_rating: f64,
    /// Propagation decay, `0.75^distance`.
    pub multiplier: f64,
}

/// Aggregate for one (topic, bucket) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinState {
    pub score: f64,
    /// `base_rating * multiplier` for each contributing solve.
    #[serde(default)]
    pub credits: Vec<f64>,
    /// Parallel to `credits`.
    #[serde(default)]
    pub multipliers: Vec<f64>,
}

/// Current and peak mastery of one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MasteryResult {
    pub current: f64,
    pub peak: f64,
}

/// Judge verdict of one raw attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Ok,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    RuntimeError,
    CompilationError,
    IdlenessLimitExceeded,
    Challenged,
    Skipped,
    Testing,
    #[serde(other)]
    Other,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Ok)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Ok => "OK",
            Verdict::WrongAnswer => "WRONG_ANSWER",
            Verdict::TimeLimitExceeded => "TIME_LIMIT_EXCEEDED",
            Verdict::MemoryLimitExceeded => "MEMORY_LIMIT_EXCEEDED",
            Verdict::RuntimeError => "RUNTIME_ERROR",
            Verdict::CompilationError => "COMPILATION_ERROR",
            Verdict::IdlenessLimitExceeded => "IDLENESS_LIMIT_EXCEEDED",
            Verdict::Challenged => "CHALLENGED",
            Verdict::Skipped => "SKIPPED",
            Verdict::Testing => "TESTING",
            Verdict::Other => "OTHER",
        };
        f.write_str(s)
    }
}

impl FromStr for Verdict {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "OK" | "ACCEPTED" => Verdict::Ok,
            "WRONG_ANSWER" => Verdict::WrongAnswer,
            "TIME_LIMIT_EXCEEDED" => Verdict::TimeLimitExceeded,
            "MEMORY_LIMIT_EXCEEDED" => Verdict::MemoryLimitExceeded,
            "RUNTIME_ERROR" => Verdict::RuntimeError,
            "COMPILATION_ERROR" => Verdict::CompilationError,
            "IDLENESS_LIMIT_EXCEEDED" => Verdict::IdlenessLimitExceeded,
            "CHALLENGED" => Verdict::Challenged,
            "SKIPPED" => Verdict::Skipped,
            "TESTING" => Verdict::Testing,
            _ => Verdict::Other,
        })
    }
}

/// A problem as referenced by a raw attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRef {
    /// Contest the problem belongs to; absent for some gym/acmsguru problems.
    #[serde(default)]
    pub contest_id: Option<u32>,
    /// Problem letter within the contest (e.g. "F", "B1").
    pub index: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProblemRef {
    /// Key used to group attempts of the same problem, e.g. "1520F".
    ///
    /// Problems without a contest are keyed by index and name, so two of them
    /// sharing a letter stay apart.
    pub fn key(&self) -> String {
        match self.contest_id {
            Some(contest) => format!("{contest}{}", self.index),
            None => format!("{}:{}", self.index, self.name),
        }
    }
}

/// One attempt as reported by the upstream judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttempt {
    /// Missing while the attempt is still being judged.
    #[serde(default)]
    pub verdict: Option<Verdict>,
    pub problem: ProblemRef,
    /// Submission time in epoch seconds.
    pub created_at: i64,
}

/// Whether a problem the learner touched was eventually solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemStatus {
    Solved,
    Incomplete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(display_name_for("tree dp"), "Tree DP");
        assert_eq!(display_name_for("dynamic programming"), "DP");
        assert_eq!(display_name_for("meet in the middle"), "Meet In The Middle");
        assert_eq!(display_name_for("graphs"), "Graphs");
        assert_eq!(TopicNode::new(3, "ad hoc").display_name, "Ad Hoc");
    }

    #[test]
    fn verdict_parse_and_serde() {
        assert_eq!("OK".parse::<Verdict>().unwrap(), Verdict::Ok);
        assert_eq!(
            "wrong_answer".parse::<Verdict>().unwrap(),
            Verdict::WrongAnswer
        );
        assert_eq!("PARTIAL".parse::<Verdict>().unwrap(), Verdict::Other);

        let v: Verdict = serde_json::from_str("\"TIME_LIMIT_EXCEEDED\"").unwrap();
        assert_eq!(v, Verdict::TimeLimitExceeded);
        let unknown: Verdict = serde_json::from_str("\"CRASHED\"").unwrap();
        assert_eq!(unknown, Verdict::Other);
        assert!(Verdict::Ok.is_accepted());
        assert!(!Verdict::WrongAnswer.is_accepted());
    }

    #[test]
    fn problem_key() {
        let p = ProblemRef {
            contest_id: Some(1520),
            index: "F".into(),
            name: "Guess the K-th Zero".into(),
            rating: Some(1600),
            tags: vec!["binary search".into()],
        };
        assert_eq!(p.key(), "1520F");

        let gym = ProblemRef {
            contest_id: None,
            ..p
        };
        assert_eq!(gym.key(), "F:Guess the K-th Zero");

        let other_gym = ProblemRef {
            name: "Permutation Swaps".into(),
            ..gym.clone()
        };
        assert_ne!(gym.key(), other_gym.key());
    }
}
