//! Credit model: how much one solve is worth, and how that worth fades as it
//! propagates back to prerequisite topics.

use crate::ancestry::AncestryMap;
use crate::model::{SolveAttributes, Submission};

/// Recovery rate of the attempts penalty.
pub const ATTEMPT_DECAY: f64 = 0.1;

/// Credit kept per hop away from the solved topic.
pub const PROPAGATION_DECAY: f64 = 0.75;

/// Rating after the attempts penalty.
///
/// A first-try solve keeps its full rating. Later solves recover toward half
/// credit: `rating * (0.5 + 0.5 * e^(-0.1 * (attempts - 1)))`.
pub fn base_rating(rating: u32, attempts: u32) -> f64 {
    let rating = f64::from(rating);
    if attempts <= 1 {
        return rating;
    }
    let modifier = 0.5 + 0.5 * (-ATTEMPT_DECAY * f64::from(attempts - 1)).exp();
    rating * modifier
}

/// `0.75^distance`.
pub fn propagation_multiplier(distance: u32) -> f64 {
    PROPAGATION_DECAY.powi(distance as i32)
}

/// Shortest distance from any of `topics` back to `goal`, or `None` if
/// `goal` is a prerequisite of none of them.
pub fn propagation_distance<S: AsRef<str>>(
    topics: &[S],
    goal: &str,
    ancestry: &AncestryMap,
) -> Option<u32> {
    topics
        .iter()
        .filter_map(|t| ancestry.distance(t.as_ref(), goal))
        .min()
}

/// Credit `submission` carries toward `goal`, if any.
pub fn solve_attributes(
    submission: &Submission,
    goal: &str,
    ancestry: &AncestryMap,
) -> Option<SolveAttributes> {
    let distance = propagation_distance(&submission.topic_slugs, goal, ancestry)?;
    Some(SolveAttributes {
        base_rating: base_rating(submission.rating, submission.attempts),
        multiplier: propagation_multiplier(distance),
    })
}
