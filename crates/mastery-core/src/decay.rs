//! Recency-decayed aggregation of bucket scores, and bucket numbering.

use chrono::{DateTime, Utc};

use crate::model::MasteryResult;

/// Per-bucket exponential time decay.
pub const TIME_DECAY: f64 = 0.05;

/// Evidence floor for the mastery denominator.
pub const MASTERY_CONFIDENCE: f64 = 1.2;

const SECONDS_PER_DAY: i64 = 86_400;

/// Absolute bucket index of `t` for buckets `width_days` wide:
/// `floor(epoch_seconds / (width_days * 86400))`.
///
/// `width_days` must be non-zero; see [`crate::engine::compute_mastery`].
pub fn bucket_index(t: DateTime<Utc>, width_days: u32) -> i64 {
    t.timestamp()
        .div_euclid(i64::from(width_days) * SECONDS_PER_DAY)
}

/// Fold bucket scores, ordered from the present bucket back to the oldest
/// populated one (gaps as 0.0), into a current score and the peak.
///
/// Bucket `i` is weighted by `e^(-0.05 i) * (score_i / peak)^3`; the weight
/// sum is floored at [`MASTERY_CONFIDENCE`].
pub fn aggregate_across_time(scores: &[f64]) -> MasteryResult {
    let peak = scores.iter().copied().fold(0.0, f64::max);
    if peak == 0.0 {
        return MasteryResult::default();
    }

    let (numerator, denominator) =
        scores
            .iter()
            .enumerate()
            .fold((0.0_f64, 0.0_f64), |(num, den), (i, &score)| {
                let time_weight = (-TIME_DECAY * i as f64).exp();
                let quality_weight = (score / peak).powi(3);
                let weight = time_weight * quality_weight;
                (num + score * weight, den + weight)
            });

    if denominator == 0.0 {
        return MasteryResult::default();
    }

    MasteryResult {
        current: numerator / denominator.max(MASTERY_CONFIDENCE),
        peak,
    }
}
