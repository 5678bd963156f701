//! Interval aggregation: all credit a topic earned inside one time bucket.

use crate::model::{BinState, SolveAttributes};

/// Evidence floor for the bucket score denominator.
pub const BIN_CONFIDENCE: f64 = 1.5;

/// Combine the solves credited to one topic in one bucket.
///
/// Each credit is weighted by `(credit / best)^3`, so the strongest solves
/// dominate and weak or far-propagated ones barely move the score. The
/// weighted multiplier sum is floored at [`BIN_CONFIDENCE`] so that thin
/// evidence yields a conservative score.
pub fn aggregate_bin(solves: &[SolveAttributes]) -> BinState {
    if solves.is_empty() {
        return BinState::default();
    }

    let credits: Vec<f64> = solves
        .iter()
        .map(|s| s.base_rating * s.multiplier)
        .collect();
    let multipliers: Vec<f64> = solves.iter().map(|s| s.multiplier).collect();
    let best = credits.iter().copied().fold(0.0, f64::max);

    if best == 0.0 {
        return BinState {
            score: 0.0,
            credits,
            multipliers,
        };
    }

    let (numerator, denominator) = credits.iter().zip(&multipliers).fold(
        (0.0_f64, 0.0_f64),
        |(num, den), (&credit, &multiplier)| {
            let weight = (credit / best).powi(3);
            (num + credit * weight, den + multiplier * weight)
        },
    );

    BinState {
        score: numerator / denominator.max(BIN_CONFIDENCE),
        credits,
        multipliers,
    }
}
