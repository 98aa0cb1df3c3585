// Rhythm helpers: swing grids, timing jitter and velocity contours.
//
// These work on plain onset lists and velocity lists rather than on
// `NoteEvent`s, so callers can apply them to any part before building events.

use crate::event::Beats;
use serde::{Deserialize, Serialize};
use tunesmith_prng::RandomSource;

/// Eighth-note onsets over `beats` beats with swing applied.
///
/// Each beat's first eighth sits on the beat; the second lands `ratio` of the
/// way through it. A ratio of 0.5 gives a straight grid.
pub fn swing_timings(beats: usize, ratio: f64) -> Vec<Beats> {
    (0..beats * 2)
        .map(|i| {
            let beat = (i / 2) as f64;
            if i % 2 == 0 { beat } else { beat + ratio }
        })
        .collect()
}

/// Jitter each onset uniformly within `[-amount, amount]`, never below 0.
pub fn humanize(timings: &[Beats], amount: Beats, rng: &mut impl RandomSource) -> Vec<Beats> {
    timings
        .iter()
        .map(|&t| {
            let jitter = (rng.uniform() * 2.0 - 1.0) * amount;
            (t + jitter).max(0.0)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityCurve {
    /// Rises linearly from 60 toward 100.
    Crescendo,
    /// Falls linearly from 100 toward 60.
    Diminuendo,
    /// Independent draws in 70 ± 20.
    Random,
    /// Constant 80.
    Flat,
}

/// A velocity for each of `length` notes following `curve`.
///
/// The ramps use `i / length`, so the last note stops one step short of the
/// far end.
pub fn velocity_curve(length: usize, curve: VelocityCurve, rng: &mut impl RandomSource) -> Vec<u8> {
    let ramp = |i: usize| (i as f64 / length as f64) * 40.0;
    (0..length)
        .map(|i| match curve {
            VelocityCurve::Crescendo => (60.0 + ramp(i)) as u8,
            VelocityCurve::Diminuendo => (100.0 - ramp(i)) as u8,
            VelocityCurve::Random => rng.range_inclusive(50, 90),
            VelocityCurve::Flat => 80,
        })
        .collect()
}
