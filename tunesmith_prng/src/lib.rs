// Random sources for arrangement generation.
//
// Every random decision in `tunesmith_music` (progression symbols, melody
// notes, velocities, drum fills) goes through the `RandomSource` trait so
// that callers can inject whichever source they need:
//
// - `SongRng`: xoshiro256++ (Blackman & Vigna, 2019) seeded via SplitMix64.
//   Same seed, same song, on every platform.
// - `ScriptedSource`: replays a fixed list of uniforms. Tests use it to force
//   exact branches ("always emit a note", "always pick the chord tone").
//
// The core generator is integer-only; floating point appears only when a
// `u64` is mapped onto [0, 1).

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of uniform randomness plus the derived draws the generators need.
///
/// Implementors only have to supply `uniform`; everything else is derived
/// from it. `SongRng` overrides `below` with unbiased integer sampling.
pub trait RandomSource {
    /// A uniform value in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// A uniform index in `[0, n)`. Panics if `n == 0`.
    fn below(&mut self, n: usize) -> usize {
        assert!(n > 0, "below: n must be positive");
        ((self.uniform() * n as f64) as usize).min(n - 1)
    }

    /// `true` with probability `p`. `p <= 0` is never, `p >= 1` is always.
    fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }

    /// Pick one element uniformly. Panics on an empty slice.
    fn choice<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "choice: empty slice");
        &items[self.below(items.len())]
    }

    /// A uniform integer in `[low, high]`, both ends inclusive.
    fn range_inclusive(&mut self, low: u8, high: u8) -> u8 {
        assert!(low <= high, "range_inclusive: low must be <= high");
        low + self.below(usize::from(high - low) + 1) as u8
    }
}

/// Xoshiro256++ generator, the default source for song generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SongRng {
    s: [u64; 4],
}

impl SongRng {
    /// Seed from a `u64`. SplitMix64 expands the seed into the 256-bit state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Pick a fresh seed from the clock and return it with the generator, so
    /// an unseeded run can still be reported and replayed.
    pub fn from_entropy() -> (u64, Self) {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5eed);
        (seed, Self::new(seed))
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform integer in `[0, range)` by rejection sampling (no modulo bias).
    fn bounded(&mut self, range: u64) -> u64 {
        if range.is_power_of_two() {
            return self.next_u64() & (range - 1);
        }
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return r % range;
            }
        }
    }
}

impl RandomSource for SongRng {
    /// Upper 53 bits of the next output, scaled into `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        assert!(n > 0, "below: n must be positive");
        self.bounded(n as u64) as usize
    }
}

/// Replays a fixed sequence of uniforms, wrapping around at the end.
///
/// Values are clamped into `[0, 1)` on construction so a script can use
/// `1.0` to mean "the last option".
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    values: Vec<f64>,
    next: usize,
}

impl ScriptedSource {
    /// Panics if `values` is empty.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values: Vec<f64> = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        assert!(!values.is_empty(), "ScriptedSource needs at least one value");
        Self { values, next: 0 }
    }

    /// A source that always returns the same value.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// How many values have been drawn so far.
    pub fn draws(&self) -> usize {
        self.next
    }
}

impl RandomSource for ScriptedSource {
    fn uniform(&mut self) -> f64 {
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
