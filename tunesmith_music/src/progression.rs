// Chord progressions: random generation and bulk resolution.
//
// A random progression always opens on the tonic and closes on a cadence
// chord (V or I in major, v or i in minor); interior chords come from a
// small preferred-degree set. Each symbol independently picks up a seventh
// suffix with `seventh_probability`: `maj7` on uppercase degrees without a V,
// `m7` on everything else (so a dominant `V` becomes `Vm7`).

use crate::error::Result;
use crate::pitch::Pitch;
use crate::roman::{Key, RomanSymbol};
use crate::theory::chord;
use tunesmith_prng::RandomSource;

const MAJOR_PREFERRED: [&str; 5] = ["I", "ii", "IV", "V", "vi"];
const MINOR_PREFERRED: [&str; 5] = ["i", "iv", "v", "VI", "VII"];
const MAJOR_CADENCE: [&str; 2] = ["V", "I"];
const MINOR_CADENCE: [&str; 2] = ["v", "i"];

/// Generate `length` Roman-numeral symbols for `key`.
///
/// `length == 1` yields just the tonic. Reproducible for a seeded source.
pub fn random_progression(
    length: usize,
    key: &Key,
    seventh_probability: f64,
    rng: &mut impl RandomSource,
) -> Vec<RomanSymbol> {
    let (tonic, preferred, cadence) = if key.minor {
        ("i", &MINOR_PREFERRED, &MINOR_CADENCE)
    } else {
        ("I", &MAJOR_PREFERRED, &MAJOR_CADENCE)
    };

    (0..length)
        .map(|i| {
            let base = if i == 0 {
                tonic
            } else if i == length - 1 {
                *rng.choice(cadence)
            } else {
                *rng.choice(preferred)
            };
            let mut symbol = base.to_string();
            if rng.chance(seventh_probability) {
                symbol.push_str(seventh_suffix(base));
            }
            RomanSymbol::new(symbol)
        })
        .collect()
}

fn seventh_suffix(base: &str) -> &'static str {
    let uppercase = base.chars().all(|c| c.is_ascii_uppercase());
    if uppercase && !base.contains('V') { "maj7" } else { "m7" }
}

/// Resolve every symbol and build its root-position chord in `octave`.
pub fn progression_chords(
    symbols: &[RomanSymbol],
    key: &Key,
    octave: i8,
) -> Result<Vec<Vec<Pitch>>> {
    symbols
        .iter()
        .map(|symbol| {
            let (root, chord_type) = symbol.resolve(key)?;
            chord(root, chord_type, octave)
        })
        .collect()
}
