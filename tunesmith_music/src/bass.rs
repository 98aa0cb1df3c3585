// Bass line generator.
//
// Produces one bar of bass under a chord root. Two styles:
// - Sustained: a single whole-bar note in the low octave.
// - Active: four quarter notes alternating between two octaves, used where a
//   section wants more drive (the chorus by default).
//
// Octaves and velocity bands come from `BassConfig`.

use crate::config::BassConfig;
use crate::error::Result;
use crate::event::{BAR_BEATS, NoteEvent};
use crate::pitch::NoteName;
use serde::{Deserialize, Serialize};
use tunesmith_prng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BassStyle {
    Sustained,
    Active,
}

/// Generate one bar of bass on `root`, with bar-relative start offsets.
pub fn generate_bass(
    root: NoteName,
    style: BassStyle,
    config: &BassConfig,
    rng: &mut impl RandomSource,
) -> Result<Vec<NoteEvent>> {
    match style {
        BassStyle::Sustained => {
            let pitch = root.pitch(config.sustained_octave)?;
            let velocity = config.sustained_velocity.draw(rng);
            Ok(vec![NoteEvent::note(pitch, 0.0, BAR_BEATS, velocity)])
        }
        BassStyle::Active => {
            let [low, high] = config.active_octaves;
            let pitches = [root.pitch(low)?, root.pitch(high)?];
            Ok((0..4)
                .map(|beat| {
                    let velocity = config.active_velocity.draw(rng);
                    NoteEvent::note(pitches[beat % 2], beat as f64, 1.0, velocity)
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MusicError;
    use crate::event::total_duration;
    use tunesmith_prng::SongRng;

    fn note(name: &str) -> NoteName {
        NoteName::parse(name).unwrap()
    }

    #[test]
    fn sustained_is_one_whole_bar_note() {
        let config = BassConfig::default();
        let events =
            generate_bass(note("G"), BassStyle::Sustained, &config, &mut SongRng::new(3)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].keys, vec![43]);
        assert_eq!(events[0].start, 0.0);
        assert_eq!(events[0].duration, BAR_BEATS);
        assert!(config.sustained_velocity.contains(events[0].velocity));
    }

    #[test]
    fn active_alternates_octaves_on_quarters() {
        let config = BassConfig::default();
        for seed in 0..50 {
            let events =
                generate_bass(note("C"), BassStyle::Active, &config, &mut SongRng::new(seed))
                    .unwrap();
            let keys: Vec<u8> = events.iter().map(|e| e.keys[0]).collect();
            assert_eq!(keys, [36, 48, 36, 48]);
            let starts: Vec<f64> = events.iter().map(|e| e.start).collect();
            assert_eq!(starts, [0.0, 1.0, 2.0, 3.0]);
            assert_eq!(total_duration(&events), BAR_BEATS);
            for e in &events {
                assert!((90..=110).contains(&e.velocity));
            }
        }
    }

    #[test]
    fn out_of_range_octave_propagates() {
        let config = BassConfig {
            sustained_octave: 11,
            ..BassConfig::default()
        };
        let result = generate_bass(note("C"), BassStyle::Sustained, &config, &mut SongRng::new(0));
        assert!(matches!(result, Err(MusicError::PitchOutOfRange { .. })));
    }
}
