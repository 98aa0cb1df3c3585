// Drum pattern generator.
//
// Every pattern is one 4/4 bar of percussion events. Keys are General MIDI
// percussion numbers taken from `DrumKit`; the renderer places the drum track
// on the percussion channel.
//
// Patterns:
// - Backbeat: kick on beats 1 and 3, snare on 2 and 4, one beat each.
// - HiHat: eight eighth-note hi-hats, with the kick layered in at steps 0
//   and 4 and the snare at steps 2 and 6. A step's velocity comes from its
//   accent voice's band when it has one, otherwise from the hi-hat band.
//   The off-beat eighths follow `DrumConfig::swing`.
//
// The fill marks the end of a section: a kick and a snare on beats 1 and 2,
// then four eighth-note snares whose velocities climb.

use crate::config::DrumConfig;
use crate::event::{BAR_BEATS, NoteEvent};
use crate::rhythm::swing_timings;
use serde::{Deserialize, Serialize};
use tunesmith_prng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrumPattern {
    Backbeat,
    HiHat,
}

impl DrumPattern {
    pub const ALL: [DrumPattern; 2] = [DrumPattern::Backbeat, DrumPattern::HiHat];
}

/// One bar of the standard beat for `pattern`.
pub fn generate_beat(
    pattern: DrumPattern,
    config: &DrumConfig,
    rng: &mut impl RandomSource,
) -> Vec<NoteEvent> {
    let kit = config.kit;
    match pattern {
        DrumPattern::Backbeat => (0..4)
            .map(|beat| {
                let (key, band) = if beat % 2 == 0 {
                    (kit.kick, config.kick_velocity)
                } else {
                    (kit.snare, config.snare_velocity)
                };
                NoteEvent::note(key, beat as f64, 1.0, band.draw(rng))
            })
            .collect(),
        DrumPattern::HiHat => {
            let onsets = swing_timings(4, config.swing);
            (0..onsets.len())
                .map(|step| {
                    let (keys, band) = match step {
                        0 | 4 => (vec![kit.hihat, kit.kick], config.kick_velocity),
                        2 | 6 => (vec![kit.hihat, kit.snare], config.snare_velocity),
                        _ => (vec![kit.hihat], config.hihat_velocity),
                    };
                    let start = onsets[step];
                    let next = onsets.get(step + 1).copied().unwrap_or(BAR_BEATS);
                    NoteEvent::chord(keys, start, next - start, band.draw(rng))
                })
                .collect()
        }
    }
}

/// One bar of fill: kick, snare, then a four-stroke snare roll.
pub fn generate_fill(config: &DrumConfig, rng: &mut impl RandomSource) -> Vec<NoteEvent> {
    let kit = config.kit;
    let mut events = vec![
        NoteEvent::note(kit.kick, 0.0, 1.0, config.kick_velocity.draw(rng)),
        NoteEvent::note(kit.snare, 1.0, 1.0, config.snare_velocity.draw(rng)),
    ];

    let mut roll: Vec<u8> = (0..4).map(|_| config.fill_velocity.draw(rng)).collect();
    roll.sort_unstable();
    events.extend(
        roll.into_iter()
            .enumerate()
            .map(|(i, velocity)| NoteEvent::note(kit.snare, 2.0 + i as f64 * 0.5, 0.5, velocity)),
    );
    events
}
