// Melody bar filler.
//
// Walks one 4-beat bar from offset 0. At each step it either plays a note
// (with the profile's note probability) or rests for `rest_beats`. A note's
// pitch comes from the chord tones with `chord_tone_probability`, otherwise
// from the whole scale; its length comes from the profile's duration set.
// Both notes and rests are clipped to the bar's remaining length, and the
// offset snaps to exactly `BAR_BEATS` when clipped, so the loop always ends
// on the barline.
//
// Chord tones are accented: their velocity band sits above the passing-tone
// band. A scale degree that happens to be in the chord counts as a chord
// tone.

use crate::config::MelodyConfig;
use crate::event::{BAR_BEATS, Beats, NoteEvent};
use crate::pitch::Pitch;
use crate::section::MelodyProfile;
use tunesmith_prng::RandomSource;

/// Fill one bar over a chord. Start offsets are bar-relative.
///
/// `chord_tones` and `scale_tones` must be non-empty and already placed in
/// the melody octave.
pub fn fill_bar(
    chord_tones: &[Pitch],
    scale_tones: &[Pitch],
    profile: &MelodyProfile,
    config: &MelodyConfig,
    rng: &mut impl RandomSource,
) -> Vec<NoteEvent> {
    let mut events = Vec::new();
    let mut offset: Beats = 0.0;

    while offset < BAR_BEATS {
        let remaining = BAR_BEATS - offset;

        if !rng.chance(profile.note_probability) {
            offset = advance(offset, config.rest_beats, remaining);
            continue;
        }

        let pool = if rng.chance(config.chord_tone_probability) {
            chord_tones
        } else {
            scale_tones
        };
        let pitch = *rng.choice(pool);
        let duration = rng.choice(&profile.durations).min(remaining);
        let band = if chord_tones.contains(&pitch) {
            config.chord_tone_velocity
        } else {
            config.passing_tone_velocity
        };
        events.push(NoteEvent::note(pitch, offset, duration, band.draw(rng)));
        offset = advance(offset, duration, remaining);
    }

    events
}

fn advance(offset: Beats, step: Beats, remaining: Beats) -> Beats {
    if step >= remaining { BAR_BEATS } else { offset + step }
}
