// Section composer.
//
// Turns one section's progression into its four instrument parts, one bar per
// chord. For each bar: resolve the symbol, emit the voiced chord for the
// whole bar, emit a bar of bass on the chord root, fill a melody bar if the
// section has one, and emit a drum bar (the fill on the last bar when the
// profile asks for it). Chord velocities follow the profile's curve when it
// names one, and drum onsets are jittered when the drum config asks for it.
// The section's dynamics multiplier is applied to all four parts as a final
// pass.
//
// Start offsets in `SectionTracks` are section-relative; the song assembler
// moves them to the section's absolute position.

use crate::bass::generate_bass;
use crate::config::GeneratorConfig;
use crate::drums::{generate_beat, generate_fill};
use crate::error::Result;
use crate::event::{BAR_BEATS, Beats, NoteEvent, apply_dynamics};
use crate::melody::fill_bar;
use crate::rhythm::{humanize, velocity_curve};
use crate::roman::{Key, RomanSymbol};
use crate::section::SectionKind;
use crate::theory::{chord, scale, voice};
use tunesmith_prng::RandomSource;

/// The four parts of one composed section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionTracks {
    pub kind: SectionKind,
    pub chords: Vec<NoteEvent>,
    pub melody: Vec<NoteEvent>,
    pub bass: Vec<NoteEvent>,
    pub drums: Vec<NoteEvent>,
    pub bars: usize,
}

impl SectionTracks {
    pub fn beats(&self) -> Beats {
        self.bars as Beats * BAR_BEATS
    }
}

/// Compose a section over `progression` in `key`.
///
/// Fails on an invalid config, on the first symbol that does not resolve, or
/// on a chord that falls outside the MIDI range in the configured octaves.
pub fn compose_section(
    kind: SectionKind,
    progression: &[RomanSymbol],
    key: &Key,
    config: &GeneratorConfig,
    rng: &mut impl RandomSource,
) -> Result<SectionTracks> {
    config.validate()?;
    let profile = config.profile(kind);
    let mut tracks = SectionTracks {
        kind,
        chords: Vec::with_capacity(progression.len()),
        melody: Vec::new(),
        bass: Vec::new(),
        drums: Vec::new(),
        bars: progression.len(),
    };

    let scale_tones = if profile.has_melody {
        scale(key.tonic, config.melody_scale(key.minor), profile.melody.octave)?
    } else {
        Vec::new()
    };
    let chord_velocities = profile
        .chord_curve
        .map(|curve| velocity_curve(progression.len(), curve, rng));

    for (bar, symbol) in progression.iter().enumerate() {
        let bar_start = bar as Beats * BAR_BEATS;
        let (root, chord_type) = symbol.resolve(key)?;

        let voiced = voice(&chord(root, chord_type, config.chord_octave)?, config.voicing);
        tracks.chords.push(NoteEvent::chord(
            voiced,
            bar_start,
            BAR_BEATS,
            chord_velocities
                .as_ref()
                .map_or(config.chord_velocity, |curve| curve[bar]),
        ));

        let bass = generate_bass(root, profile.bass_style, &config.bass, rng)?;
        tracks.bass.extend(bass.into_iter().map(|e| e.shifted(bar_start)));

        if profile.has_melody {
            let chord_tones = chord(root, chord_type, profile.melody.octave)?;
            let bar_melody = fill_bar(&chord_tones, &scale_tones, &profile.melody, &config.melody, rng);
            tracks.melody.extend(bar_melody.into_iter().map(|e| e.shifted(bar_start)));
        }

        if profile.has_drums {
            let last_bar = bar + 1 == progression.len();
            let mut bar_drums = if profile.fill_on_last_bar && last_bar {
                generate_fill(&config.drums, rng)
            } else {
                generate_beat(profile.drum_pattern, &config.drums, rng)
            };
            if config.drums.humanize > 0.0 {
                humanize_bar(&mut bar_drums, config.drums.humanize, rng);
            }
            tracks.drums.extend(bar_drums.into_iter().map(|e| e.shifted(bar_start)));
        }
    }

    for part in [
        &mut tracks.chords,
        &mut tracks.melody,
        &mut tracks.bass,
        &mut tracks.drums,
    ] {
        apply_dynamics(part, profile.dynamics);
    }

    tracing::debug!(
        section = %kind,
        bars = tracks.bars,
        melody_notes = tracks.melody.len(),
        drum_hits = tracks.drums.len(),
        "composed section"
    );
    Ok(tracks)
}

/// Jitter each hit's onset, keeping every hit inside its bar.
fn humanize_bar(events: &mut [NoteEvent], amount: Beats, rng: &mut impl RandomSource) {
    let starts: Vec<Beats> = events.iter().map(|e| e.start).collect();
    for (event, start) in events.iter_mut().zip(humanize(&starts, amount, rng)) {
        event.start = start.clamp(0.0, (BAR_BEATS - event.duration).max(0.0));
    }
    events.sort_by(|a, b| a.start.total_cmp(&b.start));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MusicError;
    use crate::event::scale_velocity;
    use crate::rhythm::VelocityCurve;
    use crate::section::SectionProfile;
    use tunesmith_prng::SongRng;

    fn c_major() -> Key {
        Key::parse("C", false).unwrap()
    }

    fn symbols(list: &[&str]) -> Vec<RomanSymbol> {
        list.iter().map(|&s| RomanSymbol::from(s)).collect()
    }

    #[test]
    fn one_voiced_chord_per_bar() {
        let config = GeneratorConfig::default();
        let prog = symbols(&["I", "vi", "IV", "V"]);
        let tracks =
            compose_section(SectionKind::Verse, &prog, &c_major(), &config, &mut SongRng::new(1))
                .unwrap();
        assert_eq!(tracks.bars, 4);
        assert_eq!(tracks.beats(), 16.0);
        assert_eq!(tracks.chords.len(), 4);
        // Cmaj7 in octave 4, open voicing.
        assert_eq!(tracks.chords[0].keys, vec![60, 71, 76, 79]);
        for (i, c) in tracks.chords.iter().enumerate() {
            assert_eq!(c.start, i as f64 * BAR_BEATS);
            assert_eq!(c.duration, BAR_BEATS);
            assert_eq!(c.velocity, 60);
        }
        let bass_roots: Vec<u8> = tracks.bass.iter().map(|e| e.keys[0]).collect();
        assert_eq!(bass_roots, [36, 45, 41, 43]);
    }

    #[test]
    fn verse_ends_with_a_fill() {
        let config = GeneratorConfig::default();
        let prog = symbols(&["I", "IV", "V", "I"]);
        let tracks =
            compose_section(SectionKind::Verse, &prog, &c_major(), &config, &mut SongRng::new(4))
                .unwrap();
        // Three backbeat bars of 4 hits, then a 6-hit fill.
        assert_eq!(tracks.drums.len(), 3 * 4 + 6);
        let fill = &tracks.drums[12..];
        assert_eq!(fill[0].start, 12.0);
        assert_eq!(fill[5].start, 15.5);
    }

    #[test]
    fn outro_and_intro_flags() {
        let config = GeneratorConfig::default();
        let prog = symbols(&["I", "V"]);
        let outro =
            compose_section(SectionKind::Outro, &prog, &c_major(), &config, &mut SongRng::new(2))
                .unwrap();
        assert!(outro.drums.is_empty());
        assert!(outro.melody.is_empty());
        assert_eq!(outro.chords.len(), 2);

        let intro =
            compose_section(SectionKind::Intro, &prog, &c_major(), &config, &mut SongRng::new(2))
                .unwrap();
        assert!(intro.melody.is_empty());
        // No fill in the intro: two plain backbeat bars.
        assert_eq!(intro.drums.len(), 8);
    }

    #[test]
    fn melody_stays_inside_each_bar() {
        let config = GeneratorConfig::default();
        let prog = symbols(&["I", "ii", "V", "I"]);
        for seed in 0..50 {
            let tracks = compose_section(
                SectionKind::Chorus,
                &prog,
                &c_major(),
                &config,
                &mut SongRng::new(seed),
            )
            .unwrap();
            assert!(!tracks.melody.is_empty());
            for e in &tracks.melody {
                let bar_end = (e.start / BAR_BEATS).floor() * BAR_BEATS + BAR_BEATS;
                assert!(e.end() <= bar_end);
                assert!(e.duration > 0.0);
            }
        }
    }

    #[test]
    fn chorus_dynamics_scale_everything() {
        let config = GeneratorConfig::default();
        let prog = symbols(&["I"]);
        let tracks =
            compose_section(SectionKind::Chorus, &prog, &c_major(), &config, &mut SongRng::new(8))
                .unwrap();
        assert_eq!(tracks.chords[0].velocity, scale_velocity(60, 1.2));
        // Active bass drawn from 90..=110 lands in 108..=127 after scaling.
        assert_eq!(tracks.bass.len(), 4);
        assert!(tracks.bass.iter().all(|e| e.velocity >= 108));
    }

    #[test]
    fn unresolvable_symbol_aborts() {
        let config = GeneratorConfig::default();
        let prog = symbols(&["I", "III"]);
        let result =
            compose_section(SectionKind::Verse, &prog, &c_major(), &config, &mut SongRng::new(1));
        assert!(matches!(result, Err(MusicError::UnknownDegree { .. })));
    }

    #[test]
    fn invalid_config_is_rejected_before_composing() {
        let mut config = GeneratorConfig::default();
        let mut verse = SectionProfile::default_for(SectionKind::Verse);
        verse.melody.durations.clear();
        config.sections.insert(SectionKind::Verse, verse);
        let prog = symbols(&["I", "V"]);
        let result =
            compose_section(SectionKind::Verse, &prog, &c_major(), &config, &mut SongRng::new(1));
        assert!(matches!(result, Err(MusicError::InvalidConfig(_))));
    }

    #[test]
    fn chord_curve_shapes_chord_velocities() {
        let mut config = GeneratorConfig::default();
        let mut verse = SectionProfile::default_for(SectionKind::Verse);
        verse.chord_curve = Some(VelocityCurve::Crescendo);
        config.sections.insert(SectionKind::Verse, verse);
        let prog = symbols(&["I", "vi", "IV", "V"]);
        let tracks =
            compose_section(SectionKind::Verse, &prog, &c_major(), &config, &mut SongRng::new(5))
                .unwrap();
        let velocities: Vec<u8> = tracks.chords.iter().map(|c| c.velocity).collect();
        assert_eq!(velocities, [60, 70, 80, 90]);

        let mut config = GeneratorConfig::default();
        let mut chorus = SectionProfile::default_for(SectionKind::Chorus);
        chorus.chord_curve = Some(VelocityCurve::Flat);
        config.sections.insert(SectionKind::Chorus, chorus);
        let tracks =
            compose_section(SectionKind::Chorus, &prog, &c_major(), &config, &mut SongRng::new(5))
                .unwrap();
        assert!(tracks.chords.iter().all(|c| c.velocity == scale_velocity(80, 1.2)));
    }

    #[test]
    fn humanized_drums_stay_inside_their_bar() {
        let mut config = GeneratorConfig::default();
        config.drums.humanize = 0.2;
        let prog = symbols(&["I", "IV", "V", "I"]);
        let mut moved = false;
        for seed in 0..20 {
            let tracks = compose_section(
                SectionKind::Verse,
                &prog,
                &c_major(),
                &config,
                &mut SongRng::new(seed),
            )
            .unwrap();
            assert_eq!(tracks.drums.len(), 3 * 4 + 6);
            for (i, e) in tracks.drums.iter().enumerate() {
                let bar_start = (i / 4).min(3) as f64 * BAR_BEATS;
                assert!(e.start >= bar_start);
                assert!(e.end() <= bar_start + BAR_BEATS + 1e-9);
                moved |= e.start.fract() != 0.0 && e.start.fract() != 0.5;
            }
            assert!(tracks.drums.windows(2).all(|w| w[0].start <= w[1].start));
        }
        assert!(moved);
    }
}
