// Data-driven generator configuration.
//
// Every probability, velocity band and constant the generators use lives in
// `GeneratorConfig`, loaded from JSON or taken from `Default`. Nothing in the
// generators is a bare literal: bass.rs, drums.rs, melody.rs and composer.rs
// all read from here.
//
// JSON files may be partial. `from_json` lays the file over the serialized
// defaults before deserializing: objects merge key by key, while arrays and
// scalars replace. A file containing only `{"tempo_bpm": 120}` keeps every
// other default, and `{"sections": {"chorus": {"dynamics": 1.5}}}` keeps the
// rest of the chorus profile.

use crate::error::{MusicError, Result};
use crate::event::Beats;
use crate::pitch::Pitch;
use crate::section::{SectionKind, SectionProfile};
use crate::theory::{ScaleType, Voicing};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tunesmith_prng::RandomSource;

/// Slowest tempo whose microseconds-per-quarter fits MIDI's 24-bit field.
pub const MIN_TEMPO_BPM: u16 = 4;

/// An inclusive velocity range that generators draw from uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityBand {
    pub low: u8,
    pub high: u8,
}

impl VelocityBand {
    pub const fn new(low: u8, high: u8) -> Self {
        VelocityBand { low, high }
    }

    pub fn draw(&self, rng: &mut impl RandomSource) -> u8 {
        rng.range_inclusive(self.low, self.high)
    }

    pub fn contains(&self, velocity: u8) -> bool {
        (self.low..=self.high).contains(&velocity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BassConfig {
    pub sustained_octave: i8,
    /// Active style alternates between these two octaves, one per beat.
    pub active_octaves: [i8; 2],
    pub sustained_velocity: VelocityBand,
    pub active_velocity: VelocityBand,
}

impl Default for BassConfig {
    fn default() -> Self {
        BassConfig {
            sustained_octave: 2,
            active_octaves: [2, 3],
            sustained_velocity: VelocityBand::new(75, 90),
            active_velocity: VelocityBand::new(90, 110),
        }
    }
}

/// General MIDI percussion keys for each kit piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrumKit {
    pub kick: Pitch,
    pub snare: Pitch,
    pub hihat: Pitch,
}

impl Default for DrumKit {
    fn default() -> Self {
        DrumKit {
            kick: 36,
            snare: 38,
            hihat: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrumConfig {
    pub kit: DrumKit,
    pub kick_velocity: VelocityBand,
    pub snare_velocity: VelocityBand,
    pub hihat_velocity: VelocityBand,
    /// Band for the snare roll at the end of a fill.
    pub fill_velocity: VelocityBand,
    /// Where the off-beat eighth lands within each beat of the hi-hat
    /// pattern. 0.5 is straight, about 0.67 is a triplet shuffle.
    pub swing: f64,
    /// Maximum onset jitter in beats applied to every drum hit. 0 disables it.
    pub humanize: Beats,
}

impl Default for DrumConfig {
    fn default() -> Self {
        DrumConfig {
            kit: DrumKit::default(),
            kick_velocity: VelocityBand::new(90, 110),
            snare_velocity: VelocityBand::new(85, 105),
            hihat_velocity: VelocityBand::new(40, 60),
            fill_velocity: VelocityBand::new(90, 120),
            swing: 0.5,
            humanize: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyConfig {
    /// Chance of drawing from the chord tones rather than the full scale.
    pub chord_tone_probability: f64,
    /// Offset advance when no note is emitted.
    pub rest_beats: Beats,
    pub chord_tone_velocity: VelocityBand,
    pub passing_tone_velocity: VelocityBand,
}

impl Default for MelodyConfig {
    fn default() -> Self {
        MelodyConfig {
            chord_tone_probability: 0.7,
            rest_beats: 0.5,
            chord_tone_velocity: VelocityBand::new(85, 105),
            passing_tone_velocity: VelocityBand::new(70, 90),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub tempo_bpm: u16,
    /// Octave of the chord track's root-position chords, before voicing.
    pub chord_octave: i8,
    /// Chord velocity before section dynamics.
    pub chord_velocity: u8,
    pub voicing: Voicing,
    /// Scale the melody draws passing tones from, by name, per mode.
    /// Unknown names fall back to `major` with a warning.
    pub major_scale: String,
    pub minor_scale: String,
    /// Chords per generated progression; one bar each.
    pub progression_length: usize,
    /// Chance that each generated symbol carries a seventh suffix.
    pub seventh_probability: f64,
    pub bass: BassConfig,
    pub drums: DrumConfig,
    pub melody: MelodyConfig,
    pub sections: BTreeMap<SectionKind, SectionProfile>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            tempo_bpm: 90,
            chord_octave: 4,
            chord_velocity: 60,
            voicing: Voicing::Open,
            major_scale: ScaleType::for_mode(false).name().to_string(),
            minor_scale: ScaleType::for_mode(true).name().to_string(),
            progression_length: 4,
            seventh_probability: 0.7,
            bass: BassConfig::default(),
            drums: DrumConfig::default(),
            melody: MelodyConfig::default(),
            sections: SectionKind::ALL
                .into_iter()
                .map(|kind| (kind, SectionProfile::default_for(kind)))
                .collect(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a (possibly partial) JSON config over the defaults and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let overrides: Value = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(GeneratorConfig::default())?;
        overlay(&mut merged, overrides);
        let config: GeneratorConfig = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        GeneratorConfig::from_json(&data)
    }

    /// Profile for a section kind, falling back to the built-in one.
    pub fn profile(&self, kind: SectionKind) -> SectionProfile {
        self.sections
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| SectionProfile::default_for(kind))
    }

    /// The melody scale for a key's mode.
    pub fn melody_scale(&self, minor: bool) -> ScaleType {
        ScaleType::parse_or_default(if minor { &self.minor_scale } else { &self.major_scale })
    }

    /// Check everything generation relies on to terminate and stay in range.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(MusicError::InvalidConfig(msg.to_string()));
        if self.tempo_bpm < MIN_TEMPO_BPM {
            return invalid("tempo must be at least 4 BPM");
        }
        if self.melody.rest_beats.is_nan() || self.melody.rest_beats <= 0.0 {
            return invalid("melody rest must be positive");
        }
        for p in [self.seventh_probability, self.melody.chord_tone_probability] {
            if !(0.0..=1.0).contains(&p) {
                return invalid("probabilities must be within 0..=1");
            }
        }
        let bands = [
            self.bass.sustained_velocity,
            self.bass.active_velocity,
            self.drums.kick_velocity,
            self.drums.snare_velocity,
            self.drums.hihat_velocity,
            self.drums.fill_velocity,
            self.melody.chord_tone_velocity,
            self.melody.passing_tone_velocity,
        ];
        if bands.iter().any(|b| b.low > b.high || b.high > 127) {
            return invalid("velocity bands must satisfy low <= high <= 127");
        }
        if self.chord_velocity > 127 {
            return invalid("chord velocity must be <= 127");
        }
        let kit = self.drums.kit;
        if [kit.kick, kit.snare, kit.hihat].iter().any(|&key| key > 127) {
            return invalid("drum kit keys must be <= 127");
        }
        if self.drums.swing.is_nan() || self.drums.swing <= 0.0 || self.drums.swing >= 1.0 {
            return invalid("swing must be strictly between 0 and 1");
        }
        if !(0.0..0.5).contains(&self.drums.humanize) {
            return invalid("drum humanize must be within 0..0.5 beats");
        }
        for (&kind, profile) in &self.sections {
            profile.validate(kind)?;
        }
        Ok(())
    }
}

/// Merge `overrides` into `base`. Objects merge per key; anything else
/// replaces the base value.
fn overlay(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        GeneratorConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GeneratorConfig::from_json(r#"{"tempo_bpm": 120, "voicing": "drop2"}"#).unwrap();
        assert_eq!(config.tempo_bpm, 120);
        assert_eq!(config.voicing, Voicing::Drop2);
        assert_eq!(config.chord_octave, 4);
        assert_eq!(config.melody, MelodyConfig::default());
        assert_eq!(config.sections.len(), SectionKind::ALL.len());
    }

    #[test]
    fn nested_partial_override() {
        let json = r#"{"drums": {"kit": {"hihat": 44}}, "melody": {"rest_beats": 0.25}}"#;
        let config = GeneratorConfig::from_json(json).unwrap();
        assert_eq!(config.drums.kit.hihat, 44);
        assert_eq!(config.drums.kit.kick, 36);
        assert_eq!(config.drums.kick_velocity, VelocityBand::new(90, 110));
        assert_eq!(config.melody.rest_beats, 0.25);
    }

    #[test]
    fn partial_section_profile_keeps_the_rest() {
        let config = GeneratorConfig::from_json(r#"{"sections": {"chorus": {"dynamics": 1.5}}}"#).unwrap();
        let chorus = config.profile(SectionKind::Chorus);
        assert_eq!(chorus.dynamics, 1.5);
        let mut expected = SectionProfile::default_for(SectionKind::Chorus);
        expected.dynamics = 1.5;
        assert_eq!(chorus, expected);

        let json = r#"{"sections": {"verse": {"melody": {"octave": 4}}}}"#;
        let verse = GeneratorConfig::from_json(json).unwrap().profile(SectionKind::Verse);
        assert_eq!(verse.melody.octave, 4);
        assert_eq!(verse.melody.durations, vec![0.5, 1.0, 1.5]);
        assert!(verse.has_melody);
    }

    #[test]
    fn partial_velocity_band_keeps_the_other_end() {
        let config = GeneratorConfig::from_json(r#"{"bass": {"active_velocity": {"low": 95}}}"#).unwrap();
        assert_eq!(config.bass.active_velocity, VelocityBand::new(95, 110));
        assert_eq!(config.bass.sustained_velocity, VelocityBand::new(75, 90));
    }

    #[test]
    fn arrays_replace_instead_of_merging() {
        let json = r#"{"sections": {"chorus": {"melody": {"durations": [2.0]}}}}"#;
        let config = GeneratorConfig::from_json(json).unwrap();
        assert_eq!(config.profile(SectionKind::Chorus).melody.durations, vec![2.0]);
    }

    #[test]
    fn unknown_section_names_are_rejected() {
        assert!(matches!(
            GeneratorConfig::from_json(r#"{"sections": {"solo": {"dynamics": 1.0}}}"#),
            Err(MusicError::Config(_))
        ));
    }

    #[test]
    fn missing_section_profiles_fall_back() {
        let json = r#"{"sections": {"chorus": {
            "has_melody": true, "has_drums": false, "fill_on_last_bar": false,
            "dynamics": 1.5, "bass_style": "sustained", "drum_pattern": "hi_hat",
            "melody": {"note_probability": 1.0, "octave": 5, "durations": [1.0]}
        }}}"#;
        let config = GeneratorConfig::from_json(json).unwrap();
        assert_eq!(config.profile(SectionKind::Chorus).dynamics, 1.5);
        assert!(!config.profile(SectionKind::Chorus).has_drums);
        assert_eq!(
            config.profile(SectionKind::Verse),
            SectionProfile::default_for(SectionKind::Verse)
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{"tempo_bpm": 0}"#,
            r#"{"seventh_probability": 2.0}"#,
            r#"{"melody": {"rest_beats": 0.0}}"#,
            r#"{"bass": {"active_velocity": {"low": 110, "high": 90}}}"#,
            r#"{"drums": {"fill_velocity": {"low": 90, "high": 200}}}"#,
            r#"{"drums": {"kit": {"kick": 200}}}"#,
            r#"{"drums": {"swing": 1.0}}"#,
            r#"{"drums": {"humanize": -0.1}}"#,
            r#"{"tempo_bpm": 3}"#,
            r#"{"sections": {"verse": {"melody": {"durations": []}}}}"#,
        ] {
            assert!(
                matches!(GeneratorConfig::from_json(json), Err(MusicError::InvalidConfig(_))),
                "{json} should be rejected"
            );
        }
        assert!(matches!(
            GeneratorConfig::from_json("{not json"),
            Err(MusicError::Config(_))
        ));
    }

    #[test]
    fn slowest_tempo_fits_the_midi_tempo_field() {
        let config = GeneratorConfig::from_json(r#"{"tempo_bpm": 4}"#).unwrap();
        assert_eq!(config.tempo_bpm, MIN_TEMPO_BPM);
        assert!(60_000_000 / u32::from(MIN_TEMPO_BPM) <= 0xFF_FFFF);
        assert!(60_000_000 / u32::from(MIN_TEMPO_BPM - 1) > 0xFF_FFFF);
    }

    #[test]
    fn load_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"progression_length": 8}"#).unwrap();
        assert_eq!(GeneratorConfig::load(&path).unwrap().progression_length, 8);
        assert!(matches!(
            GeneratorConfig::load(&dir.path().join("missing.json")),
            Err(MusicError::Io(_))
        ));
    }

    #[test]
    fn melody_scale_by_name() {
        let config = GeneratorConfig::from_json(r#"{"major_scale": "pentatonic_major"}"#).unwrap();
        assert_eq!(config.melody_scale(false), ScaleType::PentatonicMajor);
        assert_eq!(config.melody_scale(true), ScaleType::Minor);

        let config = GeneratorConfig::from_json(r#"{"minor_scale": "phrygian"}"#).unwrap();
        assert_eq!(config.melody_scale(true), ScaleType::Major);
    }

    #[test]
    fn band_draws_stay_inside() {
        let band = VelocityBand::new(40, 60);
        let mut rng = tunesmith_prng::SongRng::new(1);
        for _ in 0..1000 {
            assert!(band.contains(band.draw(&mut rng)));
        }
    }
}
