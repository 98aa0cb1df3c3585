// Section types and their behaviour profiles.
//
// Each section type maps to a `SectionProfile` that decides which tracks
// play, how dense the melody is, whether the last bar gets a drum fill, and
// the dynamics multiplier applied to every velocity in the section. The
// defaults below are the built-in arrangement style; `GeneratorConfig`
// can override any of them from JSON.

use crate::bass::BassStyle;
use crate::drums::DrumPattern;
use crate::error::{MusicError, Result};
use crate::event::Beats;
use crate::rhythm::VelocityCurve;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Intro,
    Verse,
    Chorus,
    Bridge,
    Outro,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Intro,
        SectionKind::Verse,
        SectionKind::Chorus,
        SectionKind::Bridge,
        SectionKind::Outro,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Intro => "intro",
            SectionKind::Verse => "verse",
            SectionKind::Chorus => "chorus",
            SectionKind::Bridge => "bridge",
            SectionKind::Outro => "outro",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SectionKind {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        SectionKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| MusicError::UnknownSection(s.to_string()))
    }
}

/// How the melody fills each bar of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelodyProfile {
    /// Chance of emitting a note (vs. a rest) at each step.
    pub note_probability: f64,
    pub octave: i8,
    /// Note lengths to choose from, in beats.
    pub durations: Vec<Beats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionProfile {
    pub has_melody: bool,
    pub has_drums: bool,
    /// Replace the standard beat with a fill on the section's final bar.
    pub fill_on_last_bar: bool,
    /// Multiplier applied to every velocity in the section.
    pub dynamics: f64,
    pub bass_style: BassStyle,
    pub drum_pattern: DrumPattern,
    /// Shape the chord velocities across the section's bars instead of
    /// using the flat `chord_velocity`.
    #[serde(default)]
    pub chord_curve: Option<VelocityCurve>,
    pub melody: MelodyProfile,
}

impl SectionProfile {
    /// Built-in profile for a section type.
    pub fn default_for(kind: SectionKind) -> Self {
        let calm_melody = MelodyProfile {
            note_probability: 0.60,
            octave: 5,
            durations: vec![0.5, 1.0, 1.5],
        };
        match kind {
            SectionKind::Intro => SectionProfile {
                has_melody: false,
                has_drums: true,
                fill_on_last_bar: false,
                dynamics: 1.0,
                bass_style: BassStyle::Sustained,
                drum_pattern: DrumPattern::Backbeat,
                chord_curve: None,
                melody: calm_melody,
            },
            SectionKind::Verse => SectionProfile {
                has_melody: true,
                has_drums: true,
                fill_on_last_bar: true,
                dynamics: 1.0,
                bass_style: BassStyle::Sustained,
                drum_pattern: DrumPattern::Backbeat,
                chord_curve: None,
                melody: calm_melody,
            },
            SectionKind::Chorus => SectionProfile {
                has_melody: true,
                has_drums: true,
                fill_on_last_bar: true,
                dynamics: 1.2,
                bass_style: BassStyle::Active,
                drum_pattern: DrumPattern::Backbeat,
                chord_curve: None,
                melody: MelodyProfile {
                    note_probability: 0.85,
                    octave: 6,
                    durations: vec![0.25, 0.5, 1.0],
                },
            },
            SectionKind::Bridge => SectionProfile {
                has_melody: false,
                has_drums: true,
                fill_on_last_bar: false,
                dynamics: 1.0,
                bass_style: BassStyle::Sustained,
                drum_pattern: DrumPattern::HiHat,
                chord_curve: None,
                melody: calm_melody,
            },
            SectionKind::Outro => SectionProfile {
                has_melody: false,
                has_drums: false,
                fill_on_last_bar: false,
                dynamics: 1.0,
                bass_style: BassStyle::Sustained,
                drum_pattern: DrumPattern::Backbeat,
                chord_curve: None,
                melody: calm_melody,
            },
        }
    }

    /// Reject profiles the melody loop cannot terminate on.
    pub fn validate(&self, kind: SectionKind) -> Result<()> {
        let bad = |what: &str| MusicError::InvalidConfig(format!("{kind} profile: {what}"));
        if self.melody.durations.is_empty() {
            return Err(bad("melody durations are empty"));
        }
        if self.melody.durations.iter().any(|&d| d.is_nan() || d <= 0.0) {
            return Err(bad("melody durations must be positive"));
        }
        if !(0.0..=1.0).contains(&self.melody.note_probability) {
            return Err(bad("note probability must be within 0..=1"));
        }
        if self.dynamics.is_nan() || self.dynamics < 0.0 {
            return Err(bad("dynamics must be non-negative"));
        }
        Ok(())
    }
}
