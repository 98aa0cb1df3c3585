// Interval formulas: scales, chords and voicings.
//
// Scale and chord types are closed enums whose formulas live in static
// tables (first offset 0, strictly increasing). Names coming from outside
// (config files, the CLI) go through `parse`, which is strict, or
// `parse_or_default`, which falls back to `major` / `maj` and logs a warning
// naming the unknown formula.
//
// Voicings reorder or transpose chord tones by whole octaves, so pitch-class
// content is unchanged. Used by composer.rs for the chord track and by
// melody.rs for chord/scale tone pools.

use crate::error::{MusicError, Result};
use crate::pitch::{NoteName, Pitch};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    Major,
    Minor,
    Dorian,
    PentatonicMajor,
    PentatonicMinor,
}

impl ScaleType {
    pub const ALL: [ScaleType; 5] = [
        ScaleType::Major,
        ScaleType::Minor,
        ScaleType::Dorian,
        ScaleType::PentatonicMajor,
        ScaleType::PentatonicMinor,
    ];

    /// Semitone offsets from the root.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::PentatonicMajor => &[0, 2, 4, 7, 9],
            ScaleType::PentatonicMinor => &[0, 3, 5, 7, 10],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::Minor => "minor",
            ScaleType::Dorian => "dorian",
            ScaleType::PentatonicMajor => "pentatonic_major",
            ScaleType::PentatonicMinor => "pentatonic_minor",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        ScaleType::ALL
            .into_iter()
            .find(|s| s.name() == wanted)
            .ok_or_else(|| MusicError::InvalidScaleType(name.to_string()))
    }

    /// Like `parse`, but unknown names become `Major` with a warning.
    pub fn parse_or_default(name: &str) -> Self {
        ScaleType::parse(name).unwrap_or_else(|_| {
            tracing::warn!(scale = name, "unknown scale type, falling back to major");
            ScaleType::Major
        })
    }

    /// The diatonic scale for a key's mode.
    pub fn for_mode(minor: bool) -> Self {
        if minor { ScaleType::Minor } else { ScaleType::Major }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordType {
    #[serde(rename = "maj")]
    Major,
    #[serde(rename = "min")]
    Minor,
    #[serde(rename = "maj7")]
    Major7,
    #[serde(rename = "min7")]
    Minor7,
    #[serde(rename = "7")]
    Dominant7,
    #[serde(rename = "maj9")]
    Major9,
    #[serde(rename = "min9")]
    Minor9,
    #[serde(rename = "sus2")]
    Sus2,
    #[serde(rename = "sus4")]
    Sus4,
    #[serde(rename = "dim")]
    Diminished,
}

impl ChordType {
    pub const ALL: [ChordType; 10] = [
        ChordType::Major,
        ChordType::Minor,
        ChordType::Major7,
        ChordType::Minor7,
        ChordType::Dominant7,
        ChordType::Major9,
        ChordType::Minor9,
        ChordType::Sus2,
        ChordType::Sus4,
        ChordType::Diminished,
    ];

    /// Semitone offsets from the root, 3 to 5 notes.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordType::Major => &[0, 4, 7],
            ChordType::Minor => &[0, 3, 7],
            ChordType::Major7 => &[0, 4, 7, 11],
            ChordType::Minor7 => &[0, 3, 7, 10],
            ChordType::Dominant7 => &[0, 4, 7, 10],
            ChordType::Major9 => &[0, 4, 7, 11, 14],
            ChordType::Minor9 => &[0, 3, 7, 10, 14],
            ChordType::Sus2 => &[0, 2, 7],
            ChordType::Sus4 => &[0, 5, 7],
            ChordType::Diminished => &[0, 3, 6],
        }
    }

    /// Short chord-symbol suffix, e.g. `maj7` or `7`.
    pub fn name(self) -> &'static str {
        match self {
            ChordType::Major => "maj",
            ChordType::Minor => "min",
            ChordType::Major7 => "maj7",
            ChordType::Minor7 => "min7",
            ChordType::Dominant7 => "7",
            ChordType::Major9 => "maj9",
            ChordType::Minor9 => "min9",
            ChordType::Sus2 => "sus2",
            ChordType::Sus4 => "sus4",
            ChordType::Diminished => "dim",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        ChordType::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| MusicError::InvalidChordType(name.to_string()))
    }

    /// Like `parse`, but unknown names become `Major` with a warning.
    pub fn parse_or_default(name: &str) -> Self {
        ChordType::parse(name).unwrap_or_else(|_| {
            tracing::warn!(chord = name, "unknown chord type, falling back to maj");
            ChordType::Major
        })
    }
}

impl fmt::Display for ChordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Root pitch in `octave` plus each offset. Fails only if a note would fall
/// outside the MIDI range.
fn stack(root: NoteName, octave: i8, intervals: &[u8]) -> Result<Vec<Pitch>> {
    let root_pitch = root.pitch(octave)?;
    intervals
        .iter()
        .map(|&iv| {
            root_pitch
                .checked_add(iv)
                .filter(|&p| p <= 127)
                .ok_or_else(|| MusicError::PitchOutOfRange {
                    name: root.to_string(),
                    octave,
                })
        })
        .collect()
}

/// Pitches of a scale, one per formula entry (5 for pentatonic, 7 otherwise).
pub fn scale(root: NoteName, scale_type: ScaleType, octave: i8) -> Result<Vec<Pitch>> {
    stack(root, octave, scale_type.intervals())
}

/// Pitches of a chord in root position.
pub fn chord(root: NoteName, chord_type: ChordType, octave: i8) -> Result<Vec<Pitch>> {
    stack(root, octave, chord_type.intervals())
}

/// How chord tones are spread across octaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Voicing {
    /// Root position, unchanged.
    Close,
    /// 2nd and 3rd chord tones lifted an octave.
    #[default]
    Open,
    /// Second-from-top tone dropped an octave, then sorted.
    Drop2,
    /// Root, 3rd and 7th; the 5th is omitted.
    Shell,
}

impl Voicing {
    pub const ALL: [Voicing; 4] = [Voicing::Close, Voicing::Open, Voicing::Drop2, Voicing::Shell];

    pub fn name(self) -> &'static str {
        match self {
            Voicing::Close => "close",
            Voicing::Open => "open",
            Voicing::Drop2 => "drop2",
            Voicing::Shell => "shell",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        Voicing::ALL
            .into_iter()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| MusicError::InvalidVoicing(name.to_string()))
    }
}

/// Apply a voicing to root-position chord pitches.
///
/// Chords too small for a voicing pass through unchanged (`open` and `drop2`
/// need 3 notes). An octave shift that would leave the MIDI range is skipped
/// for that note.
pub fn voice(pitches: &[Pitch], voicing: Voicing) -> Vec<Pitch> {
    let mut out = pitches.to_vec();
    match voicing {
        Voicing::Close => {}
        Voicing::Open => {
            if out.len() >= 3 {
                for p in &mut out[1..3] {
                    if *p <= 127 - 12 {
                        *p += 12;
                    }
                }
                out.sort_unstable();
            }
        }
        Voicing::Drop2 => {
            if out.len() >= 3 {
                let idx = out.len() - 2;
                if out[idx] >= 12 {
                    out[idx] -= 12;
                }
                out.sort_unstable();
            }
        }
        Voicing::Shell => {
            if out.len() >= 4 {
                out = vec![out[0], out[1], out[3]];
            } else {
                out.truncate(3);
            }
        }
    }
    out
}
