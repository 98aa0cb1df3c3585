// Pitch table: note names <-> MIDI pitch numbers <-> frequencies.
//
// A `NoteName` keeps the spelling it was written with (letter plus signed
// accidental offset) so `Db` and `C#` stay distinguishable for display, but
// both normalize to the same pitch-class index. Pitch numbers follow MIDI:
// `pitch = (octave + 1) * 12 + offset`, so C4 = 60 and A4 = 69 = 440 Hz.
//
// Enharmonics that cross an octave boundary are computed from the signed
// offset rather than the wrapped index: Cb4 is B3 (59), B#3 is C4 (60).
//
// The reverse direction (index -> name) is a spelling choice, not unique:
// `Spelling::Sharps` or `Spelling::Flats`.

use crate::error::{MusicError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MIDI pitch number, 0..=127.
pub type Pitch = u8;

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Accidentals beyond a double sharp/flat are rejected as typos.
const MAX_ACCIDENTALS: i8 = 2;

/// Which enharmonic spelling to use when turning a pitch back into a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spelling {
    #[default]
    Sharps,
    Flats,
}

/// A spelled note name such as `C`, `F#`, `Bb` or `E#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteName {
    /// Uppercase letter A-G.
    letter: char,
    /// Semitones added by the accidentals: `#` is +1, `b`/`-` is -1.
    accidental: i8,
}

impl NoteName {
    /// Parse a note spelling. The letter is case-insensitive; accidentals are
    /// `#` (sharp) and `b`, `B` or `-` (flat), up to two of them.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || MusicError::InvalidNoteName(text.to_string());
        let mut chars = text.trim().chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        natural_offset(letter).ok_or_else(invalid)?;

        let mut accidental: i8 = 0;
        for c in chars {
            match c {
                '#' => accidental += 1,
                'b' | 'B' | '-' => accidental -= 1,
                _ => return Err(invalid()),
            }
            if accidental.abs() > MAX_ACCIDENTALS {
                return Err(invalid());
            }
        }
        Ok(NoteName { letter, accidental })
    }

    /// Canonical name for a pitch-class index (taken mod 12).
    pub fn from_index(index: u8, spelling: Spelling) -> Self {
        let table = match spelling {
            Spelling::Sharps => &SHARP_NAMES,
            Spelling::Flats => &FLAT_NAMES,
        };
        // The tables only hold valid spellings.
        let name = table[usize::from(index % 12)];
        let mut chars = name.chars();
        let letter = chars.next().unwrap_or('C');
        let accidental = match chars.next() {
            Some('#') => 1,
            Some('b') => -1,
            _ => 0,
        };
        NoteName { letter, accidental }
    }

    pub fn letter(self) -> char {
        self.letter
    }

    pub fn accidental(self) -> i8 {
        self.accidental
    }

    /// Pitch-class index 0..=11. Every enharmonic spelling of a pitch class
    /// yields the same index.
    pub fn index(self) -> u8 {
        self.semitone_offset().rem_euclid(12) as u8
    }

    /// Offset from C in the written octave; -1 for Cb, 12 for B#.
    fn semitone_offset(self) -> i16 {
        natural_offset(self.letter).unwrap_or(0) + i16::from(self.accidental)
    }

    /// MIDI pitch of this note in the given octave.
    pub fn pitch(self, octave: i8) -> Result<Pitch> {
        let pitch = (i16::from(octave) + 1) * 12 + self.semitone_offset();
        if (0..=127).contains(&pitch) {
            Ok(pitch as Pitch)
        } else {
            Err(MusicError::PitchOutOfRange {
                name: self.to_string(),
                octave,
            })
        }
    }

    /// Same pitch class, same spelling convention (`Sharps` for naturals).
    pub fn respelled(self, spelling: Spelling) -> Self {
        NoteName::from_index(self.index(), spelling)
    }
}

fn natural_offset(letter: char) -> Option<i16> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter)?;
        let mark = if self.accidental > 0 { '#' } else { 'b' };
        for _ in 0..self.accidental.unsigned_abs() {
            write!(f, "{mark}")?;
        }
        Ok(())
    }
}

impl FromStr for NoteName {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self> {
        NoteName::parse(s)
    }
}

impl TryFrom<String> for NoteName {
    type Error = MusicError;

    fn try_from(s: String) -> Result<Self> {
        NoteName::parse(&s)
    }
}

impl From<NoteName> for String {
    fn from(name: NoteName) -> String {
        name.to_string()
    }
}

/// Convert a spelled note name and octave to a MIDI pitch.
pub fn name_to_pitch(name: &str, octave: i8) -> Result<Pitch> {
    NoteName::parse(name)?.pitch(octave)
}

/// Convert a MIDI pitch back to a name and octave (`floor(pitch / 12) - 1`).
pub fn pitch_to_name(pitch: Pitch, spelling: Spelling) -> (NoteName, i8) {
    let octave = (pitch / 12) as i8 - 1;
    (NoteName::from_index(pitch % 12, spelling), octave)
}

/// Equal-tempered frequency in Hz, A4 (69) = 440 Hz.
pub fn pitch_to_frequency(pitch: Pitch) -> f64 {
    440.0 * 2f64.powf((f64::from(pitch) - 69.0) / 12.0)
}
