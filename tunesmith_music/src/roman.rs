// Roman-numeral chord symbols and their resolution in a key.
//
// A symbol like `V7`, `ii`, `IVmaj7` or `vim7` is a scale-degree token made
// of the letters I/V (case gives the default triad quality) plus an optional
// quality suffix. Resolution is a pure function of (symbol, key, mode):
//
// 1. Strip the symbol down to its run of I, V, i, v letters (the degree token).
// 2. Look the token up in the 7-entry table for the key's mode, which gives
//    the semitone offset from the tonic and a default chord type.
// 3. Override the chord type from the suffix, first match wins:
//    `maj7`, then `min7`/`m7`, then `7`, then `maj`, then `dim`, then `min`/`m`.
//
// The root is spelled with sharps regardless of the key signature.

use crate::error::{MusicError, Result};
use crate::pitch::{NoteName, Spelling};
use crate::theory::ChordType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tonic plus major/minor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub tonic: NoteName,
    pub minor: bool,
}

impl Key {
    pub fn new(tonic: NoteName, minor: bool) -> Self {
        Key { tonic, minor }
    }

    /// Parse the tonic name; fails with `InvalidNoteName`.
    pub fn parse(tonic: &str, minor: bool) -> Result<Self> {
        Ok(Key::new(NoteName::parse(tonic)?, minor))
    }

    pub fn mode_name(&self) -> &'static str {
        if self.minor { "minor" } else { "major" }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode_name())
    }
}

/// A Roman-numeral chord symbol as written, e.g. `V7` or `vim7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RomanSymbol(String);

impl RomanSymbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        RomanSymbol(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The degree token: the first run of I/V/i/v characters. Anything
    /// before it (an accidental prefix) and after it (the suffix) is dropped,
    /// so the `i` in a `min` or `dim` suffix never leaks into the degree.
    pub fn base_degree(&self) -> String {
        self.0
            .chars()
            .skip_while(|&c| !is_degree_letter(c))
            .take_while(|&c| is_degree_letter(c))
            .collect()
    }

    /// Resolve to a chord root and chord type in `key`.
    pub fn resolve(&self, key: &Key) -> Result<(NoteName, ChordType)> {
        resolve_roman_numeral(&self.0, key)
    }
}

impl fmt::Display for RomanSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RomanSymbol {
    fn from(s: &str) -> Self {
        RomanSymbol::new(s)
    }
}

fn is_degree_letter(c: char) -> bool {
    matches!(c, 'I' | 'V' | 'i' | 'v')
}

/// One row of a mode's degree table.
struct Degree {
    token: &'static str,
    semitones: u8,
    quality: ChordType,
}

const MAJOR_DEGREES: [Degree; 7] = [
    Degree { token: "I", semitones: 0, quality: ChordType::Major7 },
    Degree { token: "ii", semitones: 2, quality: ChordType::Minor7 },
    Degree { token: "iii", semitones: 4, quality: ChordType::Minor7 },
    Degree { token: "IV", semitones: 5, quality: ChordType::Major7 },
    Degree { token: "V", semitones: 7, quality: ChordType::Dominant7 },
    Degree { token: "vi", semitones: 9, quality: ChordType::Minor7 },
    Degree { token: "vii", semitones: 11, quality: ChordType::Diminished },
];

const MINOR_DEGREES: [Degree; 7] = [
    Degree { token: "i", semitones: 0, quality: ChordType::Minor7 },
    Degree { token: "ii", semitones: 2, quality: ChordType::Diminished },
    Degree { token: "III", semitones: 3, quality: ChordType::Major7 },
    Degree { token: "iv", semitones: 5, quality: ChordType::Minor7 },
    Degree { token: "v", semitones: 7, quality: ChordType::Minor7 },
    Degree { token: "VI", semitones: 8, quality: ChordType::Major7 },
    Degree { token: "VII", semitones: 10, quality: ChordType::Major7 },
];

/// Explicit quality carried by the suffix, if any.
fn suffix_quality(symbol: &str) -> Option<ChordType> {
    let lower = symbol.to_ascii_lowercase();
    if lower.contains("maj7") {
        Some(ChordType::Major7)
    } else if lower.contains("min7") || lower.contains("m7") {
        Some(ChordType::Minor7)
    } else if lower.contains('7') {
        Some(ChordType::Dominant7)
    } else if lower.contains("maj") {
        Some(ChordType::Major)
    } else if lower.contains("dim") {
        Some(ChordType::Diminished)
    } else if lower.contains("min") || lower.contains('m') {
        Some(ChordType::Minor)
    } else {
        None
    }
}

/// Resolve a Roman-numeral symbol to (root, chord type) in a key.
///
/// Fails with `UnknownDegree` when the stripped token is not one of the seven
/// degrees of the key's mode (e.g. `III` in a major key).
pub fn resolve_roman_numeral(symbol: &str, key: &Key) -> Result<(NoteName, ChordType)> {
    let token: String = RomanSymbol::new(symbol).base_degree();
    let table = if key.minor { &MINOR_DEGREES } else { &MAJOR_DEGREES };
    let degree = table
        .iter()
        .find(|d| d.token == token)
        .ok_or_else(|| MusicError::UnknownDegree {
            symbol: symbol.to_string(),
            mode: key.mode_name(),
        })?;

    let chord_type = suffix_quality(symbol).unwrap_or(degree.quality);
    let root = NoteName::from_index(key.tonic.index() + degree.semitones, Spelling::Sharps);
    Ok((root, chord_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(symbol: &str, tonic: &str, minor: bool) -> (String, ChordType) {
        let key = Key::parse(tonic, minor).unwrap();
        let (root, chord_type) = resolve_roman_numeral(symbol, &key).unwrap();
        (root.to_string(), chord_type)
    }

    #[test]
    fn default_qualities_in_major() {
        assert_eq!(resolve("I", "C", false), ("C".into(), ChordType::Major7));
        assert_eq!(resolve("ii", "C", false), ("D".into(), ChordType::Minor7));
        assert_eq!(resolve("V", "C", false), ("G".into(), ChordType::Dominant7));
        assert_eq!(resolve("vii", "C", false), ("B".into(), ChordType::Diminished));
    }

    #[test]
    fn default_qualities_in_minor() {
        assert_eq!(resolve("i", "A", true), ("A".into(), ChordType::Minor7));
        assert_eq!(resolve("III", "A", true), ("C".into(), ChordType::Major7));
        assert_eq!(resolve("VI", "A", true), ("F".into(), ChordType::Major7));
        assert_eq!(resolve("VII", "A", true), ("G".into(), ChordType::Major7));
    }

    #[test]
    fn suffix_overrides_in_priority_order() {
        assert_eq!(resolve("V7", "C", false), ("G".into(), ChordType::Dominant7));
        assert_eq!(resolve("IVmaj7", "C", false).1, ChordType::Major7);
        assert_eq!(resolve("Vm7", "C", false).1, ChordType::Minor7);
        assert_eq!(resolve("vimin7", "C", false), ("A".into(), ChordType::Minor7));
        assert_eq!(resolve("Imaj", "C", false).1, ChordType::Major);
        assert_eq!(resolve("vim", "C", false).1, ChordType::Minor);
        assert_eq!(resolve("iimin", "C", false), ("D".into(), ChordType::Minor));
        assert_eq!(resolve("viidim", "C", false).1, ChordType::Diminished);
    }

    #[test]
    fn roots_wrap_and_use_sharps() {
        assert_eq!(resolve("V", "F#", false).0, "C#");
        assert_eq!(resolve("IV", "Bb", false).0, "D#");
        assert_eq!(resolve("VII", "E", true).0, "D");
        assert_eq!(resolve("VI", "Cb", true).0, "G");
    }

    #[test]
    fn degree_missing_from_mode_is_an_error() {
        let key = Key::parse("C", false).unwrap();
        match resolve_roman_numeral("III", &key) {
            Err(MusicError::UnknownDegree { symbol, mode }) => {
                assert_eq!(symbol, "III");
                assert_eq!(mode, "major");
            }
            other => panic!("expected UnknownDegree, got {other:?}"),
        }
        assert!(resolve_roman_numeral("X7", &key).is_err());
        assert!(resolve_roman_numeral("", &key).is_err());
        let minor = Key::parse("A", true).unwrap();
        assert!(resolve_roman_numeral("I", &minor).is_err());
    }

    #[test]
    fn resolution_is_pure() {
        let key = Key::parse("D", false).unwrap();
        let first = resolve_roman_numeral("vim7", &key).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve_roman_numeral("vim7", &key).unwrap(), first);
        }
    }

    #[test]
    fn base_degree_strips_suffixes() {
        assert_eq!(RomanSymbol::new("Imaj7").base_degree(), "I");
        assert_eq!(RomanSymbol::new("VIIm7").base_degree(), "VII");
        assert_eq!(RomanSymbol::new("iv").base_degree(), "iv");
        assert_eq!(RomanSymbol::new("vimin7").base_degree(), "vi");
        assert_eq!(RomanSymbol::new("viidim").base_degree(), "vii");
        assert_eq!(RomanSymbol::new("bVII").base_degree(), "VII");
        assert_eq!(RomanSymbol::from("V7").to_string(), "V7");
    }
}
