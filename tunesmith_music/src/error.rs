// Error taxonomy for the arranger.
//
// Only theory resolution and resource loading can fail. Randomized
// generation draws from bounded, non-empty choice sets and never errors on
// its own. A failure anywhere aborts the whole song: `generate_song` returns
// either a complete `Song` or the first error, never a partial arrangement.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MusicError {
    /// Note spelling that does not normalize to any pitch class.
    #[error("invalid note name: {0:?}")]
    InvalidNoteName(String),

    /// Valid note name, but the octave puts it outside MIDI 0..=127.
    #[error("note {name}{octave} is outside the MIDI pitch range")]
    PitchOutOfRange { name: String, octave: i8 },

    /// Roman numeral whose stripped degree token is not in the mode's table.
    #[error("unknown Roman numeral {symbol:?} in {mode}")]
    UnknownDegree { symbol: String, mode: &'static str },

    #[error("unknown chord type: {0:?}")]
    InvalidChordType(String),

    #[error("unknown scale type: {0:?}")]
    InvalidScaleType(String),

    #[error("unknown voicing: {0:?}")]
    InvalidVoicing(String),

    #[error("unknown section type: {0:?}")]
    UnknownSection(String),

    /// Key table resource that is empty or contains an unparseable name.
    #[error("invalid key table: {0}")]
    InvalidKeyTable(String),

    /// Configuration that parsed but cannot drive generation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MusicError>;
