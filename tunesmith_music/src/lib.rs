// Tunesmith arrangement generator
//
// A rule-based generator that turns a key and a section plan (intro, verse,
// chorus...) into a four-part arrangement: voiced chords, melody, bass and
// drums. Harmony comes from Roman-numeral progressions resolved in the key;
// the parts are generated bar by bar with controlled randomness and written
// out as a Standard MIDI File.
//
// Architecture:
// - pitch.rs: Note names, enharmonic spelling, MIDI pitch and frequency
// - theory.rs: Scale and chord formulas, voicings
// - roman.rs: Keys and Roman-numeral resolution to (root, chord type)
// - progression.rs: Random progressions and bulk chord building
// - event.rs: Timed note events, dynamics, instrument tracks
// - section.rs: Section kinds and their behaviour profiles
// - config.rs: Data-driven generator configuration (JSON)
// - bass.rs / drums.rs / melody.rs: Per-bar pattern generators
// - rhythm.rs: Swing grids, humanized timing, velocity curves
// - composer.rs: One section's four parts from its progression
// - song.rs: Section plans assembled into a song (top-level entry point)
// - keys.rs: Key table resource for random key selection
// - midi.rs: MIDI file output
// - error.rs: Error type shared by every fallible operation
//
// All randomness goes through `tunesmith_prng::RandomSource`, so a song is
// reproducible given a seed.

pub mod bass;
pub mod composer;
pub mod config;
pub mod drums;
pub mod error;
pub mod event;
pub mod keys;
pub mod melody;
pub mod midi;
pub mod pitch;
pub mod progression;
pub mod rhythm;
pub mod roman;
pub mod section;
pub mod song;
pub mod theory;

pub use error::{MusicError, Result};
pub use song::{SectionSpec, Song, generate_section, generate_song};
