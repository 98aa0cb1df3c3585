// Song assembly: the top-level generation entry point.
//
// A song is a key plus a section plan. Each section gets a progression
// (explicit, or generated once per section kind so a repeated chorus repeats
// its chords), is composed into four parts, and is appended to the four
// song-wide tracks at the running beat offset. Generation is all-or-nothing:
// the first resolution error aborts the song.

use crate::composer::{SectionTracks, compose_section};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::event::{BAR_BEATS, Beats, Track, TrackRole};
use crate::progression::random_progression;
use crate::roman::{Key, RomanSymbol};
use crate::section::SectionKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use tunesmith_prng::RandomSource;

/// One entry of a section plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub kind: SectionKind,
    /// Explicit chords; `None` uses the progression shared by this kind.
    pub progression: Option<Vec<RomanSymbol>>,
}

impl SectionSpec {
    pub fn new(kind: SectionKind) -> Self {
        SectionSpec {
            kind,
            progression: None,
        }
    }

    pub fn with_progression(kind: SectionKind, progression: Vec<RomanSymbol>) -> Self {
        SectionSpec {
            kind,
            progression: Some(progression),
        }
    }

    /// Parse a comma-separated plan such as `"intro,verse,chorus"`.
    pub fn parse_plan(plan: &str) -> Result<Vec<SectionSpec>> {
        plan.split(',')
            .filter(|name| !name.trim().is_empty())
            .map(|name| Ok(SectionSpec::new(name.parse()?)))
            .collect()
    }
}

/// Where a section landed in the song and which chords it used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub kind: SectionKind,
    pub progression: Vec<RomanSymbol>,
    pub start: Beats,
    pub bars: usize,
}

/// A generated arrangement: four parallel tracks with absolute offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub key: Key,
    pub tempo_bpm: u16,
    pub sections: Vec<SectionSummary>,
    pub chords: Track,
    pub melody: Track,
    pub bass: Track,
    pub drums: Track,
}

impl Song {
    fn empty(key: Key, tempo_bpm: u16) -> Self {
        Song {
            key,
            tempo_bpm,
            sections: Vec::new(),
            chords: Track::new(TrackRole::Chords),
            melody: Track::new(TrackRole::Melody),
            bass: Track::new(TrackRole::Bass),
            drums: Track::new(TrackRole::Drums),
        }
    }

    /// Tracks in `TrackRole::ALL` order.
    pub fn tracks(&self) -> [&Track; 4] {
        [&self.chords, &self.melody, &self.bass, &self.drums]
    }

    pub fn total_beats(&self) -> Beats {
        self.sections
            .last()
            .map_or(0.0, |s| s.start + s.bars as Beats * BAR_BEATS)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.total_beats() * 60.0 / f64::from(self.tempo_bpm)
    }

    /// Human-readable overview: one line per section, then track sizes.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Key: {}  Tempo: {} BPM", self.key, self.tempo_bpm);
        for section in &self.sections {
            let chords: Vec<&str> = section.progression.iter().map(RomanSymbol::as_str).collect();
            let _ = writeln!(
                out,
                "{:>7} @ beat {:>4}: {}",
                section.kind.name(),
                section.start,
                chords.join(" - ")
            );
        }
        for track in self.tracks() {
            let _ = writeln!(out, "{:>16}: {} events", track.instrument, track.len());
        }
        let _ = write!(
            out,
            "Length: {} beats ({:.0}s)",
            self.total_beats(),
            self.duration_seconds()
        );
        out
    }

    fn append(&mut self, progression: Vec<RomanSymbol>, section: SectionTracks) {
        let start = self.total_beats();
        self.chords.append_at(section.chords, start);
        self.melody.append_at(section.melody, start);
        self.bass.append_at(section.bass, start);
        self.drums.append_at(section.drums, start);
        self.sections.push(SectionSummary {
            kind: section.kind,
            progression,
            start,
            bars: section.bars,
        });
    }
}

/// A random progression of the configured length and seventh probability.
pub fn generate_progression(
    key: &Key,
    config: &GeneratorConfig,
    rng: &mut impl RandomSource,
) -> Vec<RomanSymbol> {
    random_progression(config.progression_length, key, config.seventh_probability, rng)
}

/// Compose a single section over a freshly generated progression.
pub fn generate_section(
    kind: SectionKind,
    key: &Key,
    config: &GeneratorConfig,
    rng: &mut impl RandomSource,
) -> Result<SectionTracks> {
    config.validate()?;
    let progression = generate_progression(key, config, rng);
    compose_section(kind, &progression, key, config, rng)
}

/// Generate a whole song from a key and a section plan.
pub fn generate_song(
    key: &Key,
    plan: &[SectionSpec],
    config: &GeneratorConfig,
    rng: &mut impl RandomSource,
) -> Result<Song> {
    config.validate()?;

    let mut shared: BTreeMap<SectionKind, Vec<RomanSymbol>> = BTreeMap::new();
    let mut song = Song::empty(*key, config.tempo_bpm);

    for entry in plan {
        let progression = match &entry.progression {
            Some(explicit) => explicit.clone(),
            None => shared
                .entry(entry.kind)
                .or_insert_with(|| generate_progression(key, config, rng))
                .clone(),
        };
        let section = compose_section(entry.kind, &progression, key, config, rng)?;
        song.append(progression, section);
    }

    tracing::info!(
        key = %song.key,
        sections = song.sections.len(),
        beats = song.total_beats(),
        "assembled song"
    );
    Ok(song)
}
