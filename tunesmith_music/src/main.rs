// Tunesmith arrangement generator: CLI entry point.
//
// Generates a four-part arrangement and writes it to MIDI.
// The pipeline: config + key selection -> progressions -> section composition
// -> song assembly -> MIDI output.
//
// Usage:
//   cargo run -p tunesmith_music -- [output.mid] [--key KEY] [--minor]
//     [--sections intro,verse,chorus,...] [--seed N] [--tempo BPM]
//     [--progression-length N] [--voicing NAME] [--config FILE] [--keys FILE]
//
// Without --key, a tonic is drawn from the key table. Without --seed, the
// seed comes from the clock and is logged so the run can be repeated.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunesmith_music::config::GeneratorConfig;
use tunesmith_music::keys::{KeyTable, default_key_table};
use tunesmith_music::midi::write_midi;
use tunesmith_music::roman::Key;
use tunesmith_music::theory::Voicing;
use tunesmith_music::{SectionSpec, generate_song};
use tunesmith_prng::SongRng;

/// Command-line arguments for the generator
#[derive(Parser, Debug)]
#[command(name = "generate")]
#[command(about = "Generate a chords/melody/bass/drums arrangement as a MIDI file")]
#[command(version)]
struct Args {
    /// Output MIDI file
    #[arg(default_value = "song.mid")]
    output: PathBuf,

    /// Tonic, e.g. C, F#, Bb (random from the key table if omitted)
    #[arg(short, long)]
    key: Option<String>,

    /// Use the minor mode
    #[arg(short, long)]
    minor: bool,

    /// Comma-separated section plan
    #[arg(short, long, default_value = "intro,verse,chorus,verse,chorus,outro")]
    sections: String,

    /// Random seed for a reproducible song
    #[arg(long)]
    seed: Option<u64>,

    /// Tempo in BPM (overrides the config file)
    #[arg(short, long)]
    tempo: Option<u16>,

    /// Chords per generated progression (overrides the config file)
    #[arg(short, long)]
    progression_length: Option<usize>,

    /// Chord voicing: close, open, drop2 or shell (overrides the config file)
    #[arg(long)]
    voicing: Option<String>,

    /// Generator config JSON; unspecified fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Key table JSON used for random key selection
    #[arg(long)]
    keys: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunesmith_music=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if let Some(tempo) = args.tempo {
        config.tempo_bpm = tempo;
    }
    if let Some(length) = args.progression_length {
        config.progression_length = length;
    }
    if let Some(name) = &args.voicing {
        config.voicing = Voicing::parse(name).context("Invalid --voicing")?;
    }

    let (seed, mut rng) = match args.seed {
        Some(seed) => (seed, SongRng::new(seed)),
        None => SongRng::from_entropy(),
    };
    info!(seed, "seeded generator");

    let key = match &args.key {
        Some(name) => Key::parse(name, args.minor).context("Invalid --key")?,
        None => {
            let table = match &args.keys {
                Some(path) => KeyTable::load(path)
                    .with_context(|| format!("Failed to load key table {}", path.display()))?,
                None => default_key_table(),
            };
            Key::new(table.random_key(&mut rng), args.minor)
        }
    };

    let plan = SectionSpec::parse_plan(&args.sections).context("Invalid --sections")?;
    let song = generate_song(&key, &plan, &config, &mut rng).context("Generation failed")?;

    println!("{}", song.summary());
    println!("Seed: {seed}");

    write_midi(&song, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Wrote {}", args.output.display());
    Ok(())
}
