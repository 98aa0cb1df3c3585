// MIDI output from generated songs.
//
// Converts a Song into a Standard MIDI File (SMF) for playback. Track 0
// carries the title, tempo and time signature; each instrument role then
// gets its own track with a name and (except drums) a program change.
// Beats map to ticks at 480 ticks per quarter note.
//
// Uses the `midly` crate for MIDI writing. Output is SMF Format 1 (multi-track).

use crate::error::Result;
use crate::event::{Beats, Track as SongTrack};
use crate::song::Song;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Convert a Song to MIDI and write it to a file.
pub fn write_midi(song: &Song, path: &Path) -> Result<()> {
    let title = song_title(song);
    let smf = song_to_smf(song, &title);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    std::fs::write(path, &buf)?;
    tracing::info!(path = %path.display(), bytes = buf.len(), "wrote MIDI file");
    Ok(())
}

pub fn song_title(song: &Song) -> String {
    format!("Tunesmith in {}", song.key)
}

pub fn beats_to_ticks(beats: Beats) -> u32 {
    (beats * f64::from(TICKS_PER_QUARTER)).round() as u32
}

/// Convert a Song to an in-memory SMF. Track names borrow from the song.
pub fn song_to_smf<'a>(song: &'a Song, title: &'a str) -> Smf<'a> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: title, tempo, 4/4
    // Tempos below 4 BPM do not fit the 24-bit field; config validation
    // rejects them, hand-built songs saturate.
    let tempo_microseconds = (60_000_000 / u32::from(song.tempo_bpm.max(1))).min(0xFF_FFFF);
    smf.tracks.push(vec![
        meta(MetaMessage::TrackName(title.as_bytes())),
        meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
        meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
        meta(MetaMessage::EndOfTrack),
    ]);

    for track in song.tracks() {
        smf.tracks.push(render_track(track));
    }
    smf
}

fn meta(message: MetaMessage<'_>) -> TrackEvent<'_> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    }
}

fn render_track(track: &SongTrack) -> Track<'_> {
    let channel = u4::new(track.role.channel());
    let mut out: Track<'_> = vec![meta(MetaMessage::TrackName(track.instrument.as_bytes()))];

    if let Some(program) = track.role.program() {
        out.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(program),
                },
            },
        });
    }

    // (tick, is_note_on, message). Sorting puts note-offs before note-ons on
    // the same tick, so a repeated key is released before it is struck again.
    let mut timeline: Vec<(u32, bool, MidiMessage)> = Vec::new();
    for event in &track.events {
        let on = beats_to_ticks(event.start);
        let off = beats_to_ticks(event.end()).max(on + 1);
        for &key in &event.keys {
            timeline.push((
                on,
                true,
                MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(event.velocity),
                },
            ));
            timeline.push((
                off,
                false,
                MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                },
            ));
        }
    }
    timeline.sort_by_key(|&(tick, is_on, _)| (tick, is_on));

    let mut last_tick = 0;
    for (tick, _, message) in timeline {
        out.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = tick;
    }

    out.push(meta(MetaMessage::EndOfTrack));
    out
}
