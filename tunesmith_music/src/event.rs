// Timed note events and the tracks that hold them.
//
// Time is measured in beats (quarter notes) as `f64`. Every duration the
// generators use (0.25, 0.5, 1, 1.5, 4) is exactly representable, so bar
// arithmetic is exact and a bar's events sum to precisely 4.0 beats.
//
// A `NoteEvent` carries a set of MIDI keys that start and stop together:
// one key for a melody or bass note, several for a chord, and one or more
// General MIDI percussion keys for a drum hit. Rests are not events; they
// are gaps between one event's end and the next event's start.

use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};

/// Musical time in quarter-note beats.
pub type Beats = f64;

/// Every bar is 4/4.
pub const BAR_BEATS: Beats = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI keys sounding together (pitches, or drum ids on the drum track).
    pub keys: Vec<Pitch>,
    /// Offset from the start of the bar, section or song, depending on who
    /// holds the event.
    pub start: Beats,
    /// Always > 0.
    pub duration: Beats,
    /// 0..=127.
    pub velocity: u8,
}

impl NoteEvent {
    pub fn note(key: Pitch, start: Beats, duration: Beats, velocity: u8) -> Self {
        NoteEvent::chord(vec![key], start, duration, velocity)
    }

    pub fn chord(keys: Vec<Pitch>, start: Beats, duration: Beats, velocity: u8) -> Self {
        debug_assert!(duration > 0.0, "event duration must be positive");
        NoteEvent {
            keys,
            start,
            duration,
            velocity: velocity.min(127),
        }
    }

    pub fn end(&self) -> Beats {
        self.start + self.duration
    }

    /// The same event moved later by `offset` beats.
    pub fn shifted(mut self, offset: Beats) -> Self {
        self.start += offset;
        self
    }
}

/// Multiply a velocity, truncating toward zero and clamping to 0..=127.
pub fn scale_velocity(velocity: u8, factor: f64) -> u8 {
    (f64::from(velocity) * factor).clamp(0.0, 127.0) as u8
}

/// Apply a dynamics multiplier to every event in place.
pub fn apply_dynamics(events: &mut [NoteEvent], factor: f64) {
    for event in events {
        event.velocity = scale_velocity(event.velocity, factor);
    }
}

/// Total sounding length of a run of events (ignores gaps).
pub fn total_duration(events: &[NoteEvent]) -> Beats {
    events.iter().map(|e| e.duration).sum()
}

/// The four instrument roles of an arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackRole {
    Chords,
    Melody,
    Bass,
    Drums,
}

impl TrackRole {
    pub const ALL: [TrackRole; 4] = [
        TrackRole::Chords,
        TrackRole::Melody,
        TrackRole::Bass,
        TrackRole::Drums,
    ];

    /// Instrument label handed to the renderer.
    pub fn instrument(self) -> &'static str {
        match self {
            TrackRole::Chords => "Piano",
            TrackRole::Melody => "Acoustic Guitar",
            TrackRole::Bass => "Electric Bass",
            TrackRole::Drums => "Drums",
        }
    }

    /// General MIDI program, or `None` for the percussion channel.
    pub fn program(self) -> Option<u8> {
        match self {
            TrackRole::Chords => Some(0),
            TrackRole::Melody => Some(24),
            TrackRole::Bass => Some(33),
            TrackRole::Drums => None,
        }
    }

    /// Zero-based MIDI channel; drums sit on channel 10.
    pub fn channel(self) -> u8 {
        match self {
            TrackRole::Chords => 0,
            TrackRole::Melody => 1,
            TrackRole::Bass => 2,
            TrackRole::Drums => 9,
        }
    }
}

/// One instrument's events across the whole song, in start order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub role: TrackRole,
    pub instrument: String,
    pub events: Vec<NoteEvent>,
}

impl Track {
    pub fn new(role: TrackRole) -> Self {
        Track {
            role,
            instrument: role.instrument().to_string(),
            events: Vec::new(),
        }
    }

    /// Append section-relative events, moving them to `offset`.
    pub fn append_at(&mut self, events: Vec<NoteEvent>, offset: Beats) {
        self.events
            .extend(events.into_iter().map(|e| e.shifted(offset)));
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// End of the last event, or 0 for an empty track.
    pub fn end(&self) -> Beats {
        self.events.iter().map(NoteEvent::end).fold(0.0, f64::max)
    }
}
