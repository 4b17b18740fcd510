//! Immutable, in-memory representation of a parsed score.
//!
//! A score is a set of channel-tagged tracks of note events with absolute
//! start times in seconds. It is built once per generation, handed to the
//! scheduler, and replaced wholesale on the next generation - never mutated
//! in place.

pub mod pitch;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One note event. Times are seconds relative to loop start.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// MIDI pitch, 0-127.
    pub pitch: u8,
    /// Derived sharp spelling ("E2"); informational for pitched voices.
    pub name: String,
    /// Normalized velocity in [0, 1].
    pub velocity: f32,
    /// Absolute start, seconds >= 0.
    pub start: f64,
    /// Sounding length, seconds > 0.
    pub duration: f64,
}

impl Note {
    /// Build a note, deriving its spelled name from the pitch.
    pub fn new(pitch: u8, velocity: f32, start: f64, duration: f64) -> Self {
        Self {
            pitch,
            name: pitch::pitch_name(pitch),
            velocity,
            start,
            duration,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// An ordered run of notes on one MIDI channel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub channel: u8,
    /// Conventionally ascending by start time; not required.
    pub notes: Vec<Note>,
}

/// A complete parsed score with its derived loop length.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    tracks: Vec<Track>,
    total_duration: f64,
}

impl Score {
    /// Assemble a score; the loop length is the latest note end across all
    /// tracks, so tail notes are never truncated.
    pub fn new(tracks: Vec<Track>) -> Self {
        let total_duration = tracks
            .iter()
            .flat_map(|t| t.notes.iter())
            .map(Note::end)
            .fold(0.0_f64, f64::max);

        Self {
            tracks,
            total_duration,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.note_count() == 0
    }
}
