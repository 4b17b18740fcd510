//! Standard MIDI file decoding.
//!
//! Converts a generated SMF artifact into the in-memory [`Score`]: delta
//! ticks become absolute seconds through the file's tempo map, note-on/off
//! pairs become [`Note`] events, and notes are grouped by channel into one
//! [`Track`] per channel. The artifact is trusted input - no music-theory
//! validation happens here, only structural decoding.

use std::collections::BTreeMap;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use crate::engine::{EngineError, Result};
use crate::score::{Note, Score, Track};

/// Floor for notes a malformed file leaves unterminated or zero-length.
/// Every note must produce a sound, so they are closed, not rejected.
const MIN_NOTE_SECS: f64 = 0.02;

/// Microseconds per quarter note before any tempo event (120 bpm).
const DEFAULT_US_PER_BEAT: u32 = 500_000;

/// Decode SMF bytes into a [`Score`].
///
/// Fails if the bytes are not a well-formed SMF or contain no notes at all.
pub fn parse_score(bytes: &[u8]) -> Result<Score> {
    let smf = Smf::parse(bytes)?;
    let clock = TickClock::from_smf(&smf);

    // (channel, key) -> open note-on stack, per SMF track
    let mut by_channel: BTreeMap<u8, Vec<Note>> = BTreeMap::new();

    for events in &smf.tracks {
        let mut pending: BTreeMap<(u8, u8), Vec<(u64, u8)>> = BTreeMap::new();
        let mut tick: u64 = 0;

        for event in events {
            tick += u64::from(event.delta.as_int());

            let TrackEventKind::Midi { channel, message } = event.kind else {
                continue;
            };
            let channel = channel.as_int();

            match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    pending
                        .entry((channel, key.as_int()))
                        .or_default()
                        .push((tick, vel.as_int()));
                }
                // Running-status convention: note-on with velocity 0 releases
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    let Some(open) = pending.get_mut(&(channel, key.as_int())) else {
                        continue;
                    };
                    if open.is_empty() {
                        continue;
                    }
                    let (start_tick, vel) = open.remove(0);
                    by_channel.entry(channel).or_default().push(make_note(
                        &clock,
                        key.as_int(),
                        vel,
                        start_tick,
                        tick,
                    ));
                }
                _ => {}
            }
        }

        // Close anything the track left hanging at its final tick.
        for ((channel, key), open) in pending {
            for (start_tick, vel) in open {
                tracing::warn!(channel, key, "note without note-off, closing at end of track");
                by_channel
                    .entry(channel)
                    .or_default()
                    .push(make_note(&clock, key, vel, start_tick, tick));
            }
        }
    }

    let tracks: Vec<Track> = by_channel
        .into_iter()
        .map(|(channel, mut notes)| {
            notes.sort_by(|a, b| a.start.total_cmp(&b.start));
            Track { channel, notes }
        })
        .collect();

    let score = Score::new(tracks);
    if score.is_empty() {
        return Err(EngineError::Parse("score contains no notes".into()));
    }

    tracing::debug!(
        notes = score.note_count(),
        duration_secs = score.total_duration(),
        "decoded score"
    );
    Ok(score)
}

fn make_note(clock: &TickClock, pitch: u8, vel: u8, start_tick: u64, end_tick: u64) -> Note {
    let start = clock.to_secs(start_tick);
    let duration = (clock.to_secs(end_tick) - start).max(MIN_NOTE_SECS);
    Note::new(pitch, f32::from(vel) / 127.0, start, duration)
}

/// Tick-to-seconds conversion honoring every tempo event in the file.
///
/// Segments hold (start tick, elapsed seconds at that tick, seconds per
/// tick from there on); lookup is a scan over what is almost always a
/// single entry.
struct TickClock {
    segments: Vec<(u64, f64, f64)>,
}

impl TickClock {
    fn from_smf(smf: &Smf) -> Self {
        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => f64::from(tpb.as_int()),
            Timing::Timecode(fps, subframe) => {
                // Fixed frame timing: one rate for the whole file
                let ticks_per_sec = f64::from(fps.as_f32()) * f64::from(subframe);
                return Self {
                    segments: vec![(0, 0.0, 1.0 / ticks_per_sec)],
                };
            }
        };

        // Merge tempo events from all tracks into absolute-tick order.
        let mut tempo_events: Vec<(u64, u32)> = Vec::new();
        for events in &smf.tracks {
            let mut tick: u64 = 0;
            for event in events {
                tick += u64::from(event.delta.as_int());
                if let TrackEventKind::Meta(MetaMessage::Tempo(us_per_beat)) = event.kind {
                    tempo_events.push((tick, us_per_beat.as_int()));
                }
            }
        }
        tempo_events.sort_by_key(|(tick, _)| *tick);

        let mut segments = Vec::with_capacity(tempo_events.len() + 1);
        let mut secs_per_tick = f64::from(DEFAULT_US_PER_BEAT) / 1e6 / ticks_per_beat;
        let mut elapsed = 0.0;
        let mut last_tick = 0u64;
        segments.push((0, 0.0, secs_per_tick));

        for (tick, us_per_beat) in tempo_events {
            elapsed += (tick - last_tick) as f64 * secs_per_tick;
            secs_per_tick = f64::from(us_per_beat) / 1e6 / ticks_per_beat;
            last_tick = tick;
            segments.push((tick, elapsed, secs_per_tick));
        }

        Self { segments }
    }

    fn to_secs(&self, tick: u64) -> f64 {
        let (seg_tick, seg_secs, secs_per_tick) = self
            .segments
            .iter()
            .rev()
            .find(|(t, _, _)| *t <= tick)
            .copied()
            .unwrap_or((0, 0.0, 0.0));
        seg_secs + (tick - seg_tick) as f64 * secs_per_tick
    }
}
