//! Scheduler and transport: score time to audio-clock time, looping.
//!
//! At configure time every note is resolved through the routing table into
//! one [`TriggerRegistration`], sorted by loop-local time. The audio
//! callback drives [`Scheduler::process_block`], which advances a
//! sample-accurate loop position, fires each registration exactly once per
//! loop pass, and rewinds its cursor at the seam. Cancellation is "clear
//! the collection": after [`Scheduler::dispose_all`] nothing can fire.

use crate::engine::routing;
use crate::score::{pitch, Score};
use crate::voices::{VoiceKind, VoicePool};

/// One pending, repeating trigger: where in the loop, which voice, and the
/// payload it fires with. Lifetime is bounded by the session.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRegistration {
    /// Seconds from loop start, in `[0, loop_end)`.
    pub loop_local_time: f64,
    pub kind: VoiceKind,
    /// Spelled pitch for pitched voices, `None` for noise voices.
    pub pitch_name: Option<String>,
    /// Effective sounding length (after routing clamps).
    pub duration: f64,
    pub velocity: f32,
}

/// Transport snapshot. Mutated only by the scheduler's own operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportState {
    /// Always true in this engine; playback repeats until stopped.
    pub looping: bool,
    pub loop_start: f64,
    pub loop_end: f64,
    pub is_playing: bool,
    pub tempo_bpm: u16,
}

impl TransportState {
    fn unconfigured() -> Self {
        Self {
            looping: true,
            loop_start: 0.0,
            loop_end: 0.0,
            is_playing: false,
            tempo_bpm: 0,
        }
    }
}

/// `Unconfigured -> Configured(stopped) -> Playing <-> Configured(stopped)
/// -> Disposed`. Dispose is reachable from anywhere and terminal until the
/// next configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unconfigured,
    Stopped,
    Playing,
    Disposed,
}

pub struct Scheduler {
    phase: Phase,
    transport: TransportState,
    registrations: Vec<TriggerRegistration>,
    /// Fire times in samples, parallel to `registrations`.
    fire_samples: Vec<u64>,
    loop_samples: u64,
    /// Next registration index within the current loop pass.
    cursor: usize,
    /// Loop-local playhead in samples.
    position: u64,
    sample_rate: f32,
}

impl Scheduler {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: Phase::Unconfigured,
            transport: TransportState::unconfigured(),
            registrations: Vec::new(),
            fire_samples: Vec::new(),
            loop_samples: 0,
            cursor: 0,
            position: 0,
            sample_rate,
        }
    }

    /// Install one registration per note, replacing any prior configuration
    /// wholesale. A previously installed set can never fire again after
    /// this returns, whatever state the transport was in.
    pub fn configure(&mut self, score: &Score, tempo_bpm: u16) {
        if self.phase == Phase::Playing {
            tracing::debug!("reconfigure while playing, retiring previous registrations");
        }

        self.registrations.clear();
        for track in score.tracks() {
            for note in &track.notes {
                let route = routing::resolve(track.channel, note.pitch, note.duration);
                // Names are derived from the pitch at parse time, so
                // resolution cannot fail for well-formed scores; if it
                // somehow does, degrade to the melody voice at the raw
                // pitch instead of dropping the note.
                let (kind, pitch_name) = if route.pitched {
                    match pitch::name_to_pitch(&note.name) {
                        Some(_) => (route.kind, Some(note.name.clone())),
                        None => {
                            tracing::warn!(
                                channel = track.channel,
                                pitch = note.pitch,
                                name = %note.name,
                                "unresolvable pitch name, defaulting to melody voice"
                            );
                            (VoiceKind::Melody, Some(pitch::pitch_name(note.pitch)))
                        }
                    }
                } else {
                    (route.kind, None)
                };

                self.registrations.push(TriggerRegistration {
                    loop_local_time: note.start,
                    kind,
                    pitch_name,
                    duration: route.duration,
                    velocity: note.velocity,
                });
            }
        }
        self.registrations
            .sort_by(|a, b| a.loop_local_time.total_cmp(&b.loop_local_time));

        let sample_rate = f64::from(self.sample_rate);
        let loop_samples = ((score.total_duration() * sample_rate).round() as u64).max(1);
        self.loop_samples = loop_samples;
        self.fire_samples = self
            .registrations
            .iter()
            .map(|r| {
                let s = (r.loop_local_time * sample_rate).round() as u64;
                // Registrations live in [0, loop_end); keep the seam clean
                // even against rounding.
                s.min(loop_samples - 1)
            })
            .collect();

        self.transport = TransportState {
            looping: true,
            loop_start: 0.0,
            loop_end: score.total_duration(),
            is_playing: false,
            tempo_bpm,
        };
        self.cursor = 0;
        self.position = 0;
        self.phase = Phase::Stopped;

        tracing::debug!(
            registrations = self.registrations.len(),
            loop_end_secs = self.transport.loop_end,
            tempo_bpm,
            "transport configured"
        );
    }

    /// Begin dispatch. No-op unless the transport is configured and stopped.
    pub fn start(&mut self) {
        if self.phase == Phase::Stopped {
            self.phase = Phase::Playing;
            self.transport.is_playing = true;
            tracing::debug!("transport started");
        }
    }

    /// Halt dispatch and rewind to loop start. Sounding envelopes are left
    /// to their natural release - stop never hard-mutes. No-op unless
    /// playing.
    pub fn stop(&mut self) {
        if self.phase == Phase::Playing {
            self.phase = Phase::Stopped;
            self.transport.is_playing = false;
            self.position = 0;
            self.cursor = 0;
            tracing::debug!("transport stopped");
        }
    }

    /// Cancel every registration, then dispose every voice in the pool.
    /// Reachable from any state, idempotent, terminal until the next
    /// [`Scheduler::configure`].
    pub fn dispose_all(&mut self, pool: &mut VoicePool) {
        self.registrations.clear();
        self.fire_samples.clear();
        self.loop_samples = 0;
        self.cursor = 0;
        self.position = 0;
        self.transport = TransportState::unconfigured();
        self.phase = Phase::Disposed;
        pool.dispose_all();
        tracing::debug!("transport disposed");
    }

    /// Advance `frames` samples of the loop, firing due registrations
    /// against the pool. Called from the audio callback before rendering.
    pub fn process_block(&mut self, frames: usize, pool: &mut VoicePool) {
        if self.phase != Phase::Playing || self.loop_samples == 0 {
            return;
        }

        for _ in 0..frames {
            while self.cursor < self.fire_samples.len()
                && self.fire_samples[self.cursor] <= self.position
            {
                let reg = &self.registrations[self.cursor];
                pool.trigger(reg.kind, reg.pitch_name.as_deref(), reg.duration, reg.velocity);
                self.cursor += 1;
            }

            self.position += 1;
            if self.position >= self.loop_samples {
                // Loop seam: rewind position and the registration cursor so
                // every registration fires exactly once per pass.
                self.position = 0;
                self.cursor = 0;
            }
        }
    }

    pub fn registrations(&self) -> &[TriggerRegistration] {
        &self.registrations
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.phase, Phase::Stopped | Phase::Playing)
    }

    /// Loop-local playhead in seconds.
    pub fn position_secs(&self) -> f64 {
        self.position as f64 / f64::from(self.sample_rate)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}
