//! The fixed six-voice pool.
//!
//! Every sound this engine makes comes from one of six instruments: kick,
//! hi-hat, bass, melody, snare, chord. The set is closed - a tagged
//! [`VoiceKind`] with a static per-kind [`VoiceConfig`] - so routing stays a
//! table lookup and disposal is a walk over an array.
//!
//! Trigger contract: attack starts immediately, release is scheduled by the
//! voice itself after `duration` seconds (a sample countdown, no external
//! note-off). Monophonic kinds cut their previous note on retrigger;
//! polyphonic kinds let overlapping notes coexist.

mod bass;
mod chord;
mod hihat;
mod kick;
mod melody;
mod snare;

use crate::dsp::{AdsrParams, Envelope, Oscillator, Waveform};
use crate::score::pitch;

/// The closed set of instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceKind {
    Kick,
    HiHat,
    Bass,
    Melody,
    Snare,
    Chord,
}

impl VoiceKind {
    pub const ALL: [VoiceKind; 6] = [
        VoiceKind::Kick,
        VoiceKind::HiHat,
        VoiceKind::Bass,
        VoiceKind::Melody,
        VoiceKind::Snare,
        VoiceKind::Chord,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VoiceKind::Kick => "kick",
            VoiceKind::HiHat => "hihat",
            VoiceKind::Bass => "bass",
            VoiceKind::Melody => "melody",
            VoiceKind::Snare => "snare",
            VoiceKind::Chord => "chord",
        }
    }

    fn index(&self) -> usize {
        match self {
            VoiceKind::Kick => 0,
            VoiceKind::HiHat => 1,
            VoiceKind::Bass => 2,
            VoiceKind::Melody => 3,
            VoiceKind::Snare => 4,
            VoiceKind::Chord => 5,
        }
    }
}

impl std::fmt::Display for VoiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a kind handles overlapping triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polyphony {
    /// A new trigger cuts any still-sounding note (drums, bass).
    Mono,
    /// Overlapping notes coexist (melody, chord layers).
    Poly,
}

/// Static synthesis parameters for one kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceConfig {
    pub waveform: Waveform,
    pub envelope: AdsrParams,
    pub gain: f32,
    /// Pitched kinds need a spelled pitch name per trigger; unpitched kinds
    /// (noise-based) take duration only.
    pub pitched: bool,
    pub polyphony: Polyphony,
}

impl VoiceConfig {
    pub fn for_kind(kind: VoiceKind) -> Self {
        match kind {
            VoiceKind::Kick => kick::config(),
            VoiceKind::HiHat => hihat::config(),
            VoiceKind::Bass => bass::config(),
            VoiceKind::Melody => melody::config(),
            VoiceKind::Snare => snare::config(),
            VoiceKind::Chord => chord::config(),
        }
    }
}

/// What the last trigger asked for. Feeds the activity display and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerInfo {
    pub pitch_name: Option<String>,
    pub duration: f64,
    pub velocity: f32,
}

/// One sounding note inside a voice.
struct PlayingNote {
    osc: Oscillator,
    env: Envelope,
    freq: f32,
    velocity: f32,
    /// Samples until the gate closes and the envelope releases.
    gate_remaining: u64,
}

/// One instrument: config plus its currently sounding notes.
pub struct Voice {
    kind: VoiceKind,
    config: VoiceConfig,
    notes: Vec<PlayingNote>,
    disposed: bool,
    last_trigger: Option<TriggerInfo>,
}

impl Voice {
    fn new(kind: VoiceKind) -> Self {
        Self {
            kind,
            config: VoiceConfig::for_kind(kind),
            notes: Vec::with_capacity(8),
            disposed: false,
            last_trigger: None,
        }
    }

    /// Start a note: attack now, release after `duration` seconds.
    ///
    /// No-op on a disposed voice. A pitched voice with no resolvable pitch
    /// name is an internal-invariant violation; it is logged and skipped
    /// rather than allowed to crash the audio thread.
    pub fn trigger(
        &mut self,
        pitch_name: Option<&str>,
        duration: f64,
        velocity: f32,
        sample_rate: f32,
    ) {
        if self.disposed {
            return;
        }

        let freq = if self.config.pitched {
            match pitch_name.and_then(pitch::name_to_freq) {
                Some(freq) => freq,
                None => {
                    tracing::warn!(voice = %self.kind, ?pitch_name, "unresolvable pitch, skipping trigger");
                    return;
                }
            }
        } else {
            0.0
        };

        if self.config.polyphony == Polyphony::Mono {
            self.notes.clear();
        } else {
            self.notes.retain(|n| n.env.is_active());
        }

        let mut env = Envelope::from_params(&self.config.envelope);
        env.note_on();
        self.notes.push(PlayingNote {
            osc: Oscillator::new(self.config.waveform),
            env,
            freq,
            velocity: velocity.clamp(0.0, 1.0),
            gate_remaining: ((duration * f64::from(sample_rate)) as u64).max(1),
        });

        self.last_trigger = Some(TriggerInfo {
            pitch_name: pitch_name.map(str::to_owned),
            duration,
            velocity,
        });
    }

    /// Mix this voice's output into `out`.
    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        if self.notes.is_empty() {
            return;
        }

        for sample in out.iter_mut() {
            let mut acc = 0.0;
            for note in &mut self.notes {
                if note.gate_remaining > 0 {
                    note.gate_remaining -= 1;
                    if note.gate_remaining == 0 {
                        note.env.note_off(sample_rate);
                    }
                }
                let level = note.env.next_sample(sample_rate);
                acc += note.osc.next_sample(note.freq, sample_rate) * level * note.velocity;
            }
            *sample += acc * self.config.gain;
        }

        self.notes.retain(|n| n.env.is_active());
    }

    /// Silence everything and mark the voice dead. Idempotent.
    pub fn dispose(&mut self) {
        self.notes.clear();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn kind(&self) -> VoiceKind {
        self.kind
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// Notes currently sounding (including release tails).
    pub fn active_notes(&self) -> usize {
        self.notes.len()
    }

    pub fn last_trigger(&self) -> Option<&TriggerInfo> {
        self.last_trigger.as_ref()
    }
}

/// Owns the six instruments for one session.
pub struct VoicePool {
    voices: [Voice; 6],
    sample_rate: f32,
}

impl VoicePool {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: VoiceKind::ALL.map(Voice::new),
            sample_rate,
        }
    }

    pub fn trigger(
        &mut self,
        kind: VoiceKind,
        pitch_name: Option<&str>,
        duration: f64,
        velocity: f32,
    ) {
        let sample_rate = self.sample_rate;
        self.voices[kind.index()].trigger(pitch_name, duration, velocity, sample_rate);
    }

    /// Render and mix all voices into `out` (overwrites the buffer).
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let sample_rate = self.sample_rate;
        for voice in &mut self.voices {
            voice.render(out, sample_rate);
        }
    }

    /// Dispose every voice. Idempotent, safe mid-note.
    pub fn dispose_all(&mut self) {
        for voice in &mut self.voices {
            voice.dispose();
        }
    }

    pub fn voice(&self, kind: VoiceKind) -> &Voice {
        &self.voices[kind.index()]
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn any_active(&self) -> bool {
        self.voices.iter().any(|v| v.active_notes() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    #[test]
    fn mono_voice_preempts_on_retrigger() {
        let mut pool = VoicePool::new(SAMPLE_RATE);
        pool.trigger(VoiceKind::Bass, Some("E2"), 0.5, 0.8);
        pool.trigger(VoiceKind::Bass, Some("G2"), 0.5, 0.8);
        assert_eq!(pool.voice(VoiceKind::Bass).active_notes(), 1);
    }

    #[test]
    fn poly_voice_stacks_simultaneous_notes() {
        let mut pool = VoicePool::new(SAMPLE_RATE);
        pool.trigger(VoiceKind::Chord, Some("C4"), 1.0, 0.7);
        pool.trigger(VoiceKind::Chord, Some("E4"), 1.0, 0.7);
        pool.trigger(VoiceKind::Chord, Some("G4"), 1.0, 0.7);
        assert_eq!(pool.voice(VoiceKind::Chord).active_notes(), 3);
    }

    #[test]
    fn unpitched_voice_triggers_without_a_name() {
        let mut pool = VoicePool::new(SAMPLE_RATE);
        pool.trigger(VoiceKind::Snare, None, 0.1, 1.0);
        assert_eq!(pool.voice(VoiceKind::Snare).active_notes(), 1);
    }

    #[test]
    fn pitched_voice_without_name_is_skipped() {
        let mut pool = VoicePool::new(SAMPLE_RATE);
        pool.trigger(VoiceKind::Melody, None, 0.1, 1.0);
        assert_eq!(pool.voice(VoiceKind::Melody).active_notes(), 0);
    }

    #[test]
    fn gate_expiry_moves_note_into_release_then_prunes() {
        let mut pool = VoicePool::new(SAMPLE_RATE);
        pool.trigger(VoiceKind::Bass, Some("E2"), 0.05, 1.0);

        let mut buf = vec![0.0; 64];
        // Render past gate (50 samples) plus the full release
        let release = pool.voice(VoiceKind::Bass).config().envelope.release;
        let total = 50 + (release * SAMPLE_RATE) as usize + 64;
        let mut rendered = 0;
        while rendered < total {
            pool.render(&mut buf);
            rendered += buf.len();
        }

        assert_eq!(pool.voice(VoiceKind::Bass).active_notes(), 0);
    }

    #[test]
    fn dispose_is_idempotent_and_silences() {
        let mut pool = VoicePool::new(SAMPLE_RATE);
        pool.trigger(VoiceKind::Kick, Some("C2"), 0.2, 1.0);
        pool.dispose_all();
        pool.dispose_all();

        assert!(pool.voice(VoiceKind::Kick).is_disposed());
        assert!(!pool.any_active());

        // Triggers after disposal are no-ops
        pool.trigger(VoiceKind::Kick, Some("C2"), 0.2, 1.0);
        assert_eq!(pool.voice(VoiceKind::Kick).active_notes(), 0);
    }

    #[test]
    fn render_produces_signal_for_a_triggered_note() {
        let mut pool = VoicePool::new(48_000.0);
        pool.trigger(VoiceKind::Melody, Some("A4"), 0.5, 1.0);

        let mut buf = vec![0.0; 256];
        pool.render(&mut buf);
        assert!(buf.iter().any(|s| s.abs() > 0.0));
        assert!(buf.iter().all(|s| s.abs() <= 1.0));
    }
}
