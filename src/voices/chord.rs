//! Chord voice.
//!
//! A pad-like layer for stacked harmony notes: slow attack, high sustain,
//! long release, saw for width. Polyphonic by necessity - chords arrive as
//! simultaneous notes that must coexist without preempting each other.

use crate::dsp::{AdsrParams, Waveform};

use super::{Polyphony, VoiceConfig};

pub(super) fn config() -> VoiceConfig {
    VoiceConfig {
        waveform: Waveform::Saw,
        envelope: AdsrParams {
            attack: 0.3,
            decay: 0.1,
            sustain: 0.8,
            release: 0.5,
        },
        gain: 0.35,
        pitched: true,
        polyphony: Polyphony::Poly,
    }
}
