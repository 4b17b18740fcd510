//! Kick drum voice.
//!
//! A synthesized kick built on a pure sine: deep body, instant attack,
//! quick decay. The routed note pitch lands in the low octaves, so the
//! sine reads as the drum's fundamental rather than a melodic tone.
//!
//! # How It Works
//!
//! 1. Sine oscillator provides the body (pure, deep tone)
//! 2. Near-instant attack with a fast decay gives the punch
//! 3. Low sustain so held gates thump rather than drone
//!
//! Monophonic: overlapping kicks cut each other, the way one drum head
//! can only be struck again.

use crate::dsp::{AdsrParams, Waveform};

use super::{Polyphony, VoiceConfig};

pub(super) fn config() -> VoiceConfig {
    VoiceConfig {
        waveform: Waveform::Sine,
        envelope: AdsrParams {
            attack: 0.001,
            decay: 0.15,
            sustain: 0.05,
            release: 0.05,
        },
        gain: 0.9,
        pitched: true,
        polyphony: Polyphony::Mono,
    }
}
