//! Bass voice.
//!
//! Square wave for the hollow, woody low end. Monophonic with retrigger
//! cut - a new bass note takes over the line, matching how the generated
//! basslines are written (one note at a time).

use crate::dsp::{AdsrParams, Waveform};

use super::{Polyphony, VoiceConfig};

pub(super) fn config() -> VoiceConfig {
    VoiceConfig {
        waveform: Waveform::Square,
        envelope: AdsrParams {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.15,
        },
        gain: 0.8,
        pitched: true,
        polyphony: Polyphony::Mono,
    }
}
