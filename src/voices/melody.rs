//! Melody voice.
//!
//! Sawtooth lead with some sustain for held notes. Polyphonic, and doubles
//! as the fallback for any channel the routing table has no specific rule
//! for - unknown material degrades to a playable lead rather than silence.

use crate::dsp::{AdsrParams, Waveform};

use super::{Polyphony, VoiceConfig};

pub(super) fn config() -> VoiceConfig {
    VoiceConfig {
        waveform: Waveform::Saw,
        envelope: AdsrParams {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.6,
            release: 0.2,
        },
        gain: 0.5,
        pitched: true,
        polyphony: Polyphony::Poly,
    }
}
