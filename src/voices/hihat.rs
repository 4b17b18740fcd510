//! Hi-hat voice.
//!
//! A tight burst of noise with a very short envelope - the "tss" that
//! carries the groove. Unpitched: triggers take duration only. Gates
//! shorter than the engine's minimum-sustain floor are clamped upstream
//! by the routing table so the burst never collapses into a click.

use crate::dsp::{AdsrParams, Waveform};

use super::{Polyphony, VoiceConfig};

pub(super) fn config() -> VoiceConfig {
    VoiceConfig {
        waveform: Waveform::Noise,
        envelope: AdsrParams {
            attack: 0.001,
            decay: 0.05,
            sustain: 0.0,
            release: 0.03,
        },
        gain: 0.35,
        pitched: false,
        polyphony: Polyphony::Mono,
    }
}
