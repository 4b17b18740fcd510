//! Snare voice.
//!
//! Noise with a snappy envelope standing in for the wire rattle. This is
//! also the percussion catch-all: every drum-channel pitch that is not a
//! kick or a hat (snares, claps, rims, whatever the generator emits) lands
//! here, duration-only, so a sound plays for every note.
//!
//! # How It Works
//!
//! 1. White noise provides the rattle character
//! 2. Short decay with a modest release keeps it snappy, not gated-sounding
//! 3. Pitch is ignored entirely - one generic hit for all comers

use crate::dsp::{AdsrParams, Waveform};

use super::{Polyphony, VoiceConfig};

pub(super) fn config() -> VoiceConfig {
    VoiceConfig {
        waveform: Waveform::Noise,
        envelope: AdsrParams {
            attack: 0.001,
            decay: 0.12,
            sustain: 0.0,
            release: 0.08,
        },
        gain: 0.5,
        pitched: false,
        polyphony: Polyphony::Mono,
    }
}
