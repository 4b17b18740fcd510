#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Waveform Choices
================

Each voice kind picks one waveform; the mix of harmonics gives it its timbre.

Sine: fundamental only. Deep and round - the kick body.
Square: odd harmonics, hollow and woody - the bass.
Saw: all harmonics, bright and cutting - melody and chord layers.
Triangle: odd harmonics falling off fast - soft, mellow alternative.
Noise: every frequency at once, no pitch - hats and snares.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Saw,
    Triangle,
    Noise,
}

/// Phase-accumulator oscillator. One instance per playing note.
///
/// Noise keeps its own xorshift state so the render path stays free of
/// shared RNGs; the constant seed makes offline renders reproducible.
pub struct Oscillator {
    waveform: Waveform,
    phase: f32,
    noise_state: u32,
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            noise_state: 0x9E37_79B9,
        }
    }

    /// Produce the next sample at the given frequency.
    ///
    /// `frequency` is ignored by `Noise`; phase wraps in [0, 1).
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let sample = match self.waveform {
            Waveform::Sine => (self.phase * std::f32::consts::TAU).sin(),
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Saw => 2.0 * self.phase - 1.0,
            Waveform::Triangle => 4.0 * (self.phase - 0.5).abs() - 1.0,
            Waveform::Noise => {
                // xorshift32, mapped to [-1, 1)
                let mut x = self.noise_state;
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                self.noise_state = x;
                (x as f32 / u32::MAX as f32) * 2.0 - 1.0
            }
        };

        self.phase += frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }
}
