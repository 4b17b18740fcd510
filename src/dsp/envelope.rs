use crate::MIN_TIME;

/*
ADSR Envelope
=============

Linear ADSR envelope generator driving every voice's amplitude.

  level       Current output value (0.0 to 1.0), multiplied into the signal.
  stage       Idle, Attack, Decay, Sustain or Release; a state machine
              governs the transitions.
  gate        In this engine the gate is a duration: the voice counts down
              the note's length in samples and calls note_off itself when
              the countdown reaches zero.

Shape (linear ramps):

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

note_off starts Release from the CURRENT level, whatever the stage - a note
released mid-attack must not jump, or it clicks. Release snapshots the start
level and its total sample count at note_off time and interpolates linearly,
so it lands on exactly 0.0.
*/

/// Envelope shape parameters, all times in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

#[derive(Debug, Clone, Copy)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    stage: EnvelopeStage,
    level: f32,

    decay_start_level: f32,

    // Release bookkeeping, snapshotted at note_off
    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn from_params(params: &AdsrParams) -> Self {
        Self {
            attack_time: params.attack.max(MIN_TIME),
            decay_time: params.decay.max(MIN_TIME),
            sustain_level: params.sustain.clamp(0.0, 1.0),
            release_time: params.release.max(MIN_TIME),

            stage: EnvelopeStage::Idle,
            level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Gate high: start the attack phase from zero for a clean retrigger.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeStage::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: start the release phase from the current level.
    pub fn note_off(&mut self, sample_rate: f32) {
        if matches!(self.stage, EnvelopeStage::Idle) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeStage::Release;
    }

    /// Advance one sample and return the new level.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                let increment = 1.0 / (self.attack_time * sample_rate);
                self.level += increment;

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                let target = self.sustain_level;
                let total_drop = self.decay_start_level - target;
                let decrement = total_drop / (self.decay_time * sample_rate);
                self.level -= decrement;

                if self.level <= target {
                    self.level = target;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeStage::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// True while the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeStage::Idle)
    }

    /// Hard reset to idle. Used on voice disposal.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.decay_start_level = 0.0;
        self.release_start_level = 0.0;
        self.release_elapsed_samples = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn render_samples(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample(SAMPLE_RATE);
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::from_params(&AdsrParams {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.2,
        });

        env.note_on();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert!(!matches!(env.stage(), EnvelopeStage::Attack));
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::from_params(&AdsrParams {
            attack: 0.01,
            decay: 0.05,
            sustain,
            release: 0.2,
        });

        env.note_on();
        let attack_decay_samples = ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5;
        render_samples(&mut env, attack_decay_samples);

        assert!(matches!(env.stage(), EnvelopeStage::Sustain));
        assert!(
            (env.level() - sustain).abs() < 0.05,
            "sustain level should be held"
        );
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::from_params(&AdsrParams {
            attack: 0.01,
            decay: 0.05,
            sustain: 0.5,
            release,
        });

        env.note_on();
        render_samples(&mut env, (0.02 * SAMPLE_RATE) as usize);

        env.note_off(SAMPLE_RATE);
        render_samples(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert!(env.level() <= 0.001, "release should fall back to zero");
        assert!(matches!(env.stage(), EnvelopeStage::Idle));
    }

    #[test]
    fn release_from_attack_starts_at_current_level() {
        let mut env = Envelope::from_params(&AdsrParams {
            attack: 0.1,
            decay: 0.1,
            sustain: 0.7,
            release: 0.05,
        });

        env.note_on();
        render_samples(&mut env, 20); // part way through the attack
        let level_before = env.level();
        assert!(level_before > 0.0 && level_before < 1.0);

        env.note_off(SAMPLE_RATE);
        env.next_sample(SAMPLE_RATE);
        assert!(
            env.level() <= level_before,
            "release must continue from the interrupted level, not jump"
        );
    }
}
