//! The routing table: (channel, pitch) -> voice.
//!
//! Pure and total. Every note resolves to exactly one voice; unknown
//! channels fall through to the melody voice and unknown percussion pitches
//! degrade to the snare, so "a sound plays for every note" holds no matter
//! what the generator emits.

use crate::voices::VoiceKind;

/// General MIDI percussion channel.
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Minimum sustain the hi-hat is triggered with. Generated hat notes can be
/// a few milliseconds long; below this floor the burst is an inaudible click.
pub const MIN_HAT_SUSTAIN: f64 = 0.03;

const KICK_PITCH: u8 = 36;
const CLOSED_HAT_PITCH: u8 = 42;
const OPEN_HAT_PITCH: u8 = 46;

const BASS_CHANNEL: u8 = 0;
const CHORD_CHANNEL: u8 = 2;

/// A resolved trigger target with its effective parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub kind: VoiceKind,
    /// Effective sounding length after any clamp.
    pub duration: f64,
    /// Whether the trigger carries the note's pitch name.
    pub pitched: bool,
}

/// Resolve one note to its voice and effective trigger parameters.
pub fn resolve(channel: u8, pitch: u8, duration: f64) -> Route {
    match (channel, pitch) {
        (PERCUSSION_CHANNEL, KICK_PITCH) => Route {
            kind: VoiceKind::Kick,
            duration,
            pitched: true,
        },
        (PERCUSSION_CHANNEL, CLOSED_HAT_PITCH | OPEN_HAT_PITCH) => Route {
            kind: VoiceKind::HiHat,
            duration: duration.max(MIN_HAT_SUSTAIN),
            pitched: false,
        },
        // Snares, claps, rims, anything else on the drum channel: one
        // generic noise hit, pitch ignored.
        (PERCUSSION_CHANNEL, _) => Route {
            kind: VoiceKind::Snare,
            duration,
            pitched: false,
        },
        (BASS_CHANNEL, _) => Route {
            kind: VoiceKind::Bass,
            duration,
            pitched: true,
        },
        (CHORD_CHANNEL, _) => Route {
            kind: VoiceKind::Chord,
            duration,
            pitched: true,
        },
        _ => Route {
            kind: VoiceKind::Melody,
            duration,
            pitched: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kick_and_hats_route_by_pitch() {
        assert_eq!(resolve(9, 36, 0.1).kind, VoiceKind::Kick);
        assert_eq!(resolve(9, 42, 0.1).kind, VoiceKind::HiHat);
        assert_eq!(resolve(9, 46, 0.1).kind, VoiceKind::HiHat);
    }

    #[test]
    fn hat_duration_is_clamped_to_the_floor() {
        let route = resolve(9, 42, 0.01);
        assert!((route.duration - MIN_HAT_SUSTAIN).abs() < 1e-12);

        // Durations above the floor pass through untouched
        let route = resolve(9, 46, 0.25);
        assert!((route.duration - 0.25).abs() < 1e-12);
    }

    #[test]
    fn other_percussion_pitches_degrade_to_snare() {
        for pitch in [35, 37, 38, 39, 40, 43, 45, 47, 49, 51, 127] {
            let route = resolve(9, pitch, 0.1);
            assert_eq!(route.kind, VoiceKind::Snare, "pitch {pitch}");
            assert!(!route.pitched, "snare ignores pitch");
        }
    }

    #[test]
    fn melodic_channels_route_by_channel() {
        assert_eq!(resolve(0, 40, 0.5).kind, VoiceKind::Bass);
        assert_eq!(resolve(2, 60, 0.5).kind, VoiceKind::Chord);
    }

    #[test]
    fn unknown_channels_fall_through_to_melody() {
        for channel in [1, 3, 4, 5, 8, 10, 15] {
            assert_eq!(resolve(channel, 60, 0.5).kind, VoiceKind::Melody);
        }
    }

    #[test]
    fn every_pair_resolves() {
        for channel in 0..16u8 {
            for pitch in 0..=127u8 {
                // Totality: resolve never panics and always names a voice
                let _ = resolve(channel, pitch, 0.1);
            }
        }
    }
}
