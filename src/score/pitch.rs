//! Pitch spelling and frequency conversion.
//!
//! MIDI formula: note = 12 * (octave + 1) + semitone, middle C (C4) = 60,
//! A4 = 440 Hz = MIDI 69. Derived names use sharp spellings ("F#3"); flat
//! spellings ("Gb3") are accepted on the way back in.

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Sharp spelling for a MIDI pitch, e.g. 40 -> "E2", 61 -> "C#4".
pub fn pitch_name(pitch: u8) -> String {
    let semitone = (pitch % 12) as usize;
    let octave = (pitch / 12) as i8 - 1;
    format!("{}{}", SHARP_NAMES[semitone], octave)
}

/// Parse a spelled pitch ("E2", "F#3", "Gb3", "C-1") back to a MIDI number.
pub fn name_to_pitch(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let letter = chars.next()?;
    let mut semitone: i16 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest: String = chars.collect();
    let octave_str = match rest.chars().next() {
        Some('#') => {
            semitone += 1;
            &rest[1..]
        }
        Some('b') => {
            semitone -= 1;
            &rest[1..]
        }
        _ => rest.as_str(),
    };

    let octave: i16 = octave_str.parse().ok()?;
    let pitch = 12 * (octave + 1) + semitone;
    u8::try_from(pitch).ok().filter(|p| *p <= 127)
}

/// Equal-temperament frequency for a MIDI pitch.
pub fn pitch_to_freq(pitch: u8) -> f32 {
    440.0 * 2.0_f32.powf((pitch as f32 - 69.0) / 12.0)
}

/// Frequency for a spelled pitch, if it parses.
pub fn name_to_freq(name: &str) -> Option<f32> {
    name_to_pitch(name).map(pitch_to_freq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_c_spells_c4() {
        assert_eq!(pitch_name(60), "C4");
    }

    #[test]
    fn sharps_are_spelled_with_hash() {
        assert_eq!(pitch_name(61), "C#4");
        assert_eq!(pitch_name(42), "F#2");
    }

    #[test]
    fn lowest_octave_is_minus_one() {
        assert_eq!(pitch_name(0), "C-1");
        assert_eq!(name_to_pitch("C-1"), Some(0));
    }

    #[test]
    fn every_pitch_round_trips() {
        for pitch in 0..=127u8 {
            assert_eq!(name_to_pitch(&pitch_name(pitch)), Some(pitch));
        }
    }

    #[test]
    fn flat_spellings_are_accepted() {
        assert_eq!(name_to_pitch("Gb2"), name_to_pitch("F#2"));
        assert_eq!(name_to_pitch("Bb3"), Some(58));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(name_to_pitch(""), None);
        assert_eq!(name_to_pitch("H2"), None);
        assert_eq!(name_to_pitch("C"), None);
        assert_eq!(name_to_pitch("C99"), None);
    }

    #[test]
    fn a440_is_midi_69() {
        assert!((pitch_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((name_to_freq("A4").unwrap() - 440.0).abs() < 1e-3);
    }
}
