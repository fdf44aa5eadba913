//! Pitch classes, scales, and note-name ↔ frequency conversion.
//!
//! Note names produced here are always one of the twelve sharp spellings in
//! [`PITCH_CLASSES`] followed by a single octave digit (e.g. `"F#4"`).

use serde::{Deserialize, Serialize};

/// The twelve canonical pitch-class spellings, indexed by semitone above C.
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Reference pitch for A4 (MIDI 69) in Hz.
pub const A4_FREQUENCY: f64 = 440.0;

/// Frequency returned for note names that cannot be parsed.
pub const FALLBACK_FREQUENCY: f64 = A4_FREQUENCY;

const MAJOR: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];
const PENTATONIC: [u8; 5] = [0, 2, 4, 7, 9];

/// Named scale, i.e. a set of semitone offsets from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Major,
    Minor,
    Pentatonic,
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Minor
    }
}

impl Scale {
    /// Resolve a mode name. Unknown names fall back to [`Scale::Minor`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "major" => Scale::Major,
            "minor" => Scale::Minor,
            "pentatonic" => Scale::Pentatonic,
            other => {
                log::warn!("unknown mode {other:?}, using minor");
                Scale::Minor
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
            Scale::Pentatonic => "pentatonic",
        }
    }

    /// Semitone offsets from the root, ascending, all in `0..12`.
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Scale::Major => &MAJOR,
            Scale::Minor => &MINOR,
            Scale::Pentatonic => &PENTATONIC,
        }
    }
}

/// Parse a key/root name into a pitch-class index.
///
/// The letter is case-insensitive and may be followed by `#` or `b`
/// (`"Bb"` and `"a#"` both resolve to 10).
pub fn pitch_class_index(root: &str) -> Option<usize> {
    let mut chars = root.chars();
    let base: i32 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let offset = match chars.as_str() {
        "" => 0,
        "#" => 1,
        "b" => -1,
        _ => return None,
    };
    Some((base + offset).rem_euclid(12) as usize)
}

/// Name the note at `degree` of a scale built on `root`, in `octave`.
///
/// The degree wraps modulo the scale length and the octave is written
/// as given; wrapping does not carry into the octave, so degree 7 of a
/// seven-note scale names the root in the same octave. An unknown root
/// is treated as C.
pub fn note_from_scale(root: &str, intervals: &[u8], degree: usize, octave: u8) -> String {
    let root_idx = pitch_class_index(root).unwrap_or_else(|| {
        log::warn!("unknown key {root:?}, using C");
        0
    });
    let step = if intervals.is_empty() {
        0
    } else {
        intervals[degree % intervals.len()] as usize
    };
    format!("{}{}", PITCH_CLASSES[(root_idx + step) % 12], octave % 10)
}

/// Parse a canonical note name (`[A-G]#?[0-9]`) into a MIDI note number.
///
/// Only the spellings in [`PITCH_CLASSES`] are accepted; flats, lowercase
/// letters, `E#`/`B#` and multi-digit octaves are rejected.
pub fn note_to_midi(note: &str) -> Option<i32> {
    let (letter, sharp, digit) = match note.as_bytes() {
        [letter, b'#', digit] => (*letter, true, *digit),
        [letter, digit] => (*letter, false, *digit),
        _ => return None,
    };
    if !(b'A'..=b'G').contains(&letter) || !digit.is_ascii_digit() {
        return None;
    }
    let name = if sharp { &note[..2] } else { &note[..1] };
    let semitone = PITCH_CLASSES.iter().position(|&pc| pc == name)? as i32;
    let octave = (digit - b'0') as i32;

    // MIDI note number: C4 = 60
    Some((octave + 1) * 12 + semitone)
}

/// Convert a MIDI note number to equal-tempered frequency, A4 (MIDI 69) at 440 Hz.
pub fn midi_to_frequency(midi: i32) -> f64 {
    A4_FREQUENCY * (2.0_f64).powf((midi as f64 - 69.0) / 12.0)
}

/// Fundamental frequency of a note name at A4 = 440 Hz.
///
/// Unparseable names degrade to [`FALLBACK_FREQUENCY`] instead of failing.
pub fn note_to_frequency(note: &str) -> f64 {
    match note_to_midi(note) {
        Some(midi) => midi_to_frequency(midi),
        None => {
            log::warn!("unparseable note {note:?}, using {FALLBACK_FREQUENCY} Hz");
            FALLBACK_FREQUENCY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert_eq!(note_to_frequency("A4"), 440.0);
    }

    #[test]
    fn midi_octaves_double() {
        assert_eq!(midi_to_frequency(69), A4_FREQUENCY);
        assert_eq!(midi_to_frequency(57), 220.0);
        assert_eq!(midi_to_frequency(81), 880.0);
    }

    #[test]
    fn a5_is_880() {
        assert_eq!(note_to_frequency("A5"), 880.0);
    }

    #[test]
    fn middle_c() {
        let f = note_to_frequency("C4");
        assert!((f - 261.63).abs() < 0.01, "C4 should be ~261.63, got {f}");
    }

    #[test]
    fn sharps_parse() {
        let f = note_to_frequency("F#2");
        assert!((f - 92.4986).abs() < 0.001, "F#2 should be ~92.50, got {f}");
        assert_eq!(note_to_midi("C#4"), Some(61));
    }

    #[test]
    fn unparseable_falls_back() {
        for bad in ["", "H4", "a4", "Bb4", "C10", "C", "E#4", "C#", "A4 "] {
            assert_eq!(note_to_midi(bad), None, "{bad:?} should not parse");
            assert_eq!(note_to_frequency(bad), FALLBACK_FREQUENCY);
        }
    }

    #[test]
    fn scale_degree_zero_is_root() {
        assert_eq!(note_from_scale("C", Scale::Major.intervals(), 0, 4), "C4");
    }

    #[test]
    fn scale_degree_wraps_without_octave_carry() {
        assert_eq!(note_from_scale("C", Scale::Major.intervals(), 7, 4), "C4");
        assert_eq!(note_from_scale("C", Scale::Major.intervals(), 8, 4), "D4");
    }

    #[test]
    fn scale_wraps_pitch_class_past_b() {
        // A minor: degree 2 is C, still written in the requested octave.
        assert_eq!(note_from_scale("A", Scale::Minor.intervals(), 2, 4), "C4");
        assert_eq!(note_from_scale("b", Scale::Pentatonic.intervals(), 4, 2), "G#2");
    }

    #[test]
    fn flats_and_case_in_root() {
        assert_eq!(pitch_class_index("Bb"), Some(10));
        assert_eq!(pitch_class_index("bb"), Some(10));
        assert_eq!(pitch_class_index("Cb"), Some(11));
        assert_eq!(pitch_class_index("f#"), Some(6));
        assert_eq!(pitch_class_index("X"), None);
        assert_eq!(pitch_class_index(""), None);
    }

    #[test]
    fn unknown_root_uses_c() {
        assert_eq!(note_from_scale("Q", Scale::Major.intervals(), 4, 5), "G5");
    }

    #[test]
    fn empty_intervals_name_root() {
        assert_eq!(note_from_scale("D", &[], 3, 4), "D4");
    }

    #[test]
    fn unknown_mode_is_minor() {
        assert_eq!(Scale::from_name("dorian"), Scale::Minor);
        assert_eq!(Scale::from_name("MAJOR"), Scale::Major);
        assert_eq!(Scale::from_name("pentatonic").intervals(), &[0, 2, 4, 7, 9]);
    }

    #[test]
    fn produced_names_are_canonical() {
        for scale in [Scale::Major, Scale::Minor, Scale::Pentatonic] {
            for root in PITCH_CLASSES {
                for degree in 0..10 {
                    let name = note_from_scale(root, scale.intervals(), degree, 4);
                    assert!(note_to_midi(&name).is_some(), "{name} is not canonical");
                }
            }
        }
    }
}
