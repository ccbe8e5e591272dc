//! Pitch spelling helpers — MIDI numbers to note names and back.

/// Pitch classes spelled with sharps (C, C#, D, ...).
const PC_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Pitch classes spelled with flats (C, Db, D, ...).
const PC_NAMES_FLAT: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Pitch classes that carry an accidental in either spelling.
pub const SHARP_SEMITONES: [i32; 5] = [1, 3, 6, 8, 10];

/// Spell a MIDI pitch as a note name (middle C = "C4").
pub fn midi_to_name(midi: i32, flats: bool) -> String {
    let pc = midi.rem_euclid(12) as usize;
    let octave = midi.div_euclid(12) - 1;
    let base = if flats {
        PC_NAMES_FLAT[pc]
    } else {
        PC_NAMES_SHARP[pc]
    };
    format!("{base}{octave}")
}

/// Spell a MIDI pitch without its accidental ("C#4" → "C4").
///
/// Accidental pitch classes drop to the natural a semitone below.
pub fn natural_of(midi: i32) -> String {
    let pc = midi.rem_euclid(12);
    let natural_midi = if SHARP_SEMITONES.contains(&pc) {
        midi - 1
    } else {
        midi
    };
    midi_to_name(natural_midi, false)
}

/// Whether the pitch class is one of the five accidental semitones.
pub fn is_accidental(midi: i32) -> bool {
    SHARP_SEMITONES.contains(&midi.rem_euclid(12))
}

/// Octave number of a MIDI pitch (middle C = octave 4).
pub fn octave_of(midi: i32) -> i32 {
    midi.div_euclid(12) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spells_middle_c() {
        assert_eq!(midi_to_name(60, true), "C4");
        assert_eq!(midi_to_name(60, false), "C4");
    }

    #[test]
    fn spells_accidentals_per_preference() {
        assert_eq!(midi_to_name(61, false), "C#4");
        assert_eq!(midi_to_name(61, true), "Db4");
        assert_eq!(midi_to_name(70, true), "Bb4");
    }

    #[test]
    fn natural_spelling_drops_the_accidental() {
        assert_eq!(natural_of(61), "C4");
        assert_eq!(natural_of(70), "A4");
        assert_eq!(natural_of(60), "C4");
    }

    #[test]
    fn octave_boundaries() {
        assert_eq!(midi_to_name(59, true), "B3");
        assert_eq!(midi_to_name(72, true), "C5");
        assert_eq!(octave_of(59), 3);
        assert_eq!(octave_of(60), 4);
    }
}
