//! Rhythmic note-value descriptions derived from tick durations.

use num_rational::Ratio;

/// Human friendly representation of a note duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteValueDescription {
    /// Canonical label ("Quarter", "Dotted eighth", "1 1/4 beats", ...)
    pub label: String,
    /// Whole-note fraction ("1/4"), empty when not applicable
    pub fraction: String,
}

impl NoteValueDescription {
    /// Expanded description such as "Quarter note (1/4)".
    pub fn long_text(&self) -> String {
        let base = self.label.trim();
        if !base.is_empty() && !self.fraction.is_empty() {
            format!("{base} note ({})", self.fraction)
        } else if !base.is_empty() {
            format!("{base} note")
        } else {
            self.fraction.clone()
        }
    }

    /// Compact representation such as "Quarter (1/4)".
    pub fn short_text(&self) -> String {
        let base = self.label.trim();
        if !base.is_empty() && !self.fraction.is_empty() {
            format!("{base} ({})", self.fraction)
        } else if !base.is_empty() {
            base.to_string()
        } else {
            self.fraction.clone()
        }
    }

    /// Most condensed form, preferring the fraction.
    pub fn compact_text(&self) -> String {
        if !self.fraction.is_empty() {
            self.fraction.clone()
        } else {
            self.label.trim().to_string()
        }
    }
}

/// Canonical beat values, whole note down to dotted sixty-fourth.
const KNOWN_VALUES: [(f64, &str); 13] = [
    (4.0, "Whole"),
    (3.0, "Dotted half"),
    (2.0, "Half"),
    (1.5, "Dotted quarter"),
    (1.0, "Quarter"),
    (0.75, "Dotted eighth"),
    (0.5, "Eighth"),
    (0.375, "Dotted sixteenth"),
    (0.25, "Sixteenth"),
    (0.1875, "Dotted thirty-second"),
    (0.125, "Thirty-second"),
    (0.09375, "Dotted sixty-fourth"),
    (0.0625, "Sixty-fourth"),
];

/// How a note head of a given duration should be drawn on a staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteGlyphDescription {
    /// Base shape: "whole", "half", "quarter", ... "sixty-fourth"
    pub base: &'static str,
    /// Augmentation dots (0–2)
    pub dots: u8,
}

impl NoteGlyphDescription {
    pub fn requires_stem(&self) -> bool {
        self.base != "whole"
    }
}

/// Base shapes as fractions of a whole note.
const BASE_NOTE_VALUES: [(&str, (i64, i64)); 7] = [
    ("whole", (1, 1)),
    ("half", (1, 2)),
    ("quarter", (1, 4)),
    ("eighth", (1, 8)),
    ("sixteenth", (1, 16)),
    ("thirty-second", (1, 32)),
    ("sixty-fourth", (1, 64)),
];

/// Describe a tick duration as a note value label + whole-note fraction.
pub fn describe_note_value(duration_ticks: i64, pulses_per_quarter: i64) -> NoteValueDescription {
    if duration_ticks <= 0 {
        return NoteValueDescription {
            label: "Rest".to_string(),
            fraction: String::new(),
        };
    }
    if pulses_per_quarter <= 0 {
        let ticks = duration_ticks.max(0);
        let suffix = if ticks == 1 { "tick" } else { "ticks" };
        return NoteValueDescription {
            label: format!("{ticks} {suffix}"),
            fraction: ticks.to_string(),
        };
    }

    let beats = duration_ticks as f64 / pulses_per_quarter as f64;
    let tolerance = 0.02;
    for (value, label) in KNOWN_VALUES {
        if (beats - value).abs() <= tolerance {
            return NoteValueDescription {
                label: label.to_string(),
                fraction: fraction_of_whole(duration_ticks, pulses_per_quarter),
            };
        }
    }

    let beats_fraction = limit_denominator(Ratio::new(duration_ticks, pulses_per_quarter), 32);
    NoteValueDescription {
        label: format_beats(beats_fraction),
        fraction: fraction_of_whole(duration_ticks, pulses_per_quarter),
    }
}

/// Describe how a staff note of the given duration should be drawn.
///
/// Returns None for non-positive durations or resolutions. Durations with
/// no exact match (within 1/192 of a whole note) take the closest of the
/// 21 base-shape/dot-count candidates.
pub fn describe_note_glyph(
    duration_ticks: i64,
    pulses_per_quarter: i64,
) -> Option<NoteGlyphDescription> {
    if duration_ticks <= 0 || pulses_per_quarter <= 0 {
        return None;
    }

    let whole_fraction = limit_denominator(
        Ratio::new(duration_ticks, pulses_per_quarter.max(1) * 4),
        128,
    );
    let tolerance = Ratio::new(1, 192);
    let mut best: Option<(Ratio<i64>, NoteGlyphDescription)> = None;

    for (base, (numer, denom)) in BASE_NOTE_VALUES {
        for dots in 0u8..3 {
            let value = Ratio::new(numer, denom) * dot_factor(dots);
            let diff = ratio_abs(value - whole_fraction);
            let glyph = NoteGlyphDescription { base, dots };
            if diff <= tolerance {
                return Some(glyph);
            }
            match best {
                Some((best_diff, _)) if diff >= best_diff => {}
                _ => best = Some((diff, glyph)),
            }
        }
    }

    best.map(|(_, glyph)| glyph)
}

/// Multiplier contributed by augmentation dots (1 + 1/2 + ... + 1/2^dots).
fn dot_factor(dots: u8) -> Ratio<i64> {
    let mut total = Ratio::new(0, 1);
    for index in 0..=dots as u32 {
        total += Ratio::new(1, 1i64 << index);
    }
    total
}

fn fraction_of_whole(duration_ticks: i64, pulses_per_quarter: i64) -> String {
    let whole = limit_denominator(
        Ratio::new(duration_ticks, pulses_per_quarter.max(1) * 4),
        64,
    );
    if *whole.numer() == 0 {
        return String::new();
    }
    if *whole.denom() == 1 {
        return whole.numer().to_string();
    }
    format!("{}/{}", whole.numer(), whole.denom())
}

fn format_beats(fraction: Ratio<i64>) -> String {
    let numerator = *fraction.numer();
    let denominator = *fraction.denom();
    if denominator == 1 {
        let suffix = if numerator == 1 { "beat" } else { "beats" };
        return format!("{numerator} {suffix}");
    }

    if numerator > denominator {
        let whole = numerator / denominator;
        let remainder = Ratio::new(numerator % denominator, denominator);
        if *remainder.numer() == 0 {
            return format!("{whole} beats");
        }
        return format!("{whole} {}/{} beats", remainder.numer(), remainder.denom());
    }

    let suffix = if numerator == 1 { "beat" } else { "beats" };
    format!("{numerator}/{denominator} {suffix}")
}

fn ratio_abs(value: Ratio<i64>) -> Ratio<i64> {
    if value < Ratio::new(0, 1) {
        -value
    } else {
        value
    }
}

/// Closest fraction to `value` with a denominator no larger than `max_den`,
/// via the continued-fraction convergent walk.
fn limit_denominator(value: Ratio<i64>, max_den: i64) -> Ratio<i64> {
    if *value.denom() <= max_den {
        return value;
    }

    let (mut p0, mut q0, mut p1, mut q1) = (0i64, 1i64, 1i64, 0i64);
    let mut n = *value.numer();
    let mut d = *value.denom();
    loop {
        let a = n.div_euclid(d);
        let q2 = q0 + a * q1;
        if q2 > max_den {
            break;
        }
        let p2 = p0 + a * p1;
        p0 = p1;
        q0 = q1;
        p1 = p2;
        q1 = q2;
        let next_d = n - a * d;
        if next_d == 0 {
            break;
        }
        n = d;
        d = next_d;
    }

    let k = (max_den - q0) / q1;
    let lower = Ratio::new(p0 + k * p1, q0 + k * q1);
    let upper = Ratio::new(p1, q1);
    if ratio_abs(upper - value) <= ratio_abs(lower - value) {
        upper
    } else {
        lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_for_non_positive_duration() {
        let desc = describe_note_value(0, 480);
        assert_eq!(desc.label, "Rest");
        assert_eq!(desc.fraction, "");
        assert!(describe_note_glyph(0, 480).is_none());
    }

    #[test]
    fn raw_ticks_without_resolution() {
        let desc = describe_note_value(240, 0);
        assert_eq!(desc.label, "240 ticks");
        assert_eq!(desc.fraction, "240");
        let single = describe_note_value(1, 0);
        assert_eq!(single.label, "1 tick");
    }

    #[test]
    fn canonical_quarter() {
        let desc = describe_note_value(480, 480);
        assert_eq!(desc.label, "Quarter");
        assert_eq!(desc.fraction, "1/4");
        assert_eq!(desc.long_text(), "Quarter note (1/4)");
        assert_eq!(desc.short_text(), "Quarter (1/4)");
        assert_eq!(desc.compact_text(), "1/4");
    }

    #[test]
    fn non_canonical_duration_formats_beats() {
        let desc = describe_note_value(600, 480);
        assert_eq!(desc.label, "1 1/4 beats");
        assert_eq!(desc.fraction, "5/16");
    }

    #[test]
    fn fractional_beat_is_singular() {
        let desc = describe_note_value(160, 480);
        assert_eq!(desc.label, "1/3 beat");
        assert_eq!(desc.fraction, "1/12");
    }

    #[test]
    fn glyph_for_plain_quarter() {
        let glyph = describe_note_glyph(480, 480).unwrap();
        assert_eq!(glyph.base, "quarter");
        assert_eq!(glyph.dots, 0);
        assert!(glyph.requires_stem());
    }

    #[test]
    fn glyph_for_dotted_eighth() {
        let glyph = describe_note_glyph(360, 480).unwrap();
        assert_eq!(glyph.base, "eighth");
        assert_eq!(glyph.dots, 1);
    }

    #[test]
    fn glyph_for_whole_has_no_stem() {
        let glyph = describe_note_glyph(1920, 480).unwrap();
        assert_eq!(glyph.base, "whole");
        assert!(!glyph.requires_stem());
    }

    #[test]
    fn glyph_falls_back_to_closest_candidate() {
        // 5/4 of a whole note is longer than any candidate; whole is closest.
        let glyph = describe_note_glyph(2400, 480).unwrap();
        assert_eq!(glyph.base, "whole");
    }

    #[test]
    fn limit_denominator_matches_known_reductions() {
        assert_eq!(limit_denominator(Ratio::new(600, 1920), 64), Ratio::new(5, 16));
        assert_eq!(limit_denominator(Ratio::new(1, 3), 2), Ratio::new(1, 2));
        assert_eq!(limit_denominator(Ratio::new(480, 1920), 64), Ratio::new(1, 4));
    }
}
