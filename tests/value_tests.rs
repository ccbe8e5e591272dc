//! Tests for note-value descriptions and staff glyph selection.

use pretty_assertions::assert_eq;
use sheetlib::{describe_note_glyph, describe_note_value};

// ═══════════════════════════════════════════════════════════════════════
// describe_note_value
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn zero_duration_is_a_rest() {
    let desc = describe_note_value(0, 480);
    assert_eq!((desc.label.as_str(), desc.fraction.as_str()), ("Rest", ""));
    let negative = describe_note_value(-10, 480);
    assert_eq!(negative.label, "Rest");
}

#[test]
fn missing_resolution_reports_raw_ticks() {
    let desc = describe_note_value(240, 0);
    assert_eq!(desc.label, "240 ticks");
    assert_eq!(desc.fraction, "240");
}

#[test]
fn quarter_note_at_standard_resolution() {
    let desc = describe_note_value(480, 480);
    assert_eq!(desc.label, "Quarter");
    assert_eq!(desc.fraction, "1/4");
}

#[test]
fn canonical_values_cover_dotted_durations() {
    assert_eq!(describe_note_value(720, 480).label, "Dotted quarter");
    assert_eq!(describe_note_value(360, 480).label, "Dotted eighth");
    assert_eq!(describe_note_value(1920, 480).label, "Whole");
    assert_eq!(describe_note_value(30, 480).label, "Sixty-fourth");
}

#[test]
fn tolerance_absorbs_slightly_off_durations() {
    // 485 ticks is 1.0104 beats, within the 0.02-beat tolerance.
    assert_eq!(describe_note_value(485, 480).label, "Quarter");
}

#[test]
fn non_canonical_duration_formats_mixed_beats() {
    let desc = describe_note_value(600, 480);
    assert_eq!(desc.label, "1 1/4 beats");
    assert_eq!(desc.fraction, "5/16");
}

// ═══════════════════════════════════════════════════════════════════════
// describe_note_glyph
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn glyph_is_none_for_degenerate_input() {
    assert_eq!(describe_note_glyph(0, 480), None);
    assert_eq!(describe_note_glyph(480, 0), None);
    assert_eq!(describe_note_glyph(-5, 480), None);
}

#[test]
fn glyph_for_quarter_note() {
    let glyph = describe_note_glyph(480, 480).unwrap();
    assert_eq!(glyph.base, "quarter");
    assert_eq!(glyph.dots, 0);
}

#[test]
fn glyph_for_dotted_eighth() {
    let glyph = describe_note_glyph(360, 480).unwrap();
    assert_eq!(glyph.base, "eighth");
    assert_eq!(glyph.dots, 1);
}

#[test]
fn glyph_for_double_dotted_half() {
    // 1680 ticks = 3.5 beats = 7/8 whole note = half * (1 + 1/2 + 1/4).
    let glyph = describe_note_glyph(1680, 480).unwrap();
    assert_eq!(glyph.base, "half");
    assert_eq!(glyph.dots, 2);
}

#[test]
fn only_whole_notes_skip_the_stem() {
    assert!(!describe_note_glyph(1920, 480).unwrap().requires_stem());
    assert!(describe_note_glyph(960, 480).unwrap().requires_stem());
    assert!(describe_note_glyph(480, 480).unwrap().requires_stem());
}
