//! Fingering pattern resolution — note events to hole-state patterns.

use std::collections::BTreeMap;

use crate::model::{ArrangedNote, InstrumentSpec, NoteEvent, PatternData};
use crate::pitch::{midi_to_name, natural_of};

/// Translate note events into arranged fingering metadata.
///
/// Indices are 1-based and follow the event order.
pub fn collect_arranged_notes(
    events: &[NoteEvent],
    instrument: &InstrumentSpec,
    prefer_flats: bool,
) -> Vec<ArrangedNote> {
    events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let note_name = midi_to_name(event.midi, prefer_flats);
            let (pattern_text, pattern_state) =
                resolve_pattern(instrument, &note_name, event.midi);
            ArrangedNote {
                index: index + 1,
                midi: event.midi,
                note_name,
                pattern_text,
                pattern_state,
            }
        })
        .collect()
}

/// Resolve the fingering pattern for a note name, with spelling fallbacks.
///
/// Lookup order: the given name, then the canonical (flat) spelling of the
/// same pitch, then its natural spelling. Resolved patterns are padded or
/// truncated to the instrument's hole count.
pub fn resolve_pattern(
    instrument: &InstrumentSpec,
    note_name: &str,
    midi: i32,
) -> (String, Option<Vec<u8>>) {
    let mut fallback_names: Vec<String> = Vec::new();
    let canonical = midi_to_name(midi, true);
    let natural = natural_of(midi);
    for candidate in [canonical, natural] {
        if !candidate.is_empty() && !fallback_names.contains(&candidate) {
            fallback_names.push(candidate);
        }
    }

    let mut selected = instrument.pattern_for(note_name);
    if selected.is_none() {
        for fallback in &fallback_names {
            if fallback != note_name {
                if let Some(states) = instrument.pattern_for(fallback) {
                    selected = Some(states);
                    break;
                }
            }
        }
    }

    let Some(states) = selected else {
        return ("N/A".to_string(), None);
    };

    let hole_count = instrument.holes.len();
    let mut sequence: Vec<u8> = states.to_vec();
    sequence.resize(hole_count, 0);

    let normalized: Vec<u8> = sequence.iter().map(|&state| state.min(2)).collect();
    let pattern_text: String = normalized.iter().map(|&state| hole_symbol(state)).collect();
    (pattern_text, Some(normalized))
}

/// ASCII glyph for a hole state: open, half, closed.
fn hole_symbol(state: u8) -> char {
    match state {
        0 => 'O',
        1 => '/',
        2 => 'X',
        _ => '?',
    }
}

/// Collapse repeated patterns and collect notes with no fingering.
///
/// Patterns sort by (lowest pitch, note names, pattern text) so the output
/// is identical for any ordering of the same note multiset.
pub fn group_patterns(notes: &[ArrangedNote]) -> (Vec<PatternData>, Vec<String>) {
    let mut grouped: BTreeMap<Vec<u8>, Vec<String>> = BTreeMap::new();
    let mut pattern_texts: BTreeMap<Vec<u8>, String> = BTreeMap::new();
    let mut pattern_midis: BTreeMap<Vec<u8>, Vec<i32>> = BTreeMap::new();
    let mut missing: Vec<String> = Vec::new();

    for note in notes {
        let Some(ref state) = note.pattern_state else {
            missing.push(note.note_name.clone());
            continue;
        };
        grouped
            .entry(state.clone())
            .or_default()
            .push(note.note_name.clone());
        pattern_texts
            .entry(state.clone())
            .or_insert_with(|| note.pattern_text.clone());
        pattern_midis.entry(state.clone()).or_default().push(note.midi);
    }

    let mut patterns: Vec<PatternData> = grouped
        .into_iter()
        .map(|(pattern, note_names)| {
            let unique_names = dedup_preserving_order(note_names);
            let lowest_midi = pattern_midis
                .get(&pattern)
                .and_then(|midis| midis.iter().copied().min());
            let pattern_text = pattern_texts.get(&pattern).cloned().unwrap_or_default();
            PatternData {
                pattern,
                pattern_text,
                note_names: unique_names,
                lowest_midi,
            }
        })
        .collect();

    patterns.sort_by(|a, b| {
        let a_midi = a.lowest_midi.unwrap_or(i32::MAX);
        let b_midi = b.lowest_midi.unwrap_or(i32::MAX);
        a_midi
            .cmp(&b_midi)
            .then_with(|| a.note_names.cmp(&b.note_names))
            .then_with(|| a.pattern_text.cmp(&b.pattern_text))
    });

    let mut missing_sorted = dedup_preserving_order(missing);
    missing_sorted.sort();
    (patterns, missing_sorted)
}

fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for name in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}
