//! End-to-end tests for the assembled PDF document: content checks,
//! cross-reference round trips, pagination, and file writing.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use sheetlib::pdf::piano_roll::build_piano_roll_pages;
use sheetlib::pdf::staff::build_staff_pages;
use sheetlib::{
    build_header_lines, export_arranged_pdf, render_arranged_pdf, resolve_layout, ExportError,
    ExportOptions, HoleSpec, InstrumentSpec, NoteEvent, PageBuilder, StyleSpec, TempoMarker,
    TimeSignature,
};

fn test_instrument() -> InstrumentSpec {
    let mut note_map = BTreeMap::new();
    note_map.insert("C4".to_string(), vec![2, 2, 2]);
    note_map.insert("D4".to_string(), vec![2, 2, 0]);
    note_map.insert("E4".to_string(), vec![2, 0, 0]);
    InstrumentSpec {
        id: "test".to_string(),
        name: "Test".to_string(),
        title: "Test Instrument".to_string(),
        canvas_width: 160.0,
        canvas_height: 120.0,
        holes: (1..=3)
            .map(|i| HoleSpec {
                id: format!("h{i}"),
                x: 40.0 * i as f64,
                y: 40.0,
                radius: 10.0,
            })
            .collect(),
        outline: None,
        style: StyleSpec::default(),
        note_map,
    }
}

fn linear_events() -> Vec<NoteEvent> {
    vec![
        NoteEvent::new(0, 480, 60, 79),
        NoteEvent::new(480, 480, 62, 79),
        NoteEvent::new(960, 480, 64, 79),
    ]
}

fn render_all(events: &[NoteEvent], options: &ExportOptions) -> Vec<u8> {
    render_arranged_pdf(
        events,
        480,
        &TimeSignature::new(4, 4),
        &[],
        &test_instrument(),
        options,
        None,
        true,
    )
    .unwrap()
}

fn parse_floats(command: &str) -> Vec<f64> {
    command
        .split_whitespace()
        .filter_map(|token| token.parse::<f64>().ok())
        .collect()
}

fn collect_text(page: &PageBuilder) -> Vec<String> {
    let commands = page.commands();
    let mut texts = Vec::new();
    let mut index = 0;
    while index < commands.len() {
        if commands[index] == "BT" && index + 3 < commands.len() {
            let tj = &commands[index + 3];
            let text = tj
                .strip_suffix(" Tj")
                .map(|body| body.trim())
                .and_then(|body| body.strip_prefix('('))
                .and_then(|body| body.strip_suffix(')'))
                .unwrap_or("")
                .replace("\\(", "(")
                .replace("\\)", ")")
                .replace("\\\\", "\\");
            texts.push(text);
            index += 4;
        } else {
            index += 1;
        }
    }
    texts
}

// ═══════════════════════════════════════════════════════════════════════
// Document content
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn export_writes_expected_content() {
    let data = render_all(&linear_events(), &ExportOptions::new("A4", "portrait"));
    let text = String::from_utf8_lossy(&data).into_owned();

    assert!(text.starts_with("%PDF-1.4"));
    assert!(text.contains("SheetLab SheetArranger"));
    assert!(text.contains("/Subtype /Link"));
    assert!(text.contains("/C [0 0 1]"));
    assert!(text.contains("/URI (https://github.com/SheetLab/SheetArranger)"));
    assert!(text.contains("Arranged piano roll"));
    assert!(text.contains("Arranged staff view"));
    assert!(text.contains("Used fingerings visuals"));
    assert!(text.contains("C4"));
    for label in ["h1", "h2", "h3"] {
        assert!(text.contains(label), "missing hole label {label}");
    }
    // Duration names never appear in the document.
    assert!(!text.contains("Quarter"));
    assert!(!text.contains("Eighth"));
}

#[test]
fn disabled_sections_are_skipped() {
    let mut options = ExportOptions::new("A4", "portrait");
    options.include_piano_roll = false;
    options.include_staff = false;
    options.include_text = false;
    let data = render_all(&linear_events(), &options);
    let text = String::from_utf8_lossy(&data).into_owned();

    assert!(text.starts_with("%PDF"));
    assert!(!text.contains("Arranged piano roll"));
    assert!(!text.contains("Arranged staff view"));
    assert!(!text.contains("001   C4"));
    assert!(text.contains("Used fingerings visuals"));
}

#[test]
fn unknown_page_size_is_rejected_before_drawing() {
    let result = render_arranged_pdf(
        &linear_events(),
        480,
        &TimeSignature::new(4, 4),
        &[],
        &test_instrument(),
        &ExportOptions::new("Letter", "portrait"),
        None,
        true,
    );
    assert!(matches!(result, Err(ExportError::UnsupportedPageSize(_))));
}

#[test]
fn zero_columns_are_rejected() {
    let mut options = ExportOptions::new("A4", "portrait");
    options.columns = Some(0);
    let result = render_arranged_pdf(
        &linear_events(),
        480,
        &TimeSignature::new(4, 4),
        &[],
        &test_instrument(),
        &options,
        None,
        true,
    );
    assert!(matches!(result, Err(ExportError::InvalidColumns)));
}

#[test]
fn title_appears_in_the_header() {
    let data = render_arranged_pdf(
        &linear_events(),
        480,
        &TimeSignature::new(4, 4),
        &[],
        &test_instrument(),
        &ExportOptions::new("A4", "portrait"),
        Some("Window Pane Waltz"),
        true,
    )
    .unwrap();
    let text = String::from_utf8_lossy(&data).into_owned();
    assert!(text.contains("Window Pane Waltz"));
}

#[test]
fn tempo_markers_render_on_piano_roll_pages() {
    let markers = vec![
        TempoMarker::new(0, "\u{2669} = 120"),
        TempoMarker::new(1920, "\u{2669} = 180"),
    ];
    let data = render_arranged_pdf(
        &linear_events(),
        480,
        &TimeSignature::new(4, 4),
        &markers,
        &test_instrument(),
        &ExportOptions::new("A4", "portrait"),
        None,
        true,
    )
    .unwrap();
    let text = String::from_utf8_lossy(&data).into_owned();
    assert!(text.contains("= 120"));
    assert!(text.contains("= 180"));
}

// ═══════════════════════════════════════════════════════════════════════
// Empty input degrades to placeholder pages
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn empty_input_yields_one_placeholder_page_per_section() {
    let data = render_all(&[], &ExportOptions::new("A4", "portrait"));
    let text = String::from_utf8_lossy(&data).into_owned();

    let page_objects = text.matches("/Type /Page ").count();
    assert_eq!(page_objects, 4, "one placeholder page per enabled section");
    assert!(text.contains("No arranged notes found"));
    assert!(text.contains("No fingering patterns detected"));
}

// ═══════════════════════════════════════════════════════════════════════
// Pagination
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn piano_roll_pages_conserve_every_event() {
    let layout = resolve_layout("A4", "portrait").unwrap();
    let header_lines = build_header_lines(None);
    let events: Vec<NoteEvent> = (0..40)
        .map(|index| NoteEvent::new(index * 480, 240, 60 + (index % 12) as i32, 79))
        .collect();

    let pages = build_piano_roll_pages(
        &layout,
        &events,
        480,
        &TimeSignature::new(4, 4),
        &[],
        &header_lines,
        true,
    );
    assert!(pages.len() > 1, "40 spaced events should span pages");

    let mut total = 0usize;
    for page in &pages {
        let summary = collect_text(page)
            .into_iter()
            .find(|text| text.contains("Events on page: "))
            .expect("summary line");
        let count: usize = summary
            .rsplit("Events on page: ")
            .next()
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        total += count;
    }
    assert_eq!(total, events.len(), "no event lost or duplicated");

    let footer = collect_text(&pages[0])
        .into_iter()
        .find(|text| text.starts_with("Page 1 of "));
    assert!(footer.is_some(), "multi-page sections carry footer numbers");
}

#[test]
fn single_page_sections_have_no_footer() {
    let layout = resolve_layout("A4", "portrait").unwrap();
    let header_lines = build_header_lines(None);
    let pages = build_piano_roll_pages(
        &layout,
        &linear_events(),
        480,
        &TimeSignature::new(4, 4),
        &[],
        &header_lines,
        true,
    );
    assert_eq!(pages.len(), 1);
    assert!(!collect_text(&pages[0])
        .iter()
        .any(|text| text.starts_with("Page 1 of ")));
}

// ═══════════════════════════════════════════════════════════════════════
// Measure numbering
// ═══════════════════════════════════════════════════════════════════════

fn reference_events() -> Vec<NoteEvent> {
    vec![
        NoteEvent::new(0, 240, 60, 79),
        NoteEvent::new(1920, 240, 62, 79),
        NoteEvent::new(3840, 240, 64, 79),
    ]
}

#[test]
fn piano_roll_labels_measures_two_and_three_only() {
    let layout = resolve_layout("A4", "portrait").unwrap();
    let header_lines = build_header_lines(None);
    let pages = build_piano_roll_pages(
        &layout,
        &reference_events(),
        480,
        &TimeSignature::new(4, 4),
        &[],
        &header_lines,
        true,
    );
    assert_eq!(pages.len(), 1);

    let numeric: BTreeSet<String> = collect_text(&pages[0])
        .into_iter()
        .filter(|text| !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()))
        .collect();
    let expected: BTreeSet<String> = ["2", "3"].iter().map(|s| s.to_string()).collect();
    assert_eq!(numeric, expected);
}

#[test]
fn staff_labels_measures_two_and_three_but_never_one() {
    let layout = resolve_layout("A4", "portrait").unwrap();
    let header_lines = build_header_lines(None);
    let pages = build_staff_pages(
        &layout,
        &reference_events(),
        480,
        &TimeSignature::new(4, 4),
        &header_lines,
    );
    assert!(!pages.is_empty());

    let mut numeric: BTreeSet<String> = BTreeSet::new();
    for page in &pages {
        numeric.extend(
            collect_text(page)
                .into_iter()
                .filter(|text| !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())),
        );
    }
    assert!(numeric.contains("2"), "measure 2 should be labeled");
    assert!(numeric.contains("3"), "measure 3 should be labeled");
    assert!(!numeric.contains("1"), "measure 1 is never labeled");
}

// ═══════════════════════════════════════════════════════════════════════
// Cross-reference round trip
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn xref_table_round_trips_every_object() {
    let data = render_all(&linear_events(), &ExportOptions::new("A4", "portrait"));
    assert!(data.is_ascii(), "document should be plain ASCII");
    let text = std::str::from_utf8(&data).unwrap();

    let startxref = text.rfind("startxref").expect("startxref marker");
    let mut tail_lines = text[startxref..].lines();
    tail_lines.next();
    let xref_offset: usize = tail_lines.next().unwrap().trim().parse().unwrap();

    let xref = &text[xref_offset..];
    assert!(xref.starts_with("xref"));
    let mut lines = xref.lines();
    assert_eq!(lines.next(), Some("xref"));
    let header = lines.next().unwrap();
    let entry_count: usize = header.split_whitespace().nth(1).unwrap().parse().unwrap();

    // Head entry is the reserved free entry.
    let head = lines.next().unwrap();
    assert!(head.starts_with("0000000000 65535 f"));

    let mut recovered = 0usize;
    for object_number in 1..entry_count {
        let entry = lines.next().expect("xref entry");
        let mut parts = entry.split_whitespace();
        let offset: usize = parts.next().unwrap().parse().unwrap();
        let _generation = parts.next().unwrap();
        let kind = parts.next().unwrap();
        assert_eq!(kind, "n", "object {object_number} should be in use");
        assert!(offset > 0, "only the head entry may have offset 0");
        assert!(
            text[offset..].starts_with(&format!("{object_number} 0 obj")),
            "offset of object {object_number} should point at its header"
        );
        recovered += 1;
    }
    assert_eq!(recovered, entry_count - 1);

    // The declared object count matches the trailer size.
    let declared_objects = text.matches(" 0 obj").count();
    assert_eq!(declared_objects, entry_count - 1);
    assert!(text.contains(&format!("trailer << /Size {entry_count} /Root 1 0 R >>")));
}

// ═══════════════════════════════════════════════════════════════════════
// File writing
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn export_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/out/arranged.pdf");
    export_arranged_pdf(
        &path,
        &linear_events(),
        480,
        &TimeSignature::new(4, 4),
        &[],
        &test_instrument(),
        &ExportOptions::new("A6", "landscape"),
        Some("Nested"),
        true,
    )
    .unwrap();

    let data = std::fs::read(&path).unwrap();
    assert!(data.starts_with(b"%PDF-1.4"));
    println!("wrote {} bytes to {}", data.len(), path.display());
}

#[test]
fn failed_write_leaves_no_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let path = blocker.join("sub/arranged.pdf");

    let result = export_arranged_pdf(
        &path,
        &linear_events(),
        480,
        &TimeSignature::new(4, 4),
        &[],
        &test_instrument(),
        &ExportOptions::new("A4", "portrait"),
        None,
        true,
    );

    assert!(matches!(result, Err(ExportError::Io(_))));
    assert!(!path.exists(), "no partial file may be left behind");
}
