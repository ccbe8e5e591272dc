//! Staff-notation page generator — systems of measures with note glyphs.

use std::collections::BTreeMap;

use crate::model::{NoteEvent, TimeSignature};
use crate::pitch::{is_accidental, octave_of};
use crate::values::{describe_note_glyph, NoteGlyphDescription};

use super::constants::*;
use super::header::{draw_document_header, header_gap, header_height, HeaderLine};
use super::layout::PageLayout;
use super::page::PageBuilder;
use super::{draw_page_footer, no_notes_page};

/// Render one or more staff-notation pages.
pub fn build_staff_pages(
    layout: &PageLayout,
    events: &[NoteEvent],
    pulses_per_quarter: i64,
    time_signature: &TimeSignature,
    header_lines: &[HeaderLine],
) -> Vec<PageBuilder> {
    if events.is_empty() {
        return vec![no_notes_page(layout, header_lines, "Arranged staff view")];
    }

    let geometry = StaffGeometry::resolve(layout, header_lines);
    let quarter_ticks = pulses_per_quarter.max(1);
    let ticks_per_measure = time_signature.ticks_per_measure(quarter_ticks);
    let measures_per_system = choose_measures_per_system(
        geometry.staff_width,
        ticks_per_measure,
        TARGET_PX_PER_TICK,
    );
    let ticks_per_system = measures_per_system * ticks_per_measure;
    let ticks_per_page = (ticks_per_system * geometry.systems_per_page as i64).max(quarter_ticks);

    let mut page_events: BTreeMap<i64, Vec<&NoteEvent>> = BTreeMap::new();
    let mut max_tick: i64 = 0;
    for event in events {
        let index = event.onset / ticks_per_page;
        page_events.entry(index).or_default().push(event);
        max_tick = max_tick.max(event.end_tick());
    }

    let total_pages = page_events.len();
    let mut pages: Vec<PageBuilder> = Vec::with_capacity(total_pages);

    for (page_number, (index, bucket)) in page_events.iter().enumerate() {
        let mut page = PageBuilder::new(layout);
        draw_document_header(&mut page, layout, header_lines);
        page.draw_text(
            layout.margin_left,
            geometry.heading_top,
            "Arranged staff view",
            layout.font_size + 2.0,
        );

        let page_start = index * ticks_per_page;
        let remaining = max_tick - page_start;
        let span = if remaining > 0 {
            ticks_per_page.min(remaining).max(quarter_ticks)
        } else {
            ticks_per_page
        };

        for system_index in 0..geometry.systems_per_page {
            let system_start = page_start + system_index as i64 * ticks_per_system;
            if system_start >= page_start + span {
                break;
            }
            let system_remaining = span - (system_start - page_start);
            let system_span = ticks_per_system.min(system_remaining).max(quarter_ticks);
            draw_system(
                &mut page,
                layout,
                &geometry,
                bucket,
                system_index,
                system_start,
                system_span,
                ticks_per_measure,
                quarter_ticks,
                max_tick,
            );
        }

        draw_page_footer(&mut page, layout, page_number + 1, total_pages);
        pages.push(page);
    }

    pages
}

/// Pick the measure count whose pixel density lands closest to the
/// target pixels-per-tick. Non-positive inputs collapse to one measure.
pub fn choose_measures_per_system(
    staff_width: f64,
    ticks_per_measure: i64,
    target_px_per_tick: f64,
) -> i64 {
    if staff_width <= 0.0 || ticks_per_measure <= 0 || target_px_per_tick <= 0.0 {
        return 1;
    }
    let mut best = 1i64;
    let mut best_diff = f64::MAX;
    for measures in 1..=24i64 {
        let px_per_tick = staff_width / (measures * ticks_per_measure) as f64;
        let diff = (px_per_tick - target_px_per_tick).abs();
        if diff < best_diff {
            best_diff = diff;
            best = measures;
        }
    }
    best
}

/// Diatonic staff position of a MIDI pitch; E4 (bottom line) is 0 and
/// each step is half a staff spacing.
pub fn staff_position(midi: i32) -> i32 {
    (((midi - 64) as f64) * 7.0 / 12.0).round() as i32
}

/// Vertical center of a staff position, measured from the staff top line.
pub fn staff_y(staff_top: f64, pos: i32, spacing: f64) -> f64 {
    staff_top + (8 - pos) as f64 * (spacing / 2.0)
}

/// Vertical layout shared by every system on a staff page.
struct StaffGeometry {
    staff_spacing: f64,
    system_padding: f64,
    system_spacing: f64,
    system_height: f64,
    heading_top: f64,
    systems_top: f64,
    box_left: f64,
    box_width: f64,
    staff_left: f64,
    staff_width: f64,
    note_inset: f64,
    systems_per_page: usize,
}

impl StaffGeometry {
    fn resolve(layout: &PageLayout, header_lines: &[HeaderLine]) -> Self {
        let staff_scale = if layout.is_small() {
            SMALL_PAGE_STAFF_SCALE
        } else {
            1.0
        };
        let staff_spacing = BASE_STAFF_SPACING * staff_scale;
        let staff_height = staff_spacing * 4.0;
        let system_padding = staff_spacing * SYSTEM_PADDING_SPACINGS;
        let system_spacing = staff_spacing * SYSTEM_SPACING_SPACINGS;
        let system_height = staff_height + 2.0 * system_padding;
        let side_padding = staff_spacing * SYSTEM_SIDE_PADDING_SPACINGS;

        let heading_top = layout.margin_top
            + header_height(layout, header_lines)
            + header_gap(layout, header_lines)
            + layout.line_height * HEADING_PADDING_LINES;
        let systems_top = heading_top + HEADING_EXTRA;

        let box_left = layout.margin_left;
        let box_width = layout.content_width();
        let staff_left = box_left + side_padding;
        let staff_width = (box_width - 2.0 * side_padding).max(1.0);

        let available_height = (layout.height - layout.margin_bottom - systems_top).max(80.0);
        let base_systems = (((available_height + system_spacing)
            / (system_height + system_spacing)) as usize)
            .max(1);
        // The small page keeps one slot free so the last system never
        // crowds the bottom margin.
        let systems_per_page = if layout.is_small() {
            base_systems.saturating_sub(1).max(1)
        } else {
            base_systems
        };

        Self {
            staff_spacing,
            system_padding,
            system_spacing,
            system_height,
            heading_top,
            systems_top,
            box_left,
            box_width,
            staff_left,
            staff_width,
            note_inset: staff_spacing * 1.5,
            systems_per_page,
        }
    }
}

/// A note segment scheduled for drawing within one system. Tied notes
/// contribute one segment per continuation.
struct NoteSegment {
    onset: i64,
    duration: i64,
    midi: i32,
    first_segment: bool,
}

#[allow(clippy::too_many_arguments)]
fn draw_system(
    page: &mut PageBuilder,
    layout: &PageLayout,
    geometry: &StaffGeometry,
    events: &[&NoteEvent],
    system_index: usize,
    system_start: i64,
    system_span: i64,
    ticks_per_measure: i64,
    quarter_ticks: i64,
    max_tick: i64,
) {
    let spacing = geometry.staff_spacing;
    let box_top = geometry.systems_top
        + system_index as f64 * (geometry.system_height + geometry.system_spacing);
    let staff_top = box_top + geometry.system_padding;
    let box_bottom = box_top + geometry.system_height;

    page.draw_rect(
        geometry.box_left,
        box_top,
        geometry.box_width,
        geometry.system_height,
        Some(SYSTEM_BOX_FILL_GRAY),
        Some(SYSTEM_BOX_STROKE_GRAY),
        0.8,
    );

    let staff_right = geometry.staff_left + geometry.staff_width;
    for line in 0..5 {
        let y = staff_top + line as f64 * spacing;
        page.draw_line(
            geometry.staff_left,
            y,
            staff_right,
            y,
            STAFF_LINE_GRAY,
            STAFF_LINE_WIDTH,
        );
    }

    let usable_width = (geometry.staff_width - geometry.note_inset - spacing).max(1.0);
    let scale_x = usable_width / (system_span as f64).max(1.0);

    // Measure barlines spanning the system box, labeled with the measure
    // number except for measure 1 and trailing empty measures.
    let mut tick = (system_start / ticks_per_measure) * ticks_per_measure;
    while tick <= system_start + system_span {
        let local = tick - system_start;
        if local >= 0 {
            let x = geometry.staff_left + local as f64 * scale_x;
            page.draw_line(x, box_top, x, box_bottom, BARLINE_GRAY, BARLINE_WIDTH);
            let measure_number = tick / ticks_per_measure + 1;
            if measure_number > 1 && max_tick > tick {
                page.draw_text(
                    x + 2.0,
                    box_top - 2.0,
                    &measure_number.to_string(),
                    layout.font_size - 2.0,
                );
            }
        }
        tick += ticks_per_measure;
    }

    let system_end = system_start + system_span;
    let mut segments: Vec<NoteSegment> = Vec::new();
    for event in events {
        if event.onset >= system_end || event.end_tick() <= system_start {
            continue;
        }
        let mut cursor = event.onset;
        let mut first = true;
        for &duration in std::iter::once(&event.duration).chain(event.tie_durations.iter()) {
            let duration = duration.max(1);
            if cursor >= system_start && cursor < system_end {
                segments.push(NoteSegment {
                    onset: cursor,
                    duration,
                    midi: event.midi,
                    first_segment: first,
                });
            }
            cursor += duration;
            first = false;
        }
    }
    segments.sort_by_key(|segment| (segment.onset, segment.midi));

    for (index, segment) in segments.iter().enumerate() {
        let local_onset = (segment.onset - system_start).max(0);
        if local_onset >= system_span {
            continue;
        }
        let x_center = geometry.staff_left + geometry.note_inset + local_onset as f64 * scale_x;
        let next_x = segments
            .get(index + 1)
            .map(|next| {
                geometry.staff_left
                    + geometry.note_inset
                    + (next.onset - system_start).max(0) as f64 * scale_x
            })
            .filter(|&nx| nx > x_center);

        draw_note_segment(
            page,
            layout,
            segment,
            x_center,
            next_x,
            staff_top,
            spacing,
            quarter_ticks,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_note_segment(
    page: &mut PageBuilder,
    layout: &PageLayout,
    segment: &NoteSegment,
    x_center: f64,
    next_x: Option<f64>,
    staff_top: f64,
    spacing: f64,
    quarter_ticks: i64,
) {
    let pos = staff_position(segment.midi);
    let y_center = staff_y(staff_top, pos, spacing);
    let note_radius = (spacing * 0.45).max(3.0);

    draw_ledger_lines(page, x_center, note_radius, staff_top, pos, spacing);

    let glyph = describe_note_glyph(segment.duration, quarter_ticks);
    draw_note_head(page, x_center, y_center, note_radius, glyph);

    if is_accidental(segment.midi) {
        page.draw_text(
            x_center - note_radius - 6.0,
            y_center + spacing * 0.25,
            "#",
            layout.font_size - 2.0,
        );
    }

    if let Some(glyph) = glyph {
        if glyph.requires_stem() {
            draw_stem_and_flags(page, x_center, y_center, note_radius, glyph, pos, spacing);
        }
        draw_dots(page, x_center, y_center, note_radius, glyph, next_x);
    }

    if segment.first_segment {
        let octave = octave_of(segment.midi);
        let octave_y = if pos >= 8 {
            y_center - spacing * 1.6
        } else {
            y_center + spacing * 1.6
        };
        page.draw_text(x_center, octave_y, &octave.to_string(), layout.font_size - 2.0);
    }
}

fn draw_note_head(
    page: &mut PageBuilder,
    x_center: f64,
    y_center: f64,
    radius: f64,
    glyph: Option<NoteGlyphDescription>,
) {
    let rx = radius * 1.15;
    let ry = radius * 0.85;
    let open_head = matches!(glyph, Some(g) if g.base == "whole" || g.base == "half");
    if open_head {
        page.draw_oval(x_center, y_center, rx, ry, Some(1.0), Some(0.05), 0.8);
    } else {
        page.draw_oval(x_center, y_center, rx, ry, Some(0.1), Some(0.05), 0.8);
    }
}

fn draw_stem_and_flags(
    page: &mut PageBuilder,
    x_center: f64,
    y_center: f64,
    radius: f64,
    glyph: NoteGlyphDescription,
    pos: i32,
    spacing: f64,
) {
    let stem_length = spacing * 3.5;
    let stem_up = pos < 6;
    let stem_x = if stem_up {
        x_center + radius
    } else {
        x_center - radius
    };
    let stem_end_y = if stem_up {
        y_center - stem_length
    } else {
        y_center + stem_length
    };
    page.draw_line(stem_x, y_center, stem_x, stem_end_y, 0.0, 1.0);

    let flag_count = match glyph.base {
        "eighth" => 1,
        "sixteenth" => 2,
        "thirty-second" => 3,
        "sixty-fourth" => 4,
        _ => 0,
    };
    if flag_count == 0 {
        return;
    }

    let flag_length = radius * 2.2;
    let flag_height = spacing * 0.9;
    for index in 0..flag_count {
        if stem_up {
            let start_y = stem_end_y + index as f64 * (flag_height * 0.65);
            page.draw_polygon(
                &[
                    (stem_x, start_y),
                    (stem_x + flag_length, start_y + flag_height * 0.35),
                    (stem_x + flag_length * 0.85, start_y + flag_height),
                ],
                true,
                Some(0.0),
                None,
                1.0,
            );
        } else {
            let start_y = stem_end_y - index as f64 * (flag_height * 0.65);
            page.draw_polygon(
                &[
                    (stem_x, start_y),
                    (stem_x - flag_length, start_y - flag_height * 0.35),
                    (stem_x - flag_length * 0.85, start_y - flag_height),
                ],
                true,
                Some(0.0),
                None,
                1.0,
            );
        }
    }
}

/// Augmentation dots to the right of the head. When the next note is
/// close, the gap shrinks but never below a readable floor.
fn draw_dots(
    page: &mut PageBuilder,
    x_center: f64,
    y_center: f64,
    radius: f64,
    glyph: NoteGlyphDescription,
    next_x: Option<f64>,
) {
    if glyph.dots == 0 {
        return;
    }

    let dot_radius = (radius * 0.28).max(1.0);
    let mut gap = radius * 0.9;
    if let Some(next_x) = next_x {
        let room = next_x - x_center - radius - dot_radius;
        let needed = gap * glyph.dots as f64;
        if room < needed {
            gap = (room / glyph.dots as f64).max(radius * 0.35);
        }
    }

    let mut x = x_center + radius + gap;
    for _ in 0..glyph.dots {
        page.draw_circle(x, y_center, dot_radius, Some(0.0), Some(0.0), 0.6);
        x += gap;
    }
}

fn draw_ledger_lines(
    page: &mut PageBuilder,
    center: f64,
    radius: f64,
    staff_top: f64,
    pos: i32,
    spacing: f64,
) {
    let extra = (radius * 0.8).max(4.0);
    let left = (center - radius - extra).max(0.0);
    let right = center + radius + extra;

    if pos < 0 {
        let mut ledger_pos = -2;
        while ledger_pos >= pos - 1 {
            let y = staff_y(staff_top, ledger_pos, spacing);
            page.draw_line(left, y, right, y, LEDGER_GRAY, LEDGER_WIDTH);
            ledger_pos -= 2;
        }
    } else if pos > 8 {
        let mut ledger_pos = 10;
        while ledger_pos <= pos + 1 {
            let y = staff_y(staff_top, ledger_pos, spacing);
            page.draw_line(left, y, right, y, LEDGER_GRAY, LEDGER_WIDTH);
            ledger_pos += 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_per_system_prefers_spacing_close_to_target() {
        let measures = choose_measures_per_system(665.0, 1920, TARGET_PX_PER_TICK);
        assert_eq!(measures, 3);
    }

    #[test]
    fn measures_per_system_handles_non_positive_target() {
        assert_eq!(choose_measures_per_system(500.0, 1920, 0.0), 1);
        assert_eq!(choose_measures_per_system(0.0, 1920, 0.12), 1);
    }

    #[test]
    fn staff_positions_around_the_treble_staff() {
        assert_eq!(staff_position(64), 0); // E4, bottom line
        assert_eq!(staff_position(62), -1); // D4, just below
        assert_eq!(staff_position(60), -2); // C4, first ledger line
        assert_eq!(staff_position(77), 8); // F5, top line
    }

    #[test]
    fn staff_y_walks_half_spacings() {
        let top = 100.0;
        assert_eq!(staff_y(top, 8, 10.0), 100.0);
        assert_eq!(staff_y(top, 0, 10.0), 140.0);
        assert_eq!(staff_y(top, -2, 10.0), 150.0);
    }
}
