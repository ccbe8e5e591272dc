//! Piano-roll page generator — tick/pitch grid with one bar per note.

use std::collections::BTreeMap;

use crate::model::{NoteEvent, TempoMarker, TimeSignature};
use crate::pitch::{is_accidental, midi_to_name};

use super::constants::*;
use super::header::{draw_document_header, header_gap, header_height, HeaderLine};
use super::layout::PageLayout;
use super::page::{Font, PageBuilder, TextColor};
use super::{draw_page_footer, no_notes_page};

/// Render one or more piano roll pages depending on song length.
pub fn build_piano_roll_pages(
    layout: &PageLayout,
    events: &[NoteEvent],
    pulses_per_quarter: i64,
    time_signature: &TimeSignature,
    tempo_markers: &[TempoMarker],
    header_lines: &[HeaderLine],
    prefer_flats: bool,
) -> Vec<PageBuilder> {
    if events.is_empty() {
        return vec![no_notes_page(layout, header_lines, "Arranged piano roll")];
    }

    let left = layout.margin_left;
    let width = layout.content_width();
    let label_width = (layout.font_size * 2.5).max(32.0);
    let quarter_ticks = pulses_per_quarter.max(1);
    let px_per_quarter = if layout.is_small() {
        PX_PER_QUARTER / 2.0
    } else {
        PX_PER_QUARTER
    };
    let quarters_per_page = ((width / px_per_quarter) as i64).max(MIN_QUARTERS_PER_PAGE);
    let ticks_per_measure = time_signature.ticks_per_measure(quarter_ticks);
    let ticks_per_page = (quarters_per_page * quarter_ticks).max(ticks_per_measure);

    let min_event_midi = events.iter().map(|e| e.midi).min().unwrap_or(60);
    let max_event_midi = events.iter().map(|e| e.midi).max().unwrap_or(60);
    let (min_midi, max_midi) = if min_event_midi == max_event_midi {
        ((min_event_midi - 2).max(0), (max_event_midi + 2).min(127))
    } else {
        ((min_event_midi - 1).max(0), (max_event_midi + 1).min(127))
    };
    let low_name = midi_to_name(min_midi, prefer_flats);
    let high_name = midi_to_name(max_midi, prefer_flats);

    let mut page_events: BTreeMap<i64, Vec<&NoteEvent>> = BTreeMap::new();
    let mut max_tick: i64 = 0;
    for event in events {
        let index = event.onset / ticks_per_page;
        page_events.entry(index).or_default().push(event);
        max_tick = max_tick.max(event.onset + event.duration.max(1));
    }

    let total_pages = page_events.len();
    let mut pages: Vec<PageBuilder> = Vec::with_capacity(total_pages);

    for (page_number, (index, bucket)) in page_events.iter().enumerate() {
        let mut page = PageBuilder::new(layout);
        draw_piano_roll_page(
            &mut page,
            layout,
            bucket,
            PianoRollPageContext {
                page_number: page_number + 1,
                page_start: index * ticks_per_page,
                total_pages,
                ticks_per_page,
                ticks_per_measure,
                max_tick,
                left,
                width,
                label_width,
                quarter_ticks,
                min_midi,
                max_midi,
                low_name: &low_name,
                high_name: &high_name,
                pulses_per_quarter,
                prefer_flats,
            },
            tempo_markers,
            header_lines,
        );
        pages.push(page);
    }

    pages
}

struct PianoRollPageContext<'a> {
    page_number: usize,
    page_start: i64,
    total_pages: usize,
    ticks_per_page: i64,
    ticks_per_measure: i64,
    max_tick: i64,
    left: f64,
    width: f64,
    label_width: f64,
    quarter_ticks: i64,
    min_midi: i32,
    max_midi: i32,
    low_name: &'a str,
    high_name: &'a str,
    pulses_per_quarter: i64,
    prefer_flats: bool,
}

fn draw_piano_roll_page(
    page: &mut PageBuilder,
    layout: &PageLayout,
    events: &[&NoteEvent],
    ctx: PianoRollPageContext<'_>,
    tempo_markers: &[TempoMarker],
    header_lines: &[HeaderLine],
) {
    draw_document_header(page, layout, header_lines);
    let content_top =
        layout.margin_top + header_height(layout, header_lines) + header_gap(layout, header_lines);

    page.draw_text(
        ctx.left,
        content_top,
        "Arranged piano roll",
        layout.font_size + 2.0,
    );

    let remaining_ticks = ctx.max_tick - ctx.page_start;
    let span = if remaining_ticks > 0 {
        ctx.ticks_per_page.min(remaining_ticks).max(ctx.quarter_ticks)
    } else {
        ctx.ticks_per_page.max(ctx.quarter_ticks)
    };
    let page_span = ctx.ticks_per_page.max(ctx.quarter_ticks);
    let grid_width = (ctx.width - ctx.label_width).max(1.0);
    let scale_x = grid_width / (page_span as f64).max(1.0);

    let start_measure = ctx.page_start / ctx.ticks_per_measure + 1;
    let end_measure = (ctx.page_start + span - 1) / ctx.ticks_per_measure + 1;

    let summary = format!(
        "Range: {} to {} | Pulses/quarter: {} | Measures {}-{} | Events on page: {}",
        ctx.low_name,
        ctx.high_name,
        ctx.pulses_per_quarter.max(0),
        start_measure,
        end_measure,
        events.len()
    );
    let summary_y = content_top + layout.line_height;
    page.draw_text(ctx.left, summary_y, &summary, layout.font_size - 1.0);

    let grid_top = summary_y + layout.line_height + 6.0;
    let grid_bottom = layout.height - layout.margin_bottom;
    let available_height = (grid_bottom - grid_top).max(40.0);

    let note_count = ((ctx.max_midi - ctx.min_midi + 1) as usize).max(1);
    let row_height = (available_height / note_count as f64).max(ROLL_ROW_MIN_HEIGHT);
    let actual_height = row_height * note_count as f64;
    let grid_left = ctx.left + ctx.label_width;

    // Pitch rows, top down from the highest pitch.
    for (idx, midi) in (ctx.min_midi..=ctx.max_midi).rev().enumerate() {
        let row_y = grid_top + idx as f64 * row_height;
        let fill = if is_accidental(midi) {
            ROLL_BLACK_KEY_ROW_GRAY
        } else {
            ROLL_WHITE_KEY_ROW_GRAY
        };
        page.draw_rect(grid_left, row_y, grid_width, row_height, Some(fill), None, 1.0);
        page.draw_rect(
            ctx.left,
            row_y,
            ctx.label_width,
            row_height,
            Some(0.99),
            Some(0.85),
            0.3,
        );
        let label = midi_to_name(midi, ctx.prefer_flats);
        page.draw_text(
            ctx.left + 4.0,
            row_y + row_height - 4.0,
            &label,
            layout.font_size - 2.0,
        );
    }

    page.draw_rect(
        grid_left,
        grid_top,
        grid_width,
        actual_height,
        None,
        Some(0.6),
        0.8,
    );
    page.draw_line(
        grid_left,
        grid_top,
        grid_left,
        grid_top + actual_height,
        0.6,
        0.8,
    );

    // Vertical gridlines every quarter; measure boundaries are heavier
    // and labeled, except measure 1 and measures past the last event.
    let mut tick = (ctx.page_start / ctx.quarter_ticks) * ctx.quarter_ticks;
    let page_end = ctx.page_start + page_span;
    while tick <= page_end {
        let local = tick - ctx.page_start;
        if local >= 0 {
            let x = grid_left + local as f64 * scale_x;
            let at_measure = tick % ctx.ticks_per_measure == 0;
            if at_measure {
                page.draw_line(x, grid_top, x, grid_top + actual_height, 0.6, 0.9);
                let measure_number = tick / ctx.ticks_per_measure + 1;
                if measure_number > 1 && ctx.max_tick > tick {
                    page.draw_text(
                        x + 2.0,
                        grid_top - 2.0,
                        &measure_number.to_string(),
                        layout.font_size - 2.0,
                    );
                }
            } else {
                page.draw_line(x, grid_top, x, grid_top + actual_height, 0.85, 0.5);
            }
        }
        tick += ctx.quarter_ticks;
    }

    draw_tempo_markers(
        page,
        layout,
        tempo_markers,
        ctx.page_start,
        page_span,
        grid_left,
        grid_width,
        scale_x,
        grid_top,
    );

    // One filled bar + pitch label per note, scaled to its tick span.
    for event in events {
        let local_onset = (event.onset - ctx.page_start).max(0);
        if local_onset >= page_span {
            continue;
        }
        let local_end = (local_onset + event.duration.max(1)).min(page_span);
        let note_width = ((local_end - local_onset) as f64 * scale_x).max(2.0);
        let row_index = (ctx.max_midi - event.midi).clamp(0, ctx.max_midi - ctx.min_midi) as f64;
        let row_y = grid_top + row_index * row_height;
        let note_y = row_y + 1.0;
        let note_height = (row_height - 2.0).max(2.0);
        let fill_gray = if is_accidental(event.midi) {
            ROLL_BLACK_NOTE_GRAY
        } else {
            ROLL_WHITE_NOTE_GRAY
        };
        page.draw_rect(
            grid_left + local_onset as f64 * scale_x,
            note_y,
            note_width,
            note_height,
            Some(fill_gray),
            Some(0.1),
            0.8,
        );
        let name = midi_to_name(event.midi, ctx.prefer_flats);
        let label_x = grid_left + local_onset as f64 * scale_x + 2.0;
        let label_size = (layout.font_size - 2.0).min(note_height * 0.55).max(6.0);
        let baseline = (note_y + note_height - 1.0).min(note_y + note_height * 0.6);
        page.draw_text_styled(
            label_x,
            baseline,
            &name,
            Font::Body,
            label_size,
            0.0,
            TextColor::Gray(1.0),
        );
    }

    draw_page_footer(page, layout, ctx.page_number, ctx.total_pages);
}

/// Draw tempo labels above the grid, positioned by tick and nudged so
/// they stay inside the grid edges.
#[allow(clippy::too_many_arguments)]
fn draw_tempo_markers(
    page: &mut PageBuilder,
    layout: &PageLayout,
    tempo_markers: &[TempoMarker],
    page_start: i64,
    page_span: i64,
    grid_left: f64,
    grid_width: f64,
    scale_x: f64,
    grid_top: f64,
) {
    if tempo_markers.is_empty() {
        return;
    }
    let size = layout.font_size - 1.0;
    let min_left = grid_left + 2.0;
    let max_right = grid_left + grid_width;
    // One line above the measure numbers so the two never collide.
    let y = grid_top - 4.0 - layout.font_size;

    for marker in tempo_markers {
        let label = marker.label.trim();
        if label.is_empty() {
            continue;
        }
        let tick = marker.tick.max(0);
        if tick < page_start || tick >= page_start + page_span {
            continue;
        }
        let local = (tick - page_start) as f64;
        let mut x = grid_left + local * scale_x + TEMPO_MARKER_PADDING;
        let text_width = page.estimate_text_width(label, Font::Body, size);
        if x + text_width > max_right {
            x = (max_right - text_width).max(min_left);
        }
        if x < min_left {
            x = min_left;
        }
        page.draw_text(x, y, label, size);
    }
}
