//! Fingering-diagram page generator — one scaled instrument diagram per
//! distinct pattern, laid out in a grid.

use crate::model::{InstrumentSpec, PatternData};
use crate::outline::generate_outline_path;

use super::constants::*;
use super::header::{draw_document_header, header_gap, header_height, HeaderLine};
use super::layout::PageLayout;
use super::page::PageBuilder;

/// Render the fingering diagram pages.
pub fn build_fingering_pages(
    layout: &PageLayout,
    patterns: &[PatternData],
    missing_notes: &[String],
    instrument: &InstrumentSpec,
    columns: u32,
    header_lines: &[HeaderLine],
) -> Vec<PageBuilder> {
    let content_top =
        layout.margin_top + header_height(layout, header_lines) + header_gap(layout, header_lines);
    let available_width = layout.content_width();
    let available_height = layout.height - content_top - layout.margin_bottom;
    let heading_height = layout.font_size + 20.0;
    let spacing = DIAGRAM_SPACING;
    let label_height = layout.line_height * 1.6;
    let canvas_width = if instrument.canvas_width > 0.0 {
        instrument.canvas_width
    } else {
        160.0
    };
    let canvas_height = if instrument.canvas_height > 0.0 {
        instrument.canvas_height
    } else {
        120.0
    };

    if patterns.is_empty() {
        let mut page = PageBuilder::new(layout);
        draw_document_header(&mut page, layout, header_lines);
        page.draw_text(
            layout.margin_left,
            content_top,
            "Used fingerings visuals",
            layout.font_size + 2.0,
        );
        let y = content_top + layout.line_height;
        if missing_notes.is_empty() {
            page.draw_text(
                layout.margin_left,
                y,
                "(No fingering patterns detected)",
                layout.font_size,
            );
        } else {
            page.draw_text(
                layout.margin_left,
                y,
                &missing_fingering_text(missing_notes),
                layout.font_size - 1.0,
            );
        }
        return vec![page];
    }

    let target_columns = resolve_target_columns(
        columns.max(1) as usize,
        available_width,
        spacing,
        canvas_width,
    );
    let mut column_width =
        (available_width - (target_columns - 1) as f64 * spacing) / target_columns as f64;
    if column_width <= 0.0 {
        column_width = available_width;
    }

    let mut scale = if canvas_width > 0.0 {
        column_width / canvas_width
    } else {
        1.0
    };
    scale = scale.clamp(DIAGRAM_MIN_SCALE, DIAGRAM_MAX_SCALE);

    // The wide page keeps a fixed number of diagram rows in view, so the
    // scale is additionally capped by the per-row height budget.
    if layout.page_size == "A4" && layout.orientation == "landscape" {
        let usable_height = available_height - heading_height + spacing;
        if usable_height > spacing {
            let max_row_height =
                ((usable_height / WIDE_PAGE_DIAGRAM_ROWS as f64) - spacing).max(64.0);
            let allowed_diagram_height = max_row_height - label_height;
            if allowed_diagram_height > 0.0 && canvas_height > 0.0 {
                scale = scale
                    .min(allowed_diagram_height / canvas_height)
                    .max(DIAGRAM_MIN_SCALE);
            }
        }
    }

    let diagram_width = canvas_width * scale;
    let diagram_height = canvas_height * scale;
    let row_height = diagram_height + label_height;

    let rows_per_page =
        (((available_height - heading_height + spacing) / (row_height + spacing)) as usize).max(1);
    let items_per_page = (rows_per_page * target_columns).max(1);

    let mut pages: Vec<PageBuilder> = Vec::new();
    for (chunk_index, chunk) in patterns.chunks(items_per_page).enumerate() {
        let mut page = PageBuilder::new(layout);
        draw_document_header(&mut page, layout, header_lines);
        page.draw_text(
            layout.margin_left,
            content_top,
            "Used fingerings visuals",
            layout.font_size + 2.0,
        );
        let y_base = content_top + layout.line_height + 4.0;

        for (idx, entry) in chunk.iter().enumerate() {
            let row = idx / target_columns;
            let col = idx % target_columns;
            let column_left = layout.margin_left + col as f64 * (column_width + spacing);
            let diagram_left = column_left + (column_width - diagram_width) / 2.0;
            let block_top = y_base + row as f64 * (row_height + spacing);

            render_fingering_block(
                &mut page,
                layout,
                instrument,
                entry,
                diagram_left,
                block_top,
                diagram_width,
                diagram_height,
                scale,
            );
        }

        if chunk_index == 0 && !missing_notes.is_empty() {
            let row_count = chunk.len().div_ceil(target_columns).max(1);
            let missing_y = y_base + row_count as f64 * (row_height + spacing);
            let clamped = missing_y.min(layout.height - layout.margin_bottom - layout.line_height);
            page.draw_text(
                layout.margin_left,
                clamped,
                &missing_fingering_text(missing_notes),
                layout.font_size - 1.0,
            );
        }

        pages.push(page);
    }

    pages
}

fn missing_fingering_text(missing_notes: &[String]) -> String {
    if missing_notes.is_empty() {
        "Missing fingering patterns".to_string()
    } else {
        format!("Missing fingering patterns for: {}", missing_notes.join(", "))
    }
}

#[allow(clippy::too_many_arguments)]
fn render_fingering_block(
    page: &mut PageBuilder,
    layout: &PageLayout,
    instrument: &InstrumentSpec,
    entry: &PatternData,
    diagram_left: f64,
    block_top: f64,
    diagram_width: f64,
    diagram_height: f64,
    scale: f64,
) {
    let diagram_top = block_top;
    page.draw_rect(
        diagram_left,
        diagram_top,
        diagram_width,
        diagram_height,
        Some(0.98),
        Some(0.7),
        0.8,
    );

    if let Some(ref outline) = instrument.outline {
        if !outline.points.is_empty() {
            let path = generate_outline_path(
                &outline.points,
                instrument.style.outline_smooth,
                outline.closed,
                instrument.style.outline_spline_steps,
            );
            let scaled: Vec<(f64, f64)> = path
                .iter()
                .map(|&(x, y)| (diagram_left + x * scale, diagram_top + y * scale))
                .collect();
            page.draw_polygon(&scaled, outline.closed, None, Some(0.6), 0.8);
        }
    }

    for (hole, &state) in instrument.holes.iter().zip(entry.pattern.iter()) {
        let cx = diagram_left + hole.x * scale;
        let cy = diagram_top + hole.y * scale;
        let radius = (hole.radius * scale).max(2.0);
        draw_hole(page, cx, cy, radius, state);
    }

    // Labels go below the diagram so the outline never overdraws them.
    let names = if entry.note_names.is_empty() {
        "(No note names)".to_string()
    } else {
        entry.note_names.join(", ")
    };
    let diagram_bottom = diagram_top + diagram_height;
    page.draw_text(
        diagram_left,
        diagram_bottom + layout.line_height * 0.8,
        &names,
        layout.font_size - 1.0,
    );
    page.draw_text(
        diagram_left,
        diagram_bottom + layout.line_height * 1.6,
        &format!("Pattern: {}", entry.pattern_text),
        layout.font_size - 1.0,
    );
}

/// One hole: ring outline, then a fill matching the state (closed holes
/// fill fully, half holes fill the left half).
fn draw_hole(page: &mut PageBuilder, cx: f64, cy: f64, radius: f64, state: u8) {
    page.draw_circle(cx, cy, radius, None, Some(0.1), 0.8);
    let inner_radius = (radius - 1.5).max(1.0);
    if state >= 2 {
        page.draw_circle(cx, cy, inner_radius, Some(0.15), None, 0.8);
    } else if state == 1 {
        page.fill_half_circle(cx, cy, inner_radius, 0.15);
    }
}

/// Reduce the requested column count until each diagram keeps a usable
/// scale.
fn resolve_target_columns(
    requested: usize,
    available_width: f64,
    spacing: f64,
    canvas_width: f64,
) -> usize {
    let mut target = requested.max(1);
    while target > 1 {
        let column_width = (available_width - (target - 1) as f64 * spacing) / target as f64;
        if column_width <= 0.0 {
            target -= 1;
            continue;
        }
        let scale = if canvas_width > 0.0 {
            column_width / canvas_width
        } else {
            1.0
        };
        if scale < DIAGRAM_COLUMN_MIN_SCALE {
            target -= 1;
            continue;
        }
        return target;
    }
    target.max(1)
}
