//! Pattern-text page generator — a multi-column fingering table with
//! vertically rotated hole labels.

use crate::model::{ArrangedNote, InstrumentSpec};

use super::constants::{COLUMN_GAP_LINES, MIN_COLUMN_WIDTH, MONO_FONT_WIDTH_FACTOR};
use super::header::{draw_document_header, header_gap, header_height, HeaderLine};
use super::layout::PageLayout;
use super::page::{Font, PageBuilder, TextColor};

/// Render the tabular fingering text pages.
pub fn build_text_pages(
    layout: &PageLayout,
    instrument: &InstrumentSpec,
    notes: &[ArrangedNote],
    header_lines: &[HeaderLine],
) -> Vec<PageBuilder> {
    let entry_lines: Vec<String> = notes.iter().map(entry_line).collect();
    let hole_labels = hole_labels(instrument);
    let column_offset = fingering_column_offset(&entry_lines, notes);

    let char_step = layout.font_size * MONO_FONT_WIDTH_FACTOR;
    let available_width = layout.content_width();
    let column_gap = layout.line_height * COLUMN_GAP_LINES;
    let max_columns_by_width =
        (((available_width + column_gap) / (MIN_COLUMN_WIDTH + column_gap)) as usize).max(1);

    let label_top = |layout: &PageLayout| {
        layout.margin_top + header_height(layout, header_lines) + header_gap(layout, header_lines)
    };

    if entry_lines.is_empty() {
        let mut page = PageBuilder::new(layout);
        draw_document_header(&mut page, layout, header_lines);
        let top = label_top(layout);
        let label_height = draw_fingering_labels(
            &mut page,
            layout,
            &hole_labels,
            top,
            char_step,
            column_offset,
            &[layout.margin_left],
        );
        let y = top + label_height + layout.line_height;
        page.draw_text_styled(
            layout.margin_left,
            y,
            "(No arranged notes found)",
            Font::Mono,
            layout.font_size,
            0.0,
            TextColor::Gray(0.0),
        );
        return vec![page];
    }

    let mut pages: Vec<PageBuilder> = Vec::new();
    let total_entries = entry_lines.len();
    let mut index = 0;

    while index < total_entries {
        let mut page = PageBuilder::new(layout);
        draw_document_header(&mut page, layout, header_lines);
        let top = label_top(layout);

        // First pass: estimate how much room the rotated labels take so
        // the column split can be decided before anything is drawn.
        let remaining = total_entries - index;
        let estimated_label_height = estimate_label_height(&hole_labels, char_step);
        let estimated_y_start = top + estimated_label_height + layout.line_height * 0.5;
        let available_height = layout.height - layout.margin_bottom - estimated_y_start;
        let mut lines_per_column = ((available_height / layout.line_height) as usize).max(1);
        let columns_for_page = remaining
            .div_ceil(lines_per_column)
            .max(1)
            .min(max_columns_by_width);
        let required_per_column = remaining.div_ceil(columns_for_page);
        lines_per_column = lines_per_column.min(required_per_column);

        let column_width = if columns_for_page > 0 {
            (available_width - (columns_for_page - 1) as f64 * column_gap)
                / columns_for_page as f64
        } else {
            available_width
        };

        let column_origins: Vec<f64> = (0..columns_for_page)
            .map(|column| layout.margin_left + column as f64 * (column_width + column_gap))
            .collect();

        // Second pass: the realized label height refines the line budget.
        let label_height = draw_fingering_labels(
            &mut page,
            layout,
            &hole_labels,
            top,
            char_step,
            column_offset,
            &column_origins,
        );
        let y_start = top + label_height + layout.line_height * 0.5;
        let available_height = layout.height - layout.margin_bottom - y_start;
        let mut lines_per_column = ((available_height / layout.line_height) as usize).max(1);
        lines_per_column = lines_per_column.min(required_per_column);

        let chunk_end = total_entries.min(index + columns_for_page * lines_per_column);
        let chunk = &entry_lines[index..chunk_end];

        for (column, &origin) in column_origins.iter().enumerate() {
            let start = column * lines_per_column;
            if start >= chunk.len() {
                break;
            }
            let end = chunk.len().min(start + lines_per_column);
            let mut y = y_start;
            for line in &chunk[start..end] {
                page.draw_text_styled(
                    origin,
                    y,
                    line,
                    Font::Mono,
                    layout.font_size,
                    0.0,
                    TextColor::Gray(0.0),
                );
                y += layout.line_height;
            }
        }

        index += chunk.len();
        pages.push(page);
    }

    pages
}

fn entry_line(note: &ArrangedNote) -> String {
    format!("{:03}   {:<4}  {}", note.index, note.note_name, note.pattern_text)
}

fn hole_labels(instrument: &InstrumentSpec) -> Vec<String> {
    instrument
        .holes
        .iter()
        .enumerate()
        .map(|(index, hole)| {
            let identifier = hole.id.trim();
            if identifier.is_empty() {
                format!("Hole {}", index + 1)
            } else {
                identifier.to_string()
            }
        })
        .collect()
}

/// Draw the vertical hole labels above every column; returns the height
/// consumed by the tallest label.
fn draw_fingering_labels(
    page: &mut PageBuilder,
    layout: &PageLayout,
    hole_labels: &[String],
    top: f64,
    char_step: f64,
    column_offset: usize,
    column_origins: &[f64],
) -> f64 {
    if hole_labels.is_empty() {
        return 0.0;
    }

    let mut max_height: f64 = 0.0;
    for &origin in column_origins {
        for (index, label) in hole_labels.iter().enumerate() {
            let x = origin + (column_offset + index) as f64 * char_step;
            page.draw_text_styled(
                x,
                top,
                label,
                Font::Mono,
                layout.font_size,
                -90.0,
                TextColor::Gray(0.0),
            );
            max_height = max_height.max(label.chars().count() as f64 * char_step);
        }
    }
    max_height
}

fn estimate_label_height(hole_labels: &[String], char_step: f64) -> f64 {
    hole_labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0) as f64
        * char_step
}

/// Character offset of the pattern column within an entry line, so the
/// rotated labels line up with the pattern glyphs beneath them.
fn fingering_column_offset(entry_lines: &[String], notes: &[ArrangedNote]) -> usize {
    if let (Some(sample_line), Some(first_note)) = (entry_lines.first(), notes.first()) {
        if !first_note.pattern_text.is_empty() {
            if let Some(index) = sample_line.find(&first_note.pattern_text) {
                return index;
            }
        }
    }
    format!("{:03}   {:<4}  ", 0, "").chars().count()
}
