//! Arranged-score PDF rendering pipeline.
//!
//! The facade runs the enabled page generators in a fixed order —
//! piano roll, pattern text, staff view, fingering diagrams — and hands
//! the combined page list to the serializer. Everything is computed in
//! memory; the only I/O is the final file write.

mod constants;
pub mod fingering;
pub mod header;
pub mod layout;
pub mod page;
pub mod piano_roll;
pub mod staff;
pub mod text;
pub mod writer;

use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use crate::model::{ExportOptions, InstrumentSpec, NoteEvent, TempoMarker, TimeSignature};
use crate::patterns::{collect_arranged_notes, group_patterns};

use header::{build_header_lines, draw_document_header, header_gap, header_height, HeaderLine};
use layout::{resolve_layout, PageLayout};
use page::{Font, PageBuilder};
use writer::PdfWriter;

/// Errors surfaced by an export run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported page size: {0}")]
    UnsupportedPageSize(String),
    #[error("Unsupported orientation: {0}")]
    UnsupportedOrientation(String),
    #[error("Fingering columns must be greater than zero")]
    InvalidColumns,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render the arranged score into a complete PDF byte stream.
///
/// Generators run strictly in the order piano roll, text, staff,
/// fingerings; disabled sections are skipped without renumbering the
/// others. Empty input degrades to placeholder pages, never an error.
#[allow(clippy::too_many_arguments)]
pub fn render_arranged_pdf(
    events: &[NoteEvent],
    pulses_per_quarter: i64,
    time_signature: &TimeSignature,
    tempo_markers: &[TempoMarker],
    instrument: &InstrumentSpec,
    options: &ExportOptions,
    title: Option<&str>,
    prefer_flats: bool,
) -> Result<Vec<u8>, ExportError> {
    let pdf = build_document(
        events,
        pulses_per_quarter,
        time_signature,
        tempo_markers,
        instrument,
        options,
        title,
        prefer_flats,
    )?;
    Ok(pdf.render())
}

#[allow(clippy::too_many_arguments)]
fn build_document(
    events: &[NoteEvent],
    pulses_per_quarter: i64,
    time_signature: &TimeSignature,
    tempo_markers: &[TempoMarker],
    instrument: &InstrumentSpec,
    options: &ExportOptions,
    title: Option<&str>,
    prefer_flats: bool,
) -> Result<PdfWriter, ExportError> {
    let layout = resolve_layout(&options.page_size, &options.orientation)?;
    if options.columns == Some(0) {
        return Err(ExportError::InvalidColumns);
    }
    let columns = options.resolved_columns();
    debug!(
        "export layout {} {}: {:.2}x{:.2}",
        layout.page_size, layout.orientation, layout.width, layout.height
    );

    let mut sorted_events: Vec<NoteEvent> = events.to_vec();
    sorted_events.sort_by(|a, b| {
        a.onset
            .cmp(&b.onset)
            .then_with(|| a.midi.cmp(&b.midi))
            .then_with(|| a.duration.cmp(&b.duration))
    });

    let header_lines = build_header_lines(title);

    let mut notes = Vec::new();
    let mut grouped_patterns = Vec::new();
    let mut missing_notes = Vec::new();
    if options.include_text || options.include_fingerings {
        notes = collect_arranged_notes(&sorted_events, instrument, prefer_flats);
        if options.include_fingerings {
            let (patterns, missing) = group_patterns(&notes);
            grouped_patterns = patterns;
            missing_notes = missing;
        }
    }

    let mut pdf = PdfWriter::new(&layout);

    if options.include_piano_roll {
        let pages = piano_roll::build_piano_roll_pages(
            &layout,
            &sorted_events,
            pulses_per_quarter,
            time_signature,
            tempo_markers,
            &header_lines,
            prefer_flats,
        );
        info!("piano roll: {} page(s)", pages.len());
        pdf.add_pages(pages);
    }

    if options.include_text {
        let pages = text::build_text_pages(&layout, instrument, &notes, &header_lines);
        info!("pattern text: {} page(s)", pages.len());
        pdf.add_pages(pages);
    }

    if options.include_staff {
        let pages = staff::build_staff_pages(
            &layout,
            &sorted_events,
            pulses_per_quarter,
            time_signature,
            &header_lines,
        );
        info!("staff view: {} page(s)", pages.len());
        pdf.add_pages(pages);
    }

    if options.include_fingerings {
        let pages = fingering::build_fingering_pages(
            &layout,
            &grouped_patterns,
            &missing_notes,
            instrument,
            columns,
            &header_lines,
        );
        info!("fingerings: {} page(s)", pages.len());
        pdf.add_pages(pages);
    }

    Ok(pdf)
}

/// Render the arranged score and write it to `output_path`.
///
/// The document is fully assembled before the first byte is written, so
/// a failed write never leaves a partial file behind.
#[allow(clippy::too_many_arguments)]
pub fn export_arranged_pdf(
    output_path: &Path,
    events: &[NoteEvent],
    pulses_per_quarter: i64,
    time_signature: &TimeSignature,
    tempo_markers: &[TempoMarker],
    instrument: &InstrumentSpec,
    options: &ExportOptions,
    title: Option<&str>,
    prefer_flats: bool,
) -> Result<(), ExportError> {
    let pdf = build_document(
        events,
        pulses_per_quarter,
        time_signature,
        tempo_markers,
        instrument,
        options,
        title,
        prefer_flats,
    )?;
    pdf.write(output_path)
}

/// Placeholder page used by generators when there are no note events.
pub(crate) fn no_notes_page(
    layout: &PageLayout,
    header_lines: &[HeaderLine],
    heading: &str,
) -> PageBuilder {
    let mut page = PageBuilder::new(layout);
    draw_document_header(&mut page, layout, header_lines);
    let top =
        layout.margin_top + header_height(layout, header_lines) + header_gap(layout, header_lines);
    page.draw_text(layout.margin_left, top, heading, layout.font_size + 2.0);
    page.draw_text(
        layout.margin_left,
        top + layout.line_height,
        "(No arranged notes found)",
        layout.font_size,
    );
    page
}

/// Centered footer page number, drawn only for multi-page sections.
pub(crate) fn draw_page_footer(
    page: &mut PageBuilder,
    layout: &PageLayout,
    page_number: usize,
    total_pages: usize,
) {
    if total_pages <= 1 {
        return;
    }
    let label = format!("Page {page_number} of {total_pages}");
    let size = layout.font_size - 1.0;
    let width = page.estimate_text_width(&label, Font::Body, size);
    let x = (layout.width - width) / 2.0;
    let y = layout.height - layout.margin_bottom + layout.line_height * 0.75;
    page.draw_text(x, y, &label, size);
}
