//! sheetlib — arranged-score PDF rendering library for SheetArranger.
//!
//! Takes a pre-arranged sequence of note events plus an instrument
//! definition and renders piano-roll, fingering-text, staff-notation,
//! and fingering-diagram pages into a self-contained PDF, building every
//! structural object of the file by hand.
//!
//! # Example
//! ```no_run
//! use std::path::Path;
//! use sheetlib::{export_arranged_pdf, ExportOptions, InstrumentSpec, NoteEvent, TimeSignature};
//!
//! let instrument = InstrumentSpec::from_json(
//!     r#"{
//!         "id": "alto", "name": "Alto C",
//!         "canvas_width": 160.0, "canvas_height": 120.0,
//!         "holes": [{"id": "h1", "x": 40.0, "y": 40.0, "radius": 10.0}],
//!         "note_map": {"C4": [2]}
//!     }"#,
//! )
//! .unwrap();
//! let events = vec![NoteEvent::new(0, 480, 60, 79)];
//! export_arranged_pdf(
//!     Path::new("arranged.pdf"),
//!     &events,
//!     480,
//!     &TimeSignature::new(4, 4),
//!     &[],
//!     &instrument,
//!     &ExportOptions::new("A4", "portrait"),
//!     Some("My Song"),
//!     true,
//! )
//! .unwrap();
//! ```

pub mod model;
pub mod outline;
pub mod patterns;
pub mod pdf;
pub mod pitch;
pub mod values;

pub use model::*;
pub use patterns::{collect_arranged_notes, group_patterns, resolve_pattern};
pub use pdf::header::{build_header_lines, header_gap, header_height, HeaderLine};
pub use pdf::layout::{resolve_layout, PageLayout};
pub use pdf::page::{Font, PageBuilder, TextColor};
pub use pdf::writer::PdfWriter;
pub use pdf::{export_arranged_pdf, render_arranged_pdf, ExportError};
pub use values::{
    describe_note_glyph, describe_note_value, NoteGlyphDescription, NoteValueDescription,
};
