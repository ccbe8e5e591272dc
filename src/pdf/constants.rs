//! Shared constants for the PDF page generators (all in PDF points).

// ── Fonts ───────────────────────────────────────────────────────────
pub(super) const BODY_FONT_WIDTH_FACTOR: f64 = 0.5; // Helvetica average glyph
pub(super) const MONO_FONT_WIDTH_FACTOR: f64 = 0.6; // Courier advance

// ── Piano roll ──────────────────────────────────────────────────────
pub(super) const PX_PER_QUARTER: f64 = 18.0; // halved for A6
pub(super) const MIN_QUARTERS_PER_PAGE: i64 = 4;
pub(super) const ROLL_ROW_MIN_HEIGHT: f64 = 6.0;
pub(super) const ROLL_BLACK_KEY_ROW_GRAY: f64 = 0.93;
pub(super) const ROLL_WHITE_KEY_ROW_GRAY: f64 = 0.97;
pub(super) const ROLL_BLACK_NOTE_GRAY: f64 = 0.35;
pub(super) const ROLL_WHITE_NOTE_GRAY: f64 = 0.2;
pub(super) const TEMPO_MARKER_PADDING: f64 = 6.0; // gap after the barline

// ── Staff pages ─────────────────────────────────────────────────────
pub(super) const BASE_STAFF_SPACING: f64 = 8.0;
pub(super) const SMALL_PAGE_STAFF_SCALE: f64 = 0.45;
pub(super) const TARGET_PX_PER_TICK: f64 = 0.12;
pub(super) const SYSTEM_SIDE_PADDING_SPACINGS: f64 = 1.25;
pub(super) const SYSTEM_PADDING_SPACINGS: f64 = 2.0;
pub(super) const SYSTEM_SPACING_SPACINGS: f64 = 3.2;
pub(super) const HEADING_PADDING_LINES: f64 = 0.8;
pub(super) const HEADING_EXTRA: f64 = 8.0;

// ── Staff drawing ───────────────────────────────────────────────────
pub(super) const STAFF_LINE_GRAY: f64 = 0.2;
pub(super) const STAFF_LINE_WIDTH: f64 = 1.0;
pub(super) const BARLINE_GRAY: f64 = 0.75;
pub(super) const BARLINE_WIDTH: f64 = 0.5;
pub(super) const LEDGER_GRAY: f64 = 0.4;
pub(super) const LEDGER_WIDTH: f64 = 0.6;
pub(super) const SYSTEM_BOX_FILL_GRAY: f64 = 0.97;
pub(super) const SYSTEM_BOX_STROKE_GRAY: f64 = 0.75;

// ── Text pages ──────────────────────────────────────────────────────
pub(super) const MIN_COLUMN_WIDTH: f64 = 150.0;
pub(super) const COLUMN_GAP_LINES: f64 = 1.5;

// ── Fingering pages ─────────────────────────────────────────────────
pub(super) const DIAGRAM_SPACING: f64 = 14.0;
pub(super) const DIAGRAM_MIN_SCALE: f64 = 0.4;
pub(super) const DIAGRAM_MAX_SCALE: f64 = 1.1;
pub(super) const DIAGRAM_COLUMN_MIN_SCALE: f64 = 0.45;
pub(super) const WIDE_PAGE_DIAGRAM_ROWS: usize = 3;
