//! Data model for the arranged-score PDF exporter.
//!
//! These structures capture the pre-computed inputs handed to the
//! renderer (note events, tempo markers, instrument geometry) and the
//! fingering metadata derived from them.

use serde::{Deserialize, Serialize};

/// A single arranged note event on the tick timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Onset position in ticks (>= 0)
    pub onset: i64,
    /// Sounding duration in ticks (> 0)
    pub duration: i64,
    /// MIDI pitch number (middle C = 60)
    pub midi: i32,
    /// General MIDI program of the originating part
    pub program: i32,
    /// Durations of tie continuations following this note, in ticks.
    /// Empty for untied notes.
    #[serde(default)]
    pub tie_durations: Vec<i64>,
    /// Whether this is a grace note
    #[serde(default)]
    pub grace: bool,
}

impl NoteEvent {
    /// Create a plain (untied, non-grace) note event.
    pub fn new(onset: i64, duration: i64, midi: i32, program: i32) -> Self {
        Self {
            onset,
            duration,
            midi,
            program,
            tie_durations: Vec::new(),
            grace: false,
        }
    }

    /// Last tick covered by this event, including tie continuations.
    pub fn end_tick(&self) -> i64 {
        let tied: i64 = self.tie_durations.iter().sum();
        self.onset + self.duration.max(1) + tied
    }
}

/// Time signature of the arranged score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub beats: i32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_type: i32,
}

impl TimeSignature {
    pub fn new(beats: i32, beat_type: i32) -> Self {
        Self { beats, beat_type }
    }

    /// Ticks covered by one measure at the given resolution.
    pub fn ticks_per_measure(&self, pulses_per_quarter: i64) -> i64 {
        let ppq = pulses_per_quarter.max(1);
        let beats = self.beats.max(1) as i64;
        let beat_type = self.beat_type.max(1) as i64;
        (ppq * 4 * beats / beat_type).max(1)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self { beats: 4, beat_type: 4 }
    }
}

/// A tempo annotation at a tick position, with a pre-formatted label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoMarker {
    pub tick: i64,
    pub label: String,
}

impl TempoMarker {
    pub fn new(tick: i64, label: impl Into<String>) -> Self {
        Self {
            tick: tick.max(0),
            label: label.into(),
        }
    }
}

/// Normalized options describing how to render an arranged PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Page size key: "A4" or "A6"
    pub page_size: String,
    /// Orientation: "portrait" or "landscape"
    pub orientation: String,
    /// Fingering diagram columns; resolved from the page geometry when None
    pub columns: Option<u32>,
    pub include_piano_roll: bool,
    pub include_staff: bool,
    pub include_text: bool,
    pub include_fingerings: bool,
}

impl ExportOptions {
    pub fn new(page_size: &str, orientation: &str) -> Self {
        Self {
            page_size: page_size.trim().to_uppercase(),
            orientation: orientation.trim().to_lowercase(),
            columns: None,
            include_piano_roll: true,
            include_staff: true,
            include_text: true,
            include_fingerings: true,
        }
    }

    /// Columns to use for the fingering diagram grid.
    pub fn resolved_columns(&self) -> u32 {
        match self.columns {
            Some(count) => count,
            None => Self::default_columns_for(&self.page_size, &self.orientation),
        }
    }

    /// Default fingering column count for a page size + orientation.
    pub fn default_columns_for(page_size: &str, orientation: &str) -> u32 {
        let size = page_size.trim().to_uppercase();
        let orient = orientation.trim().to_lowercase();
        match (size.as_str(), orient.as_str()) {
            ("A6", "landscape") => 4,
            ("A6", _) => 2,
            _ => 4,
        }
    }

    /// Short description such as "A4 Portrait" for host UI labels.
    pub fn label(&self) -> String {
        let mut orient = self.orientation.clone();
        if let Some(first) = orient.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        format!("{} {}", self.page_size, orient)
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new("A4", "portrait")
    }
}

/// Specification for a fingering hole on the instrument canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleSpec {
    /// Identifier shown as a column header (e.g., "T1", "L4")
    #[serde(default)]
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_hole_radius")]
    pub radius: f64,
}

fn default_hole_radius() -> f64 {
    8.0
}

/// Outline of the instrument body on its canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSpec {
    /// Polyline points in canvas coordinates
    pub points: Vec<(f64, f64)>,
    /// Whether the outline closes back to its first point
    #[serde(default)]
    pub closed: bool,
}

/// Visual style settings for instrument diagrams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    /// Whether the outline is smoothed with a spline pass
    #[serde(default = "default_true")]
    pub outline_smooth: bool,
    /// Interpolation steps per spline segment
    #[serde(default = "default_spline_steps")]
    pub outline_spline_steps: u32,
}

fn default_true() -> bool {
    true
}

fn default_spline_steps() -> u32 {
    48
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            outline_smooth: true,
            outline_spline_steps: 48,
        }
    }
}

/// An instrument definition supplied by the instrument library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    /// Canvas dimensions the hole/outline coordinates are expressed in
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub holes: Vec<HoleSpec>,
    #[serde(default)]
    pub outline: Option<OutlineSpec>,
    #[serde(default)]
    pub style: StyleSpec,
    /// Note name (e.g., "C4", "Bb4") → hole states (0 open, 1 half, 2 closed)
    #[serde(default)]
    pub note_map: std::collections::BTreeMap<String, Vec<u8>>,
}

impl InstrumentSpec {
    /// Parse an instrument definition from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid instrument spec: {e}"))
    }

    /// Look up the hole states for a note name.
    pub fn pattern_for(&self, note_name: &str) -> Option<&[u8]> {
        self.note_map.get(note_name).map(|states| states.as_slice())
    }
}

/// One note of the arrangement with its resolved fingering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrangedNote {
    /// 1-based sequence index
    pub index: usize,
    pub midi: i32,
    pub note_name: String,
    /// ASCII rendering of the pattern ("XO/"), or "N/A" when unresolved
    pub pattern_text: String,
    /// Hole states padded to the instrument hole count; None when unresolved
    pub pattern_state: Option<Vec<u8>>,
}

/// A distinct fingering pattern and the notes that use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternData {
    pub pattern: Vec<u8>,
    pub pattern_text: String,
    /// Note names using this pattern, deduplicated in first-seen order
    pub note_names: Vec<String>,
    /// Lowest MIDI pitch among the notes, used for sort order
    pub lowest_midi: Option<i32>,
}
