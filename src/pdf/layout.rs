//! Page geometry resolution — size key + orientation to concrete metrics.

use serde::{Deserialize, Serialize};

use super::ExportError;

/// Resolved page geometry for one export.
///
/// Created once by [`resolve_layout`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Normalized size key: "A4" or "A6"
    pub page_size: String,
    /// Normalized orientation: "portrait" or "landscape"
    pub orientation: String,
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub font_size: f64,
    pub line_height: f64,
}

impl PageLayout {
    /// Whether this is the smaller of the two supported page sizes.
    pub fn is_small(&self) -> bool {
        self.page_size == "A6"
    }

    /// Content width between the left/right margins.
    pub fn content_width(&self) -> f64 {
        (self.width - 2.0 * self.margin_left).max(1.0)
    }
}

// ISO 216 dimensions in PDF points (1/72 inch).
const A4_PORTRAIT: (f64, f64) = (595.28, 841.89);
const A6_PORTRAIT: (f64, f64) = (297.64, 419.53);

/// Resolve a page size key + orientation into a concrete geometry.
///
/// Only "A4"/"A6" and "portrait"/"landscape" are recognized (both
/// case-insensitive); landscape swaps width and height exactly.
pub fn resolve_layout(page_size: &str, orientation: &str) -> Result<PageLayout, ExportError> {
    let size = page_size.trim().to_uppercase();
    let orient = orientation.trim().to_lowercase();

    let (portrait, margin_left, margin_top, margin_bottom, font_size, line_height) =
        match size.as_str() {
            "A4" => (A4_PORTRAIT, 40.0, 42.0, 36.0, 11.0, 14.0),
            "A6" => (A6_PORTRAIT, 20.0, 24.0, 20.0, 8.0, 10.0),
            _ => return Err(ExportError::UnsupportedPageSize(page_size.to_string())),
        };

    let (width, height) = match orient.as_str() {
        "portrait" => portrait,
        "landscape" => (portrait.1, portrait.0),
        _ => return Err(ExportError::UnsupportedOrientation(orientation.to_string())),
    };

    Ok(PageLayout {
        page_size: size,
        orientation: orient,
        width,
        height,
        margin_left,
        margin_top,
        margin_bottom,
        font_size,
        line_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_swaps_dimensions_exactly() {
        let portrait = resolve_layout("A4", "portrait").unwrap();
        let landscape = resolve_layout("A4", "landscape").unwrap();
        assert_eq!(portrait.width, landscape.height);
        assert_eq!(portrait.height, landscape.width);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let layout = resolve_layout(" a6 ", "LANDSCAPE").unwrap();
        assert_eq!(layout.page_size, "A6");
        assert_eq!(layout.orientation, "landscape");
    }

    #[test]
    fn rejects_unknown_inputs() {
        assert!(matches!(
            resolve_layout("Letter", "portrait"),
            Err(ExportError::UnsupportedPageSize(_))
        ));
        assert!(matches!(
            resolve_layout("A4", "diagonal"),
            Err(ExportError::UnsupportedOrientation(_))
        ));
    }
}
