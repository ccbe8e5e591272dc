//! Page builder — accumulates PDF content-stream operators for one page.
//!
//! All public coordinates are in page space (origin top-left, y grows
//! downward). The builder converts to PDF device space (origin
//! bottom-left) as commands are emitted; no other component performs
//! this flip.

use super::constants::{BODY_FONT_WIDTH_FACTOR, MONO_FONT_WIDTH_FACTOR};
use super::layout::PageLayout;

/// Bézier circle approximation constant.
const KAPPA: f64 = 0.5522847498307936;

/// Font resources registered with every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Proportional body font (Helvetica)
    Body,
    /// Monospace font (Courier)
    Mono,
}

impl Font {
    /// Resource name used inside content streams ("/F1 ... Tf").
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Body => "F1",
            Font::Mono => "F2",
        }
    }

    fn width_factor(&self) -> f64 {
        match self {
            Font::Body => BODY_FONT_WIDTH_FACTOR,
            Font::Mono => MONO_FONT_WIDTH_FACTOR,
        }
    }
}

/// Fill color for text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextColor {
    Gray(f64),
    Rgb(f64, f64, f64),
}

/// A clickable rectangle recorded in page space.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnnotation {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub uri: String,
}

/// Accumulator of drawing commands and link annotations for one page.
pub struct PageBuilder {
    layout: PageLayout,
    commands: Vec<String>,
    links: Vec<LinkAnnotation>,
}

impl PageBuilder {
    pub fn new(layout: &PageLayout) -> Self {
        Self {
            layout: layout.clone(),
            commands: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Raw content-stream commands recorded so far.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn links(&self) -> &[LinkAnnotation] {
        &self.links
    }

    /// Draw text at the given baseline position with the body font.
    pub fn draw_text(&mut self, x: f64, y: f64, text: &str, size: f64) {
        self.draw_text_styled(x, y, text, Font::Body, size, 0.0, TextColor::Gray(0.0));
    }

    /// Draw text with full styling: font, rotation (0 or ±90 degrees
    /// supported), and gray or RGB fill.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text_styled(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        font: Font,
        size: f64,
        angle: f64,
        color: TextColor,
    ) {
        let baseline = self.layout.height - y;
        let escaped = escape_text(text);

        let (a, b, c, d) = if angle.abs() <= 1e-6 {
            (1.0, 0.0, 0.0, 1.0)
        } else {
            let radians = angle.to_radians();
            let mut cos_theta = radians.cos();
            let mut sin_theta = radians.sin();
            if cos_theta.abs() < 1e-6 {
                cos_theta = 0.0;
            }
            if sin_theta.abs() < 1e-6 {
                sin_theta = 0.0;
            }
            (cos_theta, sin_theta, -sin_theta, cos_theta)
        };

        let fill = match color {
            TextColor::Gray(gray) => format!("{gray:.3} g"),
            TextColor::Rgb(r, g, b) => format!("{r:.3} {g:.3} {b:.3} rg"),
        };

        self.commands.push("q".to_string());
        self.commands.push(fill);
        self.commands.push("BT".to_string());
        self.commands
            .push(format!("/{} {size:.2} Tf", font.resource_name()));
        self.commands
            .push(format!("{a:.2} {b:.2} {c:.2} {d:.2} {x:.2} {baseline:.2} Tm"));
        self.commands.push(format!("({escaped}) Tj"));
        self.commands.push("ET".to_string());
        self.commands.push("Q".to_string());
    }

    pub fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, gray: f64, line_width: f64) {
        let (px1, py1) = self.to_pdf_point(x1, y1);
        let (px2, py2) = self.to_pdf_point(x2, y2);
        self.commands.push("q".to_string());
        self.commands.push(format!("{gray:.3} G"));
        self.commands.push(format!("{line_width:.2} w"));
        self.commands.push(format!("{px1:.2} {py1:.2} m"));
        self.commands.push(format!("{px2:.2} {py2:.2} l"));
        self.commands.push("S".to_string());
        self.commands.push("Q".to_string());
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill_gray: Option<f64>,
        stroke_gray: Option<f64>,
        line_width: f64,
    ) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let py = self.layout.height - (y + height);
        self.commands.push("q".to_string());
        if let Some(gray) = stroke_gray {
            self.commands.push(format!("{gray:.3} G"));
            self.commands.push(format!("{line_width:.2} w"));
        }
        if let Some(gray) = fill_gray {
            self.commands.push(format!("{gray:.3} g"));
        }
        self.commands
            .push(format!("{x:.2} {py:.2} {width:.2} {height:.2} re"));
        self.commands
            .push(paint_operator(fill_gray, stroke_gray).to_string());
        self.commands.push("Q".to_string());
    }

    pub fn draw_circle(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        fill_gray: Option<f64>,
        stroke_gray: Option<f64>,
        line_width: f64,
    ) {
        self.draw_oval(cx, cy, radius, radius, fill_gray, stroke_gray, line_width);
    }

    /// Draw an axis-aligned oval from four Bézier arcs.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_oval(
        &mut self,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        fill_gray: Option<f64>,
        stroke_gray: Option<f64>,
        line_width: f64,
    ) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let (px, py) = self.to_pdf_point(cx, cy);
        let kx = rx * KAPPA;
        let ky = ry * KAPPA;
        self.commands.push("q".to_string());
        if let Some(gray) = stroke_gray {
            self.commands.push(format!("{gray:.3} G"));
            self.commands.push(format!("{line_width:.2} w"));
        }
        if let Some(gray) = fill_gray {
            self.commands.push(format!("{gray:.3} g"));
        }
        self.commands.push(format!("{:.2} {py:.2} m", px + rx));
        self.commands.push(format!(
            "{:.2} {:.2} {:.2} {:.2} {px:.2} {:.2} c",
            px + rx,
            py + ky,
            px + kx,
            py + ry,
            py + ry
        ));
        self.commands.push(format!(
            "{:.2} {:.2} {:.2} {:.2} {:.2} {py:.2} c",
            px - kx,
            py + ry,
            px - rx,
            py + ky,
            px - rx
        ));
        self.commands.push(format!(
            "{:.2} {:.2} {:.2} {:.2} {px:.2} {:.2} c",
            px - rx,
            py - ky,
            px - kx,
            py - ry,
            py - ry
        ));
        self.commands.push(format!(
            "{:.2} {:.2} {:.2} {:.2} {:.2} {py:.2} c",
            px + kx,
            py - ry,
            px + rx,
            py - ky,
            px + rx
        ));
        self.commands
            .push(paint_operator(fill_gray, stroke_gray).to_string());
        self.commands.push("Q".to_string());
    }

    /// Fill the left half of a circle (used for half-covered holes).
    pub fn fill_half_circle(&mut self, cx: f64, cy: f64, radius: f64, fill_gray: f64) {
        if radius <= 0.0 {
            return;
        }
        let (px, py) = self.to_pdf_point(cx, cy);
        let k = radius * KAPPA;
        self.commands.push("q".to_string());
        self.commands.push(format!("{fill_gray:.3} g"));
        self.commands.push(format!("{px:.2} {:.2} m", py + radius));
        self.commands.push(format!(
            "{:.2} {:.2} {:.2} {:.2} {:.2} {py:.2} c",
            px - k,
            py + radius,
            px - radius,
            py + k,
            px - radius
        ));
        self.commands.push(format!(
            "{:.2} {:.2} {:.2} {:.2} {px:.2} {:.2} c",
            px - radius,
            py - k,
            px - k,
            py - radius,
            py - radius
        ));
        self.commands.push("h".to_string());
        self.commands.push("f".to_string());
        self.commands.push("Q".to_string());
    }

    pub fn draw_polygon(
        &mut self,
        points: &[(f64, f64)],
        closed: bool,
        fill_gray: Option<f64>,
        stroke_gray: Option<f64>,
        line_width: f64,
    ) {
        if points.len() < 2 {
            return;
        }
        self.commands.push("q".to_string());
        if let Some(gray) = stroke_gray {
            self.commands.push(format!("{gray:.3} G"));
            self.commands.push(format!("{line_width:.2} w"));
        }
        if let Some(gray) = fill_gray {
            self.commands.push(format!("{gray:.3} g"));
        }
        let (sx, sy) = self.to_pdf_point(points[0].0, points[0].1);
        self.commands.push(format!("{sx:.2} {sy:.2} m"));
        for &(x, y) in &points[1..] {
            let (px, py) = self.to_pdf_point(x, y);
            self.commands.push(format!("{px:.2} {py:.2} l"));
        }
        if closed {
            self.commands.push("h".to_string());
        }
        self.commands
            .push(paint_operator(fill_gray, stroke_gray).to_string());
        self.commands.push("Q".to_string());
    }

    /// Approximate rendered width of `text` at the given size.
    ///
    /// This is a coarse average-glyph-width model (character count ×
    /// size × per-font factor), not real font metrics; column packing is
    /// tuned against it, so callers must not assume sub-pixel accuracy.
    pub fn estimate_text_width(&self, text: &str, font: Font, size: f64) -> f64 {
        text.chars().count() as f64 * size * font.width_factor()
    }

    /// Record a clickable rectangle; the writer converts it to the PDF
    /// bottom-left rectangle when the annotation object is emitted.
    pub fn add_link_annotation(&mut self, x: f64, y: f64, width: f64, height: f64, uri: &str) {
        self.links.push(LinkAnnotation {
            x,
            y,
            width,
            height,
            uri: uri.to_string(),
        });
    }

    /// Serialize the recorded commands into a PDF stream object body.
    pub fn build_stream(&self) -> Vec<u8> {
        let content = encode_latin1(&self.commands.join("\n"));
        let mut stream = encode_latin1(&format!("<< /Length {} >>\n", content.len()));
        stream.extend_from_slice(b"stream\n");
        stream.extend_from_slice(&content);
        stream.extend_from_slice(b"\nendstream\n");
        stream
    }

    fn to_pdf_point(&self, x: f64, y: f64) -> (f64, f64) {
        (x, self.layout.height - y)
    }
}

fn paint_operator(fill: Option<f64>, stroke: Option<f64>) -> &'static str {
    match (fill, stroke) {
        (Some(_), Some(_)) => "B",
        (Some(_), None) => "f",
        (None, Some(_)) => "S",
        (None, None) => "n",
    }
}

/// Escape PDF string delimiters.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Encode text as latin-1 bytes; characters outside the range become '?'.
pub(super) fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| {
            let code = ch as u32;
            if code <= 0xFF {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::layout::resolve_layout;

    fn page() -> PageBuilder {
        let layout = resolve_layout("A4", "portrait").unwrap();
        PageBuilder::new(&layout)
    }

    #[test]
    fn text_flips_to_bottom_left_baseline() {
        let mut builder = page();
        builder.draw_text(10.0, 42.0, "Hello", 11.0);
        let blob = builder.commands().join("\n");
        assert!(blob.contains("(Hello) Tj"));
        assert!(blob.contains(&format!("10.00 {:.2} Tm", 841.89 - 42.0)));
    }

    #[test]
    fn rotated_text_uses_rotation_matrix() {
        let mut builder = page();
        builder.draw_text_styled(
            10.0,
            50.0,
            "T1",
            Font::Mono,
            11.0,
            -90.0,
            TextColor::Gray(0.0),
        );
        let blob = builder.commands().join("\n");
        assert!(blob.contains("0.00 -1.00 1.00 0.00"));
        assert!(blob.contains("/F2"));
    }

    #[test]
    fn escapes_reserved_characters() {
        let mut builder = page();
        builder.draw_text(0.0, 0.0, "a(b)c\\d", 10.0);
        let blob = builder.commands().join("\n");
        assert!(blob.contains("(a\\(b\\)c\\\\d) Tj"));
    }

    #[test]
    fn degenerate_shapes_are_skipped() {
        let mut builder = page();
        builder.draw_rect(0.0, 0.0, 0.0, 10.0, Some(0.5), None, 1.0);
        builder.draw_circle(0.0, 0.0, -1.0, Some(0.5), None, 1.0);
        builder.draw_polygon(&[(0.0, 0.0)], true, Some(0.5), None, 1.0);
        assert!(builder.commands().is_empty());
    }

    #[test]
    fn width_estimate_scales_with_length_and_font() {
        let builder = page();
        let short = builder.estimate_text_width("ab", Font::Mono, 10.0);
        let long = builder.estimate_text_width("abcd", Font::Mono, 10.0);
        assert!((long - 2.0 * short).abs() < 1e-9);
        let body = builder.estimate_text_width("abcd", Font::Body, 10.0);
        assert!(body < long);
    }

    #[test]
    fn non_latin_characters_are_replaced() {
        assert_eq!(encode_latin1("a♩b"), vec![b'a', b'?', b'b']);
    }
}
