//! Shared helpers for rendering consistent page headers.

use super::layout::PageLayout;
use super::page::{Font, PageBuilder, TextColor};

/// GitHub repository the attribution line links to.
const GITHUB_REPO: &str = "SheetLab/SheetArranger";

const HEADER_GAP_MULTIPLIER: f64 = 0.5;
const LINK_COLOR: (f64, f64, f64) = (0.0, 0.2, 0.8);

/// A logical line within the document header.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderLine {
    pub text: String,
    pub font: Font,
    pub link: Option<String>,
    pub color_rgb: Option<(f64, f64, f64)>,
}

impl HeaderLine {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: Font::Body,
            link: None,
            color_rgb: None,
        }
    }
}

/// Create the header lines rendered at the top of every page.
///
/// The optional title comes first (omitted when blank), followed by the
/// fixed attribution line that links to the project repository.
pub fn build_header_lines(title: Option<&str>) -> Vec<HeaderLine> {
    let mut lines: Vec<HeaderLine> = Vec::new();

    let title = title.map(str::trim).unwrap_or("");
    if !title.is_empty() {
        lines.push(HeaderLine::plain(title));
    }

    let (account, app) = split_github_repo(GITHUB_REPO);
    let label = format!("{account} {app}").trim().to_string();
    let link_label = if label.is_empty() {
        GITHUB_REPO.to_string()
    } else {
        label
    };
    lines.push(HeaderLine {
        text: link_label,
        font: Font::Body,
        link: Some(format!("https://github.com/{GITHUB_REPO}")),
        color_rgb: Some(LINK_COLOR),
    });
    lines
}

/// Render the common document header and return its height.
pub fn draw_document_header(
    page: &mut PageBuilder,
    layout: &PageLayout,
    header_lines: &[HeaderLine],
) -> f64 {
    if header_lines.is_empty() {
        return 0.0;
    }

    let mut y = layout.margin_top;
    for line in header_lines {
        let color = match line.color_rgb {
            Some((r, g, b)) => TextColor::Rgb(r, g, b),
            None => TextColor::Gray(0.0),
        };
        page.draw_text_styled(
            layout.margin_left,
            y,
            &line.text,
            line.font,
            layout.font_size,
            0.0,
            color,
        );
        if let Some(ref uri) = line.link {
            let width = page.estimate_text_width(&line.text, line.font, layout.font_size);
            page.add_link_annotation(layout.margin_left, y, width, layout.line_height, uri);
        }
        y += layout.line_height;
    }
    header_height(layout, header_lines)
}

/// Rendered height of the header block.
pub fn header_height(layout: &PageLayout, header_lines: &[HeaderLine]) -> f64 {
    header_lines.len() as f64 * layout.line_height
}

/// Vertical gap inserted after the header block.
pub fn header_gap(layout: &PageLayout, header_lines: &[HeaderLine]) -> f64 {
    if header_lines.is_empty() {
        0.0
    } else {
        layout.line_height * HEADER_GAP_MULTIPLIER
    }
}

fn split_github_repo(repo: &str) -> (&str, &str) {
    match repo.split_once('/') {
        Some((account, app)) => (account.trim(), app.trim()),
        None => (repo, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::layout::resolve_layout;

    #[test]
    fn blank_title_is_omitted() {
        let lines = build_header_lines(Some("   "));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].link.is_some());
    }

    #[test]
    fn title_line_comes_first() {
        let lines = build_header_lines(Some("My Song"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "My Song");
        assert!(lines[0].link.is_none());
        assert_eq!(lines[1].text, "SheetLab SheetArranger");
    }

    #[test]
    fn header_metrics_scale_with_line_count() {
        let layout = resolve_layout("A4", "portrait").unwrap();
        let lines = build_header_lines(Some("Title"));
        assert_eq!(header_height(&layout, &lines), 2.0 * layout.line_height);
        assert_eq!(header_gap(&layout, &lines), 0.5 * layout.line_height);
        assert_eq!(header_gap(&layout, &[]), 0.0);
    }

    #[test]
    fn link_line_records_an_annotation() {
        let layout = resolve_layout("A4", "portrait").unwrap();
        let lines = build_header_lines(None);
        let mut page = PageBuilder::new(&layout);
        let height = draw_document_header(&mut page, &layout, &lines);
        assert_eq!(height, layout.line_height);
        assert_eq!(page.links().len(), 1);
        assert!(page.links()[0].uri.contains("github.com/SheetLab"));
    }
}
