//! PDF document serializer — objects, cross-reference table, trailer.
//!
//! The writer owns the finished pages and assembles the complete file in
//! memory: catalog, page tree, the two shared font resources, one page +
//! content-stream object per page, and one link-annotation object per
//! recorded hyperlink. Only after the byte vector is complete does
//! anything touch the filesystem.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;

use super::layout::PageLayout;
use super::page::{encode_latin1, PageBuilder};
use super::ExportError;

const CATALOG_OBJ: u32 = 1;
const PAGES_OBJ: u32 = 2;

/// Collects drawn pages and serializes them into a PDF byte stream.
pub struct PdfWriter {
    layout: PageLayout,
    pages: Vec<PageBuilder>,
}

impl PdfWriter {
    pub fn new(layout: &PageLayout) -> Self {
        Self {
            layout: layout.clone(),
            pages: Vec::new(),
        }
    }

    pub fn add_page(&mut self, page: PageBuilder) {
        self.pages.push(page);
    }

    pub fn add_pages(&mut self, pages: Vec<PageBuilder>) {
        self.pages.extend(pages);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize the document into its final byte form.
    ///
    /// An empty page list still produces a single blank page; the output
    /// is never an empty file.
    pub fn render(&self) -> Vec<u8> {
        let blank;
        let pages: Vec<&PageBuilder> = if self.pages.is_empty() {
            blank = PageBuilder::new(&self.layout);
            vec![&blank]
        } else {
            self.pages.iter().collect()
        };

        let font_specs: [(&str, &str); 2] = [("F1", "/Helvetica"), ("F2", "/Courier")];
        let mut objects: BTreeMap<u32, Vec<u8>> = BTreeMap::new();
        let mut font_numbers: Vec<(&str, u32)> = Vec::new();
        let mut next_object = PAGES_OBJ + 1;

        for (name, base_font) in font_specs {
            font_numbers.push((name, next_object));
            objects.insert(
                next_object,
                encode_line(&format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont {base_font} >>"
                )),
            );
            next_object += 1;
        }

        let font_entries = font_numbers
            .iter()
            .map(|(font, obj)| format!("/{font} {obj} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");

        let mut page_numbers: Vec<u32> = Vec::with_capacity(pages.len());
        for page in &pages {
            let page_obj = next_object;
            let content_obj = next_object + 1;
            next_object += 2;

            let mut annot_refs: Vec<String> = Vec::new();
            for link in page.links() {
                let annot_obj = next_object;
                next_object += 1;
                objects.insert(annot_obj, self.annotation_object(link));
                annot_refs.push(format!("{annot_obj} 0 R"));
            }

            let annots = if annot_refs.is_empty() {
                String::new()
            } else {
                format!(" /Annots [{}]", annot_refs.join(" "))
            };
            objects.insert(
                page_obj,
                encode_line(&format!(
                    "<< /Type /Page /Parent {PAGES_OBJ} 0 R \
                     /Resources << /Font << {font_entries} >> >> \
                     /MediaBox [0 0 {:.2} {:.2}] /Contents {content_obj} 0 R{annots} >>",
                    self.layout.width, self.layout.height
                )),
            );
            objects.insert(content_obj, page.build_stream());
            page_numbers.push(page_obj);
        }

        let kids = page_numbers
            .iter()
            .map(|num| format!("{num} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        objects.insert(
            CATALOG_OBJ,
            encode_line(&format!("<< /Type /Catalog /Pages {PAGES_OBJ} 0 R >>")),
        );
        objects.insert(
            PAGES_OBJ,
            encode_line(&format!(
                "<< /Type /Pages /Kids [{kids}] /Count {} >>",
                page_numbers.len()
            )),
        );

        let max_obj = objects.keys().max().copied().unwrap_or(PAGES_OBJ);
        let mut offsets = vec![0usize; max_obj as usize + 1];
        let mut buffer: Vec<u8> = Vec::new();
        buffer.extend_from_slice(b"%PDF-1.4\n");

        for obj_num in 1..=max_obj {
            let Some(data) = objects.get(&obj_num) else {
                continue;
            };
            offsets[obj_num as usize] = buffer.len();
            buffer.extend_from_slice(&encode_line(&format!("{obj_num} 0 obj")));
            buffer.extend_from_slice(data);
            if !data.ends_with(b"\n") {
                buffer.push(b'\n');
            }
            buffer.extend_from_slice(b"endobj\n");
        }

        let xref_offset = buffer.len();
        buffer.extend_from_slice(&encode_line(&format!("xref\n0 {}", max_obj + 1)));
        buffer.extend_from_slice(b"0000000000 65535 f \n");
        for obj_num in 1..=max_obj as usize {
            let offset = offsets[obj_num];
            if offset == 0 {
                buffer.extend_from_slice(b"0000000000 65535 f \n");
            } else {
                buffer.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
            }
        }
        buffer.extend_from_slice(&encode_line(&format!(
            "trailer << /Size {} /Root {CATALOG_OBJ} 0 R >>\nstartxref\n{xref_offset}\n%%EOF",
            max_obj + 1
        )));

        debug!(
            "serialized pdf: {} pages, {} objects, {} bytes",
            pages.len(),
            objects.len(),
            buffer.len()
        );
        buffer
    }

    /// Assemble the document and write it to `path` in one step.
    ///
    /// Parent directories are created as needed; a failed write leaves no
    /// partial file because the bytes are fully assembled first.
    pub fn write(&self, path: &Path) -> Result<(), ExportError> {
        let data = self.render();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Serialize a link annotation, converting the recorded top-left
    /// rectangle to the PDF bottom-left rectangle.
    fn annotation_object(&self, link: &super::page::LinkAnnotation) -> Vec<u8> {
        let x1 = link.x;
        let y1 = self.layout.height - (link.y + link.height);
        let x2 = link.x + link.width;
        let y2 = self.layout.height - link.y;
        let uri = link
            .uri
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        encode_line(&format!(
            "<< /Type /Annot /Subtype /Link /Rect [{x1:.2} {y1:.2} {x2:.2} {y2:.2}] \
             /Border [0 0 0] /C [0 0 1] /A << /S /URI /URI ({uri}) >> >>"
        ))
    }
}

fn encode_line(text: &str) -> Vec<u8> {
    let mut bytes = encode_latin1(text);
    bytes.push(b'\n');
    bytes
}
