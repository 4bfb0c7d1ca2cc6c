//! Office Open XML (`.docx`) package writer built on `docx-rs`.
//!
//! Output is byte-for-byte reproducible: paragraph and picture ids are
//! numbered per package, and the core-property dates come from the
//! document metadata instead of the clock.

mod blocks;

use crate::document::ExamDocument;
use crate::error::{Error, Result};
use blocks::{BlockBuilder, Element};
use chrono::{DateTime, Utc};
use docx_rs::{Docx, Footer, Header, PageMargin, RunFonts, Style, StyleType};
use log::debug;
use std::io::Cursor;

/// MIME type of a `.docx` package.
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Distance of header and footer from the page edge, in twips.
const HEADER_DISTANCE: i32 = 720;

/// Date written when the document carries none.
const EPOCH: &str = "1970-01-01T00:00:00Z";

fn w3cdtf(time: Option<&DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| EPOCH.to_string())
}

/// Heading styles: level 1 and 2, bold, in the accent colour.
fn heading_styles(doc: &ExamDocument) -> Vec<Style> {
    let size = doc.font_size as usize * 2;
    [(1usize, 8usize), (2, 4)]
        .into_iter()
        .map(|(level, bump)| {
            Style::new(&format!("Heading{}", level), StyleType::Paragraph)
                .name(&format!("heading {}", level))
                .based_on("Normal")
                .bold()
                .color(doc.accent_color.as_str())
                .size(size + bump)
        })
        .collect()
}

/// Write a document as a `.docx` package.
pub fn write_docx(doc: &ExamDocument) -> Result<Vec<u8>> {
    let page = &doc.page;
    let font = doc.font_family.as_str();

    let mut docx = Docx::new()
        .page_size(page.width, page.height)
        .page_margin(
            PageMargin::new()
                .top(page.margin_top as i32)
                .right(page.margin_right as i32)
                .bottom(page.margin_bottom as i32)
                .left(page.margin_left as i32)
                .header(HEADER_DISTANCE)
                .footer(HEADER_DISTANCE),
        )
        .default_fonts(RunFonts::new().ascii(font).hi_ansi(font).east_asia(font).cs(font))
        .default_size(doc.font_size as usize * 2)
        .created_at(&w3cdtf(doc.metadata.created.as_ref()))
        .updated_at(&w3cdtf(doc.metadata.modified.as_ref()));
    for style in heading_styles(doc) {
        docx = docx.add_style(style);
    }

    let mut builder = BlockBuilder::new(&doc.media);
    if doc.has_header() {
        let header = builder
            .paragraphs(&doc.header)?
            .into_iter()
            .fold(Header::new(), Header::add_paragraph);
        docx = docx.header(header);
    }
    if doc.has_footer() {
        let footer = builder
            .paragraphs(&doc.footer)?
            .into_iter()
            .fold(Footer::new(), Footer::add_paragraph);
        docx = docx.footer(footer);
    }

    let elements = builder.blocks(&doc.body, page.text_width())?;
    let count = elements.len();
    for element in elements {
        docx = match element {
            Element::Paragraph(p) => docx.add_paragraph(p),
            Element::Table(t) => docx.add_table(t),
        };
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| Error::Package(e.to_string()))?;
    let bytes = cursor.into_inner();

    debug!(
        "Wrote package: {} body elements, {} media, {} bytes",
        count,
        doc.media.len(),
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::media::tests::png_header;
    use crate::document::{Alignment, ImageRun, Media, Paragraph, TextRun};
    use chrono::TimeZone;
    use std::io::Read;

    fn part_names(bytes: &[u8]) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_minimal_package() {
        let mut doc = ExamDocument::new();
        doc.push(Paragraph::with_text("Hello"));
        let bytes = write_docx(&doc).unwrap();

        let names = part_names(&bytes);
        assert!(names.contains(&"word/document.xml".to_string()));
        assert!(names.contains(&"word/styles.xml".to_string()));
        assert!(!names.iter().any(|n| n.starts_with("word/header")));
        assert!(!names.iter().any(|n| n.starts_with("word/media/")));
        assert!(part(&bytes, "word/document.xml").contains(">Hello<"));
    }

    #[test]
    fn test_package_is_deterministic() {
        let mut doc = ExamDocument::new();
        doc.push(Paragraph::with_text("Same"));
        doc.push(Paragraph::heading("Part A", 2));
        assert_eq!(write_docx(&doc).unwrap(), write_docx(&doc).unwrap());
    }

    #[test]
    fn test_core_dates_come_from_metadata() {
        let mut doc = ExamDocument::new();
        doc.metadata.created = Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
        let core = part(&write_docx(&doc).unwrap(), "docProps/core.xml");
        assert!(core.contains("2024-03-01T09:30:00Z"));
        assert!(core.contains(EPOCH));
    }

    #[test]
    fn test_paragraph_properties() {
        let mut doc = ExamDocument::new();
        let mut p = Paragraph::new().align(Alignment::Center);
        p.add_run(TextRun::bold("Q1.").sized(14));
        p.add_text(" a < b");
        doc.push(p);
        doc.push(Paragraph::heading("Algebra", 2));
        doc.push(Paragraph::rule("C00000"));

        let xml = part(&write_docx(&doc).unwrap(), "word/document.xml");
        assert!(xml.contains("w:val=\"center\""));
        assert!(xml.contains("w:val=\"28\""));
        assert!(xml.contains(" a &lt; b"));
        assert!(xml.contains("w:val=\"Heading2\""));
        assert!(xml.contains("C00000"));
        assert!(!xml.contains("headerReference"));
    }

    #[test]
    fn test_header_part() {
        let mut doc = ExamDocument::new();
        doc.header.push(Paragraph::with_text("Confidential").into());
        let bytes = write_docx(&doc).unwrap();

        let header = part_names(&bytes)
            .into_iter()
            .find(|n| n.starts_with("word/header"))
            .unwrap();
        assert!(part(&bytes, &header).contains("Confidential"));
        assert!(part(&bytes, "word/document.xml").contains("headerReference"));
        assert!(!part(&bytes, "word/document.xml").contains("footerReference"));
    }

    #[test]
    fn test_media_parts() {
        let mut doc = ExamDocument::new();
        let index = doc.add_media(Media::from_bytes("fig.png", png_header(8, 8)).unwrap());
        let mut p = Paragraph::new();
        p.add_image(ImageRun {
            media: index,
            name: "fig.png".to_string(),
            width_emu: 76200,
            height_emu: 76200,
        });
        doc.push(p);

        let bytes = write_docx(&doc).unwrap();
        let media: Vec<String> = part_names(&bytes)
            .into_iter()
            .filter(|n| n.starts_with("word/media/"))
            .collect();
        assert_eq!(media.len(), 1);

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut data = Vec::new();
        archive.by_name(&media[0]).unwrap().read_to_end(&mut data).unwrap();
        assert_eq!(data, png_header(8, 8));

        let xml = part(&bytes, "word/document.xml");
        assert!(xml.contains("cx=\"76200\""));
    }
}
