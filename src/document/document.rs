//! Document-level types.

use super::{Block, Media, PageSetup};
use chrono::{DateTime, Utc};

/// A laid-out exam document, ready to be written as a package.
///
/// Everything here is ordered: body blocks in reading order, media in the
/// order of first use. Writing the same document twice yields the same bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamDocument {
    /// Document metadata (title, subject, timestamps)
    pub metadata: Metadata,

    /// Page size and margins
    pub page: PageSetup,

    /// Default font family name
    pub font_family: String,

    /// Default font size in points
    pub font_size: u32,

    /// Accent colour as six uppercase hex digits
    pub accent_color: String,

    /// Page header content (empty for no header part)
    pub header: Vec<Block>,

    /// Page footer content (empty for no footer part)
    pub footer: Vec<Block>,

    /// Body blocks
    pub body: Vec<Block>,

    /// Embedded pictures, first use first
    pub media: Vec<Media>,
}

impl ExamDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            page: PageSetup::letter(),
            font_family: "Times New Roman".to_string(),
            font_size: 12,
            accent_color: "000000".to_string(),
            header: Vec::new(),
            footer: Vec::new(),
            body: Vec::new(),
            media: Vec::new(),
        }
    }

    /// Add a block to the body.
    pub fn push(&mut self, block: impl Into<Block>) {
        self.body.push(block.into());
    }

    /// Register a picture and return its media index.
    ///
    /// A picture already registered under the same name is reused.
    pub fn add_media(&mut self, media: Media) -> usize {
        if let Some(index) = self.media_index(&media.name) {
            return index;
        }
        self.media.push(media);
        self.media.len() - 1
    }

    /// Find the media index of an asset name.
    pub fn media_index(&self, name: &str) -> Option<usize> {
        self.media.iter().position(|m| m.name == name)
    }

    /// Whether a header part will be written.
    pub fn has_header(&self) -> bool {
        !self.header.is_empty()
    }

    /// Whether a footer part will be written.
    pub fn has_footer(&self) -> bool {
        !self.footer.is_empty()
    }

    /// Check if the body has no blocks.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Get plain text content of the body, one block per line.
    pub fn plain_text(&self) -> String {
        self.body
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ExamDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Document metadata written to the core properties part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Creator (institution)
    pub creator: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::media::tests::png_header;
    use crate::document::Paragraph;

    #[test]
    fn test_document_new() {
        let doc = ExamDocument::new();
        assert!(doc.is_empty());
        assert!(!doc.has_header());
        assert!(!doc.has_footer());
        assert_eq!(doc.page, PageSetup::letter());
    }

    #[test]
    fn test_media_dedup_keeps_first_use_order() {
        let mut doc = ExamDocument::new();
        let a = doc.add_media(Media::from_bytes("b.png", png_header(10, 10)).unwrap());
        let b = doc.add_media(Media::from_bytes("a.png", png_header(20, 20)).unwrap());
        let again = doc.add_media(Media::from_bytes("b.png", png_header(10, 10)).unwrap());

        assert_eq!((a, b, again), (0, 1, 0));
        assert_eq!(doc.media.len(), 2);
        assert_eq!(doc.media_index("a.png"), Some(1));
    }

    #[test]
    fn test_plain_text() {
        let mut doc = ExamDocument::new();
        doc.push(Paragraph::with_text("Midterm"));
        doc.push(Paragraph::with_text("Q1."));
        assert_eq!(doc.plain_text(), "Midterm\nQ1.");
    }
}
