//! Laid-out document types.
//!
//! This module defines the intermediate representation (IR) between the exam
//! paper model and the DOCX package writer: paragraphs with styled runs,
//! tables, inline pictures, and page geometry. The renderer produces it and
//! the package writer consumes it without consulting the paper again.

mod block;
#[allow(clippy::module_inception)]
mod document;
pub(crate) mod media;
mod paragraph;
mod table;

pub use block::{inches_to_twips, Block, PageSetup, TWIPS_PER_INCH};
pub use document::{ExamDocument, Metadata};
pub use media::{ImageFormat, Media, EMU_PER_INCH, EMU_PER_PIXEL};
pub use paragraph::{
    Alignment, ImageRun, InlineContent, Paragraph, ParagraphStyle, TextRun, TextStyle,
};
pub use table::{Table, TableCell, TableRow};
