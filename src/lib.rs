//! # examdocx
//!
//! Exam paper model and deterministic DOCX rendering for Rust.
//!
//! Authors assemble a [`Paper`] from text, multiple-choice, table, and image
//! questions. The rendering engine lays it out and writes an Office Open XML
//! (`.docx`) package, either as the candidate paper or as an answer key with
//! the correct options marked.
//!
//! ## Quick Start
//!
//! ```no_run
//! use examdocx::{ExamDocx, McqOption, Paper, PaperHeader, Question, ContentTree};
//!
//! fn main() -> examdocx::Result<()> {
//!     let question = Question::mcq(
//!         ContentTree::from_text("What is 2 + 2?"),
//!         vec![McqOption::new("A", "3"), McqOption::new("B", "4")],
//!     )
//!     .set_correct_option(1)?;
//!
//!     let paper = Paper::new()
//!         .with_header(PaperHeader::titled("Midterm"))
//!         .push_question(question)?;
//!
//!     let (full, key) = ExamDocx::new().export_bundle(&paper)?;
//!     std::fs::write(&full.filename, &full.bytes)?;
//!     std::fs::write(&key.filename, &key.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Closed content model**: rich-text trees, four question kinds, validated up front
//! - **Functional edits**: every paper edit returns a new value
//! - **Deterministic output**: identical input gives byte-identical packages
//! - **Answer keys**: same layout, correct options marked
//! - **Parallel export**: paper and answer key rendered together with Rayon
//! - **Stores**: JSON directory store for papers/templates, asset store for uploads

pub mod assets;
pub mod docx;
pub mod document;
pub mod error;
pub mod export;
pub mod model;
pub mod render;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use assets::{Asset, AssetStore, DirAssetStore, MemoryAssetStore};
pub use document::{Block, ExamDocument, ImageFormat, Media, Paragraph, Table, TextRun};
pub use error::{Error, Result};
pub use export::{export, export_bundle, export_filename, ExportArtifact, ExportOptions};
pub use model::{
    ContentTree, FontFamily, McqOption, Node, NodeKind, Paper, PaperHeader, PaperStyle,
    PaperSummary, Question, QuestionBody, QuestionKind, Template, TemplateSummary,
};
pub use render::{JsonFormat, RenderMode, RenderOptions};
pub use session::{Autosave, EditSession};
pub use storage::{JsonDirStore, PaperStore};

use std::path::Path;
use std::sync::Arc;

/// Load and validate a paper from a JSON file.
///
/// # Example
///
/// ```no_run
/// let paper = examdocx::validate_file("midterm.json")?;
/// println!("{} questions", paper.question_count());
/// # Ok::<(), examdocx::Error>(())
/// ```
pub fn validate_file<P: AsRef<Path>>(path: P) -> Result<Paper> {
    let paper = render::load_paper(path)?;
    paper.validate()?;
    Ok(paper)
}

/// Render a paper to `.docx` bytes.
pub fn to_docx(paper: &Paper, mode: RenderMode, assets: &dyn AssetStore) -> Result<Vec<u8>> {
    render::render_docx(paper, &RenderOptions::new().with_mode(mode), assets)
}

/// Render a paper to a plain-text preview.
pub fn to_text(paper: &Paper, mode: RenderMode, assets: &dyn AssetStore) -> Result<String> {
    let doc = render::render(paper, &RenderOptions::new().with_mode(mode), assets)?;
    Ok(render::to_text(&doc))
}

/// Builder for rendering and exporting papers.
///
/// # Example
///
/// ```no_run
/// use examdocx::ExamDocx;
///
/// let paper = examdocx::validate_file("midterm.json")?;
/// let artifact = ExamDocx::new()
///     .with_asset_dir("uploads")?
///     .answer_key()
///     .export(&paper)?;
/// std::fs::write(&artifact.filename, &artifact.bytes)?;
/// # Ok::<(), examdocx::Error>(())
/// ```
pub struct ExamDocx {
    options: RenderOptions,
    assets: Arc<dyn AssetStore>,
}

impl ExamDocx {
    /// Create a builder with default options and an empty asset store.
    pub fn new() -> Self {
        Self {
            options: RenderOptions::default(),
            assets: Arc::new(MemoryAssetStore::new()),
        }
    }

    /// Resolve images through the given store.
    pub fn with_assets(mut self, assets: Arc<dyn AssetStore>) -> Self {
        self.assets = assets;
        self
    }

    /// Resolve images from a directory.
    pub fn with_asset_dir<P: AsRef<Path>>(self, dir: P) -> Result<Self> {
        let store = DirAssetStore::open(dir)?;
        Ok(self.with_assets(Arc::new(store)))
    }

    /// Replace the render options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Render answer keys.
    pub fn answer_key(mut self) -> Self {
        self.options.mode = RenderMode::AnswerKey;
        self
    }

    /// Set the image question bounding box in inches.
    pub fn with_image_box(mut self, width: f64, height: f64) -> Self {
        self.options = self.options.with_image_box(width, height);
        self
    }

    /// Current render options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Lay out a paper.
    pub fn render(&self, paper: &Paper) -> Result<Rendered> {
        let document = render::render(paper, &self.options, self.assets.as_ref())?;
        Ok(Rendered {
            document,
            filename: export_filename(&paper.header.title, self.options.mode),
        })
    }

    /// Render a paper into a named artifact.
    pub fn export(&self, paper: &Paper) -> Result<ExportArtifact> {
        export::export_with(paper, &self.options, self.assets.as_ref())
    }

    /// Render the paper and its answer key in parallel.
    pub fn export_bundle(&self, paper: &Paper) -> Result<(ExportArtifact, ExportArtifact)> {
        export::export_bundle(paper, &self.options, self.assets.as_ref())
    }
}

impl Default for ExamDocx {
    fn default() -> Self {
        Self::new()
    }
}

/// A laid-out paper awaiting serialization.
#[derive(Debug, Clone)]
pub struct Rendered {
    document: ExamDocument,
    filename: String,
}

impl Rendered {
    /// The laid-out document.
    pub fn document(&self) -> &ExamDocument {
        &self.document
    }

    /// Suggested export file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Write the `.docx` package.
    pub fn to_docx(&self) -> Result<Vec<u8>> {
        docx::write_docx(&self.document)
    }

    /// Plain-text preview.
    pub fn to_text(&self) -> String {
        render::to_text(&self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Paper {
        let q = Question::mcq(
            ContentTree::from_text("Capital of France?"),
            vec![McqOption::new("A", "Paris"), McqOption::new("B", "Rome")],
        )
        .set_correct_option(0)
        .unwrap();
        Paper::new()
            .with_header(PaperHeader::titled("Geography"))
            .push_question(q)
            .unwrap()
    }

    #[test]
    fn test_builder_render() {
        let rendered = ExamDocx::new().render(&sample()).unwrap();
        assert_eq!(rendered.filename(), "Geography.docx");
        let text = rendered.to_text();
        assert!(text.contains("Q1."));
        assert!(text.contains("(A) Paris"));
        assert!(!text.contains('✔'));
        assert!(!rendered.to_docx().unwrap().is_empty());
    }

    #[test]
    fn test_builder_answer_key() {
        let artifact = ExamDocx::new().answer_key().export(&sample()).unwrap();
        assert_eq!(artifact.filename, "Geography_answer_key.docx");
        assert_eq!(artifact.mode, RenderMode::AnswerKey);
    }

    #[test]
    fn test_to_text_marks_answer() {
        let assets = MemoryAssetStore::new();
        let text = to_text(&sample(), RenderMode::AnswerKey, &assets).unwrap();
        assert!(text.contains("(A) Paris  ✔"));
    }

    #[test]
    fn test_validate_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.json");
        render::save_json(&sample(), &path).unwrap();
        assert_eq!(validate_file(&path).unwrap().question_count(), 1);
    }
}
