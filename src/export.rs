//! Export orchestration: rendering papers into named `.docx` artifacts.
//!
//! # Example
//!
//! ```no_run
//! use examdocx::assets::DirAssetStore;
//! use examdocx::export::{export_bundle, write_artifact};
//! use examdocx::render::{load_paper, RenderOptions};
//!
//! fn main() -> examdocx::Result<()> {
//!     let paper = load_paper("midterm.json")?;
//!     let assets = DirAssetStore::open("uploads")?;
//!
//!     let (full, key) = export_bundle(&paper, &RenderOptions::default(), &assets)?;
//!     write_artifact(&full, "out")?;
//!     write_artifact(&key, "out")?;
//!     Ok(())
//! }
//! ```

use crate::assets::AssetStore;
use crate::docx::DOCX_MIME;
use crate::error::Result;
use crate::model::Paper;
use crate::render::{render_docx, RenderMode, RenderOptions};
use log::info;
use rayon::prelude::*;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Options for exporting papers.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Rendering options
    pub render: RenderOptions,

    /// Directory artifacts are written to (current directory when `None`)
    pub output_dir: Option<PathBuf>,
}

impl ExportOptions {
    /// Create new export options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set the render mode.
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.render.mode = mode;
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Directory artifacts are written to.
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }
}

/// A rendered, named document ready to be saved or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name, e.g. `Midterm_answer_key.docx`
    pub filename: String,

    /// MIME type of the bytes
    pub mime: &'static str,

    /// Mode the artifact was rendered in
    pub mode: RenderMode,

    /// Package bytes
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Size of the package in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the artifact has no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn strip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid regex"))
}

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s-]+").expect("valid regex"))
}

/// File stem derived from a paper title.
///
/// Characters other than word characters, whitespace, and `-` are removed;
/// runs of whitespace and `-` become `_`; an empty result falls back to `exam`.
pub fn filename_stem(title: &str) -> String {
    let stripped = strip_regex().replace_all(title, "");
    let joined = separator_regex().replace_all(&stripped, "_");
    let stem = joined.trim_matches('_');
    if stem.is_empty() {
        "exam".to_string()
    } else {
        stem.to_string()
    }
}

/// Export file name for a title and mode.
pub fn export_filename(title: &str, mode: RenderMode) -> String {
    format!("{}{}.docx", filename_stem(title), mode.filename_suffix())
}

/// Render a paper in the given mode with default options.
pub fn export(paper: &Paper, mode: RenderMode, assets: &dyn AssetStore) -> Result<ExportArtifact> {
    export_with(paper, &RenderOptions::default().with_mode(mode), assets)
}

/// Render a paper with explicit options.
pub fn export_with(
    paper: &Paper,
    options: &RenderOptions,
    assets: &dyn AssetStore,
) -> Result<ExportArtifact> {
    let bytes = render_docx(paper, options, assets)?;
    let filename = export_filename(&paper.header.title, options.mode);
    info!("Exported {} ({} bytes)", filename, bytes.len());
    Ok(ExportArtifact {
        filename,
        mime: DOCX_MIME,
        mode: options.mode,
        bytes,
    })
}

/// Render the paper and its answer key in parallel.
///
/// The mode in `options` is ignored; the first artifact is always the full
/// paper and the second the answer key.
pub fn export_bundle(
    paper: &Paper,
    options: &RenderOptions,
    assets: &dyn AssetStore,
) -> Result<(ExportArtifact, ExportArtifact)> {
    let full = options.clone().with_mode(RenderMode::Full);
    let key = options.clone().with_mode(RenderMode::AnswerKey);
    let (full, key) = rayon::join(
        || export_with(paper, &full, assets),
        || export_with(paper, &key, assets),
    );
    Ok((full?, key?))
}

/// Render a batch of papers in parallel, one result per paper in input order.
pub fn export_many(
    papers: &[Paper],
    options: &RenderOptions,
    assets: &dyn AssetStore,
) -> Vec<Result<ExportArtifact>> {
    papers
        .par_iter()
        .map(|paper| export_with(paper, options, assets))
        .collect()
}

/// Write an artifact into `dir` (created if missing) and return its path.
pub fn write_artifact<P: AsRef<Path>>(artifact: &ExportArtifact, dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(&artifact.filename);
    fs::write(&path, &artifact.bytes)?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// Async variant of [`write_artifact`].
#[cfg(feature = "async")]
pub async fn write_artifact_async<P: AsRef<Path>>(
    artifact: &ExportArtifact,
    dir: P,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&artifact.filename);
    tokio::fs::write(&path, &artifact.bytes).await?;
    info!("Wrote {}", path.display());
    Ok(path)
}
