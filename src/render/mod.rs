//! Rendering module: laying out papers and converting them to output formats.

mod engine;
mod json;
mod options;
mod text;

pub use engine::render;
pub use json::{
    load_paper, load_template, paper_from_json, save_json, template_from_json, to_json, JsonFormat,
};
pub use options::{RenderMode, RenderOptions};
pub use text::to_text;

use crate::assets::AssetStore;
use crate::error::Result;
use crate::model::Paper;

/// Lay out a paper and write it as a `.docx` package.
pub fn render_docx(paper: &Paper, options: &RenderOptions, assets: &dyn AssetStore) -> Result<Vec<u8>> {
    let doc = render(paper, options, assets)?;
    crate::docx::write_docx(&doc)
}
