//! JSON interchange for papers and templates.

use crate::error::Result;
use crate::model::{Paper, Template};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a paper, template, or any model value to JSON.
pub fn to_json<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}

/// Parse a paper from JSON.
pub fn paper_from_json(json: &str) -> Result<Paper> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a template from JSON.
pub fn template_from_json(json: &str) -> Result<Template> {
    Ok(serde_json::from_str(json)?)
}

/// Read a paper from a JSON file.
pub fn load_paper<P: AsRef<Path>>(path: P) -> Result<Paper> {
    paper_from_json(&fs::read_to_string(path)?)
}

/// Read a template from a JSON file.
pub fn load_template<P: AsRef<Path>>(path: P) -> Result<Template> {
    template_from_json(&fs::read_to_string(path)?)
}

/// Write any model value to a pretty-printed JSON file.
pub fn save_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    fs::write(path, to_json(value, JsonFormat::Pretty)?)?;
    Ok(())
}
