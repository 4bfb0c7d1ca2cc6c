//! Persistence of papers and templates.
//!
//! [`JsonDirStore`] keeps one pretty-printed JSON file per item:
//!
//! ```text
//! <root>/papers/<paper id>.json
//! <root>/templates/<template id>.json
//! ```

use crate::error::{Error, Result};
use crate::model::{Paper, PaperSummary, Template, TemplateSummary};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage of papers and templates. Last write wins.
pub trait PaperStore: Send + Sync {
    /// Summaries of all papers, most recently updated first.
    fn list_papers(&self) -> Result<Vec<PaperSummary>>;

    /// Load a paper by id.
    fn get_paper(&self, id: &str) -> Result<Paper>;

    /// Save a paper, refreshing its `updated_at`. Returns the saved value.
    fn upsert_paper(&self, paper: &Paper) -> Result<Paper>;

    /// Delete a paper by id.
    fn delete_paper(&self, id: &str) -> Result<()>;

    /// Summaries of all templates, newest first.
    fn list_templates(&self) -> Result<Vec<TemplateSummary>>;

    /// Load a template by id.
    fn get_template(&self, id: &str) -> Result<Template>;

    /// Save a template. Returns the saved value.
    fn upsert_template(&self, template: &Template) -> Result<Template>;

    /// Delete a template by id.
    fn delete_template(&self, id: &str) -> Result<()>;
}

/// Whether an id can be used as a file stem.
pub fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn check_id(id: &str) -> Result<()> {
    if is_safe_id(id) {
        Ok(())
    } else {
        Err(Error::validation(format!("invalid item id '{}'", id)))
    }
}

/// Directory-of-JSON-files store.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    const PAPERS: &'static str = "papers";
    const TEMPLATES: &'static str = "templates";

    /// Open (creating if needed) a store rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(Self::PAPERS))?;
        fs::create_dir_all(root.join(Self::TEMPLATES))?;
        debug!("Opened store at {}", root.display());
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn item_path(&self, dir: &str, id: &str) -> Result<PathBuf> {
        check_id(id)?;
        Ok(self.root.join(dir).join(format!("{}.json", id)))
    }

    fn load<T: DeserializeOwned>(&self, dir: &str, id: &str) -> Result<T> {
        let path = self.item_path(dir, id)?;
        if !path.is_file() {
            return Err(Error::NotFound(format!("{} {}", singular(dir), id)));
        }
        let json = fs::read_to_string(&path)?;
        serde_json::from_str(&json)
            .map_err(|e| Error::Storage(format!("{}: {}", path.display(), e)))
    }

    fn save<T: Serialize>(&self, dir: &str, id: &str, value: &T) -> Result<()> {
        let path = self.item_path(dir, id)?;
        let json = serde_json::to_string_pretty(value)?;

        // Each writer stages its own file; the rename replaces the item atomically
        let mut staged = NamedTempFile::new_in(self.root.join(dir))?;
        staged.write_all(json.as_bytes())?;
        staged.persist(&path).map_err(|e| Error::Io(e.error))?;
        debug!("Saved {} {}", singular(dir), id);
        Ok(())
    }

    fn remove(&self, dir: &str, id: &str) -> Result<()> {
        let path = self.item_path(dir, id)?;
        if !path.is_file() {
            return Err(Error::NotFound(format!("{} {}", singular(dir), id)));
        }
        fs::remove_file(path)?;
        info!("Deleted {} {}", singular(dir), id);
        Ok(())
    }

    /// Load every readable item of a directory, skipping corrupt files.
    fn load_all<T: DeserializeOwned>(&self, dir: &str) -> Result<Vec<T>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(self.root.join(dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut items = Vec::with_capacity(paths.len());
        for path in paths {
            let parsed = fs::read_to_string(&path)
                .map_err(Error::from)
                .and_then(|json| serde_json::from_str::<T>(&json).map_err(Error::from));
            match parsed {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping unreadable {}: {}", path.display(), e),
            }
        }
        Ok(items)
    }
}

fn singular(dir: &str) -> &str {
    dir.trim_end_matches('s')
}

impl PaperStore for JsonDirStore {
    fn list_papers(&self) -> Result<Vec<PaperSummary>> {
        let mut summaries: Vec<PaperSummary> = self
            .load_all::<Paper>(Self::PAPERS)?
            .iter()
            .map(Paper::summary)
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }

    fn get_paper(&self, id: &str) -> Result<Paper> {
        self.load(Self::PAPERS, id)
    }

    fn upsert_paper(&self, paper: &Paper) -> Result<Paper> {
        let saved = paper.touched();
        self.save(Self::PAPERS, &saved.id, &saved)?;
        info!("Saved paper {}", saved.id);
        Ok(saved)
    }

    fn delete_paper(&self, id: &str) -> Result<()> {
        self.remove(Self::PAPERS, id)
    }

    fn list_templates(&self) -> Result<Vec<TemplateSummary>> {
        let mut summaries: Vec<TemplateSummary> = self
            .load_all::<Template>(Self::TEMPLATES)?
            .iter()
            .map(Template::summary)
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }

    fn get_template(&self, id: &str) -> Result<Template> {
        self.load(Self::TEMPLATES, id)
    }

    fn upsert_template(&self, template: &Template) -> Result<Template> {
        self.save(Self::TEMPLATES, &template.id, template)?;
        info!("Saved template {}", template.id);
        Ok(template.clone())
    }

    fn delete_template(&self, id: &str) -> Result<()> {
        self.remove(Self::TEMPLATES, id)
    }
}
