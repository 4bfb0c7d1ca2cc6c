//! Binary asset storage for uploaded images.
//!
//! The renderer resolves every image reference (question images, inline
//! images, the logo) through an [`AssetStore`]. Stores are shared across
//! threads and only read while rendering.

use crate::document::ImageFormat;
use crate::error::{Error, Result};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Largest accepted upload, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Formats accepted for upload.
pub const ACCEPTED_UPLOADS: [ImageFormat; 4] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::Webp,
];

/// A stored binary asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Storage name
    pub name: String,

    /// MIME type
    pub mime: String,

    /// Raw bytes
    pub data: Vec<u8>,
}

/// Name-addressed storage of uploaded images.
pub trait AssetStore: Send + Sync {
    /// Look up an asset by name. Unknown or unsafe names resolve to `None`.
    fn retrieve(&self, name: &str) -> Result<Option<Asset>>;

    /// Validate and store an upload, returning its generated name.
    fn store(&self, data: &[u8], mime: &str) -> Result<String>;
}

/// Whether `name` can be used as a storage key.
///
/// Names with path separators or `..` never resolve.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && !name.starts_with('.')
}

/// Check an upload against the accepted formats, its declared MIME type, and
/// the size limit.
pub fn check_upload(data: &[u8], mime: &str) -> Result<ImageFormat> {
    let declared = ImageFormat::from_mime(mime)
        .filter(|f| ACCEPTED_UPLOADS.contains(f))
        .ok_or_else(|| {
            Error::UploadRejected(format!(
                "file type '{}' not allowed, use PNG, JPEG, GIF, or WebP",
                mime
            ))
        })?;

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(Error::UploadRejected(format!(
            "file too large ({} bytes), maximum is {} MiB",
            data.len(),
            MAX_UPLOAD_BYTES / 1024 / 1024
        )));
    }

    if ImageFormat::detect(data) != Some(declared) {
        return Err(Error::UploadRejected(
            "file content does not match the declared image type".to_string(),
        ));
    }

    Ok(declared)
}

fn upload_name(format: ImageFormat) -> String {
    format!("{}.{}", uuid::Uuid::new_v4(), format.extension())
}

fn lock_error<T>(_: T) -> Error {
    Error::Storage("asset store lock poisoned".to_string())
}

/// In-memory asset store.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: RwLock<BTreeMap<String, Asset>>,
}

impl MemoryAssetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an asset under a fixed name, bypassing upload checks.
    pub fn insert(&self, name: impl Into<String>, data: Vec<u8>) -> Result<()> {
        let name = name.into();
        let mime = ImageFormat::detect(&data)
            .map(ImageFormat::mime_type)
            .unwrap_or("application/octet-stream")
            .to_string();
        let mut assets = self.assets.write().map_err(lock_error)?;
        assets.insert(name.clone(), Asset { name, mime, data });
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_asset(self, name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        self.insert(name, data)?;
        Ok(self)
    }

    /// Number of stored assets.
    pub fn len(&self) -> usize {
        self.assets.read().map(|a| a.len()).unwrap_or(0)
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetStore for MemoryAssetStore {
    fn retrieve(&self, name: &str) -> Result<Option<Asset>> {
        if !is_safe_name(name) {
            return Ok(None);
        }
        let assets = self.assets.read().map_err(lock_error)?;
        Ok(assets.get(name).cloned())
    }

    fn store(&self, data: &[u8], mime: &str) -> Result<String> {
        let format = check_upload(data, mime)?;
        let name = upload_name(format);
        let mut assets = self.assets.write().map_err(lock_error)?;
        assets.insert(
            name.clone(),
            Asset {
                name: name.clone(),
                mime: format.mime_type().to_string(),
                data: data.to_vec(),
            },
        );
        debug!("Stored {} byte upload as {}", data.len(), name);
        Ok(name)
    }
}

/// Asset store backed by a directory of files.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the assets.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetStore for DirAssetStore {
    fn retrieve(&self, name: &str) -> Result<Option<Asset>> {
        if !is_safe_name(name) {
            return Ok(None);
        }
        let path = self.root.join(name);
        if !path.is_file() {
            return Ok(None);
        }
        let data = fs::read(&path)?;
        let mime = ImageFormat::detect(&data)
            .map(ImageFormat::mime_type)
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(Some(Asset {
            name: name.to_string(),
            mime,
            data,
        }))
    }

    fn store(&self, data: &[u8], mime: &str) -> Result<String> {
        let format = check_upload(data, mime)?;
        let name = upload_name(format);
        fs::write(self.root.join(&name), data)?;
        info!("Stored upload {} in {}", name, self.root.display());
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0,
        0, 1, 0, 0, 0, 1,
    ];

    #[test]
    fn test_safe_names() {
        assert!(is_safe_name("0b1f.png"));
        assert!(!is_safe_name("../secret.png"));
        assert!(!is_safe_name("a/b.png"));
        assert!(!is_safe_name("a\\b.png"));
        assert!(!is_safe_name(""));
        assert!(!is_safe_name(".hidden"));
    }

    #[test]
    fn test_check_upload() {
        assert_eq!(check_upload(PNG, "image/png").unwrap(), ImageFormat::Png);

        let err = check_upload(PNG, "image/bmp").unwrap_err();
        assert!(matches!(err, Error::UploadRejected(_)));

        let err = check_upload(PNG, "image/jpeg").unwrap_err();
        assert!(matches!(err, Error::UploadRejected(_)));

        let mut big = PNG.to_vec();
        big.resize(MAX_UPLOAD_BYTES + 1, 0);
        let err = check_upload(&big, "image/png").unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryAssetStore::new();
        let name = store.store(PNG, "image/png").unwrap();
        assert!(name.ends_with(".png"));

        let asset = store.retrieve(&name).unwrap().unwrap();
        assert_eq!(asset.data, PNG);
        assert_eq!(asset.mime, "image/png");
        assert!(store.retrieve("nope.png").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_rejects_traversal() {
        let store = MemoryAssetStore::new();
        store.insert("logo.png", PNG.to_vec()).unwrap();
        assert!(store.retrieve("logo.png").unwrap().is_some());
        assert!(store.retrieve("../logo.png").unwrap().is_none());
    }

    #[test]
    fn test_dir_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirAssetStore::open(dir.path().join("uploads")).unwrap();
        let name = store.store(PNG, "image/png").unwrap();

        assert!(store.root().join(&name).is_file());
        let asset = store.retrieve(&name).unwrap().unwrap();
        assert_eq!(asset.data, PNG);
        assert!(store.retrieve("../uploads").unwrap().is_none());
    }
}
