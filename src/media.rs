//! Content-addressed storage for uploaded images and verification documents.

use std::fs;
use std::path::{Component, Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;

/// Media folder for product images.
pub const PRODUCT_IMAGE_FOLDER: &str = "products";
/// Media folder for variant images.
pub const VARIANT_IMAGE_FOLDER: &str = "variants";

/// Extensions accepted for verification documents.
const DOCUMENT_EXTENSIONS: [&str; 5] = ["pdf", "png", "jpg", "jpeg", "webp"];

/// Errors raised while preparing or writing media files.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("file is not a supported image")]
    UnsupportedImage,
    #[error("image could not be decoded: {0}")]
    Decode(String),
    #[error("unsupported document type `{0}`")]
    UnsupportedDocument(String),
    #[error("invalid media path `{0}`")]
    InvalidPath(String),
    #[error("failed to write media file: {0}")]
    Io(#[from] std::io::Error),
}

/// File bytes paired with the relative path they are stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Validate that `bytes` decode as an image and name it after its hash
/// inside `folder`.
pub fn prepare_image(folder: &str, bytes: Vec<u8>) -> Result<StoredFile, MediaError> {
    let format = image::guess_format(&bytes).map_err(|_| MediaError::UnsupportedImage)?;
    image::load_from_memory_with_format(&bytes, format)
        .map_err(|err| MediaError::Decode(err.to_string()))?;

    Ok(StoredFile {
        path: hashed_path(folder, &bytes, image_extension(format)),
        bytes,
    })
}

/// Name a verification document after its hash, keeping the original
/// extension when it is one of the accepted types.
pub fn prepare_document(
    folder: &str,
    file_name: Option<&str>,
    bytes: Vec<u8>,
) -> Result<StoredFile, MediaError> {
    let extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !DOCUMENT_EXTENSIONS.contains(&extension.as_str()) {
        return Err(MediaError::UnsupportedDocument(extension));
    }

    Ok(StoredFile {
        path: hashed_path(folder, &bytes, &extension),
        bytes,
    })
}

fn image_extension(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("img")
}

fn hashed_path(folder: &str, bytes: &[u8], extension: &str) -> String {
    let digest = blake3::hash(bytes);
    format!("{}/{}.{}", folder.trim_matches('/'), digest.to_hex(), extension)
}

/// Media files live below a single root directory configured at startup.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a prepared file. Files are content addressed, so an existing
    /// file with the same path is left as is.
    pub fn save(&self, file: &StoredFile) -> Result<(), MediaError> {
        let target = self.resolve(&file.path)?;
        if target.exists() {
            return Ok(());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &file.bytes)?;
        log::debug!("Stored media file {}", target.display());
        Ok(())
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, MediaError> {
        let path = Path::new(relative);
        let is_plain = path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if relative.is_empty() || !is_plain {
            return Err(MediaError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }
}
