//! Reading the zip archive submitted to the bulk upload.

use std::collections::HashMap;
use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::forms::bulk_upload::{MAX_ENTRY_BYTES, UploadFormatError};
use crate::media::{MediaError, StoredFile, prepare_image};

pub mod sheet;
pub mod template;

use sheet::{SheetKind, SheetTable};

/// Outcome of looking up an image referenced by the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLookup {
    Found(StoredFile),
    Missing,
    Invalid(String),
}

/// Normalize a path typed into a spreadsheet to the form used inside the
/// archive: forward slashes without a leading `./` or `/`.
pub fn normalize_archive_path(raw: &str) -> Option<String> {
    let mut path = raw.trim().replace('\\', "/");

    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest.to_string();
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest.to_string();
        } else {
            break;
        }
    }

    if path.is_empty() { None } else { Some(path) }
}

fn is_ignored(name: &str) -> bool {
    name.ends_with('/') || name.starts_with("__MACOSX/") || name.contains("/__MACOSX/")
}

/// An opened upload archive with an index of its files.
pub struct UploadArchive<R> {
    zip: ZipArchive<R>,
    entries: HashMap<String, usize>,
    entries_lowercase: HashMap<String, usize>,
    spreadsheet: Option<(usize, SheetKind)>,
    images: HashMap<(String, String), ImageLookup>,
    entry_limit: u64,
}

impl<R: Read + Seek> UploadArchive<R> {
    pub fn new(reader: R) -> Result<Self, UploadFormatError> {
        let mut zip = ZipArchive::new(reader)?;

        let mut entries = HashMap::new();
        let mut entries_lowercase = HashMap::new();
        let mut spreadsheet = None;

        for index in 0..zip.len() {
            let file = zip.by_index_raw(index)?;
            if file.is_dir() {
                continue;
            }

            let raw_name = file.name().to_string();
            if is_ignored(&raw_name) {
                continue;
            }

            let Some(name) = normalize_archive_path(&raw_name) else {
                continue;
            };

            if spreadsheet.is_none()
                && let Some(kind) = SheetKind::from_path(&name)
            {
                spreadsheet = Some((index, kind));
            }

            entries_lowercase
                .entry(name.to_lowercase())
                .or_insert(index);
            entries.entry(name).or_insert(index);
        }

        Ok(Self {
            zip,
            entries,
            entries_lowercase,
            spreadsheet,
            images: HashMap::new(),
            entry_limit: MAX_ENTRY_BYTES,
        })
    }

    /// Cap the unpacked size of every entry read from the archive.
    pub fn with_entry_limit(mut self, limit: u64) -> Self {
        self.entry_limit = limit;
        self
    }

    /// Read the first spreadsheet found in the archive.
    pub fn spreadsheet(&mut self) -> Result<SheetTable, UploadFormatError> {
        let (index, kind) = self.spreadsheet.ok_or(UploadFormatError::NoSpreadsheet)?;
        let bytes = self.read_entry(index)?;
        sheet::read_sheet(kind, bytes)
    }

    /// Resolve an image path from the spreadsheet and prepare it for storage
    /// under `folder`. Results are cached per path and folder.
    pub fn image(&mut self, path: &str, folder: &str) -> ImageLookup {
        let key = (path.to_string(), folder.to_string());
        if let Some(cached) = self.images.get(&key) {
            return cached.clone();
        }

        let lookup = self.load_image(path, folder);
        self.images.insert(key, lookup.clone());
        lookup
    }

    fn load_image(&mut self, path: &str, folder: &str) -> ImageLookup {
        let index = self
            .entries
            .get(path)
            .or_else(|| self.entries_lowercase.get(&path.to_lowercase()))
            .copied();

        let Some(index) = index else {
            return ImageLookup::Missing;
        };

        let bytes = match self.read_entry(index) {
            Ok(bytes) => bytes,
            Err(err) => return ImageLookup::Invalid(err.to_string()),
        };

        match prepare_image(folder, bytes) {
            Ok(file) => ImageLookup::Found(file),
            Err(MediaError::UnsupportedImage) => {
                ImageLookup::Invalid("file is not a supported image".to_string())
            }
            Err(err) => ImageLookup::Invalid(err.to_string()),
        }
    }

    /// Read one entry, refusing anything that declares or inflates to more
    /// than the entry limit.
    fn read_entry(&mut self, index: usize) -> Result<Vec<u8>, UploadFormatError> {
        let limit = self.entry_limit;
        let file = self.zip.by_index(index)?;
        let name = file.name().to_string();

        if file.size() > limit {
            return Err(UploadFormatError::EntryTooLarge(name));
        }

        let mut bytes = Vec::new();
        file.take(limit + 1).read_to_end(&mut bytes)?;
        if bytes.len() as u64 > limit {
            return Err(UploadFormatError::EntryTooLarge(name));
        }

        Ok(bytes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::{Cursor, Write};

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use super::*;

    /// Build an in-memory zip from `(path, bytes)` pairs.
    pub(crate) fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in files {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .expect("add dir");
            } else {
                writer
                    .start_file(*name, SimpleFileOptions::default())
                    .expect("start file");
                writer.write_all(bytes).expect("write file");
            }
        }
        writer.finish().expect("finish zip").into_inner()
    }

    pub(crate) fn png_bytes() -> Vec<u8> {
        template::placeholder_png(4, [10, 20, 30]).expect("encode png")
    }

    #[test]
    fn paths_are_normalized() {
        assert_eq!(
            normalize_archive_path(" .\\images\\a.png "),
            Some("images/a.png".to_string())
        );
        assert_eq!(normalize_archive_path("/./b.jpg"), Some("b.jpg".to_string()));
        assert_eq!(normalize_archive_path("  "), None);
    }

    #[test]
    fn first_spreadsheet_wins_and_macos_metadata_is_skipped() {
        let bytes = zip_bytes(&[
            ("__MACOSX/._products.csv", b"junk"),
            ("data/", b""),
            ("data/products.csv", b"product_name\nMouse\n"),
            ("other.csv", b"product_name\nKeyboard\n"),
        ]);

        let mut archive = UploadArchive::new(Cursor::new(bytes)).expect("archive");
        let table = archive.spreadsheet().expect("sheet");

        assert_eq!(table.headers, vec!["product_name".to_string()]);
        assert_eq!(table.rows[0].cells, vec!["Mouse".to_string()]);
    }

    #[test]
    fn archive_without_spreadsheet_is_rejected() {
        let bytes = zip_bytes(&[("readme.txt", b"hello")]);
        let mut archive = UploadArchive::new(Cursor::new(bytes)).expect("archive");

        assert!(matches!(
            archive.spreadsheet(),
            Err(UploadFormatError::NoSpreadsheet)
        ));
    }

    #[test]
    fn oversized_entries_are_rejected() {
        let big = vec![b'a'; 4096];
        let bytes = zip_bytes(&[("products.csv", &big), ("images/big.png", &big)]);
        let mut archive = UploadArchive::new(Cursor::new(bytes))
            .expect("archive")
            .with_entry_limit(64);

        assert!(matches!(
            archive.spreadsheet(),
            Err(UploadFormatError::EntryTooLarge(name)) if name == "products.csv"
        ));
        assert!(matches!(
            archive.image("images/big.png", "products"),
            ImageLookup::Invalid(_)
        ));
    }

    #[test]
    fn images_are_found_missing_or_invalid() {
        let png = png_bytes();
        let bytes = zip_bytes(&[
            ("products.csv", b"product_name\n"),
            ("Images/Kraken.PNG", &png),
            ("images/broken.png", b"not an image"),
        ]);
        let mut archive = UploadArchive::new(Cursor::new(bytes)).expect("archive");

        match archive.image("images/kraken.png", "products") {
            ImageLookup::Found(file) => {
                assert!(file.path.starts_with("products/"));
                assert_eq!(file.bytes, png);
            }
            other => panic!("expected image, got {other:?}"),
        }
        assert_eq!(archive.image("images/none.png", "products"), ImageLookup::Missing);
        assert!(matches!(
            archive.image("images/broken.png", "variants"),
            ImageLookup::Invalid(_)
        ));
    }
}
