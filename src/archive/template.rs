//! Example archive offered for download next to the bulk upload form.

use std::io::{Cursor, Write};

use image::{ImageBuffer, ImageFormat, Rgb};
use thiserror::Error;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::forms::bulk_upload::COLUMNS;

pub const TEMPLATE_FILE_NAME: &str = "bulk_upload_template.zip";

const EXAMPLE_ROWS: [[&str; 15]; 2] = [
    [
        "",
        "Gaming",
        "",
        "",
        "",
        "Razer Kraken",
        "Razer",
        "Wired gaming headset",
        "images/razer-kraken.png",
        "Black",
        "79.99",
        "15",
        "RZ-KRAKEN-BLK",
        "",
        "images/razer-kraken-black.png",
    ],
    [
        "Gaming",
        "",
        "",
        "",
        "Razer Kraken",
        "",
        "",
        "",
        "",
        "White",
        "84.99",
        "10",
        "RZ-KRAKEN-WHT",
        "",
        "images/razer-kraken-white.png",
    ],
];

const PLACEHOLDERS: [(&str, [u8; 3]); 3] = [
    ("images/razer-kraken.png", [90, 200, 90]),
    ("images/razer-kraken-black.png", [30, 30, 30]),
    ("images/razer-kraken-white.png", [235, 235, 235]),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to write template sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to build template archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("failed to render placeholder image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to write template: {0}")]
    Io(#[from] std::io::Error),
}

/// Square single-colour PNG.
pub fn placeholder_png(size: u32, colour: [u8; 3]) -> Result<Vec<u8>, image::ImageError> {
    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(size, size, Rgb(colour));
    let mut cursor = Cursor::new(Vec::new());
    buffer.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

fn template_sheet() -> Result<Vec<u8>, TemplateError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for row in EXAMPLE_ROWS {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| TemplateError::Io(err.into_error()))
}

/// Build the template archive: `products.csv` plus placeholder images at the
/// paths it references.
pub fn build_template() -> Result<Vec<u8>, TemplateError> {
    let options = SimpleFileOptions::default();
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file("products.csv", options)?;
    zip.write_all(&template_sheet()?)?;

    for (path, colour) in PLACEHOLDERS {
        zip.start_file(path, options)?;
        zip.write_all(&placeholder_png(64, colour)?)?;
    }

    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ImageLookup, UploadArchive};
    use crate::forms::bulk_upload::ColumnIndex;

    #[test]
    fn template_is_a_valid_upload() {
        let bytes = build_template().expect("template");
        let mut archive = UploadArchive::new(Cursor::new(bytes)).expect("archive");

        let table = archive.spreadsheet().expect("sheet");
        let index = ColumnIndex::locate(&table.headers).expect("columns");

        let rows: Vec<_> = table
            .rows
            .iter()
            .map(|row| index.fields(&row.cells).into_row(row.line).expect("valid row"))
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[1].price_cents, 8499);

        for (path, _) in PLACEHOLDERS {
            assert!(matches!(
                archive.image(path, "products"),
                ImageLookup::Found(_)
            ));
        }
    }
}
