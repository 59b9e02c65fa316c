use std::io::Cursor;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use thiserror::Error;

use crate::archive::{UploadArchive, normalize_archive_path};
use crate::domain::bulk_upload::{BulkUploadRow, NameRef};
use crate::forms::{
    AmountError, non_empty_inline, parse_price_cents, parse_quantity, read_upload, sanitize_code,
    sanitize_multiline_text,
};

/// Largest archive accepted by the bulk upload.
pub const MAX_ARCHIVE_BYTES: usize = 50 * 1024 * 1024;

/// Largest size a single archive entry may unpack to.
pub const MAX_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Maximum length of category, product and variant names.
const NAME_MAX_LEN: usize = 128;
/// Maximum length of SKU and barcode values.
const CODE_MAX_LEN: usize = 64;

/// Spreadsheet columns understood by the bulk upload, in template order.
pub const COLUMNS: [&str; 15] = [
    "existing_category",
    "new_category",
    "existing_subcategory",
    "new_subcategory",
    "existing_product",
    "product_name",
    "brand",
    "description",
    "product_image",
    "variant_name",
    "price",
    "quantity",
    "sku",
    "barcode",
    "variant_image",
];

/// Fatal problems with the uploaded archive. Nothing is written when one of
/// these is returned.
#[derive(Debug, Error)]
pub enum UploadFormatError {
    #[error("upload must be a .zip archive")]
    NotZip,
    #[error("archive is larger than 50 MB")]
    TooLarge,
    #[error("failed to read the upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("file `{0}` in the archive unpacks to more than 50 MB")]
    EntryTooLarge(String),
    #[error("archive cannot be read: {0}")]
    Archive(String),
    #[error("archive does not contain a .xlsx, .xls or .csv spreadsheet")]
    NoSpreadsheet,
    #[error("spreadsheet cannot be read: {0}")]
    Spreadsheet(String),
    #[error("spreadsheet is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("spreadsheet does not contain any data rows")]
    NoDataRows,
}

impl From<zip::result::ZipError> for UploadFormatError {
    fn from(err: zip::result::ZipError) -> Self {
        UploadFormatError::Archive(err.to_string())
    }
}

impl From<csv::Error> for UploadFormatError {
    fn from(err: csv::Error) -> Self {
        UploadFormatError::Spreadsheet(err.to_string())
    }
}

impl From<calamine::Error> for UploadFormatError {
    fn from(err: calamine::Error) -> Self {
        UploadFormatError::Spreadsheet(err.to_string())
    }
}

/// Reasons a single spreadsheet row is skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowValidationError {
    #[error("product name is missing")]
    MissingProductName,
    #[error("variant name is missing")]
    MissingVariantName,
    #[error("either existing_category or new_category is required")]
    MissingCategory,
    #[error("existing_category and new_category cannot both be set")]
    ConflictingCategory,
    #[error("existing_subcategory and new_subcategory cannot both be set")]
    ConflictingSubcategory,
    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("invalid price: {0}")]
    Price(AmountError),
    #[error("invalid quantity: {0}")]
    Quantity(AmountError),
}

/// Multipart payload of the bulk upload form.
#[derive(MultipartForm)]
pub struct BulkUploadForm {
    #[multipart(limit = "50MB")]
    pub archive: TempFile,
    /// Checkbox; browsers omit it when unchecked.
    pub update_existing: Option<Text<String>>,
}

impl BulkUploadForm {
    pub fn update_existing(&self) -> bool {
        self.update_existing
            .as_ref()
            .map(|value| matches!(value.trim(), "on" | "true" | "1" | "yes"))
            .unwrap_or(false)
    }

    /// Check the file name and size and open the uploaded zip archive.
    pub fn open_archive(&mut self) -> Result<UploadArchive<Cursor<Vec<u8>>>, UploadFormatError> {
        let is_zip = self
            .archive
            .file_name
            .as_deref()
            .map(|name| name.to_ascii_lowercase().ends_with(".zip"))
            .unwrap_or(false);
        if !is_zip {
            return Err(UploadFormatError::NotZip);
        }

        if self.archive.size > MAX_ARCHIVE_BYTES {
            return Err(UploadFormatError::TooLarge);
        }

        let bytes = read_upload(&mut self.archive)?.ok_or(UploadFormatError::NotZip)?;
        UploadArchive::new(Cursor::new(bytes))
    }
}

/// Raw cell values of one row, as read from a spreadsheet or a web form.
#[derive(Debug, Default, Clone, Copy)]
pub struct RowFields<'a> {
    pub existing_category: Option<&'a str>,
    pub new_category: Option<&'a str>,
    pub existing_subcategory: Option<&'a str>,
    pub new_subcategory: Option<&'a str>,
    pub existing_product: Option<&'a str>,
    pub product_name: Option<&'a str>,
    pub brand: Option<&'a str>,
    pub description: Option<&'a str>,
    pub product_image: Option<&'a str>,
    pub variant_name: Option<&'a str>,
    pub price: Option<&'a str>,
    pub quantity: Option<&'a str>,
    pub sku: Option<&'a str>,
    pub barcode: Option<&'a str>,
    pub variant_image: Option<&'a str>,
}

impl RowFields<'_> {
    /// Whether every cell of the row is empty.
    pub fn is_blank(&self) -> bool {
        [
            self.existing_category,
            self.new_category,
            self.existing_subcategory,
            self.new_subcategory,
            self.existing_product,
            self.product_name,
            self.brand,
            self.description,
            self.product_image,
            self.variant_name,
            self.price,
            self.quantity,
            self.sku,
            self.barcode,
            self.variant_image,
        ]
        .iter()
        .all(|cell| cell.is_none_or(|value| value.trim().is_empty()))
    }

    /// Validate the cells into a typed row. Image paths are normalized but
    /// still point into the archive.
    pub fn into_row(self, row_number: usize) -> Result<BulkUploadRow, RowValidationError> {
        let category = pick_reference(
            name_cell(self.existing_category, "existing_category")?,
            name_cell(self.new_category, "new_category")?,
        )
        .map_err(|_| RowValidationError::ConflictingCategory)?
        .ok_or(RowValidationError::MissingCategory)?;

        let subcategory = pick_reference(
            name_cell(self.existing_subcategory, "existing_subcategory")?,
            name_cell(self.new_subcategory, "new_subcategory")?,
        )
        .map_err(|_| RowValidationError::ConflictingSubcategory)?;

        let product = match name_cell(self.existing_product, "existing_product")? {
            Some(name) => NameRef::Existing(name),
            None => name_cell(self.product_name, "product_name")?
                .map(NameRef::New)
                .ok_or(RowValidationError::MissingProductName)?,
        };

        let variant_name = name_cell(self.variant_name, "variant_name")?
            .ok_or(RowValidationError::MissingVariantName)?;

        let price_cents =
            parse_price_cents(self.price.unwrap_or_default()).map_err(RowValidationError::Price)?;
        let quantity =
            parse_quantity(self.quantity.unwrap_or_default()).map_err(RowValidationError::Quantity)?;

        let mut row = BulkUploadRow::new(
            row_number,
            category,
            product,
            variant_name,
            price_cents,
            quantity,
        );
        row.subcategory = subcategory;
        row.brand = name_cell(self.brand, "brand")?;
        row.description = self
            .description
            .map(sanitize_multiline_text)
            .filter(|value| !value.is_empty());
        row.product_image = self.product_image.and_then(normalize_archive_path);
        row.sku = code_cell(self.sku, "sku")?;
        row.barcode = code_cell(self.barcode, "barcode")?;
        row.variant_image = self.variant_image.and_then(normalize_archive_path);

        Ok(row)
    }
}

fn name_cell(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<String>, RowValidationError> {
    let sanitized = non_empty_inline(value);
    if let Some(name) = &sanitized
        && name.chars().count() > NAME_MAX_LEN
    {
        return Err(RowValidationError::TooLong {
            field,
            max: NAME_MAX_LEN,
        });
    }
    Ok(sanitized)
}

fn code_cell(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<String>, RowValidationError> {
    let sanitized = value.map(sanitize_code).filter(|code| !code.is_empty());
    if let Some(code) = &sanitized
        && code.chars().count() > CODE_MAX_LEN
    {
        return Err(RowValidationError::TooLong {
            field,
            max: CODE_MAX_LEN,
        });
    }
    Ok(sanitized)
}

/// `Err(())` when both an existing and a new name are supplied.
fn pick_reference(existing: Option<String>, new: Option<String>) -> Result<Option<NameRef>, ()> {
    match (existing, new) {
        (Some(_), Some(_)) => Err(()),
        (Some(name), None) => Ok(Some(NameRef::Existing(name))),
        (None, Some(name)) => Ok(Some(NameRef::New(name))),
        (None, None) => Ok(None),
    }
}

/// Positions of the known columns inside a spreadsheet header.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    existing_category: Option<usize>,
    new_category: Option<usize>,
    existing_subcategory: Option<usize>,
    new_subcategory: Option<usize>,
    existing_product: Option<usize>,
    product_name: Option<usize>,
    brand: Option<usize>,
    description: Option<usize>,
    product_image: Option<usize>,
    variant_name: Option<usize>,
    price: Option<usize>,
    quantity: Option<usize>,
    sku: Option<usize>,
    barcode: Option<usize>,
    variant_image: Option<usize>,
}

impl ColumnIndex {
    /// Locate the columns by case-insensitive header name.
    pub fn locate(headers: &[String]) -> Result<Self, UploadFormatError> {
        let index = ColumnIndex {
            existing_category: locate_header(headers, "existing_category"),
            new_category: locate_header(headers, "new_category"),
            existing_subcategory: locate_header(headers, "existing_subcategory"),
            new_subcategory: locate_header(headers, "new_subcategory"),
            existing_product: locate_header(headers, "existing_product"),
            product_name: locate_header(headers, "product_name"),
            brand: locate_header(headers, "brand"),
            description: locate_header(headers, "description"),
            product_image: locate_header(headers, "product_image"),
            variant_name: locate_header(headers, "variant_name"),
            price: locate_header(headers, "price"),
            quantity: locate_header(headers, "quantity"),
            sku: locate_header(headers, "sku"),
            barcode: locate_header(headers, "barcode"),
            variant_image: locate_header(headers, "variant_image"),
        };

        let mut missing = Vec::new();
        if index.existing_category.is_none() && index.new_category.is_none() {
            missing.push("existing_category or new_category".to_string());
        }
        for (name, position) in [
            ("product_name", index.product_name),
            ("variant_name", index.variant_name),
            ("price", index.price),
            ("quantity", index.quantity),
        ] {
            if position.is_none() {
                missing.push(name.to_string());
            }
        }

        if !missing.is_empty() {
            return Err(UploadFormatError::MissingColumns(missing));
        }

        Ok(index)
    }

    /// Borrow the cells of one spreadsheet row.
    pub fn fields<'a>(&self, cells: &'a [String]) -> RowFields<'a> {
        let cell = |position: Option<usize>| {
            position
                .and_then(|i| cells.get(i))
                .map(String::as_str)
                .filter(|value| !value.trim().is_empty())
        };

        RowFields {
            existing_category: cell(self.existing_category),
            new_category: cell(self.new_category),
            existing_subcategory: cell(self.existing_subcategory),
            new_subcategory: cell(self.new_subcategory),
            existing_product: cell(self.existing_product),
            product_name: cell(self.product_name),
            brand: cell(self.brand),
            description: cell(self.description),
            product_image: cell(self.product_image),
            variant_name: cell(self.variant_name),
            price: cell(self.price),
            quantity: cell(self.quantity),
            sku: cell(self.sku),
            barcode: cell(self.barcode),
            variant_image: cell(self.variant_image),
        }
    }
}

fn locate_header(headers: &[String], expected: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(expected))
}

#[cfg(test)]
mod tests {
    use std::io::{Seek, SeekFrom, Write};

    use tempfile::NamedTempFile;

    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn build_form(name: &str, bytes: &[u8]) -> BulkUploadForm {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(bytes).expect("write upload");
        file.as_file_mut()
            .seek(SeekFrom::Start(0))
            .expect("rewind");

        BulkUploadForm {
            archive: TempFile {
                file,
                content_type: None,
                file_name: Some(name.to_string()),
                size: bytes.len(),
            },
            update_existing: None,
        }
    }

    #[test]
    fn full_header_is_located_case_insensitively() {
        let upper: Vec<String> = COLUMNS.iter().map(|c| c.to_uppercase()).collect();
        let index = ColumnIndex::locate(&upper).expect("all columns present");

        let row = cells(&[
            "", "Gaming", "", "Headsets", "", "Razer Kraken", "Razer", "", "img/kraken.png",
            "Black", "79.99", "15", "RZ-1", "", "./img/black.png",
        ]);
        let parsed = index.fields(&row).into_row(2).expect("valid row");

        assert_eq!(parsed.category, NameRef::New("Gaming".into()));
        assert_eq!(parsed.subcategory, Some(NameRef::New("Headsets".into())));
        assert_eq!(parsed.product, NameRef::New("Razer Kraken".into()));
        assert_eq!(parsed.variant_name, "Black");
        assert_eq!(parsed.price_cents, 7999);
        assert_eq!(parsed.quantity, 15);
        assert_eq!(parsed.sku.as_deref(), Some("RZ-1"));
        assert_eq!(parsed.barcode, None);
        assert_eq!(parsed.product_image.as_deref(), Some("img/kraken.png"));
        assert_eq!(parsed.variant_image.as_deref(), Some("img/black.png"));
    }

    #[test]
    fn missing_required_columns_are_listed() {
        let result = ColumnIndex::locate(&headers(&["product_name", "price"]));

        match result {
            Err(UploadFormatError::MissingColumns(missing)) => {
                assert_eq!(
                    missing,
                    vec![
                        "existing_category or new_category".to_string(),
                        "variant_name".to_string(),
                        "quantity".to_string(),
                    ]
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn existing_product_supplies_the_product_name() {
        let fields = RowFields {
            existing_category: Some("Gaming"),
            existing_product: Some("Razer Kraken"),
            variant_name: Some("White"),
            price: Some("84.99"),
            quantity: Some("10"),
            ..RowFields::default()
        };

        let row = fields.into_row(3).expect("valid row");

        assert_eq!(row.category, NameRef::Existing("Gaming".into()));
        assert_eq!(row.product, NameRef::Existing("Razer Kraken".into()));
    }

    #[test]
    fn row_errors_are_typed() {
        let base = RowFields {
            new_category: Some("Gaming"),
            product_name: Some("Mouse"),
            variant_name: Some("Black"),
            price: Some("10"),
            quantity: Some("1"),
            ..RowFields::default()
        };

        let no_product = RowFields {
            product_name: None,
            ..base
        };
        assert_eq!(
            no_product.into_row(2),
            Err(RowValidationError::MissingProductName)
        );

        let no_variant = RowFields {
            variant_name: Some("   "),
            ..base
        };
        assert_eq!(
            no_variant.into_row(2),
            Err(RowValidationError::MissingVariantName)
        );

        let both_categories = RowFields {
            existing_category: Some("Audio"),
            ..base
        };
        assert_eq!(
            both_categories.into_row(2),
            Err(RowValidationError::ConflictingCategory)
        );

        let no_category = RowFields {
            new_category: None,
            ..base
        };
        assert_eq!(no_category.into_row(2), Err(RowValidationError::MissingCategory));

        let bad_price = RowFields {
            price: Some("free"),
            ..base
        };
        assert_eq!(
            bad_price.into_row(2),
            Err(RowValidationError::Price(AmountError::NotNumeric(
                "free".into()
            )))
        );

        let negative_quantity = RowFields {
            quantity: Some("-2"),
            ..base
        };
        assert_eq!(
            negative_quantity.into_row(2),
            Err(RowValidationError::Quantity(AmountError::NegativeQuantity))
        );
    }

    #[test]
    fn blank_rows_are_detected() {
        let index = ColumnIndex::locate(&headers(&COLUMNS)).expect("columns");
        let row = cells(&[" ", "", "", "", "", "", "", "", "", "", "", "", "", "", ""]);

        assert!(index.fields(&row).is_blank());
    }

    #[test]
    fn non_zip_upload_is_rejected() {
        let mut form = build_form("products.csv", b"product_name\n");

        assert!(matches!(form.open_archive(), Err(UploadFormatError::NotZip)));
    }

    #[test]
    fn corrupt_zip_is_rejected() {
        let mut form = build_form("products.zip", b"not really a zip");

        assert!(matches!(
            form.open_archive(),
            Err(UploadFormatError::Archive(_))
        ));
    }

    #[test]
    fn update_existing_checkbox() {
        let mut form = build_form("products.zip", b"");
        assert!(!form.update_existing());

        form.update_existing = Some(Text("on".to_string()));
        assert!(form.update_existing());
    }
}
