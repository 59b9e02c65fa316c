//! Typed rows and the report of a bulk catalog upload.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::slug::name_key;

/// Reference to a catalog record by name, either expected to exist already or
/// to be created when missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRef {
    Existing(String),
    New(String),
}

impl NameRef {
    pub fn name(&self) -> &str {
        match self {
            NameRef::Existing(name) | NameRef::New(name) => name,
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, NameRef::Existing(_))
    }

    fn key(&self) -> (bool, String) {
        (self.is_existing(), name_key(self.name()))
    }
}

/// One validated spreadsheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkUploadRow {
    /// 1-based spreadsheet line, the header being line 1.
    pub row_number: usize,
    pub category: NameRef,
    pub subcategory: Option<NameRef>,
    pub product: NameRef,
    pub brand: Option<String>,
    pub description: Option<String>,
    /// Product image: a path inside the archive while parsing, the stored
    /// media path once the file has been resolved.
    pub product_image: Option<String>,
    pub variant_name: String,
    pub price_cents: i64,
    pub quantity: i32,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    /// Variant image, same convention as `product_image`.
    pub variant_image: Option<String>,
}

impl BulkUploadRow {
    /// Row for a new product with the mandatory fields only.
    pub fn new(
        row_number: usize,
        category: NameRef,
        product: NameRef,
        variant_name: impl Into<String>,
        price_cents: i64,
        quantity: i32,
    ) -> Self {
        Self {
            row_number,
            category,
            subcategory: None,
            product,
            brand: None,
            description: None,
            product_image: None,
            variant_name: variant_name.into(),
            price_cents,
            quantity,
            sku: None,
            barcode: None,
            variant_image: None,
        }
    }

    pub fn key(&self) -> ProductKey {
        ProductKey {
            category: self.category.key(),
            subcategory: self.subcategory.as_ref().map(NameRef::key),
            product: self.product.key(),
        }
    }
}

/// Identity of the product a row belongs to. Names are compared
/// case-insensitively while existing and new references stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductKey {
    category: (bool, String),
    subcategory: Option<(bool, String)>,
    product: (bool, String),
}

/// Rows sharing one [`ProductKey`].
#[derive(Debug, Clone)]
pub struct ProductGroup {
    pub rows: Vec<BulkUploadRow>,
}

impl ProductGroup {
    /// The row that defines category, subcategory and product names.
    pub fn head(&self) -> Option<&BulkUploadRow> {
        self.rows.first()
    }

    fn first_supplied(&self, field: impl Fn(&BulkUploadRow) -> Option<&String>) -> Option<String> {
        self.rows
            .iter()
            .filter_map(field)
            .find(|value| !value.trim().is_empty())
            .cloned()
    }

    pub fn brand(&self) -> Option<String> {
        self.first_supplied(|row| row.brand.as_ref())
    }

    pub fn description(&self) -> Option<String> {
        self.first_supplied(|row| row.description.as_ref())
    }

    pub fn product_image(&self) -> Option<String> {
        self.first_supplied(|row| row.product_image.as_ref())
    }

    pub fn row_numbers(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().map(|row| row.row_number)
    }
}

/// Group rows by product, keeping the order in which products first appear.
pub fn group_rows(rows: Vec<BulkUploadRow>) -> Vec<ProductGroup> {
    let mut index: HashMap<ProductKey, usize> = HashMap::new();
    let mut groups: Vec<ProductGroup> = Vec::new();

    for row in rows {
        let key = row.key();
        match index.get(&key) {
            Some(&position) => groups[position].rows.push(row),
            None => {
                index.insert(key, groups.len());
                groups.push(ProductGroup { rows: vec![row] });
            }
        }
    }

    groups
}

/// Who the upload is applied for and how existing records are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkUploadScope {
    pub hub_id: i32,
    pub store_id: i32,
    /// Merge incoming values into records that already exist.
    pub update_existing: bool,
}

/// Problem attached to a spreadsheet row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RowIssue {
    /// Spreadsheet line; `0` when the issue concerns the whole upload.
    pub row: usize,
    pub message: String,
}

/// Outcome of a bulk upload shown to the store owner.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct BulkUploadReport {
    pub rows_processed: usize,
    pub categories_created: usize,
    pub subcategories_created: usize,
    pub products_created: usize,
    pub products_updated: usize,
    pub variants_created: usize,
    pub variants_updated: usize,
    pub inventory_created: usize,
    pub inventory_updated: usize,
    pub errors: Vec<RowIssue>,
    pub warnings: Vec<RowIssue>,
    /// Archive paths referenced by rows but absent from the archive.
    pub missing_images: Vec<String>,
    /// Media paths written into saved records; only these files are stored.
    #[serde(skip)]
    pub applied_images: Vec<String>,
}

impl BulkUploadReport {
    pub fn error(&mut self, row: usize, message: impl Into<String>) {
        self.errors.push(RowIssue {
            row,
            message: message.into(),
        });
    }

    pub fn warning(&mut self, row: usize, message: impl Into<String>) {
        self.warnings.push(RowIssue {
            row,
            message: message.into(),
        });
    }

    pub fn missing_image(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.missing_images.contains(&path) {
            self.missing_images.push(path);
        }
    }

    pub fn image_applied(&mut self, path: &str) {
        if !self.applied_images.iter().any(|known| known == path) {
            self.applied_images.push(path.to_string());
        }
    }

    /// Drop the write counts, keeping the rows read and the issues collected
    /// while parsing.
    pub fn reset_counts(&mut self) {
        *self = Self {
            rows_processed: self.rows_processed,
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
            missing_images: std::mem::take(&mut self.missing_images),
            ..Self::default()
        };
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Records written by the upload.
    pub fn total_changes(&self) -> usize {
        self.categories_created
            + self.subcategories_created
            + self.products_created
            + self.products_updated
            + self.variants_created
            + self.variants_updated
            + self.inventory_created
            + self.inventory_updated
    }
}
