use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::bulk_upload::BulkUploadRow;
use crate::domain::inventory::UpdateInventoryItem;
use crate::forms::bulk_upload::{RowFields, RowValidationError};
use crate::forms::{AmountError, parse_price_cents, parse_quantity, read_upload};
use crate::media::{PRODUCT_IMAGE_FOLDER, StoredFile, VARIANT_IMAGE_FOLDER, prepare_image};

/// Result type returned by the inventory form helpers.
pub type InventoryFormResult<T> = Result<T, InventoryFormError>;

/// Errors that can occur while processing inventory forms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryFormError {
    #[error("invalid price: {0}")]
    Price(AmountError),
    #[error("invalid quantity: {0}")]
    Quantity(AmountError),
    #[error("invalid image: {0}")]
    Image(String),
    #[error("at least one variant is required")]
    NoVariants,
    #[error("variant {index}: {source}")]
    Variant {
        index: usize,
        source: RowValidationError,
    },
}

/// Form payload for adding a single inventory row.
#[derive(Debug, Deserialize)]
pub struct AddInventoryForm {
    /// Slug of a variant of the current store.
    pub variant_slug: String,
    pub price: String,
    pub quantity: String,
}

/// Parsed stock line; the variant is resolved by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryDraft {
    pub variant_slug: String,
    pub price_cents: i64,
    pub quantity: i32,
}

impl AddInventoryForm {
    pub fn into_draft(self) -> InventoryFormResult<InventoryDraft> {
        let price_cents = parse_price_cents(&self.price).map_err(InventoryFormError::Price)?;
        let quantity = parse_quantity(&self.quantity).map_err(InventoryFormError::Quantity)?;
        Ok(InventoryDraft {
            variant_slug: self.variant_slug.trim().to_string(),
            price_cents,
            quantity,
        })
    }
}

/// Form payload for editing an inventory row.
#[derive(Debug, Deserialize)]
pub struct EditInventoryForm {
    pub price: String,
    pub quantity: String,
    /// Checkbox; absent when unchecked.
    #[serde(default)]
    pub is_active: Option<String>,
}

impl EditInventoryForm {
    pub fn into_update(self) -> InventoryFormResult<UpdateInventoryItem> {
        let price_cents = parse_price_cents(&self.price).map_err(InventoryFormError::Price)?;
        let quantity = parse_quantity(&self.quantity).map_err(InventoryFormError::Quantity)?;
        Ok(UpdateInventoryItem::new()
            .price_cents(price_cents)
            .quantity(quantity)
            .active(self.is_active.is_some()))
    }
}

/// The single-page "category, subcategory, product and variants" form. The
/// variant fields, the variant image included, repeat once per variant line.
#[derive(MultipartForm, Default)]
pub struct SmartInventoryForm {
    pub existing_category: Option<Text<String>>,
    pub new_category: Option<Text<String>>,
    pub existing_subcategory: Option<Text<String>>,
    pub new_subcategory: Option<Text<String>>,
    pub existing_product: Option<Text<String>>,
    pub product_name: Option<Text<String>>,
    pub brand: Option<Text<String>>,
    pub description: Option<Text<String>>,
    #[multipart(limit = "5MB")]
    pub product_image: Option<TempFile>,
    pub variant_name: Vec<Text<String>>,
    pub price: Vec<Text<String>>,
    pub quantity: Vec<Text<String>>,
    pub sku: Vec<Text<String>>,
    pub barcode: Vec<Text<String>>,
    #[multipart(limit = "5MB")]
    pub variant_image: Vec<TempFile>,
}

/// Smart form rows with the images to store once the rows are saved.
#[derive(Debug)]
pub struct SmartInventoryInput {
    pub rows: Vec<BulkUploadRow>,
    pub images: Vec<StoredFile>,
}

fn text(value: &Option<Text<String>>) -> Option<&str> {
    value.as_ref().map(|value| value.as_str())
}

fn cell(values: &[Text<String>], index: usize) -> Option<&str> {
    values.get(index).map(|value| value.as_str())
}

fn image_upload(upload: Option<TempFile>, folder: &str) -> InventoryFormResult<Option<StoredFile>> {
    let Some(mut upload) = upload else {
        return Ok(None);
    };

    let bytes = read_upload(&mut upload).map_err(|err| InventoryFormError::Image(err.to_string()))?;
    match bytes {
        Some(bytes) => prepare_image(folder, bytes)
            .map(Some)
            .map_err(|err| InventoryFormError::Image(err.to_string())),
        None => Ok(None),
    }
}

impl SmartInventoryForm {
    /// Convert every variant line into a bulk upload row and check the
    /// attached images. Lines left completely empty are ignored.
    pub fn into_input(self) -> InventoryFormResult<SmartInventoryInput> {
        let product_image = image_upload(self.product_image, PRODUCT_IMAGE_FOLDER)?;
        let mut variant_images: Vec<Option<TempFile>> =
            self.variant_image.into_iter().map(Some).collect();

        let lines = self
            .variant_name
            .len()
            .max(self.price.len())
            .max(self.quantity.len());

        let mut rows = Vec::new();
        let mut images: Vec<StoredFile> = Vec::new();

        for index in 0..lines {
            let variant_name = cell(&self.variant_name, index);
            let price = cell(&self.price, index);
            let quantity = cell(&self.quantity, index);
            let sku = cell(&self.sku, index);
            let barcode = cell(&self.barcode, index);

            let line_is_empty = [variant_name, price, quantity, sku, barcode]
                .iter()
                .all(|value| value.is_none_or(|v| v.trim().is_empty()));
            if line_is_empty {
                continue;
            }

            let fields = RowFields {
                existing_category: text(&self.existing_category),
                new_category: text(&self.new_category),
                existing_subcategory: text(&self.existing_subcategory),
                new_subcategory: text(&self.new_subcategory),
                existing_product: text(&self.existing_product),
                product_name: text(&self.product_name),
                brand: text(&self.brand),
                description: text(&self.description),
                variant_name,
                price,
                quantity,
                sku,
                barcode,
                ..RowFields::default()
            };

            let mut row = fields
                .into_row(index + 1)
                .map_err(|source| InventoryFormError::Variant {
                    index: index + 1,
                    source,
                })?;

            let upload = variant_images.get_mut(index).and_then(Option::take);
            if let Some(file) = image_upload(upload, VARIANT_IMAGE_FOLDER)? {
                row.variant_image = Some(file.path.clone());
                if !images.iter().any(|known| known.path == file.path) {
                    images.push(file);
                }
            }

            rows.push(row);
        }

        let Some(first) = rows.first_mut() else {
            return Err(InventoryFormError::NoVariants);
        };

        if let Some(file) = product_image {
            first.product_image = Some(file.path.clone());
            if !images.iter().any(|known| known.path == file.path) {
                images.push(file);
            }
        }

        Ok(SmartInventoryInput { rows, images })
    }
}
