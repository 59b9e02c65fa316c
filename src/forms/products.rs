use pushkind_common::routes::empty_string_as_none;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::{NewProduct, NewProductVariant};
use crate::forms::{non_empty_inline, sanitize_code, sanitize_inline_text, sanitize_multiline_text};

/// Maximum allowed length for product and variant names.
const NAME_MAX_LEN: usize = 128;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Maximum allowed length for a SKU or barcode.
const CODE_MAX_LEN: usize = 64;
const CODE_MAX_LEN_VALIDATOR: u64 = CODE_MAX_LEN as u64;

/// Maximum allowed length for a product description.
const DESCRIPTION_MAX_LEN: usize = 4096;
const DESCRIPTION_MAX_LEN_VALIDATOR: u64 = DESCRIPTION_MAX_LEN as u64;

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing product forms.
#[derive(Debug, Error)]
pub enum ProductFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("product name cannot be empty")]
    EmptyName,
    /// The variant name is empty after sanitization.
    #[error("variant name cannot be empty")]
    EmptyVariantName,
    /// Supplied identifier field could not be parsed.
    #[error("invalid {field} `{value}`")]
    InvalidIdentifier { field: &'static str, value: String },
}

/// Form payload emitted when submitting the "Add product" form.
#[derive(Debug, Deserialize, Validate)]
pub struct AddProductForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    pub category_id: i32,
    /// Optional subcategory identifier in string form.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub subcategory_id: Option<String>,
    #[validate(length(max = NAME_MAX_LEN_VALIDATOR))]
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub brand: Option<String>,
    #[validate(length(max = DESCRIPTION_MAX_LEN_VALIDATOR))]
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
    /// Name of the first variant.
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub variant_name: String,
    #[validate(length(max = CODE_MAX_LEN_VALIDATOR))]
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub sku: Option<String>,
    #[validate(length(max = CODE_MAX_LEN_VALIDATOR))]
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub barcode: Option<String>,
}

impl AddProductForm {
    /// Validates and sanitizes the payload into a product and its first
    /// variant.
    pub fn into_new_product(
        self,
        hub_id: i32,
        store_id: i32,
    ) -> ProductFormResult<(NewProduct, NewProductVariant)> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(ProductFormError::EmptyName);
        }

        let subcategory_id = parse_optional_id(self.subcategory_id, "subcategory")?;
        let description = self
            .description
            .as_deref()
            .map(sanitize_multiline_text)
            .filter(|value| !value.is_empty());

        let product = NewProduct::new(hub_id, store_id, self.category_id, name)
            .with_subcategory(subcategory_id)
            .with_brand(non_empty_inline(self.brand.as_deref()))
            .with_description(description);

        let variant = variant_from_parts(&self.variant_name, self.sku, self.barcode)?;

        Ok((product, variant))
    }
}

/// Form payload for adding another variant to an existing product.
#[derive(Debug, Deserialize, Validate)]
pub struct AddVariantForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub variant_name: String,
    #[validate(length(max = CODE_MAX_LEN_VALIDATOR))]
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub sku: Option<String>,
    #[validate(length(max = CODE_MAX_LEN_VALIDATOR))]
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub barcode: Option<String>,
}

impl AddVariantForm {
    pub fn into_new_variant(self) -> ProductFormResult<NewProductVariant> {
        self.validate()?;
        variant_from_parts(&self.variant_name, self.sku, self.barcode)
    }
}

fn variant_from_parts(
    variant_name: &str,
    sku: Option<String>,
    barcode: Option<String>,
) -> ProductFormResult<NewProductVariant> {
    let variant_name = sanitize_inline_text(variant_name);
    if variant_name.is_empty() {
        return Err(ProductFormError::EmptyVariantName);
    }

    let code = |value: Option<String>| {
        value
            .as_deref()
            .map(sanitize_code)
            .filter(|value| !value.is_empty())
    };

    Ok(NewProductVariant::new(variant_name)
        .with_sku(code(sku))
        .with_barcode(code(barcode)))
}

fn parse_optional_id(value: Option<String>, field: &'static str) -> ProductFormResult<Option<i32>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ProductFormError::InvalidIdentifier {
                field,
                value: raw.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_form() -> AddProductForm {
        AddProductForm {
            name: "  Razer   Kraken ".to_string(),
            category_id: 3,
            subcategory_id: Some("4".to_string()),
            brand: Some(" Razer ".to_string()),
            description: Some(" Wired.\n\n\n Comfortable. ".to_string()),
            variant_name: " Black ".to_string(),
            sku: Some(" RZ-1 ".to_string()),
            barcode: Some("   ".to_string()),
        }
    }

    #[test]
    fn add_product_form_converts_successfully() {
        let (product, variant) = product_form()
            .into_new_product(9, 2)
            .expect("expected success");

        assert_eq!(product.hub_id, 9);
        assert_eq!(product.store_id, 2);
        assert_eq!(product.category_id, 3);
        assert_eq!(product.subcategory_id, Some(4));
        assert_eq!(product.name, "Razer Kraken");
        assert_eq!(product.brand.as_deref(), Some("Razer"));
        assert_eq!(product.description.as_deref(), Some("Wired.\n\nComfortable."));
        assert_eq!(variant.variant_name, "Black");
        assert_eq!(variant.sku.as_deref(), Some("RZ-1"));
        assert_eq!(variant.barcode, None);
    }

    #[test]
    fn add_product_form_rejects_empty_name() {
        let form = AddProductForm {
            name: "   ".to_string(),
            ..product_form()
        };

        assert!(matches!(
            form.into_new_product(9, 2),
            Err(ProductFormError::EmptyName)
        ));
    }

    #[test]
    fn add_product_form_rejects_bad_subcategory() {
        let form = AddProductForm {
            subcategory_id: Some("abc".to_string()),
            ..product_form()
        };

        assert!(matches!(
            form.into_new_product(9, 2),
            Err(ProductFormError::InvalidIdentifier { field: "subcategory", value }) if value == "abc"
        ));
    }

    #[test]
    fn add_variant_form_rejects_blank_name() {
        let form = AddVariantForm {
            variant_name: " \t ".to_string(),
            sku: None,
            barcode: None,
        };

        assert!(matches!(
            form.into_new_variant(),
            Err(ProductFormError::EmptyVariantName)
        ));
    }
}
