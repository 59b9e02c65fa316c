//! Field merge policies applied when an upload touches existing records.

use crate::domain::inventory::{InventoryItem, UpdateInventoryItem};
use crate::domain::product::{
    NewProduct, NewProductVariant, Product, ProductVariant, UpdateProduct, UpdateProductVariant,
};

/// How an incoming value is combined with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Replace the stored value whenever a non-blank value arrives.
    Overwrite,
    /// Only write when the stored value is missing or blank.
    FillIfEmpty,
    /// Never touch the stored value.
    Never,
}

pub const PRODUCT_DETAILS_POLICY: MergePolicy = MergePolicy::FillIfEmpty;
pub const VARIANT_DETAILS_POLICY: MergePolicy = MergePolicy::FillIfEmpty;
pub const STOCK_POLICY: MergePolicy = MergePolicy::Overwrite;

/// Values that can be considered empty.
pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Blank for i32 {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for i64 {
    fn is_blank(&self) -> bool {
        false
    }
}

/// Decide the value to write for a single field.
///
/// Returns `Some` only when the stored value must change. A blank or missing
/// incoming value never clears a stored one.
pub fn merge_field<T>(existing: Option<&T>, incoming: Option<&T>, policy: MergePolicy) -> Option<T>
where
    T: Blank + Clone + PartialEq,
{
    let incoming = incoming.filter(|value| !value.is_blank())?;
    let existing = existing.filter(|value| !value.is_blank());

    match policy {
        MergePolicy::Never => None,
        MergePolicy::FillIfEmpty => match existing {
            Some(_) => None,
            None => Some(incoming.clone()),
        },
        MergePolicy::Overwrite => match existing {
            Some(current) if current == incoming => None,
            _ => Some(incoming.clone()),
        },
    }
}

/// Patch filling the empty product attributes from an incoming row.
pub fn merge_product(existing: &Product, incoming: &NewProduct) -> UpdateProduct {
    UpdateProduct {
        subcategory_id: merge_field(
            existing.subcategory_id.as_ref(),
            incoming.subcategory_id.as_ref(),
            PRODUCT_DETAILS_POLICY,
        ),
        brand: merge_field(
            existing.brand.as_ref(),
            incoming.brand.as_ref(),
            PRODUCT_DETAILS_POLICY,
        ),
        description: merge_field(
            existing.description.as_ref(),
            incoming.description.as_ref(),
            PRODUCT_DETAILS_POLICY,
        ),
        image: merge_field(
            existing.image.as_ref(),
            incoming.image.as_ref(),
            PRODUCT_DETAILS_POLICY,
        ),
        ..UpdateProduct::new()
    }
}

/// Patch filling the empty variant attributes from an incoming row.
pub fn merge_variant(existing: &ProductVariant, incoming: &NewProductVariant) -> UpdateProductVariant {
    UpdateProductVariant {
        sku: merge_field(
            existing.sku.as_ref(),
            incoming.sku.as_ref(),
            VARIANT_DETAILS_POLICY,
        ),
        barcode: merge_field(
            existing.barcode.as_ref(),
            incoming.barcode.as_ref(),
            VARIANT_DETAILS_POLICY,
        ),
        image: merge_field(
            existing.image.as_ref(),
            incoming.image.as_ref(),
            VARIANT_DETAILS_POLICY,
        ),
        ..UpdateProductVariant::new()
    }
}

/// Patch applying the row price and quantity to a stored inventory row.
pub fn merge_inventory(
    existing: &InventoryItem,
    price_cents: i64,
    quantity: i32,
) -> UpdateInventoryItem {
    let mut patch = UpdateInventoryItem::new();
    patch.price_cents = merge_field(Some(&existing.price_cents), Some(&price_cents), STOCK_POLICY);
    patch.quantity_available = merge_field(
        Some(&existing.quantity_available),
        Some(&quantity),
        STOCK_POLICY,
    );
    if !existing.is_active {
        patch.is_active = Some(true);
    }
    patch
}
