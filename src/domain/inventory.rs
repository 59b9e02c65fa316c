use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// Stock and price of one product variant in one store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: i32,
    pub store_id: i32,
    pub product_variant_id: i32,
    /// Price represented in the smallest currency unit.
    pub price_cents: i64,
    /// Units available for pickup, never negative.
    pub quantity_available: i32,
    pub is_active: bool,
    pub last_updated: NaiveDateTime,
}

/// Inventory row joined with the names customers and owners see.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InventoryEntry {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub product_id: i32,
    pub product_name: String,
    pub product_slug: String,
    pub brand: Option<String>,
    pub product_image: Option<String>,
    pub variant_name: String,
    pub variant_slug: String,
    pub variant_image: Option<String>,
}

/// Payload required to insert a new inventory row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryItem {
    pub store_id: i32,
    pub product_variant_id: i32,
    pub price_cents: i64,
    pub quantity_available: i32,
}

impl NewInventoryItem {
    pub fn new(store_id: i32, product_variant_id: i32, price_cents: i64, quantity: i32) -> Self {
        Self {
            store_id,
            product_variant_id,
            price_cents,
            quantity_available: quantity,
        }
    }
}

/// Patch data applied when updating an inventory row.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInventoryItem {
    pub price_cents: Option<i64>,
    pub quantity_available: Option<i32>,
    pub is_active: Option<bool>,
    pub last_updated: NaiveDateTime,
}

impl Default for UpdateInventoryItem {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateInventoryItem {
    pub fn new() -> Self {
        Self {
            price_cents: None,
            quantity_available: None,
            is_active: None,
            last_updated: chrono::Local::now().naive_utc(),
        }
    }

    pub fn price_cents(mut self, price_cents: i64) -> Self {
        self.price_cents = Some(price_cents);
        self
    }

    pub fn quantity(mut self, quantity: i32) -> Self {
        self.quantity_available = Some(quantity);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.price_cents.is_none() && self.quantity_available.is_none() && self.is_active.is_none()
    }
}

/// Query definition used to list the inventory of a store.
#[derive(Debug, Clone)]
pub struct InventoryListQuery {
    pub store_id: i32,
    /// Only active rows of active products and variants.
    pub active_only: bool,
    /// Only rows with stock left.
    pub in_stock_only: bool,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl InventoryListQuery {
    pub fn new(store_id: i32) -> Self {
        Self {
            store_id,
            active_only: false,
            in_stock_only: false,
            search: None,
            pagination: None,
        }
    }

    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn in_stock_only(mut self) -> Self {
        self.in_stock_only = true;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Catalog size of a store shown above the inventory table.
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryCounts {
    pub products: i64,
    pub variants: i64,
}
