use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::inventory::{
    InventoryItem as DomainInventoryItem, NewInventoryItem as DomainNewInventoryItem,
    UpdateInventoryItem as DomainUpdateInventoryItem,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::store_inventory)]
pub struct InventoryItem {
    pub id: i32,
    pub store_id: i32,
    pub product_variant_id: i32,
    pub price_cents: i64,
    pub quantity_available: i32,
    pub is_active: bool,
    pub last_updated: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::store_inventory)]
pub struct NewInventoryItem {
    pub store_id: i32,
    pub product_variant_id: i32,
    pub price_cents: i64,
    pub quantity_available: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::store_inventory)]
pub struct UpdateInventoryItem {
    pub price_cents: Option<i64>,
    pub quantity_available: Option<i32>,
    pub is_active: Option<bool>,
    pub last_updated: NaiveDateTime,
}

impl From<InventoryItem> for DomainInventoryItem {
    fn from(value: InventoryItem) -> Self {
        Self {
            id: value.id,
            store_id: value.store_id,
            product_variant_id: value.product_variant_id,
            price_cents: value.price_cents,
            quantity_available: value.quantity_available,
            is_active: value.is_active,
            last_updated: value.last_updated,
        }
    }
}

impl From<&DomainNewInventoryItem> for NewInventoryItem {
    fn from(value: &DomainNewInventoryItem) -> Self {
        Self {
            store_id: value.store_id,
            product_variant_id: value.product_variant_id,
            price_cents: value.price_cents,
            quantity_available: value.quantity_available,
        }
    }
}

impl From<&DomainUpdateInventoryItem> for UpdateInventoryItem {
    fn from(value: &DomainUpdateInventoryItem) -> Self {
        Self {
            price_cents: value.price_cents,
            quantity_available: value.quantity_available,
            is_active: value.is_active,
            last_updated: value.last_updated,
        }
    }
}
