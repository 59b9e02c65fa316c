use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::category::{Category as DomainCategory, NewCategory as DomainNewCategory};
use crate::domain::inventory::{
    InventoryItem as DomainInventoryItem, NewInventoryItem as DomainNewInventoryItem,
    UpdateInventoryItem as DomainUpdateInventoryItem,
};
use crate::domain::product::{
    NewProduct as DomainNewProduct, NewProductVariant as DomainNewProductVariant,
    Product as DomainProduct, ProductVariant as DomainProductVariant,
    UpdateProduct as DomainUpdateProduct, UpdateProductVariant as DomainUpdateProductVariant,
};
use crate::domain::slug::name_key;
use crate::domain::subcategory::{
    NewSubCategory as DomainNewSubCategory, SubCategory as DomainSubCategory,
};
use crate::models::category::Category as DbCategory;
use crate::models::inventory::{
    InventoryItem as DbInventoryItem, NewInventoryItem as DbNewInventoryItem,
    UpdateInventoryItem as DbUpdateInventoryItem,
};
use crate::models::product::{
    Product as DbProduct, ProductVariant as DbProductVariant, UpdateProduct as DbUpdateProduct,
    UpdateProductVariant as DbUpdateProductVariant,
};
use crate::models::subcategory::SubCategory as DbSubCategory;
use crate::repository::category::insert_category;
use crate::repository::product::{insert_product, insert_variant};
use crate::repository::subcategory::insert_subcategory;
use crate::repository::{CatalogTransaction, CatalogUnit, DieselRepository};

/// [`CatalogUnit`] bound to a connection with an open transaction.
pub struct DieselCatalogUnit<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> DieselCatalogUnit<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }
}

impl CatalogTransaction for DieselRepository {
    fn in_catalog_transaction<T, F>(&self, work: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut dyn CatalogUnit) -> RepositoryResult<T>,
    {
        let mut conn = self.conn()?;

        conn.transaction::<T, RepositoryError, _>(|conn| {
            let mut unit = DieselCatalogUnit::new(conn);
            work(&mut unit)
        })
    }
}

impl CatalogUnit for DieselCatalogUnit<'_> {
    fn find_visible_category(
        &mut self,
        hub_id: i32,
        store_id: i32,
        name: &str,
    ) -> RepositoryResult<Option<DomainCategory>> {
        use crate::schema::categories;

        // SQLite sorts NULL first, so descending order puts the store-owned row on top.
        let category = categories::table
            .filter(categories::hub_id.eq(hub_id))
            .filter(categories::is_active.eq(true))
            .filter(categories::name_key.eq(name_key(name)))
            .filter(
                categories::is_global
                    .eq(true)
                    .or(categories::store_id.eq(store_id)),
            )
            .order((categories::store_id.desc(), categories::id.asc()))
            .first::<DbCategory>(self.conn)
            .optional()?;

        Ok(category.map(DomainCategory::from))
    }

    fn create_category(
        &mut self,
        new_category: &DomainNewCategory,
    ) -> RepositoryResult<DomainCategory> {
        insert_category(self.conn, new_category)
    }

    fn find_visible_subcategory(
        &mut self,
        hub_id: i32,
        store_id: i32,
        category_id: i32,
        name: &str,
    ) -> RepositoryResult<Option<DomainSubCategory>> {
        use crate::schema::subcategories;

        let subcategory = subcategories::table
            .filter(subcategories::hub_id.eq(hub_id))
            .filter(subcategories::category_id.eq(category_id))
            .filter(subcategories::is_active.eq(true))
            .filter(subcategories::name_key.eq(name_key(name)))
            .filter(
                subcategories::is_global
                    .eq(true)
                    .or(subcategories::store_id.eq(store_id)),
            )
            .order((subcategories::store_id.desc(), subcategories::id.asc()))
            .first::<DbSubCategory>(self.conn)
            .optional()?;

        Ok(subcategory.map(DomainSubCategory::from))
    }

    fn create_subcategory(
        &mut self,
        new_subcategory: &DomainNewSubCategory,
    ) -> RepositoryResult<DomainSubCategory> {
        insert_subcategory(self.conn, new_subcategory)
    }

    fn find_store_product(
        &mut self,
        store_id: i32,
        name: &str,
    ) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let product = products::table
            .filter(products::store_id.eq(store_id))
            .filter(products::name_key.eq(name_key(name)))
            .order(products::id.asc())
            .first::<DbProduct>(self.conn)
            .optional()?;

        Ok(product.map(DomainProduct::from))
    }

    fn create_product(&mut self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        insert_product(self.conn, new_product)
    }

    fn update_product(
        &mut self,
        product_id: i32,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let updated = diesel::update(products::table.filter(products::id.eq(product_id)))
            .set(&DbUpdateProduct::from(updates))
            .get_result::<DbProduct>(self.conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn find_variant(
        &mut self,
        product_id: i32,
        variant_name: &str,
    ) -> RepositoryResult<Option<DomainProductVariant>> {
        use crate::schema::product_variants;

        let variant = product_variants::table
            .filter(product_variants::product_id.eq(product_id))
            .filter(product_variants::is_active.eq(true))
            .filter(product_variants::name_key.eq(name_key(variant_name)))
            .first::<DbProductVariant>(self.conn)
            .optional()?;

        Ok(variant.map(DomainProductVariant::from))
    }

    fn create_variant(
        &mut self,
        product_id: i32,
        new_variant: &DomainNewProductVariant,
    ) -> RepositoryResult<DomainProductVariant> {
        insert_variant(self.conn, product_id, new_variant)
    }

    fn update_variant(
        &mut self,
        variant_id: i32,
        updates: &DomainUpdateProductVariant,
    ) -> RepositoryResult<DomainProductVariant> {
        use crate::schema::product_variants;

        let updated =
            diesel::update(product_variants::table.filter(product_variants::id.eq(variant_id)))
                .set(&DbUpdateProductVariant::from(updates))
                .get_result::<DbProductVariant>(self.conn)
                .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn find_inventory(
        &mut self,
        store_id: i32,
        variant_id: i32,
    ) -> RepositoryResult<Option<DomainInventoryItem>> {
        use crate::schema::store_inventory;

        let item = store_inventory::table
            .filter(store_inventory::store_id.eq(store_id))
            .filter(store_inventory::product_variant_id.eq(variant_id))
            .first::<DbInventoryItem>(self.conn)
            .optional()?;

        Ok(item.map(DomainInventoryItem::from))
    }

    fn create_inventory(
        &mut self,
        new_item: &DomainNewInventoryItem,
    ) -> RepositoryResult<DomainInventoryItem> {
        use crate::schema::store_inventory;

        let created = diesel::insert_into(store_inventory::table)
            .values(&DbNewInventoryItem::from(new_item))
            .get_result::<DbInventoryItem>(self.conn)?;

        Ok(created.into())
    }

    fn update_inventory(
        &mut self,
        item_id: i32,
        updates: &DomainUpdateInventoryItem,
    ) -> RepositoryResult<DomainInventoryItem> {
        use crate::schema::store_inventory;

        let updated = diesel::update(store_inventory::table.filter(store_inventory::id.eq(item_id)))
            .set(&DbUpdateInventoryItem::from(updates))
            .get_result::<DbInventoryItem>(self.conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }
}
