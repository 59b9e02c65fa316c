use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::inventory::{
    InventoryCounts, InventoryEntry, InventoryItem as DomainInventoryItem, InventoryListQuery,
    NewInventoryItem as DomainNewInventoryItem, UpdateInventoryItem as DomainUpdateInventoryItem,
};
use crate::models::inventory::{
    InventoryItem as DbInventoryItem, NewInventoryItem as DbNewInventoryItem,
    UpdateInventoryItem as DbUpdateInventoryItem,
};
use crate::repository::{DieselRepository, InventoryReader, InventoryWriter};

type EntryRow = (
    DbInventoryItem,
    i32,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    String,
    Option<String>,
);

impl InventoryReader for DieselRepository {
    fn list_inventory(
        &self,
        query: InventoryListQuery,
    ) -> RepositoryResult<(usize, Vec<InventoryEntry>)> {
        use crate::schema::{product_variants, products, store_inventory};

        let mut conn = self.conn()?;

        let build = || {
            let mut items = store_inventory::table
                .inner_join(product_variants::table.inner_join(products::table))
                .filter(store_inventory::store_id.eq(query.store_id))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if query.active_only {
                items = items
                    .filter(store_inventory::is_active.eq(true))
                    .filter(product_variants::is_active.eq(true))
                    .filter(products::is_active.eq(true));
            }

            if query.in_stock_only {
                items = items.filter(store_inventory::quantity_available.gt(0));
            }

            if let Some(term) = query.search.as_ref() {
                let pattern = format!("%{}%", term);
                items = items.filter(
                    products::name
                        .like(pattern.clone())
                        .or(product_variants::variant_name.like(pattern)),
                );
            }

            items
        };

        let total = build().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = build()
            .order((products::name.asc(), product_variants::variant_name.asc()))
            .select((
                DbInventoryItem::as_select(),
                products::id,
                products::name,
                products::slug,
                products::brand,
                products::image,
                product_variants::variant_name,
                product_variants::slug,
                product_variants::image,
            ));

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            items = items.offset(offset).limit(pagination.per_page as i64);
        }

        let entries = items
            .load::<EntryRow>(&mut conn)?
            .into_iter()
            .map(
                |(
                    item,
                    product_id,
                    product_name,
                    product_slug,
                    brand,
                    product_image,
                    variant_name,
                    variant_slug,
                    variant_image,
                )| InventoryEntry {
                    item: item.into(),
                    product_id,
                    product_name,
                    product_slug,
                    brand,
                    product_image,
                    variant_name,
                    variant_slug,
                    variant_image,
                },
            )
            .collect();

        Ok((total, entries))
    }

    fn get_inventory_item(
        &self,
        id: i32,
        store_id: i32,
    ) -> RepositoryResult<Option<DomainInventoryItem>> {
        use crate::schema::store_inventory;

        let mut conn = self.conn()?;

        let item = store_inventory::table
            .filter(store_inventory::id.eq(id))
            .filter(store_inventory::store_id.eq(store_id))
            .first::<DbInventoryItem>(&mut conn)
            .optional()?;

        Ok(item.map(DomainInventoryItem::from))
    }

    fn find_inventory_for_variant(
        &self,
        store_id: i32,
        variant_id: i32,
    ) -> RepositoryResult<Option<DomainInventoryItem>> {
        use crate::schema::store_inventory;

        let mut conn = self.conn()?;

        let item = store_inventory::table
            .filter(store_inventory::store_id.eq(store_id))
            .filter(store_inventory::product_variant_id.eq(variant_id))
            .first::<DbInventoryItem>(&mut conn)
            .optional()?;

        Ok(item.map(DomainInventoryItem::from))
    }

    fn count_store_catalog(&self, store_id: i32) -> RepositoryResult<InventoryCounts> {
        use crate::schema::{product_variants, products};

        let mut conn = self.conn()?;

        let products = products::table
            .filter(products::store_id.eq(store_id))
            .filter(products::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)?;

        let variants = product_variants::table
            .inner_join(products::table)
            .filter(products::store_id.eq(store_id))
            .filter(products::is_active.eq(true))
            .filter(product_variants::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(InventoryCounts { products, variants })
    }
}

impl InventoryWriter for DieselRepository {
    fn create_inventory(
        &self,
        new_item: &DomainNewInventoryItem,
    ) -> RepositoryResult<DomainInventoryItem> {
        use crate::schema::store_inventory;

        let mut conn = self.conn()?;

        let created = diesel::insert_into(store_inventory::table)
            .values(&DbNewInventoryItem::from(new_item))
            .get_result::<DbInventoryItem>(&mut conn)?;

        Ok(created.into())
    }

    fn update_inventory(
        &self,
        item_id: i32,
        store_id: i32,
        updates: &DomainUpdateInventoryItem,
    ) -> RepositoryResult<DomainInventoryItem> {
        use crate::schema::store_inventory;

        let mut conn = self.conn()?;

        let target = store_inventory::table
            .filter(store_inventory::id.eq(item_id))
            .filter(store_inventory::store_id.eq(store_id));

        let updated = diesel::update(target)
            .set(&DbUpdateInventoryItem::from(updates))
            .get_result::<DbInventoryItem>(&mut conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn delete_inventory(&self, item_id: i32, store_id: i32) -> RepositoryResult<()> {
        use crate::schema::store_inventory;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            store_inventory::table
                .filter(store_inventory::id.eq(item_id))
                .filter(store_inventory::store_id.eq(store_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
