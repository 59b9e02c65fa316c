use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::RepositoryResult;

use crate::{
    domain::category::Category as DomainCategory,
    domain::product::Product as DomainProduct,
    domain::store::VerificationStatus,
    domain::storefront::{
        CategoryCount, StorefrontProduct, StorefrontQuery, SubCategoryCount, cheapest_products,
        rank_counts,
    },
    domain::subcategory::SubCategory as DomainSubCategory,
    models::category::Category as DbCategory,
    models::product::Product as DbProduct,
    models::subcategory::SubCategory as DbSubCategory,
    repository::{DieselRepository, StorefrontReader},
};

impl StorefrontReader for DieselRepository {
    fn list_category_counts(
        &self,
        hub_id: i32,
        limit: usize,
    ) -> RepositoryResult<Vec<CategoryCount>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        let placements = visible_placements(&mut conn, hub_id)?;

        let mut counts: HashMap<i32, usize> = HashMap::new();
        for (category_id, _) in &placements {
            *counts.entry(*category_id).or_default() += 1;
        }
        if counts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = counts.keys().copied().collect();
        let items = categories::table
            .filter(categories::id.eq_any(ids))
            .filter(categories::is_active.eq(true))
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(|db_category| {
                let category = DomainCategory::from(db_category);
                let product_count = counts.get(&category.id).copied().unwrap_or_default();
                CategoryCount {
                    category,
                    product_count,
                }
            })
            .collect();

        Ok(rank_counts(items, limit, |item| {
            (item.product_count, item.category.name.as_str())
        }))
    }

    fn list_subcategory_counts(
        &self,
        hub_id: i32,
        limit: usize,
    ) -> RepositoryResult<Vec<SubCategoryCount>> {
        use crate::schema::{categories, subcategories};

        let mut conn = self.conn()?;
        let placements = visible_placements(&mut conn, hub_id)?;

        let mut counts: HashMap<i32, usize> = HashMap::new();
        for subcategory_id in placements.iter().filter_map(|(_, subcategory)| *subcategory) {
            *counts.entry(subcategory_id).or_default() += 1;
        }
        if counts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = counts.keys().copied().collect();
        let db_subcategories = subcategories::table
            .filter(subcategories::id.eq_any(ids))
            .filter(subcategories::is_active.eq(true))
            .load::<DbSubCategory>(&mut conn)?;

        let category_ids: Vec<i32> = db_subcategories
            .iter()
            .map(|subcategory| subcategory.category_id)
            .collect();
        let category_names: HashMap<i32, String> = categories::table
            .filter(categories::id.eq_any(category_ids))
            .select((categories::id, categories::name))
            .load::<(i32, String)>(&mut conn)?
            .into_iter()
            .collect();

        let items = db_subcategories
            .into_iter()
            .map(|db_subcategory| {
                let subcategory = DomainSubCategory::from(db_subcategory);
                SubCategoryCount {
                    category_name: category_names
                        .get(&subcategory.category_id)
                        .cloned()
                        .unwrap_or_default(),
                    product_count: counts.get(&subcategory.id).copied().unwrap_or_default(),
                    subcategory,
                }
            })
            .collect();

        Ok(rank_counts(items, limit, |item| {
            (item.product_count, item.subcategory.name.as_str())
        }))
    }

    fn list_new_arrivals(
        &self,
        query: &StorefrontQuery,
    ) -> RepositoryResult<Vec<StorefrontProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let stores = visible_stores(&mut conn, query.hub_id)?;
        if stores.is_empty() {
            return Ok(Vec::new());
        }

        let store_ids: Vec<i32> = stores.keys().copied().collect();
        let mut items = products::table
            .filter(products::hub_id.eq(query.hub_id))
            .filter(products::is_active.eq(true))
            .filter(products::store_id.eq_any(store_ids))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if !query.category_ids.is_empty() {
            items = items.filter(products::category_id.eq_any(query.category_ids.clone()));
        }

        let db_products = items
            .order((products::created_at.desc(), products::id.desc()))
            .limit(query.limit as i64)
            .load::<DbProduct>(&mut conn)?;

        let product_ids: Vec<i32> = db_products.iter().map(|product| product.id).collect();
        let offers = in_stock_offers(&mut conn, &product_ids)?;
        let prices: HashMap<i32, i64> = cheapest_products(&offers, offers.len())
            .into_iter()
            .collect();

        Ok(db_products
            .into_iter()
            .map(|db_product| {
                let product = DomainProduct::from(db_product);
                StorefrontProduct {
                    store_name: stores.get(&product.store_id).cloned().unwrap_or_default(),
                    min_price_cents: prices.get(&product.id).copied(),
                    product,
                }
            })
            .collect())
    }

    fn list_best_prices(
        &self,
        query: &StorefrontQuery,
    ) -> RepositoryResult<Vec<StorefrontProduct>> {
        use crate::schema::{product_variants, products, store_inventory};

        let mut conn = self.conn()?;
        let stores = visible_stores(&mut conn, query.hub_id)?;
        if stores.is_empty() {
            return Ok(Vec::new());
        }

        let store_ids: Vec<i32> = stores.keys().copied().collect();
        let mut offers = store_inventory::table
            .inner_join(product_variants::table.inner_join(products::table))
            .filter(products::hub_id.eq(query.hub_id))
            .filter(products::is_active.eq(true))
            .filter(products::store_id.eq_any(store_ids))
            .filter(product_variants::is_active.eq(true))
            .filter(store_inventory::is_active.eq(true))
            .filter(store_inventory::quantity_available.gt(0))
            .select((products::id, store_inventory::price_cents))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if !query.category_ids.is_empty() {
            offers = offers.filter(products::category_id.eq_any(query.category_ids.clone()));
        }

        let offers = offers.load::<(i32, i64)>(&mut conn)?;
        let ranked = cheapest_products(&offers, query.limit);
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = ranked.iter().map(|(id, _)| *id).collect();
        let mut db_products: HashMap<i32, DbProduct> = products::table
            .filter(products::id.eq_any(ids))
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        Ok(ranked
            .into_iter()
            .filter_map(|(id, price)| {
                let product = DomainProduct::from(db_products.remove(&id)?);
                Some(StorefrontProduct {
                    store_name: stores.get(&product.store_id).cloned().unwrap_or_default(),
                    min_price_cents: Some(price),
                    product,
                })
            })
            .collect())
    }
}

/// Names of the active, verified stores of the hub keyed by id.
fn visible_stores(
    conn: &mut SqliteConnection,
    hub_id: i32,
) -> RepositoryResult<HashMap<i32, String>> {
    use crate::schema::stores;

    let verified: &'static str = VerificationStatus::Verified.into();
    let rows = stores::table
        .filter(stores::hub_id.eq(hub_id))
        .filter(stores::is_active.eq(true))
        .filter(stores::verification_status.eq(verified))
        .select((stores::id, stores::name))
        .load::<(i32, String)>(conn)?;

    Ok(rows.into_iter().collect())
}

/// Category and subcategory of every product customers can see.
fn visible_placements(
    conn: &mut SqliteConnection,
    hub_id: i32,
) -> RepositoryResult<Vec<(i32, Option<i32>)>> {
    use crate::schema::products;

    let stores = visible_stores(conn, hub_id)?;
    if stores.is_empty() {
        return Ok(Vec::new());
    }

    let store_ids: Vec<i32> = stores.into_keys().collect();
    let placements = products::table
        .filter(products::hub_id.eq(hub_id))
        .filter(products::is_active.eq(true))
        .filter(products::store_id.eq_any(store_ids))
        .select((products::category_id, products::subcategory_id))
        .load::<(i32, Option<i32>)>(conn)?;

    Ok(placements)
}

/// `(product_id, price_cents)` of every active, in-stock variant of the
/// given products.
fn in_stock_offers(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<Vec<(i32, i64)>> {
    use crate::schema::{product_variants, store_inventory};

    if product_ids.is_empty() {
        return Ok(Vec::new());
    }

    let offers = store_inventory::table
        .inner_join(product_variants::table)
        .filter(product_variants::product_id.eq_any(product_ids))
        .filter(product_variants::is_active.eq(true))
        .filter(store_inventory::is_active.eq(true))
        .filter(store_inventory::quantity_available.gt(0))
        .select((product_variants::product_id, store_inventory::price_cents))
        .load::<(i32, i64)>(conn)?;

    Ok(offers)
}
