use std::collections::HashMap;

use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::product::{
        NewProduct as DomainNewProduct, NewProductVariant as DomainNewProductVariant,
        Product as DomainProduct, ProductListQuery, ProductVariant as DomainProductVariant,
    },
    domain::slug::{name_key, next_free_slug, slugify},
    models::product::{
        NewProduct as DbNewProduct, NewProductVariant as DbNewProductVariant,
        Product as DbProduct, ProductVariant as DbProductVariant,
    },
    repository::{DieselRepository, ProductReader, ProductWriter},
};

impl ProductReader for DieselRepository {
    fn get_product_by_slug(
        &self,
        slug: &str,
        store_id: i32,
    ) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let product = products::table
            .filter(products::slug.eq(slug))
            .filter(products::store_id.eq(store_id))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        if let Some(db_product) = product {
            let mut domain: DomainProduct = db_product.into();
            let mut variants = load_variants_for_products(&mut conn, &[domain.id])?;
            domain.variants = variants.remove(&domain.id).unwrap_or_default();
            Ok(Some(domain))
        } else {
            Ok(None)
        }
    }

    fn list_products(
        &self,
        query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainProduct>)> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let build = || {
            let mut items = products::table
                .filter(products::hub_id.eq(query.hub_id))
                .filter(products::store_id.eq(query.store_id))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if !query.include_inactive {
                items = items.filter(products::is_active.eq(true));
            }

            if let Some(category_id) = query.category_id {
                items = items.filter(products::category_id.eq(category_id));
            }

            if let Some(term) = query.search.as_ref() {
                let pattern = format!("%{}%", term);
                items = items.filter(
                    products::name
                        .like(pattern.clone())
                        .or(products::brand.like(pattern)),
                );
            }

            items
        };

        let total = build().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = build().order((products::is_active.desc(), products::name.asc()));

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let db_products = items.load::<DbProduct>(&mut conn)?;

        if db_products.is_empty() {
            return Ok((total, Vec::new()));
        }

        let product_ids: Vec<i32> = db_products.iter().map(|product| product.id).collect();
        let mut variant_map = load_variants_for_products(&mut conn, &product_ids)?;

        let mut domain_products = Vec::with_capacity(db_products.len());
        for db_product in db_products {
            let mut domain: DomainProduct = db_product.into();
            domain.variants = variant_map.remove(&domain.id).unwrap_or_default();
            domain_products.push(domain);
        }

        Ok((total, domain_products))
    }

    fn find_product_by_name(
        &self,
        store_id: i32,
        name: &str,
    ) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let product = products::table
            .filter(products::store_id.eq(store_id))
            .filter(products::name_key.eq(name_key(name)))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        Ok(product.map(DomainProduct::from))
    }

    fn get_variant_by_slug(
        &self,
        slug: &str,
        store_id: i32,
    ) -> RepositoryResult<Option<DomainProductVariant>> {
        use crate::schema::{product_variants, products};

        let mut conn = self.conn()?;

        let variant = product_variants::table
            .inner_join(products::table)
            .filter(product_variants::slug.eq(slug))
            .filter(products::store_id.eq(store_id))
            .select(DbProductVariant::as_select())
            .first::<DbProductVariant>(&mut conn)
            .optional()?;

        Ok(variant.map(DomainProductVariant::from))
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(
        &self,
        new_product: &DomainNewProduct,
        first_variant: &DomainNewProductVariant,
    ) -> RepositoryResult<DomainProduct> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            let mut product = insert_product(conn, new_product)?;
            let variant = insert_variant(conn, product.id, first_variant)?;
            product.variants.push(variant);
            Ok(product)
        })
    }

    fn add_variant(
        &self,
        product_id: i32,
        new_variant: &DomainNewProductVariant,
    ) -> RepositoryResult<DomainProductVariant> {
        let mut conn = self.conn()?;
        insert_variant(&mut conn, product_id, new_variant)
    }

    fn delete_product(&self, product_id: i32, store_id: i32) -> RepositoryResult<()> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let target = products::table
            .filter(products::id.eq(product_id))
            .filter(products::store_id.eq(store_id));

        let deleted = diesel::delete(target).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn delete_variant(&self, variant_id: i32, store_id: i32) -> RepositoryResult<()> {
        use crate::schema::{product_variants, products};

        let mut conn = self.conn()?;

        let owned_products = products::table
            .filter(products::store_id.eq(store_id))
            .select(products::id);

        let target = product_variants::table
            .filter(product_variants::id.eq(variant_id))
            .filter(product_variants::product_id.eq_any(owned_products));

        let deleted = diesel::delete(target).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Insert a product under the first free slug derived from its name.
pub(crate) fn insert_product(
    conn: &mut SqliteConnection,
    new_product: &DomainNewProduct,
) -> RepositoryResult<DomainProduct> {
    use crate::schema::products;

    let base = slugify(&new_product.name, "product");
    let slug = next_free_slug(&base, |candidate| {
        let taken = select(exists(products::table.filter(products::slug.eq(candidate))))
            .get_result::<bool>(&mut *conn)?;
        Ok::<bool, RepositoryError>(taken)
    })?;

    let created = diesel::insert_into(products::table)
        .values(&DbNewProduct::new(new_product, &slug))
        .get_result::<DbProduct>(conn)?;

    Ok(created.into())
}

/// Insert a variant; its slug is derived from the product and variant names.
pub(crate) fn insert_variant(
    conn: &mut SqliteConnection,
    product_id: i32,
    new_variant: &DomainNewProductVariant,
) -> RepositoryResult<DomainProductVariant> {
    use crate::schema::{product_variants, products};

    let product_name = products::table
        .filter(products::id.eq(product_id))
        .select(products::name)
        .first::<String>(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

    let base = slugify(
        &format!("{} {}", product_name, new_variant.variant_name),
        "variant",
    );
    let slug = next_free_slug(&base, |candidate| {
        let taken = select(exists(
            product_variants::table.filter(product_variants::slug.eq(candidate)),
        ))
        .get_result::<bool>(&mut *conn)?;
        Ok::<bool, RepositoryError>(taken)
    })?;

    let created = diesel::insert_into(product_variants::table)
        .values(&DbNewProductVariant::new(product_id, new_variant, &slug))
        .get_result::<DbProductVariant>(conn)?;

    Ok(created.into())
}

fn load_variants_for_products(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<HashMap<i32, Vec<DomainProductVariant>>> {
    use crate::schema::product_variants;

    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = product_variants::table
        .filter(product_variants::product_id.eq_any(product_ids))
        .filter(product_variants::is_active.eq(true))
        .order(product_variants::variant_name.asc())
        .load::<DbProductVariant>(conn)?;

    let mut map: HashMap<i32, Vec<DomainProductVariant>> = HashMap::new();
    for row in rows {
        map.entry(row.product_id).or_default().push(row.into());
    }

    Ok(map)
}
