use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::slug::name_key;

use crate::domain::product::{
    NewProduct as DomainNewProduct, NewProductVariant as DomainNewProductVariant,
    Product as DomainProduct, ProductVariant as DomainProductVariant,
    UpdateProduct as DomainUpdateProduct, UpdateProductVariant as DomainUpdateProductVariant,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub hub_id: i32,
    pub store_id: i32,
    pub category_id: i32,
    pub subcategory_id: Option<i32>,
    pub name: String,
    pub slug: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub name_key: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub hub_id: i32,
    pub store_id: i32,
    pub category_id: i32,
    pub subcategory_id: Option<i32>,
    pub name: &'a str,
    pub slug: &'a str,
    pub brand: Option<&'a str>,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
    pub name_key: String,
}

impl<'a> NewProduct<'a> {
    pub fn new(value: &'a DomainNewProduct, slug: &'a str) -> Self {
        Self {
            hub_id: value.hub_id,
            store_id: value.store_id,
            category_id: value.category_id,
            subcategory_id: value.subcategory_id,
            name: value.name.as_str(),
            slug,
            brand: value.brand.as_deref(),
            description: value.description.as_deref(),
            image: value.image.as_deref(),
            name_key: name_key(&value.name),
        }
    }
}

/// Partial product update; `None` fields are left untouched.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct UpdateProduct<'a> {
    pub subcategory_id: Option<i32>,
    pub brand: Option<&'a str>,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = crate::schema::product_variants)]
pub struct ProductVariant {
    pub id: i32,
    pub product_id: i32,
    pub variant_name: String,
    pub slug: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub name_key: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_variants)]
pub struct NewProductVariant<'a> {
    pub product_id: i32,
    pub variant_name: &'a str,
    pub slug: &'a str,
    pub sku: Option<&'a str>,
    pub barcode: Option<&'a str>,
    pub image: Option<&'a str>,
    pub name_key: String,
}

impl<'a> NewProductVariant<'a> {
    pub fn new(product_id: i32, value: &'a DomainNewProductVariant, slug: &'a str) -> Self {
        Self {
            product_id,
            variant_name: value.variant_name.as_str(),
            slug,
            sku: value.sku.as_deref(),
            barcode: value.barcode.as_deref(),
            image: value.image.as_deref(),
            name_key: name_key(&value.variant_name),
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::product_variants)]
pub struct UpdateProductVariant<'a> {
    pub sku: Option<&'a str>,
    pub barcode: Option<&'a str>,
    pub image: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl From<Product> for DomainProduct {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            hub_id: value.hub_id,
            store_id: value.store_id,
            category_id: value.category_id,
            subcategory_id: value.subcategory_id,
            name: value.name,
            slug: value.slug,
            brand: value.brand,
            description: value.description,
            image: value.image,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
            variants: Vec::new(),
        }
    }
}

impl From<ProductVariant> for DomainProductVariant {
    fn from(value: ProductVariant) -> Self {
        Self {
            id: value.id,
            product_id: value.product_id,
            variant_name: value.variant_name,
            slug: value.slug,
            sku: value.sku,
            barcode: value.barcode,
            image: value.image,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateProduct> for UpdateProduct<'a> {
    fn from(value: &'a DomainUpdateProduct) -> Self {
        Self {
            subcategory_id: value.subcategory_id,
            brand: value.brand.as_deref(),
            description: value.description.as_deref(),
            image: value.image.as_deref(),
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateProductVariant> for UpdateProductVariant<'a> {
    fn from(value: &'a DomainUpdateProductVariant) -> Self {
        Self {
            sku: value.sku.as_deref(),
            barcode: value.barcode.as_deref(),
            image: value.image.as_deref(),
            updated_at: value.updated_at,
        }
    }
}
