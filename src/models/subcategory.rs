use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::slug::name_key;

use crate::domain::subcategory::{
    NewSubCategory as DomainNewSubCategory, SubCategory as DomainSubCategory,
    UpdateSubCategory as DomainUpdateSubCategory,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::subcategories)]
pub struct SubCategory {
    pub id: i32,
    pub hub_id: i32,
    pub category_id: i32,
    pub store_id: Option<i32>,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub is_global: bool,
    pub is_approved: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub name_key: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::subcategories)]
pub struct NewSubCategory<'a> {
    pub hub_id: i32,
    pub category_id: i32,
    pub store_id: Option<i32>,
    pub name: &'a str,
    pub slug: &'a str,
    pub image: Option<&'a str>,
    pub is_global: bool,
    pub is_approved: bool,
    pub name_key: String,
}

impl<'a> NewSubCategory<'a> {
    pub fn new(value: &'a DomainNewSubCategory, slug: &'a str) -> Self {
        Self {
            hub_id: value.hub_id,
            category_id: value.category_id,
            store_id: value.store_id,
            name: value.name.as_str(),
            slug,
            image: value.image.as_deref(),
            is_global: value.is_global,
            is_approved: value.is_approved,
            name_key: name_key(&value.name),
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::subcategories)]
pub struct UpdateSubCategory<'a> {
    pub category_id: i32,
    pub name: &'a str,
    pub name_key: String,
    pub image: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl From<SubCategory> for DomainSubCategory {
    fn from(value: SubCategory) -> Self {
        Self {
            id: value.id,
            hub_id: value.hub_id,
            category_id: value.category_id,
            store_id: value.store_id,
            name: value.name,
            slug: value.slug,
            image: value.image,
            is_global: value.is_global,
            is_approved: value.is_approved,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateSubCategory> for UpdateSubCategory<'a> {
    fn from(value: &'a DomainUpdateSubCategory) -> Self {
        Self {
            category_id: value.category_id,
            name: value.name.as_str(),
            name_key: name_key(&value.name),
            image: value.image.as_deref(),
            updated_at: value.updated_at,
        }
    }
}
