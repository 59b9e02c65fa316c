use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::slug::name_key;

use crate::domain::category::{
    Category as DomainCategory, NewCategory as DomainNewCategory,
    UpdateCategory as DomainUpdateCategory,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::categories)]
pub struct Category {
    pub id: i32,
    pub hub_id: i32,
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
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory<'a> {
    pub hub_id: i32,
    pub store_id: Option<i32>,
    pub name: &'a str,
    pub slug: &'a str,
    pub image: Option<&'a str>,
    pub is_global: bool,
    pub is_approved: bool,
    pub name_key: String,
}

impl<'a> NewCategory<'a> {
    pub fn new(value: &'a DomainNewCategory, slug: &'a str) -> Self {
        Self {
            hub_id: value.hub_id,
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

/// Rename and optionally replace the image; `None` image is skipped.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::categories)]
pub struct UpdateCategory<'a> {
    pub name: &'a str,
    pub name_key: String,
    pub image: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl From<Category> for DomainCategory {
    fn from(value: Category) -> Self {
        Self {
            id: value.id,
            hub_id: value.hub_id,
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

impl<'a> From<&'a DomainUpdateCategory> for UpdateCategory<'a> {
    fn from(value: &'a DomainUpdateCategory) -> Self {
        Self {
            name: value.name.as_str(),
            name_key: name_key(&value.name),
            image: value.image.as_deref(),
            updated_at: value.updated_at,
        }
    }
}
