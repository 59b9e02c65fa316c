use chrono::{Local, NaiveDateTime};
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

use crate::domain::category::CatalogVisibility;

/// Second catalog level, nested under a [`Category`](crate::domain::category::Category).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
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
}

impl SubCategory {
    pub fn is_visible_to(&self, store_id: i32) -> bool {
        self.is_active && (self.is_global || self.store_id == Some(store_id))
    }
}

/// Payload required to insert a new subcategory.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubCategory {
    pub hub_id: i32,
    pub category_id: i32,
    pub store_id: Option<i32>,
    pub name: String,
    pub image: Option<String>,
    pub is_global: bool,
    pub is_approved: bool,
}

impl NewSubCategory {
    /// Admin-created subcategory: global and approved right away.
    pub fn global(hub_id: i32, category_id: i32, name: impl Into<String>) -> Self {
        Self {
            hub_id,
            category_id,
            store_id: None,
            name: name.into(),
            image: None,
            is_global: true,
            is_approved: true,
        }
    }

    /// Store-created subcategory waiting for admin approval.
    pub fn store_scoped(
        hub_id: i32,
        category_id: i32,
        store_id: i32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            hub_id,
            category_id,
            store_id: Some(store_id),
            name: name.into(),
            image: None,
            is_global: false,
            is_approved: false,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Editable part of a subcategory.
#[derive(Debug, Clone)]
pub struct UpdateSubCategory {
    pub category_id: i32,
    pub name: String,
    /// New image; `None` keeps the current one.
    pub image: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl UpdateSubCategory {
    pub fn new(category_id: i32, name: impl Into<String>, image: Option<String>) -> Self {
        Self {
            category_id,
            name: name.into(),
            image,
            updated_at: Local::now().naive_utc(),
        }
    }
}

/// Query definition used to list subcategories of a hub.
#[derive(Debug, Clone)]
pub struct SubCategoryListQuery {
    pub hub_id: i32,
    pub visibility: CatalogVisibility,
    pub category_id: Option<i32>,
    pub pending_only: bool,
    pub pagination: Option<Pagination>,
}

impl SubCategoryListQuery {
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            visibility: CatalogVisibility::Everything,
            category_id: None,
            pending_only: false,
            pagination: None,
        }
    }

    pub fn visible_to(mut self, store_id: i32) -> Self {
        self.visibility = CatalogVisibility::Store(store_id);
        self
    }

    pub fn category(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn pending_only(mut self) -> Self {
        self.pending_only = true;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
