use chrono::{Local, NaiveDateTime};
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// Which catalog rows a caller is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogVisibility {
    /// Every row of the hub regardless of flags (admins).
    Everything,
    /// Active rows that are either global or owned by the given store.
    Store(i32),
}

/// Top level product category.
///
/// Global categories are created by admins and visible to every store.
/// Store-scoped categories belong to one store until an admin approves them,
/// at which point they lose the store reference and become global.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub id: i32,
    pub hub_id: i32,
    /// Owning store for store-scoped categories.
    pub store_id: Option<i32>,
    pub name: String,
    /// Unique URL slug derived from the name.
    pub slug: String,
    /// Media path of the category image.
    pub image: Option<String>,
    pub is_global: bool,
    pub is_approved: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Category {
    /// Whether a store may use the category.
    pub fn is_visible_to(&self, store_id: i32) -> bool {
        self.is_active && (self.is_global || self.store_id == Some(store_id))
    }
}

/// Payload required to insert a new category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub hub_id: i32,
    pub store_id: Option<i32>,
    pub name: String,
    pub image: Option<String>,
    pub is_global: bool,
    pub is_approved: bool,
}

impl NewCategory {
    /// Admin-created category: global and approved right away.
    pub fn global(hub_id: i32, name: impl Into<String>) -> Self {
        Self {
            hub_id,
            store_id: None,
            name: name.into(),
            image: None,
            is_global: true,
            is_approved: true,
        }
    }

    /// Store-created category waiting for admin approval.
    pub fn store_scoped(hub_id: i32, store_id: i32, name: impl Into<String>) -> Self {
        Self {
            hub_id,
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

/// Editable part of a category. Store, approval and activity flags are never
/// touched by an edit.
#[derive(Debug, Clone)]
pub struct UpdateCategory {
    pub name: String,
    /// New image; `None` keeps the current one.
    pub image: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl UpdateCategory {
    pub fn new(name: impl Into<String>, image: Option<String>) -> Self {
        Self {
            name: name.into(),
            image,
            updated_at: Local::now().naive_utc(),
        }
    }
}

/// Query definition used to list categories of a hub.
#[derive(Debug, Clone)]
pub struct CategoryListQuery {
    pub hub_id: i32,
    pub visibility: CatalogVisibility,
    /// Only store-scoped, active categories waiting for approval.
    pub pending_only: bool,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl CategoryListQuery {
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            visibility: CatalogVisibility::Everything,
            pending_only: false,
            search: None,
            pagination: None,
        }
    }

    /// Restrict the list to categories visible to `store_id`.
    pub fn visible_to(mut self, store_id: i32) -> Self {
        self.visibility = CatalogVisibility::Store(store_id);
        self
    }

    pub fn pending_only(mut self) -> Self {
        self.pending_only = true;
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
