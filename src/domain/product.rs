use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// Domain representation of a product sold by a store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Store offering the product.
    pub store_id: i32,
    pub category_id: i32,
    pub subcategory_id: Option<i32>,
    /// Human-readable name, unique within the store.
    pub name: String,
    /// Unique URL slug derived from the name.
    pub slug: String,
    pub brand: Option<String>,
    /// Optional longer description shown to customers.
    pub description: Option<String>,
    /// Media path of the product image.
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Variants attached to the product, filled by list queries.
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

/// Sellable variation of a product such as a size or a color.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProductVariant {
    pub id: i32,
    pub product_id: i32,
    /// Name unique within the product.
    pub variant_name: String,
    pub slug: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new product for a store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub hub_id: i32,
    pub store_id: i32,
    pub category_id: i32,
    pub subcategory_id: Option<i32>,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl NewProduct {
    /// Build a new product payload without optional attributes.
    pub fn new(hub_id: i32, store_id: i32, category_id: i32, name: impl Into<String>) -> Self {
        Self {
            hub_id,
            store_id,
            category_id,
            subcategory_id: None,
            name: name.into(),
            brand: None,
            description: None,
            image: None,
        }
    }

    pub fn with_subcategory(mut self, subcategory_id: Option<i32>) -> Self {
        self.subcategory_id = subcategory_id;
        self
    }

    pub fn with_brand(mut self, brand: Option<String>) -> Self {
        self.brand = brand;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }
}

/// Payload required to insert a new variant; the product is supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProductVariant {
    pub variant_name: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub image: Option<String>,
}

impl NewProductVariant {
    pub fn new(variant_name: impl Into<String>) -> Self {
        Self {
            variant_name: variant_name.into(),
            sku: None,
            barcode: None,
            image: None,
        }
    }

    pub fn with_sku(mut self, sku: Option<String>) -> Self {
        self.sku = sku;
        self
    }

    pub fn with_barcode(mut self, barcode: Option<String>) -> Self {
        self.barcode = barcode;
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }
}

/// Patch data applied when updating an existing product.
///
/// `None` leaves the column unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProduct {
    pub subcategory_id: Option<i32>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateProduct {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateProduct {
    /// Create a new patch object with no changes applied yet.
    pub fn new() -> Self {
        Self {
            subcategory_id: None,
            brand: None,
            description: None,
            image: None,
            updated_at: chrono::Local::now().naive_utc(),
        }
    }

    /// Whether applying the patch would change anything.
    pub fn is_empty(&self) -> bool {
        self.subcategory_id.is_none()
            && self.brand.is_none()
            && self.description.is_none()
            && self.image.is_none()
    }
}

/// Patch data applied when updating an existing variant.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProductVariant {
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub image: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateProductVariant {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateProductVariant {
    pub fn new() -> Self {
        Self {
            sku: None,
            barcode: None,
            image: None,
            updated_at: chrono::Local::now().naive_utc(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sku.is_none() && self.barcode.is_none() && self.image.is_none()
    }
}

/// Query definition used to list products of a store.
#[derive(Debug, Clone)]
pub struct ProductListQuery {
    pub hub_id: i32,
    pub store_id: i32,
    /// Optional filter on the category.
    pub category_id: Option<i32>,
    /// Optional case-insensitive search on the name or brand.
    pub search: Option<String>,
    /// Whether deactivated products should be included.
    pub include_inactive: bool,
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    /// Construct a query that targets the products of `store_id`.
    pub fn new(hub_id: i32, store_id: i32) -> Self {
        Self {
            hub_id,
            store_id,
            category_id: None,
            search: None,
            include_inactive: false,
            pagination: None,
        }
    }

    pub fn category(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn include_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
