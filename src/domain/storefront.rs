use std::collections::HashMap;

use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::product::Product;
use crate::domain::subcategory::SubCategory;

/// Number of products shown in each storefront section.
pub const SECTION_SIZE: usize = 10;
pub const TOP_CATEGORIES: usize = 8;
pub const TOP_SUBCATEGORIES: usize = 12;

/// Product offered by a verified store, as customers see it.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StorefrontProduct {
    pub product: Product,
    pub store_name: String,
    /// Lowest price among the active, in-stock variants of the product.
    pub min_price_cents: Option<i64>,
}

/// Category with the number of products customers can see in it.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CategoryCount {
    pub category: Category,
    pub product_count: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SubCategoryCount {
    pub subcategory: SubCategory,
    pub category_name: String,
    pub product_count: usize,
}

/// Query definition for the storefront product sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontQuery {
    pub hub_id: i32,
    /// Only products of these categories; empty means every category.
    pub category_ids: Vec<i32>,
    pub limit: usize,
}

impl StorefrontQuery {
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            category_ids: Vec::new(),
            limit: SECTION_SIZE,
        }
    }

    pub fn categories(mut self, category_ids: Vec<i32>) -> Self {
        self.category_ids = category_ids;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Order counted records by product count, most popular first, and keep the
/// first `limit`. Ties are broken by name so the page is stable.
pub fn rank_counts<T>(mut items: Vec<T>, limit: usize, key: impl Fn(&T) -> (usize, &str)) -> Vec<T> {
    items.sort_by(|a, b| {
        let (count_a, name_a) = key(a);
        let (count_b, name_b) = key(b);
        count_b.cmp(&count_a).then_with(|| name_a.cmp(name_b))
    });
    items.truncate(limit);
    items
}

/// Lowest price per product from `(product_id, price_cents)` offers, cheapest
/// first, keeping `limit` products.
pub fn cheapest_products(offers: &[(i32, i64)], limit: usize) -> Vec<(i32, i64)> {
    let mut lowest: HashMap<i32, i64> = HashMap::new();
    for &(product_id, price) in offers {
        lowest
            .entry(product_id)
            .and_modify(|known| *known = (*known).min(price))
            .or_insert(price);
    }

    let mut best: Vec<(i32, i64)> = lowest.into_iter().collect();
    best.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    best.truncate(limit);
    best
}
