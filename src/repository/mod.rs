use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::category::{Category, CategoryListQuery, NewCategory, UpdateCategory};
use crate::domain::inventory::{
    InventoryCounts, InventoryEntry, InventoryItem, InventoryListQuery, NewInventoryItem,
    UpdateInventoryItem,
};
use crate::domain::product::{
    NewProduct, NewProductVariant, Product, ProductListQuery, ProductVariant, UpdateProduct,
    UpdateProductVariant,
};
use crate::domain::store::{
    NewStore, NewStoreVerification, Store, StoreListQuery, StoreVerification,
    StoreWithVerification, UpdateStore, VerificationDecision,
};
use crate::domain::storefront::{
    CategoryCount, StorefrontProduct, StorefrontQuery, SubCategoryCount,
};
use crate::domain::subcategory::{
    NewSubCategory, SubCategory, SubCategoryListQuery, UpdateSubCategory,
};

pub mod catalog_unit;
pub mod category;
pub mod inventory;
pub mod product;
pub mod store;
pub mod storefront;
pub mod subcategory;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over stores and their KYC records.
pub trait StoreReader {
    fn get_store_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Store>>;
    fn list_stores(&self, query: StoreListQuery) -> RepositoryResult<(usize, Vec<Store>)>;
    /// First store (lowest id) owned by `owner_email` in the hub.
    fn find_owner_store(&self, hub_id: i32, owner_email: &str) -> RepositoryResult<Option<Store>>;
    fn get_verification(&self, store_id: i32) -> RepositoryResult<Option<StoreVerification>>;
    /// Every store of the hub, newest first, with its verification record.
    fn list_verification_queue(&self, hub_id: i32)
    -> RepositoryResult<Vec<StoreWithVerification>>;
}

/// Write operations over stores and their KYC records.
pub trait StoreWriter {
    fn create_store(&self, new_store: &NewStore) -> RepositoryResult<Store>;
    fn update_store(
        &self,
        store_id: i32,
        hub_id: i32,
        updates: &UpdateStore,
    ) -> RepositoryResult<Store>;
    fn delete_store(&self, store_id: i32, hub_id: i32) -> RepositoryResult<()>;
    /// Replace the documents of a store and put it back in the review queue.
    fn submit_verification(
        &self,
        documents: &NewStoreVerification,
    ) -> RepositoryResult<StoreVerification>;
    /// Record an admin decision and update the store status accordingly.
    fn review_verification(
        &self,
        store_id: i32,
        decision: &VerificationDecision,
    ) -> RepositoryResult<StoreVerification>;
}

/// Read-only operations over category records.
pub trait CategoryReader {
    fn get_category_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Category>>;
    fn get_category_by_slug(&self, slug: &str, hub_id: i32) -> RepositoryResult<Option<Category>>;
    fn list_categories(&self, query: CategoryListQuery)
    -> RepositoryResult<(usize, Vec<Category>)>;
}

/// Write operations over category records.
pub trait CategoryWriter {
    /// Insert a category under the first free slug derived from its name.
    fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
    fn update_category(
        &self,
        category_id: i32,
        hub_id: i32,
        updates: &UpdateCategory,
    ) -> RepositoryResult<Category>;
    fn delete_category(&self, category_id: i32, hub_id: i32) -> RepositoryResult<()>;
    /// Promote a store-scoped category to a global, approved one.
    fn approve_category(&self, category_id: i32, hub_id: i32) -> RepositoryResult<Category>;
    /// Deactivate a store-scoped category.
    fn reject_category(&self, category_id: i32, hub_id: i32) -> RepositoryResult<Category>;
}

/// Read-only operations over subcategory records.
pub trait SubCategoryReader {
    fn get_subcategory_by_id(&self, id: i32, hub_id: i32)
    -> RepositoryResult<Option<SubCategory>>;
    fn get_subcategory_by_slug(
        &self,
        slug: &str,
        hub_id: i32,
    ) -> RepositoryResult<Option<SubCategory>>;
    fn list_subcategories(
        &self,
        query: SubCategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<SubCategory>)>;
}

/// Write operations over subcategory records.
pub trait SubCategoryWriter {
    fn create_subcategory(&self, new_subcategory: &NewSubCategory)
    -> RepositoryResult<SubCategory>;
    fn update_subcategory(
        &self,
        subcategory_id: i32,
        hub_id: i32,
        updates: &UpdateSubCategory,
    ) -> RepositoryResult<SubCategory>;
    fn delete_subcategory(&self, subcategory_id: i32, hub_id: i32) -> RepositoryResult<()>;
    fn approve_subcategory(&self, subcategory_id: i32, hub_id: i32)
    -> RepositoryResult<SubCategory>;
    fn reject_subcategory(&self, subcategory_id: i32, hub_id: i32)
    -> RepositoryResult<SubCategory>;
}

/// Read-only operations over products and their variants.
pub trait ProductReader {
    /// Product of `store_id` with its variants.
    fn get_product_by_slug(&self, slug: &str, store_id: i32) -> RepositoryResult<Option<Product>>;
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    /// Product of `store_id` whose name matches case-insensitively.
    fn find_product_by_name(&self, store_id: i32, name: &str) -> RepositoryResult<Option<Product>>;
    /// Variant of a product belonging to `store_id`.
    fn get_variant_by_slug(
        &self,
        slug: &str,
        store_id: i32,
    ) -> RepositoryResult<Option<ProductVariant>>;
}

/// Write operations over products and their variants.
pub trait ProductWriter {
    /// Insert a product together with its first variant.
    fn create_product(
        &self,
        new_product: &NewProduct,
        first_variant: &NewProductVariant,
    ) -> RepositoryResult<Product>;
    fn add_variant(
        &self,
        product_id: i32,
        new_variant: &NewProductVariant,
    ) -> RepositoryResult<ProductVariant>;
    fn delete_product(&self, product_id: i32, store_id: i32) -> RepositoryResult<()>;
    fn delete_variant(&self, variant_id: i32, store_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over store inventory.
pub trait InventoryReader {
    fn list_inventory(
        &self,
        query: InventoryListQuery,
    ) -> RepositoryResult<(usize, Vec<InventoryEntry>)>;
    fn get_inventory_item(&self, id: i32, store_id: i32)
    -> RepositoryResult<Option<InventoryItem>>;
    fn find_inventory_for_variant(
        &self,
        store_id: i32,
        variant_id: i32,
    ) -> RepositoryResult<Option<InventoryItem>>;
    /// Active products and variants of the store.
    fn count_store_catalog(&self, store_id: i32) -> RepositoryResult<InventoryCounts>;
}

/// Write operations over store inventory.
pub trait InventoryWriter {
    fn create_inventory(&self, new_item: &NewInventoryItem) -> RepositoryResult<InventoryItem>;
    fn update_inventory(
        &self,
        item_id: i32,
        store_id: i32,
        updates: &UpdateInventoryItem,
    ) -> RepositoryResult<InventoryItem>;
    fn delete_inventory(&self, item_id: i32, store_id: i32) -> RepositoryResult<()>;
}

/// Customer-facing catalog reads. Only active products of active, verified
/// stores are ever returned or counted.
pub trait StorefrontReader {
    /// Active categories of the hub holding at least one visible product,
    /// most populated first.
    fn list_category_counts(&self, hub_id: i32, limit: usize)
    -> RepositoryResult<Vec<CategoryCount>>;
    fn list_subcategory_counts(
        &self,
        hub_id: i32,
        limit: usize,
    ) -> RepositoryResult<Vec<SubCategoryCount>>;
    /// Most recently added products.
    fn list_new_arrivals(&self, query: &StorefrontQuery)
    -> RepositoryResult<Vec<StorefrontProduct>>;
    /// In-stock products ordered by their lowest price.
    fn list_best_prices(&self, query: &StorefrontQuery)
    -> RepositoryResult<Vec<StorefrontProduct>>;
}

/// Catalog operations available inside one bulk upload transaction.
///
/// Every name lookup is case-insensitive and limited to active records.
pub trait CatalogUnit {
    /// Category of the hub named `name` that is global or owned by `store_id`;
    /// the store-owned one wins when both exist.
    fn find_visible_category(
        &mut self,
        hub_id: i32,
        store_id: i32,
        name: &str,
    ) -> RepositoryResult<Option<Category>>;
    fn create_category(&mut self, new_category: &NewCategory) -> RepositoryResult<Category>;
    fn find_visible_subcategory(
        &mut self,
        hub_id: i32,
        store_id: i32,
        category_id: i32,
        name: &str,
    ) -> RepositoryResult<Option<SubCategory>>;
    fn create_subcategory(
        &mut self,
        new_subcategory: &NewSubCategory,
    ) -> RepositoryResult<SubCategory>;
    fn find_store_product(&mut self, store_id: i32, name: &str)
    -> RepositoryResult<Option<Product>>;
    fn create_product(&mut self, new_product: &NewProduct) -> RepositoryResult<Product>;
    fn update_product(
        &mut self,
        product_id: i32,
        updates: &UpdateProduct,
    ) -> RepositoryResult<Product>;
    fn find_variant(
        &mut self,
        product_id: i32,
        variant_name: &str,
    ) -> RepositoryResult<Option<ProductVariant>>;
    fn create_variant(
        &mut self,
        product_id: i32,
        new_variant: &NewProductVariant,
    ) -> RepositoryResult<ProductVariant>;
    fn update_variant(
        &mut self,
        variant_id: i32,
        updates: &UpdateProductVariant,
    ) -> RepositoryResult<ProductVariant>;
    fn find_inventory(
        &mut self,
        store_id: i32,
        variant_id: i32,
    ) -> RepositoryResult<Option<InventoryItem>>;
    fn create_inventory(&mut self, new_item: &NewInventoryItem) -> RepositoryResult<InventoryItem>;
    fn update_inventory(
        &mut self,
        item_id: i32,
        updates: &UpdateInventoryItem,
    ) -> RepositoryResult<InventoryItem>;
}

/// Runs catalog work atomically: everything `work` wrote is rolled back when
/// it returns an error.
pub trait CatalogTransaction {
    fn in_catalog_transaction<T, F>(&self, work: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut dyn CatalogUnit) -> RepositoryResult<T>;
}
