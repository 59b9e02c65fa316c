use mockall::mock;

use super::{
    CategoryReader, CategoryWriter, InventoryReader, InventoryWriter, ProductReader,
    ProductWriter, StoreReader, StoreWriter, StorefrontReader, SubCategoryReader,
    SubCategoryWriter,
};
use crate::domain::{
    category::{Category, CategoryListQuery, NewCategory, UpdateCategory},
    inventory::{
        InventoryCounts, InventoryEntry, InventoryItem, InventoryListQuery, NewInventoryItem,
        UpdateInventoryItem,
    },
    product::{NewProduct, NewProductVariant, Product, ProductListQuery, ProductVariant},
    store::{
        NewStore, NewStoreVerification, Store, StoreListQuery, StoreVerification,
        StoreWithVerification, UpdateStore, VerificationDecision,
    },
    storefront::{CategoryCount, StorefrontProduct, StorefrontQuery, SubCategoryCount},
    subcategory::{NewSubCategory, SubCategory, SubCategoryListQuery, UpdateSubCategory},
};
use pushkind_common::repository::errors::RepositoryResult;

mock! {
    pub Marketplace {}

    impl StoreReader for Marketplace {
        fn get_store_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Store>>;
        fn list_stores(&self, query: StoreListQuery) -> RepositoryResult<(usize, Vec<Store>)>;
        fn find_owner_store(&self, hub_id: i32, owner_email: &str) -> RepositoryResult<Option<Store>>;
        fn get_verification(&self, store_id: i32) -> RepositoryResult<Option<StoreVerification>>;
        fn list_verification_queue(&self, hub_id: i32) -> RepositoryResult<Vec<StoreWithVerification>>;
    }

    impl StoreWriter for Marketplace {
        fn create_store(&self, new_store: &NewStore) -> RepositoryResult<Store>;
        fn update_store(&self, store_id: i32, hub_id: i32, updates: &UpdateStore) -> RepositoryResult<Store>;
        fn delete_store(&self, store_id: i32, hub_id: i32) -> RepositoryResult<()>;
        fn submit_verification(&self, documents: &NewStoreVerification) -> RepositoryResult<StoreVerification>;
        fn review_verification(&self, store_id: i32, decision: &VerificationDecision) -> RepositoryResult<StoreVerification>;
    }

    impl CategoryReader for Marketplace {
        fn get_category_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Category>>;
        fn get_category_by_slug(&self, slug: &str, hub_id: i32) -> RepositoryResult<Option<Category>>;
        fn list_categories(&self, query: CategoryListQuery) -> RepositoryResult<(usize, Vec<Category>)>;
    }

    impl CategoryWriter for Marketplace {
        fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
        fn update_category(&self, category_id: i32, hub_id: i32, updates: &UpdateCategory) -> RepositoryResult<Category>;
        fn delete_category(&self, category_id: i32, hub_id: i32) -> RepositoryResult<()>;
        fn approve_category(&self, category_id: i32, hub_id: i32) -> RepositoryResult<Category>;
        fn reject_category(&self, category_id: i32, hub_id: i32) -> RepositoryResult<Category>;
    }

    impl SubCategoryReader for Marketplace {
        fn get_subcategory_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<SubCategory>>;
        fn get_subcategory_by_slug(&self, slug: &str, hub_id: i32) -> RepositoryResult<Option<SubCategory>>;
        fn list_subcategories(&self, query: SubCategoryListQuery) -> RepositoryResult<(usize, Vec<SubCategory>)>;
    }

    impl SubCategoryWriter for Marketplace {
        fn create_subcategory(&self, new_subcategory: &NewSubCategory) -> RepositoryResult<SubCategory>;
        fn update_subcategory(&self, subcategory_id: i32, hub_id: i32, updates: &UpdateSubCategory) -> RepositoryResult<SubCategory>;
        fn delete_subcategory(&self, subcategory_id: i32, hub_id: i32) -> RepositoryResult<()>;
        fn approve_subcategory(&self, subcategory_id: i32, hub_id: i32) -> RepositoryResult<SubCategory>;
        fn reject_subcategory(&self, subcategory_id: i32, hub_id: i32) -> RepositoryResult<SubCategory>;
    }

    impl ProductReader for Marketplace {
        fn get_product_by_slug(&self, slug: &str, store_id: i32) -> RepositoryResult<Option<Product>>;
        fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
        fn find_product_by_name(&self, store_id: i32, name: &str) -> RepositoryResult<Option<Product>>;
        fn get_variant_by_slug(&self, slug: &str, store_id: i32) -> RepositoryResult<Option<ProductVariant>>;
    }

    impl ProductWriter for Marketplace {
        fn create_product(&self, new_product: &NewProduct, first_variant: &NewProductVariant) -> RepositoryResult<Product>;
        fn add_variant(&self, product_id: i32, new_variant: &NewProductVariant) -> RepositoryResult<ProductVariant>;
        fn delete_product(&self, product_id: i32, store_id: i32) -> RepositoryResult<()>;
        fn delete_variant(&self, variant_id: i32, store_id: i32) -> RepositoryResult<()>;
    }

    impl InventoryReader for Marketplace {
        fn list_inventory(&self, query: InventoryListQuery) -> RepositoryResult<(usize, Vec<InventoryEntry>)>;
        fn get_inventory_item(&self, id: i32, store_id: i32) -> RepositoryResult<Option<InventoryItem>>;
        fn find_inventory_for_variant(&self, store_id: i32, variant_id: i32) -> RepositoryResult<Option<InventoryItem>>;
        fn count_store_catalog(&self, store_id: i32) -> RepositoryResult<InventoryCounts>;
    }

    impl InventoryWriter for Marketplace {
        fn create_inventory(&self, new_item: &NewInventoryItem) -> RepositoryResult<InventoryItem>;
        fn update_inventory(&self, item_id: i32, store_id: i32, updates: &UpdateInventoryItem) -> RepositoryResult<InventoryItem>;
        fn delete_inventory(&self, item_id: i32, store_id: i32) -> RepositoryResult<()>;
    }

    impl StorefrontReader for Marketplace {
        fn list_category_counts(&self, hub_id: i32, limit: usize) -> RepositoryResult<Vec<CategoryCount>>;
        fn list_subcategory_counts(&self, hub_id: i32, limit: usize) -> RepositoryResult<Vec<SubCategoryCount>>;
        fn list_new_arrivals(&self, query: &StorefrontQuery) -> RepositoryResult<Vec<StorefrontProduct>>;
        fn list_best_prices(&self, query: &StorefrontQuery) -> RepositoryResult<Vec<StorefrontProduct>>;
    }
}
