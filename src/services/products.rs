use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Serialize;

use crate::domain::category::{Category, CategoryListQuery};
use crate::domain::product::{Product, ProductListQuery, ProductVariant};
use crate::domain::store::Store;
use crate::domain::subcategory::{SubCategory, SubCategoryListQuery};
use crate::forms::products::{AddProductForm, AddVariantForm};
use crate::repository::{
    CategoryReader, ProductReader, ProductWriter, StoreReader, SubCategoryReader,
};
use crate::services::{ServiceError, ServiceResult, current_store};

/// Data required to render the products page of the current store.
#[derive(Debug, Serialize)]
pub struct ProductsPage {
    pub store: Store,
    /// Active products with their variants.
    pub products: Vec<Product>,
    /// Categories offered in the add product form.
    pub categories: Vec<Category>,
    pub subcategories: Vec<SubCategory>,
}

pub fn load_products<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<ProductsPage>
where
    R: StoreReader + ProductReader + CategoryReader + SubCategoryReader + ?Sized,
{
    let store = current_store(repo, user)?;

    let (_total, products) = repo
        .list_products(ProductListQuery::new(user.hub_id, store.id))
        .map_err(ServiceError::from)?;

    let (_total, categories) = repo
        .list_categories(CategoryListQuery::new(user.hub_id).visible_to(store.id))
        .map_err(ServiceError::from)?;

    let (_total, subcategories) = repo
        .list_subcategories(SubCategoryListQuery::new(user.hub_id).visible_to(store.id))
        .map_err(ServiceError::from)?;

    Ok(ProductsPage {
        store,
        products,
        categories,
        subcategories,
    })
}

/// Creates a product with its first variant in the current store.
pub fn create_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddProductForm,
) -> ServiceResult<Product>
where
    R: StoreReader + CategoryReader + SubCategoryReader + ProductReader + ProductWriter + ?Sized,
{
    let store = current_store(repo, user)?;

    let (new_product, first_variant) = form
        .into_new_product(user.hub_id, store.id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let category = repo
        .get_category_by_id(new_product.category_id, user.hub_id)
        .map_err(ServiceError::from)?
        .filter(|category| category.is_visible_to(store.id))
        .ok_or_else(|| ServiceError::Form("The selected category is not available.".to_string()))?;

    if let Some(subcategory_id) = new_product.subcategory_id {
        repo.get_subcategory_by_id(subcategory_id, user.hub_id)
            .map_err(ServiceError::from)?
            .filter(|subcategory| {
                subcategory.is_visible_to(store.id) && subcategory.category_id == category.id
            })
            .ok_or_else(|| {
                ServiceError::Form("The selected subcategory is not available.".to_string())
            })?;
    }

    if repo
        .find_product_by_name(store.id, &new_product.name)
        .map_err(ServiceError::from)?
        .is_some()
    {
        return Err(ServiceError::Conflict);
    }

    repo.create_product(&new_product, &first_variant)
        .map_err(ServiceError::from)
}

fn store_product<R>(repo: &R, store: &Store, slug: &str) -> ServiceResult<Product>
where
    R: ProductReader + ?Sized,
{
    repo.get_product_by_slug(slug, store.id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

pub fn remove_product<R>(repo: &R, user: &AuthenticatedUser, slug: &str) -> ServiceResult<()>
where
    R: StoreReader + ProductReader + ProductWriter + ?Sized,
{
    let store = current_store(repo, user)?;
    let product = store_product(repo, &store, slug)?;

    repo.delete_product(product.id, store.id)
        .map_err(ServiceError::from)
}

/// Adds a variant to a product of the current store. Variant names are unique
/// within a product, ignoring case.
pub fn add_variant<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_slug: &str,
    form: AddVariantForm,
) -> ServiceResult<ProductVariant>
where
    R: StoreReader + ProductReader + ProductWriter + ?Sized,
{
    let store = current_store(repo, user)?;
    let product = store_product(repo, &store, product_slug)?;

    let new_variant = form
        .into_new_variant()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let wanted = new_variant.variant_name.to_lowercase();
    if product
        .variants
        .iter()
        .any(|variant| variant.variant_name.to_lowercase() == wanted)
    {
        return Err(ServiceError::Conflict);
    }

    repo.add_variant(product.id, &new_variant)
        .map_err(ServiceError::from)
}

pub fn remove_variant<R>(repo: &R, user: &AuthenticatedUser, slug: &str) -> ServiceResult<()>
where
    R: StoreReader + ProductReader + ProductWriter + ?Sized,
{
    let store = current_store(repo, user)?;

    let variant = repo
        .get_variant_by_slug(slug, store.id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    repo.delete_variant(variant.id, store.id)
        .map_err(ServiceError::from)
}
