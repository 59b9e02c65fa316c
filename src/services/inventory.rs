use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Serialize;

use crate::domain::bulk_upload::{BulkUploadReport, BulkUploadScope};
use crate::domain::category::{Category, CategoryListQuery};
use crate::domain::inventory::{
    InventoryCounts, InventoryEntry, InventoryItem, InventoryListQuery, NewInventoryItem,
};
use crate::domain::product::{Product, ProductListQuery};
use crate::domain::store::Store;
use crate::domain::subcategory::{SubCategory, SubCategoryListQuery};
use crate::forms::inventory::{
    AddInventoryForm, EditInventoryForm, SmartInventoryForm, SmartInventoryInput,
};
use crate::media::MediaStorage;
use crate::repository::{
    CatalogTransaction, CategoryReader, InventoryReader, InventoryWriter, ProductReader,
    StoreReader, SubCategoryReader,
};
use crate::services::bulk_upload::{apply_rows, save_applied_images};
use crate::services::{ServiceError, ServiceResult, current_store};

/// Data required to render the inventory page of the current store.
#[derive(Debug, Serialize)]
pub struct InventoryPage {
    pub store: Store,
    pub entries: Vec<InventoryEntry>,
    pub counts: InventoryCounts,
    /// Products whose variants can be stocked.
    pub products: Vec<Product>,
    /// Choices of the smart add form.
    pub categories: Vec<Category>,
    pub subcategories: Vec<SubCategory>,
}

pub fn load_inventory<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<InventoryPage>
where
    R: StoreReader
        + InventoryReader
        + ProductReader
        + CategoryReader
        + SubCategoryReader
        + ?Sized,
{
    let store = current_store(repo, user)?;

    let (_total, entries) = repo
        .list_inventory(InventoryListQuery::new(store.id))
        .map_err(ServiceError::from)?;

    let counts = repo
        .count_store_catalog(store.id)
        .map_err(ServiceError::from)?;

    let (_total, products) = repo
        .list_products(ProductListQuery::new(user.hub_id, store.id))
        .map_err(ServiceError::from)?;

    let (_total, categories) = repo
        .list_categories(CategoryListQuery::new(user.hub_id).visible_to(store.id))
        .map_err(ServiceError::from)?;

    let (_total, subcategories) = repo
        .list_subcategories(SubCategoryListQuery::new(user.hub_id).visible_to(store.id))
        .map_err(ServiceError::from)?;

    Ok(InventoryPage {
        store,
        entries,
        counts,
        products,
        categories,
        subcategories,
    })
}

/// Puts a variant of the current store on stock. A variant is stocked at most
/// once per store.
pub fn create_inventory<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddInventoryForm,
) -> ServiceResult<InventoryItem>
where
    R: StoreReader + ProductReader + InventoryReader + InventoryWriter + ?Sized,
{
    let store = current_store(repo, user)?;

    let draft = form
        .into_draft()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let variant = repo
        .get_variant_by_slug(&draft.variant_slug, store.id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    if repo
        .find_inventory_for_variant(store.id, variant.id)
        .map_err(ServiceError::from)?
        .is_some()
    {
        return Err(ServiceError::Conflict);
    }

    let new_item = NewInventoryItem::new(store.id, variant.id, draft.price_cents, draft.quantity);
    repo.create_inventory(&new_item)
        .map_err(ServiceError::from)
}

pub fn modify_inventory<R>(
    repo: &R,
    user: &AuthenticatedUser,
    item_id: i32,
    form: EditInventoryForm,
) -> ServiceResult<InventoryItem>
where
    R: StoreReader + InventoryReader + InventoryWriter + ?Sized,
{
    let store = current_store(repo, user)?;

    let item = repo
        .get_inventory_item(item_id, store.id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    let updates = form
        .into_update()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_inventory(item.id, store.id, &updates)
        .map_err(ServiceError::from)
}

pub fn remove_inventory<R>(repo: &R, user: &AuthenticatedUser, item_id: i32) -> ServiceResult<()>
where
    R: StoreReader + InventoryWriter + ?Sized,
{
    let store = current_store(repo, user)?;

    repo.delete_inventory(item_id, store.id)
        .map_err(ServiceError::from)
}

/// Creates or completes one product with several stocked variants in a single
/// step. The form is run through the bulk upload reconciliation, merging into
/// records that already exist. Attached images are stored only once the rows
/// are saved.
pub fn smart_create_inventory<R>(
    repo: &R,
    media: &MediaStorage,
    user: &AuthenticatedUser,
    form: SmartInventoryForm,
) -> ServiceResult<BulkUploadReport>
where
    R: StoreReader + CatalogTransaction + ?Sized,
{
    let store = current_store(repo, user)?;

    let SmartInventoryInput { rows, images } = form
        .into_input()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let scope = BulkUploadScope {
        hub_id: user.hub_id,
        store_id: store.id,
        update_existing: true,
    };

    let mut report = BulkUploadReport {
        rows_processed: rows.len(),
        ..BulkUploadReport::default()
    };
    if apply_rows(repo, scope, rows, &mut report) {
        save_applied_images(media, &images, &mut report);
    }

    if report.has_errors() {
        let messages: Vec<String> = report
            .errors
            .iter()
            .map(|issue| issue.message.clone())
            .collect();
        return Err(ServiceError::Form(messages.join("; ")));
    }

    Ok(report)
}
