//! Bulk catalog upload: parse the archive, then reconcile every row against
//! the catalog of the current store inside one transaction.

use std::io::{Read, Seek};

use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::archive::{ImageLookup, UploadArchive};
use crate::domain::bulk_upload::{
    BulkUploadReport, BulkUploadRow, BulkUploadScope, NameRef, ProductGroup, group_rows,
};
use crate::domain::category::{Category, NewCategory};
use crate::domain::inventory::NewInventoryItem;
use crate::domain::merge::{merge_inventory, merge_product, merge_variant};
use crate::domain::product::{NewProduct, NewProductVariant, Product};
use crate::domain::subcategory::{NewSubCategory, SubCategory};
use crate::forms::bulk_upload::{BulkUploadForm, ColumnIndex, UploadFormatError};
use crate::media::{MediaStorage, PRODUCT_IMAGE_FOLDER, StoredFile, VARIANT_IMAGE_FOLDER};
use crate::repository::{CatalogTransaction, CatalogUnit, StoreReader};
use crate::services::{ServiceError, ServiceResult, current_store};

fn format_error(err: UploadFormatError) -> ServiceError {
    ServiceError::Form(err.to_string())
}

/// Apply an uploaded archive to the catalog and inventory of the current
/// store.
///
/// Problems with the archive itself are returned as [`ServiceError::Form`]
/// and nothing is written. Problems with single rows end up in the report.
pub fn bulk_upload_inventory<R>(
    repo: &R,
    media: &MediaStorage,
    user: &AuthenticatedUser,
    mut form: BulkUploadForm,
) -> ServiceResult<BulkUploadReport>
where
    R: StoreReader + CatalogTransaction + ?Sized,
{
    let store = current_store(repo, user)?;
    let scope = BulkUploadScope {
        hub_id: user.hub_id,
        store_id: store.id,
        update_existing: form.update_existing(),
    };

    let mut archive = form.open_archive().map_err(format_error)?;
    let table = archive.spreadsheet().map_err(format_error)?;
    let columns = ColumnIndex::locate(&table.headers).map_err(format_error)?;

    let mut report = BulkUploadReport::default();
    let mut rows = Vec::new();

    for sheet_row in &table.rows {
        let fields = columns.fields(&sheet_row.cells);
        if fields.is_blank() {
            continue;
        }

        report.rows_processed += 1;
        match fields.into_row(sheet_row.line) {
            Ok(row) => rows.push(row),
            Err(err) => report.error(sheet_row.line, err.to_string()),
        }
    }

    if report.rows_processed == 0 {
        return Err(format_error(UploadFormatError::NoDataRows));
    }

    let files = attach_images(&mut archive, &mut rows, &mut report);

    if apply_rows(repo, scope, rows, &mut report) {
        save_applied_images(media, &files, &mut report);
    }

    log::info!(
        "Bulk upload for store {}: {} rows, {} changes, {} errors, {} warnings",
        store.id,
        report.rows_processed,
        report.total_changes(),
        report.errors.len(),
        report.warnings.len()
    );

    Ok(report)
}

/// Write the files that ended up referenced by saved records. Images of rows
/// that failed or were left untouched are dropped.
pub(crate) fn save_applied_images(
    media: &MediaStorage,
    files: &[StoredFile],
    report: &mut BulkUploadReport,
) {
    let applied: Vec<&StoredFile> = files
        .iter()
        .filter(|file| report.applied_images.contains(&file.path))
        .collect();

    for file in applied {
        if let Err(err) = media.save(file) {
            log::error!("Failed to store uploaded image {}: {err}", file.path);
            report.warning(0, format!("image `{}` could not be saved", file.path));
        }
    }
}

/// Swap archive paths for stored media paths and collect the files to write.
fn attach_images<R: Read + Seek>(
    archive: &mut UploadArchive<R>,
    rows: &mut [BulkUploadRow],
    report: &mut BulkUploadReport,
) -> Vec<StoredFile> {
    let mut files = Vec::new();

    for row in rows.iter_mut() {
        let line = row.row_number;
        row.product_image = resolve_image(
            archive,
            line,
            row.product_image.take(),
            PRODUCT_IMAGE_FOLDER,
            report,
            &mut files,
        );
        row.variant_image = resolve_image(
            archive,
            line,
            row.variant_image.take(),
            VARIANT_IMAGE_FOLDER,
            report,
            &mut files,
        );
    }

    files
}

fn resolve_image<R: Read + Seek>(
    archive: &mut UploadArchive<R>,
    line: usize,
    path: Option<String>,
    folder: &str,
    report: &mut BulkUploadReport,
    files: &mut Vec<StoredFile>,
) -> Option<String> {
    let path = path?;

    match archive.image(&path, folder) {
        ImageLookup::Found(file) => {
            let stored_path = file.path.clone();
            if !files.iter().any(|known| known.path == file.path) {
                files.push(file);
            }
            Some(stored_path)
        }
        ImageLookup::Missing => {
            log::warn!("Image {path} referenced on row {line} is not in the archive");
            report.warning(line, format!("image `{path}` is missing from the archive"));
            report.missing_image(path);
            None
        }
        ImageLookup::Invalid(reason) => {
            report.warning(line, format!("image `{path}` was skipped: {reason}"));
            None
        }
    }
}

/// Reconcile parsed rows in a single transaction.
///
/// Returns `false` when the transaction was rolled back; the counts of the
/// report are then cleared and a top-level error is recorded.
pub fn apply_rows<R>(
    repo: &R,
    scope: BulkUploadScope,
    rows: Vec<BulkUploadRow>,
    report: &mut BulkUploadReport,
) -> bool
where
    R: CatalogTransaction + ?Sized,
{
    if rows.is_empty() {
        return true;
    }

    let groups = group_rows(rows);
    let mut outcome = report.clone();

    let result =
        repo.in_catalog_transaction(|unit| reconcile(unit, scope, &groups, &mut outcome));

    match result {
        Ok(()) => {
            *report = outcome;
            true
        }
        Err(err) => {
            log::error!(
                "Bulk upload for store {} was rolled back: {err}",
                scope.store_id
            );
            report.reset_counts();
            report.error(0, format!("upload was rolled back: {err}"));
            false
        }
    }
}

/// Why a product group could not be applied.
enum ReconcileError {
    /// The group references records that cannot be resolved; recorded for
    /// every row of the group.
    Row(String),
    /// Storage failure; aborts the whole upload.
    Repository(RepositoryError),
}

impl From<RepositoryError> for ReconcileError {
    fn from(err: RepositoryError) -> Self {
        ReconcileError::Repository(err)
    }
}

/// Process every product group; row problems are collected in the report
/// and only repository errors abort.
pub fn reconcile(
    unit: &mut dyn CatalogUnit,
    scope: BulkUploadScope,
    groups: &[ProductGroup],
    report: &mut BulkUploadReport,
) -> RepositoryResult<()> {
    for group in groups {
        match reconcile_group(unit, scope, group, report) {
            Ok(()) => {}
            Err(ReconcileError::Row(message)) => {
                for line in group.row_numbers() {
                    report.error(line, message.clone());
                }
            }
            Err(ReconcileError::Repository(err)) => return Err(err),
        }
    }
    Ok(())
}

/// Record found in the catalog or scheduled for creation.
enum Resolved<T> {
    Found(T),
    Create(String),
}

fn resolve_category(
    unit: &mut dyn CatalogUnit,
    scope: BulkUploadScope,
    reference: &NameRef,
) -> Result<Resolved<Category>, ReconcileError> {
    let found = unit.find_visible_category(scope.hub_id, scope.store_id, reference.name())?;

    match (reference, found) {
        (_, Some(category)) => Ok(Resolved::Found(category)),
        (NameRef::Existing(name), None) => {
            Err(ReconcileError::Row(format!("category `{name}` does not exist")))
        }
        (NameRef::New(name), None) => Ok(Resolved::Create(name.clone())),
    }
}

fn resolve_subcategory(
    unit: &mut dyn CatalogUnit,
    scope: BulkUploadScope,
    category: &Resolved<Category>,
    reference: &NameRef,
) -> Result<Resolved<SubCategory>, ReconcileError> {
    let found = match category {
        Resolved::Found(category) => unit.find_visible_subcategory(
            scope.hub_id,
            scope.store_id,
            category.id,
            reference.name(),
        )?,
        Resolved::Create(_) => None,
    };

    match (reference, found) {
        (_, Some(subcategory)) => Ok(Resolved::Found(subcategory)),
        (NameRef::Existing(name), None) => Err(ReconcileError::Row(format!(
            "subcategory `{name}` does not exist in this category"
        ))),
        (NameRef::New(name), None) => Ok(Resolved::Create(name.clone())),
    }
}

fn resolve_product(
    unit: &mut dyn CatalogUnit,
    scope: BulkUploadScope,
    category: &Resolved<Category>,
    reference: &NameRef,
) -> Result<Resolved<Product>, ReconcileError> {
    let name = reference.name();
    let category_id = match category {
        Resolved::Found(category) => Some(category.id),
        Resolved::Create(_) => None,
    };

    let found = unit.find_store_product(scope.store_id, name)?;

    match (reference, found) {
        (_, Some(product)) if Some(product.category_id) == category_id => {
            Ok(Resolved::Found(product))
        }
        (NameRef::Existing(_), _) => Err(ReconcileError::Row(format!(
            "product `{name}` does not exist in this category"
        ))),
        (NameRef::New(_), Some(_)) => Err(ReconcileError::Row(format!(
            "product `{name}` already exists in another category"
        ))),
        (NameRef::New(_), None) => Ok(Resolved::Create(name.to_string())),
    }
}

fn reconcile_group(
    unit: &mut dyn CatalogUnit,
    scope: BulkUploadScope,
    group: &ProductGroup,
    report: &mut BulkUploadReport,
) -> Result<(), ReconcileError> {
    let Some(head) = group.head() else {
        return Ok(());
    };

    // Resolve every reference before writing anything for the group.
    let category = resolve_category(unit, scope, &head.category)?;
    let subcategory = match &head.subcategory {
        Some(reference) => Some(resolve_subcategory(unit, scope, &category, reference)?),
        None => None,
    };
    let product = resolve_product(unit, scope, &category, &head.product)?;

    let category = match category {
        Resolved::Found(category) => category,
        Resolved::Create(name) => {
            let created = unit.create_category(&NewCategory::store_scoped(
                scope.hub_id,
                scope.store_id,
                name,
            ))?;
            report.categories_created += 1;
            created
        }
    };

    let subcategory_id = match subcategory {
        Some(Resolved::Found(subcategory)) => Some(subcategory.id),
        Some(Resolved::Create(name)) => {
            let created = unit.create_subcategory(&NewSubCategory::store_scoped(
                scope.hub_id,
                category.id,
                scope.store_id,
                name,
            ))?;
            report.subcategories_created += 1;
            Some(created.id)
        }
        None => None,
    };

    let incoming = NewProduct::new(
        scope.hub_id,
        scope.store_id,
        category.id,
        head.product.name(),
    )
    .with_subcategory(subcategory_id)
    .with_brand(group.brand())
    .with_description(group.description())
    .with_image(group.product_image());

    let product = match product {
        Resolved::Create(_) => {
            let created = unit.create_product(&incoming)?;
            report.products_created += 1;
            if let Some(image) = &incoming.image {
                report.image_applied(image);
            }
            created
        }
        Resolved::Found(existing) => {
            let patch = merge_product(&existing, &incoming);
            if patch.is_empty() {
                existing
            } else if scope.update_existing {
                let updated = unit.update_product(existing.id, &patch)?;
                report.products_updated += 1;
                if let Some(image) = &patch.image {
                    report.image_applied(image);
                }
                updated
            } else {
                report.warning(
                    head.row_number,
                    format!(
                        "product `{}` already exists; its details were not updated",
                        existing.name
                    ),
                );
                existing
            }
        }
    };

    for row in &group.rows {
        apply_variant_row(unit, scope, &product, row, report)?;
    }

    Ok(())
}

fn apply_variant_row(
    unit: &mut dyn CatalogUnit,
    scope: BulkUploadScope,
    product: &Product,
    row: &BulkUploadRow,
    report: &mut BulkUploadReport,
) -> Result<(), ReconcileError> {
    let incoming = NewProductVariant::new(row.variant_name.clone())
        .with_sku(row.sku.clone())
        .with_barcode(row.barcode.clone())
        .with_image(row.variant_image.clone());

    let variant = match unit.find_variant(product.id, &row.variant_name)? {
        None => {
            let created = unit.create_variant(product.id, &incoming)?;
            report.variants_created += 1;
            if let Some(image) = &incoming.image {
                report.image_applied(image);
            }
            created
        }
        Some(existing) => {
            let patch = merge_variant(&existing, &incoming);
            if patch.is_empty() {
                existing
            } else if scope.update_existing {
                let updated = unit.update_variant(existing.id, &patch)?;
                report.variants_updated += 1;
                if let Some(image) = &patch.image {
                    report.image_applied(image);
                }
                updated
            } else {
                report.warning(
                    row.row_number,
                    format!(
                        "variant `{}` already exists; its details were not updated",
                        existing.variant_name
                    ),
                );
                existing
            }
        }
    };

    match unit.find_inventory(scope.store_id, variant.id)? {
        None => {
            unit.create_inventory(&NewInventoryItem::new(
                scope.store_id,
                variant.id,
                row.price_cents,
                row.quantity,
            ))?;
            report.inventory_created += 1;
        }
        Some(item) => {
            let patch = merge_inventory(&item, row.price_cents, row.quantity);
            if !patch.is_empty() {
                if scope.update_existing {
                    unit.update_inventory(item.id, &patch)?;
                    report.inventory_updated += 1;
                } else {
                    report.warning(
                        row.row_number,
                        format!(
                            "stock of `{}` already exists; price and quantity were not updated",
                            variant.variant_name
                        ),
                    );
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};
    use tempfile::TempDir;

    use super::*;
    use crate::{CUSTOMER_ROLE, STORE_OWNER_ROLE};
    use crate::archive::tests::{png_bytes, zip_bytes};
    use crate::archive::template::{build_template, placeholder_png};
    use crate::domain::inventory::{InventoryItem, UpdateInventoryItem};
    use crate::domain::product::{ProductVariant, UpdateProduct, UpdateProductVariant};
    use crate::domain::store::{
        NewStoreVerification, Store, StoreListQuery, StoreVerification, StoreWithVerification,
    };
    use crate::forms::categories::tests::upload;
    use crate::services::test_support::{
        fixed_datetime, sample_category, sample_store, user_with_roles,
    };

    const STORE_ID: i32 = 3;
    const HUB_ID: i32 = 9;

    /// In-memory catalog with the lookup rules of the database.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeCatalog {
        pub categories: Vec<Category>,
        pub subcategories: Vec<SubCategory>,
        pub products: Vec<Product>,
        pub variants: Vec<ProductVariant>,
        pub inventory: Vec<InventoryItem>,
        /// Fail every inventory insert.
        pub broken_inventory: bool,
    }

    fn same(a: &str, b: &str) -> bool {
        a.to_lowercase() == b.to_lowercase()
    }

    impl CatalogUnit for FakeCatalog {
        fn find_visible_category(
            &mut self,
            hub_id: i32,
            store_id: i32,
            name: &str,
        ) -> RepositoryResult<Option<Category>> {
            let mut visible: Vec<&Category> = self
                .categories
                .iter()
                .filter(|c| c.hub_id == hub_id && c.is_visible_to(store_id) && same(&c.name, name))
                .collect();
            visible.sort_by_key(|c| (c.store_id != Some(store_id), c.id));
            Ok(visible.first().map(|c| (*c).clone()))
        }

        fn create_category(&mut self, new_category: &NewCategory) -> RepositoryResult<Category> {
            let category = Category {
                id: self.categories.len() as i32 + 100,
                hub_id: new_category.hub_id,
                store_id: new_category.store_id,
                name: new_category.name.clone(),
                slug: new_category.name.to_lowercase(),
                image: new_category.image.clone(),
                is_global: new_category.is_global,
                is_approved: new_category.is_approved,
                is_active: true,
                created_at: fixed_datetime(),
                updated_at: fixed_datetime(),
            };
            self.categories.push(category.clone());
            Ok(category)
        }

        fn find_visible_subcategory(
            &mut self,
            hub_id: i32,
            store_id: i32,
            category_id: i32,
            name: &str,
        ) -> RepositoryResult<Option<SubCategory>> {
            Ok(self
                .subcategories
                .iter()
                .find(|s| {
                    s.hub_id == hub_id
                        && s.category_id == category_id
                        && s.is_visible_to(store_id)
                        && same(&s.name, name)
                })
                .cloned())
        }

        fn create_subcategory(
            &mut self,
            new_subcategory: &NewSubCategory,
        ) -> RepositoryResult<SubCategory> {
            let subcategory = SubCategory {
                id: self.subcategories.len() as i32 + 200,
                hub_id: new_subcategory.hub_id,
                category_id: new_subcategory.category_id,
                store_id: new_subcategory.store_id,
                name: new_subcategory.name.clone(),
                slug: new_subcategory.name.to_lowercase(),
                image: None,
                is_global: new_subcategory.is_global,
                is_approved: new_subcategory.is_approved,
                is_active: true,
                created_at: fixed_datetime(),
                updated_at: fixed_datetime(),
            };
            self.subcategories.push(subcategory.clone());
            Ok(subcategory)
        }

        fn find_store_product(
            &mut self,
            store_id: i32,
            name: &str,
        ) -> RepositoryResult<Option<Product>> {
            Ok(self
                .products
                .iter()
                .find(|p| p.store_id == store_id && same(&p.name, name))
                .cloned())
        }

        fn create_product(&mut self, new_product: &NewProduct) -> RepositoryResult<Product> {
            let product = Product {
                id: self.products.len() as i32 + 300,
                hub_id: new_product.hub_id,
                store_id: new_product.store_id,
                category_id: new_product.category_id,
                subcategory_id: new_product.subcategory_id,
                name: new_product.name.clone(),
                slug: new_product.name.to_lowercase().replace(' ', "-"),
                brand: new_product.brand.clone(),
                description: new_product.description.clone(),
                image: new_product.image.clone(),
                is_active: true,
                created_at: fixed_datetime(),
                updated_at: fixed_datetime(),
                variants: Vec::new(),
            };
            self.products.push(product.clone());
            Ok(product)
        }

        fn update_product(
            &mut self,
            product_id: i32,
            updates: &UpdateProduct,
        ) -> RepositoryResult<Product> {
            let product = self
                .products
                .iter_mut()
                .find(|p| p.id == product_id)
                .ok_or(RepositoryError::NotFound)?;
            if let Some(value) = updates.subcategory_id {
                product.subcategory_id = Some(value);
            }
            if let Some(value) = &updates.brand {
                product.brand = Some(value.clone());
            }
            if let Some(value) = &updates.description {
                product.description = Some(value.clone());
            }
            if let Some(value) = &updates.image {
                product.image = Some(value.clone());
            }
            Ok(product.clone())
        }

        fn find_variant(
            &mut self,
            product_id: i32,
            variant_name: &str,
        ) -> RepositoryResult<Option<ProductVariant>> {
            Ok(self
                .variants
                .iter()
                .find(|v| v.product_id == product_id && v.is_active && same(&v.variant_name, variant_name))
                .cloned())
        }

        fn create_variant(
            &mut self,
            product_id: i32,
            new_variant: &NewProductVariant,
        ) -> RepositoryResult<ProductVariant> {
            let variant = ProductVariant {
                id: self.variants.len() as i32 + 400,
                product_id,
                variant_name: new_variant.variant_name.clone(),
                slug: new_variant.variant_name.to_lowercase(),
                sku: new_variant.sku.clone(),
                barcode: new_variant.barcode.clone(),
                image: new_variant.image.clone(),
                is_active: true,
                created_at: fixed_datetime(),
                updated_at: fixed_datetime(),
            };
            self.variants.push(variant.clone());
            Ok(variant)
        }

        fn update_variant(
            &mut self,
            variant_id: i32,
            updates: &UpdateProductVariant,
        ) -> RepositoryResult<ProductVariant> {
            let variant = self
                .variants
                .iter_mut()
                .find(|v| v.id == variant_id)
                .ok_or(RepositoryError::NotFound)?;
            if let Some(value) = &updates.sku {
                variant.sku = Some(value.clone());
            }
            if let Some(value) = &updates.barcode {
                variant.barcode = Some(value.clone());
            }
            if let Some(value) = &updates.image {
                variant.image = Some(value.clone());
            }
            Ok(variant.clone())
        }

        fn find_inventory(
            &mut self,
            store_id: i32,
            variant_id: i32,
        ) -> RepositoryResult<Option<InventoryItem>> {
            Ok(self
                .inventory
                .iter()
                .find(|i| i.store_id == store_id && i.product_variant_id == variant_id)
                .cloned())
        }

        fn create_inventory(&mut self, new_item: &NewInventoryItem) -> RepositoryResult<InventoryItem> {
            if self.broken_inventory {
                return Err(RepositoryError::NotFound);
            }
            let item = InventoryItem {
                id: self.inventory.len() as i32 + 500,
                store_id: new_item.store_id,
                product_variant_id: new_item.product_variant_id,
                price_cents: new_item.price_cents,
                quantity_available: new_item.quantity_available,
                is_active: true,
                last_updated: fixed_datetime(),
            };
            self.inventory.push(item.clone());
            Ok(item)
        }

        fn update_inventory(
            &mut self,
            item_id: i32,
            updates: &UpdateInventoryItem,
        ) -> RepositoryResult<InventoryItem> {
            let item = self
                .inventory
                .iter_mut()
                .find(|i| i.id == item_id)
                .ok_or(RepositoryError::NotFound)?;
            if let Some(value) = updates.price_cents {
                item.price_cents = value;
            }
            if let Some(value) = updates.quantity_available {
                item.quantity_available = value;
            }
            if let Some(value) = updates.is_active {
                item.is_active = value;
            }
            Ok(item.clone())
        }
    }

    /// Repository that commits the fake catalog only when the work succeeds.
    pub(crate) struct FakeRepo {
        pub catalog: RefCell<FakeCatalog>,
        pub store: Option<Store>,
    }

    impl FakeRepo {
        pub(crate) fn new(catalog: FakeCatalog) -> Self {
            Self {
                catalog: RefCell::new(catalog),
                store: Some(sample_store(STORE_ID)),
            }
        }
    }

    impl CatalogTransaction for FakeRepo {
        fn in_catalog_transaction<T, F>(&self, work: F) -> RepositoryResult<T>
        where
            F: FnOnce(&mut dyn CatalogUnit) -> RepositoryResult<T>,
        {
            let mut draft = self.catalog.borrow().clone();
            let result = work(&mut draft)?;
            *self.catalog.borrow_mut() = draft;
            Ok(result)
        }
    }

    impl StoreReader for FakeRepo {
        fn get_store_by_id(&self, id: i32, _hub_id: i32) -> RepositoryResult<Option<Store>> {
            Ok(self.store.clone().filter(|store| store.id == id))
        }

        fn list_stores(&self, _query: StoreListQuery) -> RepositoryResult<(usize, Vec<Store>)> {
            let stores: Vec<Store> = self.store.iter().cloned().collect();
            Ok((stores.len(), stores))
        }

        fn find_owner_store(
            &self,
            _hub_id: i32,
            owner_email: &str,
        ) -> RepositoryResult<Option<Store>> {
            Ok(self
                .store
                .clone()
                .filter(|store| store.owner_email == owner_email))
        }

        fn get_verification(&self, _store_id: i32) -> RepositoryResult<Option<StoreVerification>> {
            Ok(None)
        }

        fn list_verification_queue(
            &self,
            _hub_id: i32,
        ) -> RepositoryResult<Vec<StoreWithVerification>> {
            Ok(Vec::new())
        }
    }

    fn scope(update_existing: bool) -> BulkUploadScope {
        BulkUploadScope {
            hub_id: HUB_ID,
            store_id: STORE_ID,
            update_existing,
        }
    }

    fn row(line: usize, category: NameRef, product: NameRef, variant: &str) -> BulkUploadRow {
        BulkUploadRow::new(line, category, product, variant, 1000, 5)
    }

    fn upload_form(archive: Vec<u8>, update_existing: bool) -> BulkUploadForm {
        BulkUploadForm {
            archive: upload("catalog.zip", &archive),
            update_existing: update_existing
                .then(|| actix_multipart::form::text::Text("on".to_string())),
        }
    }

    #[test]
    fn gaming_example_creates_one_product_with_two_variants() {
        let repo = FakeRepo::new(FakeCatalog::default());
        let dir = TempDir::new().expect("temp dir");
        let media = MediaStorage::new(dir.path());
        let user = user_with_roles(&[STORE_OWNER_ROLE]);
        let archive = build_template().expect("template");

        let report = bulk_upload_inventory(&repo, &media, &user, upload_form(archive, false))
            .expect("upload accepted");

        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(report.missing_images.is_empty());
        assert_eq!(report.rows_processed, 2);
        assert_eq!(report.categories_created, 1);
        assert_eq!(report.products_created, 1);
        assert_eq!(report.variants_created, 2);
        assert_eq!(report.inventory_created, 2);

        let catalog = repo.catalog.borrow();
        assert_eq!(catalog.categories.len(), 1);
        assert_eq!(catalog.categories[0].store_id, Some(STORE_ID));
        assert!(!catalog.categories[0].is_approved);
        assert_eq!(catalog.products.len(), 1);
        assert_eq!(catalog.products[0].brand.as_deref(), Some("Razer"));
        assert!(
            catalog.products[0]
                .image
                .as_deref()
                .is_some_and(|path| path.starts_with("products/"))
        );
        assert_eq!(catalog.variants.len(), 2);
        assert_eq!(catalog.inventory[1].price_cents, 8499);

        assert!(dir.path().join("products").is_dir());
        assert_eq!(
            std::fs::read_dir(dir.path().join("variants"))
                .expect("variants folder")
                .count(),
            2
        );
    }

    #[test]
    fn rerun_with_update_fills_empty_fields_and_overwrites_stock() {
        let repo = FakeRepo::new(FakeCatalog::default());
        let first = vec![row(
            2,
            NameRef::New("Gaming".into()),
            NameRef::New("Razer Kraken".into()),
            "Black",
        )];
        let mut report = BulkUploadReport::default();
        assert!(apply_rows(&repo, scope(true), first, &mut report));

        let mut second = row(
            2,
            NameRef::New("gaming".into()),
            NameRef::New("RAZER KRAKEN".into()),
            "black",
        );
        second.brand = Some("Razer".into());
        second.price_cents = 7999;
        second.quantity = 5;
        second.sku = Some("RZ-1".into());

        let mut report = BulkUploadReport::default();
        assert!(apply_rows(&repo, scope(true), vec![second], &mut report));

        assert_eq!(report.categories_created, 0);
        assert_eq!(report.products_created, 0);
        assert_eq!(report.products_updated, 1);
        assert_eq!(report.variants_created, 0);
        assert_eq!(report.variants_updated, 1);
        assert_eq!(report.inventory_updated, 1);

        let catalog = repo.catalog.borrow();
        assert_eq!(catalog.products.len(), 1);
        assert_eq!(catalog.variants.len(), 1);
        assert_eq!(catalog.inventory.len(), 1);
        assert_eq!(catalog.products[0].brand.as_deref(), Some("Razer"));
        assert_eq!(catalog.variants[0].sku.as_deref(), Some("RZ-1"));
        assert_eq!(catalog.inventory[0].price_cents, 7999);
        assert_eq!(catalog.inventory[0].quantity_available, 5);
    }

    #[test]
    fn update_never_overwrites_filled_details() {
        let mut first = row(
            2,
            NameRef::New("Gaming".into()),
            NameRef::New("Mouse".into()),
            "Default",
        );
        first.brand = Some("Logitech".into());
        let repo = FakeRepo::new(FakeCatalog::default());
        let mut report = BulkUploadReport::default();
        apply_rows(&repo, scope(true), vec![first], &mut report);

        let mut second = row(
            2,
            NameRef::New("Gaming".into()),
            NameRef::New("Mouse".into()),
            "Default",
        );
        second.brand = Some("Razer".into());
        let mut report = BulkUploadReport::default();
        apply_rows(&repo, scope(true), vec![second], &mut report);

        assert_eq!(report.products_updated, 0);
        assert_eq!(
            repo.catalog.borrow().products[0].brand.as_deref(),
            Some("Logitech")
        );
    }

    #[test]
    fn without_update_existing_records_are_left_alone_with_a_warning() {
        let repo = FakeRepo::new(FakeCatalog::default());
        let mut report = BulkUploadReport::default();
        apply_rows(
            &repo,
            scope(false),
            vec![row(
                2,
                NameRef::New("Gaming".into()),
                NameRef::New("Mouse".into()),
                "Default",
            )],
            &mut report,
        );

        let mut again = row(
            2,
            NameRef::New("Gaming".into()),
            NameRef::New("Mouse".into()),
            "Default",
        );
        again.price_cents = 2500;
        let mut report = BulkUploadReport::default();
        apply_rows(&repo, scope(false), vec![again], &mut report);

        assert_eq!(report.total_changes(), 0);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].row, 2);
        assert_eq!(repo.catalog.borrow().inventory[0].price_cents, 1000);
    }

    #[test]
    fn unknown_existing_category_fails_every_row_of_the_group() {
        let repo = FakeRepo::new(FakeCatalog::default());
        let rows = vec![
            row(
                2,
                NameRef::Existing("Audio".into()),
                NameRef::New("Speaker".into()),
                "Black",
            ),
            row(
                3,
                NameRef::Existing("Audio".into()),
                NameRef::New("Speaker".into()),
                "White",
            ),
            row(
                4,
                NameRef::New("Gaming".into()),
                NameRef::New("Mouse".into()),
                "Default",
            ),
        ];

        let mut report = BulkUploadReport::default();
        assert!(apply_rows(&repo, scope(false), rows, &mut report));

        assert_eq!(
            report.errors.iter().map(|issue| issue.row).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert_eq!(report.products_created, 1);
        assert_eq!(repo.catalog.borrow().products[0].name, "Mouse");
    }

    #[test]
    fn new_product_in_another_category_is_a_row_error() {
        let repo = FakeRepo::new(FakeCatalog::default());
        let mut report = BulkUploadReport::default();
        apply_rows(
            &repo,
            scope(false),
            vec![row(
                2,
                NameRef::New("Gaming".into()),
                NameRef::New("Mouse".into()),
                "Default",
            )],
            &mut report,
        );

        let mut report = BulkUploadReport::default();
        apply_rows(
            &repo,
            scope(false),
            vec![row(
                5,
                NameRef::New("Office".into()),
                NameRef::New("Mouse".into()),
                "Default",
            )],
            &mut report,
        );

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 5);
        assert_eq!(report.categories_created, 0);
        assert_eq!(repo.catalog.borrow().categories.len(), 1);
    }

    #[test]
    fn new_names_reuse_visible_global_categories() {
        let catalog = FakeCatalog {
            categories: vec![sample_category(1, None)],
            ..FakeCatalog::default()
        };
        let repo = FakeRepo::new(catalog);
        let mut report = BulkUploadReport::default();

        apply_rows(
            &repo,
            scope(false),
            vec![row(
                2,
                NameRef::New("GAMING".into()),
                NameRef::New("Mouse".into()),
                "Default",
            )],
            &mut report,
        );

        assert_eq!(report.categories_created, 0);
        assert_eq!(repo.catalog.borrow().products[0].category_id, 1);
    }

    #[test]
    fn repository_failure_rolls_back_the_batch() {
        let catalog = FakeCatalog {
            broken_inventory: true,
            ..FakeCatalog::default()
        };
        let repo = FakeRepo::new(catalog);
        let mut report = BulkUploadReport::default();
        report.warning(7, "parsed with a warning");

        let committed = apply_rows(
            &repo,
            scope(true),
            vec![row(
                2,
                NameRef::New("Gaming".into()),
                NameRef::New("Mouse".into()),
                "Default",
            )],
            &mut report,
        );

        assert!(!committed);
        assert_eq!(report.total_changes(), 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 0);
        assert_eq!(report.warnings.len(), 1);

        let catalog = repo.catalog.borrow();
        assert!(catalog.categories.is_empty());
        assert!(catalog.products.is_empty());
    }

    #[test]
    fn invalid_rows_are_reported_and_valid_rows_applied() {
        let csv = "new_category,product_name,variant_name,price,quantity\n\
Gaming,Mouse,Default,10,1\n\
Gaming,,Black,10,1\n\
,,,,\n\
Gaming,Keyboard,,10,1\n\
Gaming,Keyboard,Full,abc,1\n";
        let archive = zip_bytes(&[("products.csv", csv.as_bytes())]);
        let repo = FakeRepo::new(FakeCatalog::default());
        let media = MediaStorage::new("unused");
        let user = user_with_roles(&[STORE_OWNER_ROLE]);

        let report = bulk_upload_inventory(&repo, &media, &user, upload_form(archive, false))
            .expect("upload accepted");

        assert_eq!(report.rows_processed, 4);
        assert_eq!(
            report.errors.iter().map(|issue| issue.row).collect::<Vec<_>>(),
            vec![3, 5, 6]
        );
        assert_eq!(report.products_created, 1);
        assert_eq!(repo.catalog.borrow().variants.len(), 1);
    }

    #[test]
    fn missing_image_does_not_fail_the_row() {
        let csv = "new_category,product_name,variant_name,price,quantity,variant_image,product_image\n\
Gaming,Mouse,Default,10,1,images/nope.png,images/mouse.png\n";
        let png = png_bytes();
        let archive = zip_bytes(&[
            ("products.csv", csv.as_bytes()),
            ("images/mouse.png", &png),
        ]);
        let repo = FakeRepo::new(FakeCatalog::default());
        let dir = TempDir::new().expect("temp dir");
        let media = MediaStorage::new(dir.path());
        let user = user_with_roles(&[STORE_OWNER_ROLE]);

        let report = bulk_upload_inventory(&repo, &media, &user, upload_form(archive, false))
            .expect("upload accepted");

        assert!(report.errors.is_empty());
        assert_eq!(report.missing_images, vec!["images/nope.png".to_string()]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.variants_created, 1);

        let catalog = repo.catalog.borrow();
        assert_eq!(catalog.variants[0].image, None);
        assert!(catalog.products[0].image.is_some());
    }

    #[test]
    fn images_of_failed_rows_are_not_stored() {
        let csv = "existing_category,new_category,product_name,variant_name,price,quantity,product_image\n\
,Gaming,Mouse,Default,10,1,images/mouse.png\n\
Nope,,Keyboard,Default,10,1,images/keyboard.png\n";
        let mouse = placeholder_png(4, [10, 20, 30]).expect("png");
        let keyboard = placeholder_png(4, [200, 0, 0]).expect("png");
        let archive = zip_bytes(&[
            ("products.csv", csv.as_bytes()),
            ("images/mouse.png", &mouse),
            ("images/keyboard.png", &keyboard),
        ]);
        let repo = FakeRepo::new(FakeCatalog::default());
        let dir = TempDir::new().expect("temp dir");
        let media = MediaStorage::new(dir.path());
        let user = user_with_roles(&[STORE_OWNER_ROLE]);

        let report = bulk_upload_inventory(&repo, &media, &user, upload_form(archive, false))
            .expect("upload accepted");

        assert_eq!(
            report.errors.iter().map(|issue| issue.row).collect::<Vec<_>>(),
            vec![3]
        );
        let stored: Vec<_> = std::fs::read_dir(dir.path().join("products"))
            .expect("products folder")
            .collect();
        assert_eq!(stored.len(), 1);

        let catalog = repo.catalog.borrow();
        let image = catalog.products[0].image.clone().expect("mouse image");
        assert!(dir.path().join(image).exists());
    }

    #[test]
    fn archive_problems_are_form_errors() {
        let repo = FakeRepo::new(FakeCatalog::default());
        let media = MediaStorage::new("unused");
        let user = user_with_roles(&[STORE_OWNER_ROLE]);

        let no_sheet = zip_bytes(&[("images/a.png", b"png")]);
        assert!(matches!(
            bulk_upload_inventory(&repo, &media, &user, upload_form(no_sheet, false)),
            Err(ServiceError::Form(_))
        ));

        let header_only = zip_bytes(&[(
            "products.csv",
            b"new_category,product_name,variant_name,price,quantity\n",
        )]);
        assert!(matches!(
            bulk_upload_inventory(&repo, &media, &user, upload_form(header_only, false)),
            Err(ServiceError::Form(_))
        ));

        let not_zip = BulkUploadForm {
            archive: upload("catalog.csv", b"product_name\n"),
            update_existing: None,
        };
        assert!(matches!(
            bulk_upload_inventory(&repo, &media, &user, not_zip),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn customers_cannot_upload() {
        let repo = FakeRepo::new(FakeCatalog::default());
        let media = MediaStorage::new("unused");
        let user = user_with_roles(&[CUSTOMER_ROLE]);
        let archive = zip_bytes(&[("products.csv", b"product_name\n")]);

        assert!(matches!(
            bulk_upload_inventory(&repo, &media, &user, upload_form(archive, false)),
            Err(ServiceError::Unauthorized)
        ));
    }
}
