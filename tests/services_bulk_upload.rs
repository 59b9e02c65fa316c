use std::io::{Cursor, Write};

use actix_multipart::form::text::Text;
use pushkind_marketplace::STORE_OWNER_ROLE;
use pushkind_marketplace::archive::template::{build_template, placeholder_png};
use pushkind_marketplace::domain::bulk_upload::{BulkUploadReport, BulkUploadScope, group_rows};
use pushkind_marketplace::domain::category::CategoryListQuery;
use pushkind_marketplace::domain::inventory::InventoryListQuery;
use pushkind_marketplace::domain::product::NewProduct;
use pushkind_marketplace::forms::bulk_upload::{BulkUploadForm, COLUMNS, RowFields};
use pushkind_marketplace::media::MediaStorage;
use pushkind_marketplace::repository::{
    CatalogTransaction, CatalogUnit, CategoryReader, InventoryReader, ProductReader,
};
use pushkind_marketplace::services::ServiceError;
use pushkind_marketplace::services::bulk_upload::{bulk_upload_inventory, reconcile};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

mod common;

fn form(archive: &[u8], update_existing: bool) -> BulkUploadForm {
    BulkUploadForm {
        archive: common::upload("catalog.zip", archive),
        update_existing: update_existing.then(|| Text("on".to_string())),
    }
}

/// Zip with `products.csv` built from `rows` and the given image files.
fn archive(rows: &[[&str; 15]], images: &[&str]) -> Vec<u8> {
    let options = SimpleFileOptions::default();
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let mut sheet = csv::Writer::from_writer(Vec::new());
    sheet.write_record(COLUMNS).expect("header");
    for row in rows {
        sheet.write_record(row).expect("row");
    }
    let sheet = sheet.into_inner().expect("sheet bytes");

    zip.start_file("products.csv", options).expect("sheet entry");
    zip.write_all(&sheet).expect("write sheet");

    for path in images {
        zip.start_file(*path, options).expect("image entry");
        zip.write_all(&placeholder_png(8, [200, 10, 10]).expect("png"))
            .expect("write image");
    }

    zip.finish().expect("finish zip").into_inner()
}

#[test]
fn gaming_template_creates_catalog_and_inventory() {
    let test_db = common::TestDb::new("service_bulk_upload_gaming_template.db");
    let repo = test_db.repository();
    let store = common::seed_store(&repo, 1, "owner@example.com", "Game Corner");
    let user = common::user(1, "owner@example.com", &[STORE_OWNER_ROLE]);
    let media_dir = TempDir::new().expect("media dir");
    let media = MediaStorage::new(media_dir.path());

    let template = build_template().expect("template");
    let report =
        bulk_upload_inventory(&repo, &media, &user, form(&template, false)).expect("upload");

    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert!(report.missing_images.is_empty());
    assert_eq!(report.rows_processed, 2);
    assert_eq!(report.categories_created, 1);
    assert_eq!(report.products_created, 1);
    assert_eq!(report.variants_created, 2);
    assert_eq!(report.inventory_created, 2);

    let (total, categories) = repo
        .list_categories(CategoryListQuery::new(1).visible_to(store.id))
        .expect("categories");
    assert_eq!(total, 1);
    assert_eq!(categories[0].name, "Gaming");
    assert_eq!(categories[0].store_id, Some(store.id));
    assert!(!categories[0].is_approved);

    let product = repo
        .get_product_by_slug("razer-kraken", store.id)
        .expect("query product")
        .expect("product exists");
    assert_eq!(product.brand.as_deref(), Some("Razer"));
    assert_eq!(product.variants.len(), 2);
    let image = product.image.expect("product image");
    assert!(media_dir.path().join(&image).exists());

    let (total, mut entries) = repo
        .list_inventory(InventoryListQuery::new(store.id))
        .expect("inventory");
    assert_eq!(total, 2);
    entries.sort_by(|a, b| a.variant_name.cmp(&b.variant_name));
    assert_eq!(entries[0].variant_name, "Black");
    assert_eq!(entries[0].item.price_cents, 7999);
    assert_eq!(entries[0].item.quantity_available, 15);
    assert_eq!(entries[1].variant_name, "White");
    assert_eq!(entries[1].item.price_cents, 8499);
}

#[test]
fn rerun_with_update_existing_creates_no_duplicates() {
    let test_db = common::TestDb::new("service_bulk_upload_rerun.db");
    let repo = test_db.repository();
    let store = common::seed_store(&repo, 1, "owner@example.com", "Game Corner");
    let user = common::user(1, "owner@example.com", &[STORE_OWNER_ROLE]);
    let media_dir = TempDir::new().expect("media dir");
    let media = MediaStorage::new(media_dir.path());

    let template = build_template().expect("template");
    bulk_upload_inventory(&repo, &media, &user, form(&template, false)).expect("first upload");

    let restock = archive(
        &[[
            "Gaming",
            "",
            "",
            "",
            "Razer Kraken",
            "",
            "",
            "",
            "",
            "Black",
            "74.50",
            "40",
            "",
            "",
            "",
        ]],
        &[],
    );
    let report =
        bulk_upload_inventory(&repo, &media, &user, form(&restock, true)).expect("second upload");

    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.categories_created, 0);
    assert_eq!(report.products_created, 0);
    assert_eq!(report.variants_created, 0);
    assert_eq!(report.inventory_created, 0);
    assert_eq!(report.inventory_updated, 1);

    let (total, _) = repo
        .list_categories(CategoryListQuery::new(1).visible_to(store.id))
        .expect("categories");
    assert_eq!(total, 1);

    let (total, entries) = repo
        .list_inventory(InventoryListQuery::new(store.id))
        .expect("inventory");
    assert_eq!(total, 2);
    let black = entries
        .iter()
        .find(|entry| entry.variant_name == "Black")
        .expect("black variant");
    assert_eq!(black.item.price_cents, 7450);
    assert_eq!(black.item.quantity_available, 40);

    let product = repo
        .get_product_by_slug("razer-kraken", store.id)
        .expect("query product")
        .expect("product exists");
    assert_eq!(product.brand.as_deref(), Some("Razer"));
    assert_eq!(product.description.as_deref(), Some("Wired gaming headset"));
}

#[test]
fn invalid_rows_are_reported_and_valid_rows_saved() {
    let test_db = common::TestDb::new("service_bulk_upload_invalid_rows.db");
    let repo = test_db.repository();
    let store = common::seed_store(&repo, 1, "owner@example.com", "Shoe Box");
    let user = common::user(1, "owner@example.com", &[STORE_OWNER_ROLE]);
    let media_dir = TempDir::new().expect("media dir");
    let media = MediaStorage::new(media_dir.path());

    let upload = archive(
        &[
            [
                "",
                "Shoes",
                "",
                "",
                "",
                "Runner",
                "",
                "",
                "",
                "Size 42",
                "120",
                "3",
                "",
                "",
                "images/absent.png",
            ],
            [
                "", "Shoes", "", "", "", "Walker", "", "", "", "", "90", "1", "", "", "",
            ],
        ],
        &[],
    );

    let report = bulk_upload_inventory(&repo, &media, &user, form(&upload, false)).expect("upload");

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 3);
    assert_eq!(report.missing_images, vec!["images/absent.png".to_string()]);
    assert_eq!(report.products_created, 1);
    assert_eq!(report.inventory_created, 1);

    assert!(
        repo.find_product_by_name(store.id, "walker")
            .expect("query")
            .is_none()
    );
    let runner = repo
        .find_product_by_name(store.id, "runner")
        .expect("query")
        .expect("runner saved");
    assert_eq!(runner.image, None);
}

#[test]
fn archive_without_spreadsheet_is_rejected() {
    let test_db = common::TestDb::new("service_bulk_upload_no_sheet.db");
    let repo = test_db.repository();
    common::seed_store(&repo, 1, "owner@example.com", "Shoe Box");
    let user = common::user(1, "owner@example.com", &[STORE_OWNER_ROLE]);
    let media = MediaStorage::new("unused");

    let options = SimpleFileOptions::default();
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("readme.txt", options).expect("entry");
    zip.write_all(b"no sheet here").expect("write");
    let bytes = zip.finish().expect("finish").into_inner();

    let result = bulk_upload_inventory(&repo, &media, &user, form(&bytes, false));

    assert!(matches!(result, Err(ServiceError::Form(_))));
}

#[test]
fn owner_without_store_is_asked_to_create_one() {
    let test_db = common::TestDb::new("service_bulk_upload_no_store.db");
    let repo = test_db.repository();
    let user = common::user(1, "owner@example.com", &[STORE_OWNER_ROLE]);
    let media = MediaStorage::new("unused");

    let template = build_template().expect("template");
    let result = bulk_upload_inventory(&repo, &media, &user, form(&template, false));

    assert!(matches!(result, Err(ServiceError::Form(_))));
}

#[test]
fn names_match_across_non_ascii_case() {
    let test_db = common::TestDb::new("service_bulk_upload_non_ascii.db");
    let repo = test_db.repository();
    let store = common::seed_store(&repo, 1, "owner@example.com", "Boutique");
    let user = common::user(1, "owner@example.com", &[STORE_OWNER_ROLE]);
    let media = MediaStorage::new("unused");

    let first = archive(
        &[
            [
                "",
                "Électronique",
                "",
                "",
                "",
                "Écouteurs",
                "",
                "",
                "",
                "Noir",
                "40",
                "5",
                "",
                "",
                "",
            ],
            [
                "ÉLECTRONIQUE",
                "",
                "",
                "",
                "",
                "Casque",
                "",
                "",
                "",
                "Rouge",
                "60",
                "2",
                "",
                "",
                "",
            ],
        ],
        &[],
    );
    let report = bulk_upload_inventory(&repo, &media, &user, form(&first, false)).expect("upload");
    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.categories_created, 1);
    assert_eq!(report.products_created, 2);

    let shouted = archive(
        &[[
            "ÉLECTRONIQUE",
            "",
            "",
            "",
            "ÉCOUTEURS",
            "",
            "",
            "",
            "",
            "NOIR",
            "45",
            "7",
            "",
            "",
            "",
        ]],
        &[],
    );
    let report =
        bulk_upload_inventory(&repo, &media, &user, form(&shouted, true)).expect("rerun");

    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.categories_created, 0);
    assert_eq!(report.products_created, 0);
    assert_eq!(report.variants_created, 0);
    assert_eq!(report.inventory_created, 0);
    assert_eq!(report.inventory_updated, 1);

    let (total, _) = repo
        .list_categories(CategoryListQuery::new(1).visible_to(store.id))
        .expect("categories");
    assert_eq!(total, 1);
    assert!(
        repo.find_product_by_name(store.id, "écouteurs")
            .expect("query")
            .is_some()
    );
    let (total, entries) = repo
        .list_inventory(InventoryListQuery::new(store.id))
        .expect("inventory");
    assert_eq!(total, 2);
    let noir = entries
        .iter()
        .find(|entry| entry.variant_name == "Noir")
        .expect("noir stocked");
    assert_eq!(noir.item.price_cents, 4500);
    assert_eq!(noir.item.quantity_available, 7);
}

#[test]
fn failed_catalog_transaction_leaves_no_partial_records() {
    let test_db = common::TestDb::new("service_bulk_upload_rollback.db");
    let repo = test_db.repository();
    let store = common::seed_store(&repo, 1, "owner@example.com", "Sound Shop");

    let row = RowFields {
        new_category: Some("Audio"),
        product_name: Some("Speaker"),
        variant_name: Some("Default"),
        price: Some("30"),
        quantity: Some("2"),
        ..RowFields::default()
    }
    .into_row(2)
    .expect("valid row");
    let scope = BulkUploadScope {
        hub_id: 1,
        store_id: store.id,
        update_existing: false,
    };
    let mut report = BulkUploadReport::default();

    let result = repo.in_catalog_transaction(|unit| {
        reconcile(unit, scope, &group_rows(vec![row]), &mut report)?;
        let category = unit
            .find_visible_category(1, store.id, "audio")?
            .expect("category created in this transaction");
        unit.create_product(&NewProduct::new(1, store.id, category.id, "SPEAKER"))
    });

    assert!(result.is_err());
    assert_eq!(report.products_created, 1);

    let (total, _) = repo
        .list_categories(CategoryListQuery::new(1).visible_to(store.id))
        .expect("categories");
    assert_eq!(total, 0);
    assert!(
        repo.find_product_by_name(store.id, "speaker")
            .expect("query")
            .is_none()
    );
    let (total, _) = repo
        .list_inventory(InventoryListQuery::new(store.id))
        .expect("inventory");
    assert_eq!(total, 0);
}
