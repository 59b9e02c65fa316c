use std::env;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;
use pushkind_common::middleware::RedirectUnauthorized;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{logout, not_assigned};
use tera::Tera;

use pushkind_marketplace::media::MediaStorage;
use pushkind_marketplace::repository::DieselRepository;
use pushkind_marketplace::routes::api::api_v1_store_inventory;
use pushkind_marketplace::routes::categories::{
    add_category, delete_category, edit_category, review_pending_category,
    show_categories, show_pending_categories,
};
use pushkind_marketplace::routes::inventory::{
    add_inventory, delete_inventory, download_template, edit_inventory, show_inventory,
    smart_add_inventory, upload_inventory,
};
use pushkind_marketplace::routes::main::{show_catalog, show_index};
use pushkind_marketplace::routes::products::{
    add_product, add_product_variant, delete_product, delete_variant, show_products,
};
use pushkind_marketplace::routes::stores::{
    add_store, delete_store, edit_store, review_store, show_add_store, show_store,
    show_stores, show_verifications, upload_verification,
};
use pushkind_marketplace::routes::subcategories::{
    add_subcategory, delete_subcategory, edit_subcategory, review_pending_subcategory,
    show_pending_subcategories, show_subcategories,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let database_url = env::var("DATABASE_URL").unwrap_or("app.db".to_string());
    let port = env::var("PORT").unwrap_or("8080".to_string());
    let port = port.parse::<u16>().unwrap_or(8080);
    let address = env::var("ADDRESS").unwrap_or("127.0.0.1".to_string());

    let secret = env::var("SECRET_KEY");
    let secret_key = match &secret {
        Ok(key) => Key::from(key.as_bytes()),
        Err(_) => Key::generate(),
    };

    let auth_service_url = env::var("AUTH_SERVICE_URL");
    let auth_service_url = match auth_service_url {
        Ok(auth_service_url) => auth_service_url,
        Err(_) => {
            log::error!("AUTH_SERVICE_URL environment variable not set");
            std::process::exit(1);
        }
    };

    let common_config = CommonServerConfig {
        secret: secret.unwrap_or_default(),
        auth_service_url,
    };

    let domain = env::var("DOMAIN").unwrap_or("localhost".to_string());

    let media_root = env::var("MEDIA_ROOT").unwrap_or("./media".to_string());
    let media = MediaStorage::new(&media_root);

    let pool = match establish_connection_pool(&database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = match Tera::new("templates/**/*") {
        Ok(t) => t,
        Err(e) => {
            log::error!("Parsing error(s): {e}");
            std::process::exit(1);
        }
    };

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{domain}")))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(Files::new("/media", media_root.clone()))
            .service(not_assigned)
            .service(web::scope("/api").service(api_v1_store_inventory))
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_index)
                    .service(show_catalog)
                    .service(show_stores)
                    .service(show_add_store)
                    .service(add_store)
                    .service(show_verifications)
                    .service(show_store)
                    .service(edit_store)
                    .service(delete_store)
                    .service(upload_verification)
                    .service(review_store)
                    .service(show_categories)
                    .service(show_pending_categories)
                    .service(add_category)
                    .service(edit_category)
                    .service(delete_category)
                    .service(review_pending_category)
                    .service(show_subcategories)
                    .service(show_pending_subcategories)
                    .service(add_subcategory)
                    .service(edit_subcategory)
                    .service(delete_subcategory)
                    .service(review_pending_subcategory)
                    .service(show_products)
                    .service(add_product)
                    .service(delete_product)
                    .service(add_product_variant)
                    .service(delete_variant)
                    .service(show_inventory)
                    .service(add_inventory)
                    .service(smart_add_inventory)
                    .service(upload_inventory)
                    .service(download_template)
                    .service(edit_inventory)
                    .service(delete_inventory)
                    .service(logout),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(common_config.clone()))
            .app_data(web::Data::new(media.clone()))
    })
    .bind((address, port))?
    .run()
    .await
}
