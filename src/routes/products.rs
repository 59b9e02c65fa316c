use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{base_context, redirect, render_template};
use tera::Tera;

use crate::forms::products::{AddProductForm, AddVariantForm};
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::products::{
    add_variant, create_product, load_products, remove_product, remove_variant,
};

#[get("/products")]
pub async fn show_products(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_products(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "products",
                &server_config.auth_service_url,
            );
            context.insert("store", &data.store);
            context.insert("products", &data.products);
            context.insert("categories", &data.categories);
            context.insert("subcategories", &data.subcategories);
            render_template(&tera, "products/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/stores/add")
        }
        Err(err) => {
            log::error!("Failed to list products: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/products/add")]
pub async fn add_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddProductForm>,
) -> impl Responder {
    match create_product(repo.get_ref(), &user, form) {
        Ok(product) => {
            FlashMessage::success(format!("Товар «{}» добавлен.", product.name)).send();
            redirect("/products")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/products")
        }
        Err(ServiceError::Conflict) => {
            FlashMessage::error("Товар с таким названием уже существует.").send();
            redirect("/products")
        }
        Err(err) => {
            log::error!("Failed to create product: {err}");
            FlashMessage::error("Не удалось добавить товар.").send();
            redirect("/products")
        }
    }
}

#[post("/products/{slug}/delete")]
pub async fn delete_product(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let slug = path.into_inner();

    match remove_product(repo.get_ref(), &user, &slug) {
        Ok(()) => {
            FlashMessage::success("Товар удалён.").send();
            redirect("/products")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Товар не найден.").send();
            redirect("/products")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/products")
        }
        Err(err) => {
            log::error!("Failed to delete product {slug}: {err}");
            FlashMessage::error("Не удалось удалить товар.").send();
            redirect("/products")
        }
    }
}

#[post("/products/{slug}/variants/add")]
pub async fn add_product_variant(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddVariantForm>,
) -> impl Responder {
    let slug = path.into_inner();

    match add_variant(repo.get_ref(), &user, &slug, form) {
        Ok(variant) => {
            FlashMessage::success(format!("Вариант «{}» добавлен.", variant.variant_name))
                .send();
            redirect("/products")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Товар не найден.").send();
            redirect("/products")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/products")
        }
        Err(ServiceError::Conflict) => {
            FlashMessage::error("Вариант с таким названием уже существует.").send();
            redirect("/products")
        }
        Err(err) => {
            log::error!("Failed to add a variant to product {slug}: {err}");
            FlashMessage::error("Не удалось добавить вариант.").send();
            redirect("/products")
        }
    }
}

#[post("/variants/{slug}/delete")]
pub async fn delete_variant(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let slug = path.into_inner();

    match remove_variant(repo.get_ref(), &user, &slug) {
        Ok(()) => {
            FlashMessage::success("Вариант удалён.").send();
            redirect("/products")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Вариант не найден.").send();
            redirect("/products")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/products")
        }
        Err(err) => {
            log::error!("Failed to delete variant {slug}: {err}");
            FlashMessage::error("Не удалось удалить вариант.").send();
            redirect("/products")
        }
    }
}
