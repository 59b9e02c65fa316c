use actix_multipart::form::MultipartForm;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{base_context, check_role, redirect, render_template};
use tera::Tera;

use crate::STORE_OWNER_ROLE;
use crate::archive::template::{TEMPLATE_FILE_NAME, build_template};
use crate::forms::bulk_upload::BulkUploadForm;
use crate::forms::inventory::{AddInventoryForm, EditInventoryForm, SmartInventoryForm};
use crate::media::MediaStorage;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::bulk_upload::bulk_upload_inventory;
use crate::services::inventory::{
    create_inventory, load_inventory, modify_inventory, remove_inventory, smart_create_inventory,
};

#[get("/inventory")]
pub async fn show_inventory(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_inventory(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "inventory",
                &server_config.auth_service_url,
            );
            context.insert("store", &data.store);
            context.insert("entries", &data.entries);
            context.insert("counts", &data.counts);
            context.insert("products", &data.products);
            context.insert("categories", &data.categories);
            context.insert("subcategories", &data.subcategories);
            render_template(&tera, "inventory/index.html", &context)
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
            log::error!("Failed to list inventory: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/inventory/add")]
pub async fn add_inventory(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddInventoryForm>,
) -> impl Responder {
    match create_inventory(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("Позиция добавлена в остатки.").send();
            redirect("/inventory")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Вариант товара не найден.").send();
            redirect("/inventory")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/inventory")
        }
        Err(ServiceError::Conflict) => {
            FlashMessage::error("Этот вариант уже есть в остатках.").send();
            redirect("/inventory")
        }
        Err(err) => {
            log::error!("Failed to add inventory: {err}");
            FlashMessage::error("Не удалось добавить позицию.").send();
            redirect("/inventory")
        }
    }
}

#[post("/inventory/{item_id}/edit")]
pub async fn edit_inventory(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<EditInventoryForm>,
) -> impl Responder {
    let item_id = path.into_inner();

    match modify_inventory(repo.get_ref(), &user, item_id, form) {
        Ok(_) => {
            FlashMessage::success("Позиция изменена.").send();
            redirect("/inventory")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Позиция не найдена.").send();
            redirect("/inventory")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/inventory")
        }
        Err(err) => {
            log::error!("Failed to update inventory item {item_id}: {err}");
            FlashMessage::error("Не удалось изменить позицию.").send();
            redirect("/inventory")
        }
    }
}

#[post("/inventory/{item_id}/delete")]
pub async fn delete_inventory(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let item_id = path.into_inner();

    match remove_inventory(repo.get_ref(), &user, item_id) {
        Ok(()) => {
            FlashMessage::success("Позиция удалена.").send();
            redirect("/inventory")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Позиция не найдена.").send();
            redirect("/inventory")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/inventory")
        }
        Err(err) => {
            log::error!("Failed to delete inventory item {item_id}: {err}");
            FlashMessage::error("Не удалось удалить позицию.").send();
            redirect("/inventory")
        }
    }
}

/// Single-page form creating the category, product and every variant line in
/// one go, with optional product and variant images.
#[post("/inventory/smart-add")]
pub async fn smart_add_inventory(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    media: web::Data<MediaStorage>,
    MultipartForm(form): MultipartForm<SmartInventoryForm>,
) -> impl Responder {
    match smart_create_inventory(repo.get_ref(), media.get_ref(), &user, form) {
        Ok(report) => {
            FlashMessage::success(format!(
                "Сохранено: товаров {}, вариантов {}, позиций в остатках {}.",
                report.products_created + report.products_updated,
                report.variants_created + report.variants_updated,
                report.inventory_created + report.inventory_updated,
            ))
            .send();
            for warning in &report.warnings {
                FlashMessage::warning(warning.message.clone()).send();
            }
            redirect("/inventory")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/inventory")
        }
        Err(err) => {
            log::error!("Failed to add inventory from the smart form: {err}");
            FlashMessage::error("Не удалось сохранить товар.").send();
            redirect("/inventory")
        }
    }
}

#[post("/inventory/bulk-upload")]
pub async fn upload_inventory(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    media: web::Data<MediaStorage>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<BulkUploadForm>,
) -> impl Responder {
    match bulk_upload_inventory(repo.get_ref(), media.get_ref(), &user, form) {
        Ok(report) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "inventory",
                &server_config.auth_service_url,
            );
            context.insert("report", &report);
            context.insert("total_changes", &report.total_changes());
            render_template(&tera, "inventory/bulk_results.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/inventory")
        }
        Err(err) => {
            log::error!("Failed to process bulk upload: {err}");
            FlashMessage::error("Не удалось обработать архив.").send();
            redirect("/inventory")
        }
    }
}

#[get("/inventory/bulk-upload/template")]
pub async fn download_template(user: AuthenticatedUser) -> impl Responder {
    if !check_role(STORE_OWNER_ROLE, &user.roles) {
        FlashMessage::error("Недостаточно прав.").send();
        return redirect("/na");
    }

    match build_template() {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("application/zip")
            .insert_header((
                header::CONTENT_DISPOSITION,
                ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(TEMPLATE_FILE_NAME.to_string())],
                },
            ))
            .body(bytes),
        Err(err) => {
            log::error!("Failed to build the bulk upload template: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
