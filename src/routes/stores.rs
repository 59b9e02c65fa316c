use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{base_context, check_role, redirect, render_template};
use tera::Tera;

use crate::STORE_OWNER_ROLE;
use crate::domain::store::ReviewStatus;
use crate::forms::stores::{StoreForm, VerificationForm, VerifyStoreForm};
use crate::media::MediaStorage;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::stores::{
    create_store, load_store, load_stores, load_verification_queue, modify_store, remove_store,
    submit_verification, verify_store,
};

#[get("/stores")]
pub async fn show_stores(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_stores(repo.get_ref(), &user) {
        Ok(stores) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "stores",
                &server_config.auth_service_url,
            );
            context.insert("stores", &stores);
            context.insert(
                "is_store_owner",
                &check_role(STORE_OWNER_ROLE, &user.roles),
            );
            render_template(&tera, "stores/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list stores: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/stores/add")]
pub async fn show_add_store(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    if !check_role(STORE_OWNER_ROLE, &user.roles) {
        FlashMessage::error("Недостаточно прав.").send();
        return redirect("/na");
    }

    let context = base_context(
        &flash_messages,
        &user,
        "stores",
        &server_config.auth_service_url,
    );
    render_template(&tera, "stores/add.html", &context)
}

#[post("/stores/add")]
pub async fn add_store(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<StoreForm>,
) -> impl Responder {
    match create_store(repo.get_ref(), &user, form) {
        Ok(store) => {
            FlashMessage::success(format!(
                "Магазин «{}» создан. Загрузите документы для проверки.",
                store.name
            ))
            .send();
            redirect(&format!("/stores/{}", store.id))
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
            log::error!("Failed to create store: {err}");
            FlashMessage::error("Не удалось создать магазин.").send();
            redirect("/stores/add")
        }
    }
}

// Registered before `/stores/{store_id}` so the literal segment wins.
#[get("/stores/verifications")]
pub async fn show_verifications(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_verification_queue(repo.get_ref(), &user) {
        Ok(queue) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "verifications",
                &server_config.auth_service_url,
            );
            context.insert("queue", &queue);
            render_template(&tera, "stores/verifications.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list store verifications: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/stores/{store_id}")]
pub async fn show_store(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let store_id = path.into_inner();

    match load_store(repo.get_ref(), &user, store_id) {
        Ok(details) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "stores",
                &server_config.auth_service_url,
            );
            context.insert("store", &details.store);
            context.insert("inventory", &details.inventory);
            context.insert("verification", &details.verification);
            context.insert("can_manage", &details.can_manage);
            render_template(&tera, "stores/store.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Магазин не найден.").send();
            redirect("/stores")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to load store {store_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/stores/{store_id}/edit")]
pub async fn edit_store(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<StoreForm>,
) -> impl Responder {
    let store_id = path.into_inner();
    let store_url = format!("/stores/{store_id}");

    match modify_store(repo.get_ref(), &user, store_id, form) {
        Ok(store) => {
            FlashMessage::success(format!("Магазин «{}» изменён.", store.name)).send();
            redirect(&store_url)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Магазин не найден.").send();
            redirect("/stores")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(&store_url)
        }
        Err(err) => {
            log::error!("Failed to update store {store_id}: {err}");
            FlashMessage::error("Не удалось изменить магазин.").send();
            redirect(&store_url)
        }
    }
}

#[post("/stores/{store_id}/delete")]
pub async fn delete_store(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let store_id = path.into_inner();

    match remove_store(repo.get_ref(), &user, store_id) {
        Ok(()) => {
            FlashMessage::success("Магазин удалён.").send();
            redirect("/stores")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Магазин не найден.").send();
            redirect("/stores")
        }
        Err(err) => {
            log::error!("Failed to delete store {store_id}: {err}");
            FlashMessage::error("Не удалось удалить магазин.").send();
            redirect("/stores")
        }
    }
}

#[post("/stores/{store_id}/verification")]
pub async fn upload_verification(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    media: web::Data<MediaStorage>,
    MultipartForm(form): MultipartForm<VerificationForm>,
) -> impl Responder {
    let store_id = path.into_inner();
    let store_url = format!("/stores/{store_id}");

    match submit_verification(repo.get_ref(), media.get_ref(), &user, store_id, form) {
        Ok(_) => {
            FlashMessage::success("Документы отправлены на проверку.").send();
            redirect(&store_url)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Магазин не найден.").send();
            redirect("/stores")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(&store_url)
        }
        Err(err) => {
            log::error!("Failed to submit verification for store {store_id}: {err}");
            FlashMessage::error("Не удалось отправить документы.").send();
            redirect(&store_url)
        }
    }
}

#[post("/stores/{store_id}/verify")]
pub async fn review_store(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<VerifyStoreForm>,
) -> impl Responder {
    let store_id = path.into_inner();

    match verify_store(repo.get_ref(), &user, store_id, form) {
        Ok(verification) => {
            let message = match verification.status {
                ReviewStatus::Approved => "Магазин подтверждён.",
                _ => "Документы магазина отклонены.",
            };
            FlashMessage::success(message).send();
            redirect("/stores/verifications")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Магазин или документы не найдены.").send();
            redirect("/stores/verifications")
        }
        Err(err) => {
            log::error!("Failed to verify store {store_id}: {err}");
            FlashMessage::error("Не удалось сохранить решение.").send();
            redirect("/stores/verifications")
        }
    }
}
