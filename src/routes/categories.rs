use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{base_context, check_role, redirect, render_template};
use tera::Tera;

use crate::ADMIN_ROLE;
use crate::forms::categories::{CategoryForm, ReviewForm};
use crate::media::MediaStorage;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::categories::{
    create_category, load_categories, load_pending_categories, modify_category, remove_category,
    review_category,
};

#[get("/categories")]
pub async fn show_categories(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_categories(repo.get_ref(), &user) {
        Ok(categories) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "categories",
                &server_config.auth_service_url,
            );
            context.insert("categories", &categories);
            context.insert("is_admin", &check_role(ADMIN_ROLE, &user.roles));
            render_template(&tera, "categories/index.html", &context)
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
            log::error!("Failed to list categories: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/categories/add")]
pub async fn add_category(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    media: web::Data<MediaStorage>,
    MultipartForm(form): MultipartForm<CategoryForm>,
) -> impl Responder {
    match create_category(repo.get_ref(), media.get_ref(), &user, form) {
        Ok(category) if category.is_global => {
            FlashMessage::success(format!("Категория «{}» добавлена.", category.name)).send();
            redirect("/categories")
        }
        Ok(category) => {
            FlashMessage::success(format!(
                "Категория «{}» добавлена и ожидает одобрения.",
                category.name
            ))
            .send();
            redirect("/categories")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/categories")
        }
        Err(ServiceError::Conflict) => {
            FlashMessage::error("Категория с таким названием уже существует.").send();
            redirect("/categories")
        }
        Err(err) => {
            log::error!("Failed to create category: {err}");
            FlashMessage::error("Не удалось создать категорию.").send();
            redirect("/categories")
        }
    }
}

#[post("/categories/{slug}/edit")]
pub async fn edit_category(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    media: web::Data<MediaStorage>,
    MultipartForm(form): MultipartForm<CategoryForm>,
) -> impl Responder {
    let slug = path.into_inner();

    match modify_category(repo.get_ref(), media.get_ref(), &user, &slug, form) {
        Ok(category) => {
            FlashMessage::success(format!("Категория «{}» изменена.", category.name)).send();
            redirect("/categories")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Категория не найдена.").send();
            redirect("/categories")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/categories")
        }
        Err(err) => {
            log::error!("Failed to change category {slug}: {err}");
            FlashMessage::error("Не удалось изменить категорию.").send();
            redirect("/categories")
        }
    }
}

#[post("/categories/{slug}/delete")]
pub async fn delete_category(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let slug = path.into_inner();

    match remove_category(repo.get_ref(), &user, &slug) {
        Ok(()) => {
            FlashMessage::success("Категория удалена.").send();
            redirect("/categories")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Категория не найдена.").send();
            redirect("/categories")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/categories")
        }
        Err(err) => {
            log::error!("Failed to delete category {slug}: {err}");
            FlashMessage::error("Не удалось удалить категорию.").send();
            redirect("/categories")
        }
    }
}

#[get("/categories/pending")]
pub async fn show_pending_categories(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_pending_categories(repo.get_ref(), &user) {
        Ok(categories) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "approvals",
                &server_config.auth_service_url,
            );
            context.insert("entries", &categories);
            context.insert("kind", "categories");
            render_template(&tera, "categories/pending.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list pending categories: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/categories/{slug}/review")]
pub async fn review_pending_category(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ReviewForm>,
) -> impl Responder {
    let slug = path.into_inner();

    match review_category(repo.get_ref(), &user, &slug, form) {
        Ok(category) if category.is_global => {
            FlashMessage::success(format!("Категория «{}» одобрена.", category.name)).send();
            redirect("/categories/pending")
        }
        Ok(category) => {
            FlashMessage::success(format!("Категория «{}» отклонена.", category.name)).send();
            redirect("/categories/pending")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Категория не найдена.").send();
            redirect("/categories/pending")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/categories/pending")
        }
        Err(err) => {
            log::error!("Failed to review category {slug}: {err}");
            FlashMessage::error("Не удалось сохранить решение.").send();
            redirect("/categories/pending")
        }
    }
}
