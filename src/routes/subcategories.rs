use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{base_context, check_role, redirect, render_template};
use tera::Tera;

use crate::ADMIN_ROLE;
use crate::forms::categories::ReviewForm;
use crate::forms::subcategories::SubCategoryForm;
use crate::media::MediaStorage;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::categories::load_categories;
use crate::services::subcategories::{
    create_subcategory, load_pending_subcategories, load_subcategories, modify_subcategory,
    remove_subcategory, review_subcategory,
};

#[get("/subcategories")]
pub async fn show_subcategories(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let data = load_subcategories(repo.get_ref(), &user).and_then(|subcategories| {
        load_categories(repo.get_ref(), &user).map(|categories| (subcategories, categories))
    });

    match data {
        Ok((subcategories, categories)) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "subcategories",
                &server_config.auth_service_url,
            );
            context.insert("subcategories", &subcategories);
            context.insert("categories", &categories);
            context.insert("is_admin", &check_role(ADMIN_ROLE, &user.roles));
            render_template(&tera, "subcategories/index.html", &context)
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
            log::error!("Failed to list subcategories: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/subcategories/add")]
pub async fn add_subcategory(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    media: web::Data<MediaStorage>,
    MultipartForm(form): MultipartForm<SubCategoryForm>,
) -> impl Responder {
    match create_subcategory(repo.get_ref(), media.get_ref(), &user, form) {
        Ok(subcategory) if subcategory.is_global => {
            FlashMessage::success(format!("Подкатегория «{}» добавлена.", subcategory.name))
                .send();
            redirect("/subcategories")
        }
        Ok(subcategory) => {
            FlashMessage::success(format!(
                "Подкатегория «{}» добавлена и ожидает одобрения.",
                subcategory.name
            ))
            .send();
            redirect("/subcategories")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/subcategories")
        }
        Err(ServiceError::Conflict) => {
            FlashMessage::error("Подкатегория с таким названием уже существует.").send();
            redirect("/subcategories")
        }
        Err(err) => {
            log::error!("Failed to create subcategory: {err}");
            FlashMessage::error("Не удалось создать подкатегорию.").send();
            redirect("/subcategories")
        }
    }
}

#[post("/subcategories/{slug}/edit")]
pub async fn edit_subcategory(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    media: web::Data<MediaStorage>,
    MultipartForm(form): MultipartForm<SubCategoryForm>,
) -> impl Responder {
    let slug = path.into_inner();

    match modify_subcategory(repo.get_ref(), media.get_ref(), &user, &slug, form) {
        Ok(subcategory) => {
            FlashMessage::success(format!("Подкатегория «{}» изменена.", subcategory.name))
                .send();
            redirect("/subcategories")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Подкатегория не найдена.").send();
            redirect("/subcategories")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/subcategories")
        }
        Err(err) => {
            log::error!("Failed to change subcategory {slug}: {err}");
            FlashMessage::error("Не удалось изменить подкатегорию.").send();
            redirect("/subcategories")
        }
    }
}

#[post("/subcategories/{slug}/delete")]
pub async fn delete_subcategory(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let slug = path.into_inner();

    match remove_subcategory(repo.get_ref(), &user, &slug) {
        Ok(()) => {
            FlashMessage::success("Подкатегория удалена.").send();
            redirect("/subcategories")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Подкатегория не найдена.").send();
            redirect("/subcategories")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/subcategories")
        }
        Err(err) => {
            log::error!("Failed to delete subcategory {slug}: {err}");
            FlashMessage::error("Не удалось удалить подкатегорию.").send();
            redirect("/subcategories")
        }
    }
}

#[get("/subcategories/pending")]
pub async fn show_pending_subcategories(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_pending_subcategories(repo.get_ref(), &user) {
        Ok(subcategories) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "approvals",
                &server_config.auth_service_url,
            );
            context.insert("entries", &subcategories);
            context.insert("kind", "subcategories");
            render_template(&tera, "categories/pending.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list pending subcategories: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/subcategories/{slug}/review")]
pub async fn review_pending_subcategory(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ReviewForm>,
) -> impl Responder {
    let slug = path.into_inner();

    match review_subcategory(repo.get_ref(), &user, &slug, form) {
        Ok(subcategory) if subcategory.is_global => {
            FlashMessage::success(format!("Подкатегория «{}» одобрена.", subcategory.name))
                .send();
            redirect("/subcategories/pending")
        }
        Ok(subcategory) => {
            FlashMessage::success(format!("Подкатегория «{}» отклонена.", subcategory.name))
                .send();
            redirect("/subcategories/pending")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Недостаточно прав.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Подкатегория не найдена.").send();
            redirect("/subcategories/pending")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/subcategories/pending")
        }
        Err(err) => {
            log::error!("Failed to review subcategory {slug}: {err}");
            FlashMessage::error("Не удалось сохранить решение.").send();
            redirect("/subcategories/pending")
        }
    }
}
