use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{base_context, check_role, redirect, render_template};
use tera::Tera;

use crate::forms::storefront::CatalogFilterForm;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::storefront::load_storefront;
use crate::services::stores::load_stores;
use crate::{ADMIN_ROLE, STORE_OWNER_ROLE};

/// Landing page with the stores visible to the user.
#[get("/")]
pub async fn show_index(
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
                "index",
                &server_config.auth_service_url,
            );
            context.insert("stores", &stores);
            context.insert("is_admin", &check_role(ADMIN_ROLE, &user.roles));
            context.insert(
                "is_store_owner",
                &check_role(STORE_OWNER_ROLE, &user.roles),
            );
            render_template(&tera, "main/index.html", &context)
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

/// Customer catalog across every verified store of the hub.
#[get("/catalog")]
pub async fn show_catalog(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let filter = CatalogFilterForm::from_query(req.query_string());

    match load_storefront(repo.get_ref(), &user, filter) {
        Ok(page) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "catalog",
                &server_config.auth_service_url,
            );
            context.insert("categories", &page.categories);
            context.insert("subcategories", &page.subcategories);
            context.insert("new_arrivals", &page.new_arrivals);
            context.insert("best_prices", &page.best_prices);
            context.insert("selected", &page.selected);
            render_template(&tera, "main/catalog.html", &context)
        }
        Err(err) => {
            log::error!("Failed to load the catalog: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
