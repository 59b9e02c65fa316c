use actix_web::{HttpResponse, Responder, get, web};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::stores::load_store;

#[get("/v1/stores/{store_id}/inventory")]
/// Return the active inventory of a store visible to the user as JSON.
///
/// Stores the user may not see answer with `404 Not Found`.
pub async fn api_v1_store_inventory(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let store_id = path.into_inner();

    match load_store(repo.get_ref(), &user, store_id) {
        Ok(details) => HttpResponse::Ok().json(details.inventory),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to list inventory of store {store_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
