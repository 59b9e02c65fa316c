use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::Serialize;

use crate::domain::inventory::{InventoryEntry, InventoryListQuery};
use crate::domain::store::{Store, StoreListQuery, StoreVerification, StoreWithVerification};
use crate::forms::stores::{StoreForm, VerificationForm, VerifyStoreForm};
use crate::media::MediaStorage;
use crate::repository::{InventoryReader, StoreReader, StoreWriter};
use crate::services::{ServiceError, ServiceResult, save_media};
use crate::{ADMIN_ROLE, STORE_OWNER_ROLE};

/// Data required to render a single store page.
#[derive(Debug, Serialize)]
pub struct StoreDetails {
    pub store: Store,
    /// Active inventory offered for pickup.
    pub inventory: Vec<InventoryEntry>,
    /// Present for the owner and admins only.
    pub verification: Option<StoreVerification>,
    /// Whether the user may edit the store and upload documents.
    pub can_manage: bool,
}

fn is_owner(store: &Store, user: &AuthenticatedUser) -> bool {
    check_role(STORE_OWNER_ROLE, &user.roles) && store.owner_email == user.email.to_lowercase()
}

/// Load a store of the hub that the user owns.
fn owned_store<R>(repo: &R, user: &AuthenticatedUser, store_id: i32) -> ServiceResult<Store>
where
    R: StoreReader + ?Sized,
{
    if !check_role(STORE_OWNER_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    match repo
        .get_store_by_id(store_id, user.hub_id)
        .map_err(ServiceError::from)?
    {
        Some(store) if is_owner(&store, user) => Ok(store),
        _ => Err(ServiceError::NotFound),
    }
}

/// Stores listed on the landing page: everything for admins, own stores for
/// store owners and verified, active stores for everybody else.
pub fn load_stores<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Store>>
where
    R: StoreReader + ?Sized,
{
    let query = if check_role(ADMIN_ROLE, &user.roles) {
        StoreListQuery::new(user.hub_id)
    } else if check_role(STORE_OWNER_ROLE, &user.roles) {
        StoreListQuery::new(user.hub_id).owner(&user.email)
    } else {
        StoreListQuery::new(user.hub_id).public_only()
    };

    let (_total, stores) = repo.list_stores(query).map_err(ServiceError::from)?;
    Ok(stores)
}

/// Loads one store with its active inventory. Stores the user may not see are
/// reported as missing.
pub fn load_store<R>(repo: &R, user: &AuthenticatedUser, store_id: i32) -> ServiceResult<StoreDetails>
where
    R: StoreReader + InventoryReader + ?Sized,
{
    let store = repo
        .get_store_by_id(store_id, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    let is_admin = check_role(ADMIN_ROLE, &user.roles);
    let can_manage = is_owner(&store, user);

    if !(is_admin || can_manage || store.is_public()) {
        return Err(ServiceError::NotFound);
    }

    let (_total, inventory) = repo
        .list_inventory(InventoryListQuery::new(store.id).active_only())
        .map_err(ServiceError::from)?;

    let verification = if is_admin || can_manage {
        repo.get_verification(store.id).map_err(ServiceError::from)?
    } else {
        None
    };

    Ok(StoreDetails {
        store,
        inventory,
        verification,
        can_manage,
    })
}

/// Registers a new store owned by the user. New stores start pending and
/// hidden until verified.
pub fn create_store<R>(repo: &R, user: &AuthenticatedUser, form: StoreForm) -> ServiceResult<Store>
where
    R: StoreWriter + ?Sized,
{
    if !check_role(STORE_OWNER_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let new_store = form
        .into_new_store(user.hub_id, &user.email)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.create_store(&new_store).map_err(ServiceError::from)
}

pub fn modify_store<R>(
    repo: &R,
    user: &AuthenticatedUser,
    store_id: i32,
    form: StoreForm,
) -> ServiceResult<Store>
where
    R: StoreReader + StoreWriter + ?Sized,
{
    let store = owned_store(repo, user, store_id)?;

    let updates = form
        .into_update_store()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_store(store.id, user.hub_id, &updates)
        .map_err(ServiceError::from)
}

pub fn remove_store<R>(repo: &R, user: &AuthenticatedUser, store_id: i32) -> ServiceResult<()>
where
    R: StoreReader + StoreWriter + ?Sized,
{
    let store = owned_store(repo, user, store_id)?;

    repo.delete_store(store.id, user.hub_id)
        .map_err(ServiceError::from)
}

/// Stores the KYC documents and puts the store back into the review queue.
pub fn submit_verification<R>(
    repo: &R,
    media: &MediaStorage,
    user: &AuthenticatedUser,
    store_id: i32,
    form: VerificationForm,
) -> ServiceResult<StoreVerification>
where
    R: StoreReader + StoreWriter + ?Sized,
{
    let store = owned_store(repo, user, store_id)?;

    let documents = form
        .into_documents(store.id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    for file in documents.files() {
        save_media(media, file)?;
    }

    repo.submit_verification(&documents.to_new_verification(store.id))
        .map_err(ServiceError::from)
}

/// Every store of the hub with its verification record, newest first.
pub fn load_verification_queue<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<Vec<StoreWithVerification>>
where
    R: StoreReader + ?Sized,
{
    if !check_role(ADMIN_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.list_verification_queue(user.hub_id)
        .map_err(ServiceError::from)
}

/// Records the admin decision on the documents of a store.
pub fn verify_store<R>(
    repo: &R,
    user: &AuthenticatedUser,
    store_id: i32,
    form: VerifyStoreForm,
) -> ServiceResult<StoreVerification>
where
    R: StoreReader + StoreWriter + ?Sized,
{
    if !check_role(ADMIN_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let store = repo
        .get_store_by_id(store_id, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    if repo
        .get_verification(store.id)
        .map_err(ServiceError::from)?
        .is_none()
    {
        return Err(ServiceError::NotFound);
    }

    let decision = form.into_decision(&user.email);
    repo.review_verification(store.id, &decision)
        .map_err(ServiceError::from)
}
