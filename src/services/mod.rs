pub use pushkind_common::services::errors::{ServiceError, ServiceResult};

use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;

use crate::domain::store::Store;
use crate::media::{MediaStorage, StoredFile};
use crate::repository::StoreReader;
use crate::{ADMIN_ROLE, STORE_OWNER_ROLE};

pub mod bulk_upload;
pub mod categories;
pub mod inventory;
pub mod products;
pub mod stores;
pub mod storefront;
pub mod subcategories;

/// Store the owner is currently working on: the first store they own in the
/// hub.
pub fn current_store<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Store>
where
    R: StoreReader + ?Sized,
{
    if !check_role(STORE_OWNER_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.find_owner_store(user.hub_id, &user.email)
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::Form("Create a store first.".to_string()))
}

/// Who is changing the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogActor {
    /// Works on global records of the hub.
    Admin,
    /// Works on records scoped to its store.
    Store(Store),
}

impl CatalogActor {
    /// Whether the actor may edit or delete a record owned by `store_id`.
    pub fn owns(&self, store_id: Option<i32>) -> bool {
        match self {
            CatalogActor::Admin => true,
            CatalogActor::Store(store) => store_id == Some(store.id),
        }
    }

    pub fn store_id(&self) -> Option<i32> {
        match self {
            CatalogActor::Admin => None,
            CatalogActor::Store(store) => Some(store.id),
        }
    }
}

/// Resolve the catalog role of the user; admin wins over store owner.
pub fn catalog_actor<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<CatalogActor>
where
    R: StoreReader + ?Sized,
{
    if check_role(ADMIN_ROLE, &user.roles) {
        return Ok(CatalogActor::Admin);
    }

    current_store(repo, user).map(CatalogActor::Store)
}

/// Write an uploaded file to media storage. Failures are logged and reported
/// to the user as a form error.
pub(crate) fn save_media(media: &MediaStorage, file: &StoredFile) -> ServiceResult<()> {
    media.save(file).map_err(|err| {
        log::error!("Failed to store media file {}: {err}", file.path);
        ServiceError::Form("The file could not be saved, try again later.".to_string())
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::{sample_store, user_with_roles};
    use super::*;
    use crate::CUSTOMER_ROLE;
    use crate::repository::mock::MockMarketplace;

    #[test]
    fn current_store_requires_owner_role() {
        let repo = MockMarketplace::new();
        let user = user_with_roles(&[CUSTOMER_ROLE]);

        let result = current_store(&repo, &user);

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn current_store_without_store_is_form_error() {
        let mut repo = MockMarketplace::new();
        repo.expect_find_owner_store()
            .times(1)
            .withf(|hub_id, email| {
                assert_eq!(*hub_id, 9);
                assert_eq!(email, "user@example.com");
                true
            })
            .returning(|_, _| Ok(None));

        let user = user_with_roles(&[STORE_OWNER_ROLE]);

        assert!(matches!(
            current_store(&repo, &user),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn admin_wins_over_store_owner() {
        let repo = MockMarketplace::new();
        let user = user_with_roles(&[STORE_OWNER_ROLE, ADMIN_ROLE]);

        let actor = catalog_actor(&repo, &user).expect("actor");

        assert_eq!(actor, CatalogActor::Admin);
        assert!(actor.owns(Some(3)));
    }

    #[test]
    fn store_actor_owns_only_its_rows() {
        let actor = CatalogActor::Store(sample_store(3));

        assert!(actor.owns(Some(3)));
        assert!(!actor.owns(Some(4)));
        assert!(!actor.owns(None));
    }
}
