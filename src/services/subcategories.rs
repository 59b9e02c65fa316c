use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;

use crate::ADMIN_ROLE;
use crate::domain::category::Category;
use crate::domain::subcategory::{
    NewSubCategory, SubCategory, SubCategoryListQuery, UpdateSubCategory,
};
use crate::forms::categories::{ReviewAction, ReviewForm};
use crate::forms::subcategories::SubCategoryForm;
use crate::media::MediaStorage;
use crate::repository::{CategoryReader, StoreReader, SubCategoryReader, SubCategoryWriter};
use crate::services::{
    CatalogActor, ServiceError, ServiceResult, catalog_actor, save_media,
};

pub fn load_subcategories<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<Vec<SubCategory>>
where
    R: StoreReader + SubCategoryReader + ?Sized,
{
    let query = match catalog_actor(repo, user)? {
        CatalogActor::Admin => SubCategoryListQuery::new(user.hub_id),
        CatalogActor::Store(store) => SubCategoryListQuery::new(user.hub_id).visible_to(store.id),
    };

    let (_total, subcategories) = repo
        .list_subcategories(query)
        .map_err(ServiceError::from)?;
    Ok(subcategories)
}

/// Parent category the actor may attach subcategories to.
fn parent_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    actor: &CatalogActor,
    category_id: i32,
) -> ServiceResult<Category>
where
    R: CategoryReader + ?Sized,
{
    let category = repo
        .get_category_by_id(category_id, user.hub_id)
        .map_err(ServiceError::from)?;

    let visible = |category: &Category| match actor {
        CatalogActor::Admin => true,
        CatalogActor::Store(store) => category.is_visible_to(store.id),
    };

    category
        .filter(visible)
        .ok_or_else(|| ServiceError::Form("The selected category is not available.".to_string()))
}

pub fn create_subcategory<R>(
    repo: &R,
    media: &MediaStorage,
    user: &AuthenticatedUser,
    form: SubCategoryForm,
) -> ServiceResult<SubCategory>
where
    R: StoreReader + CategoryReader + SubCategoryWriter + ?Sized,
{
    let actor = catalog_actor(repo, user)?;

    let input = form
        .into_input()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let parent = parent_category(repo, user, &actor, input.category_id)?;

    let mut new_subcategory = match &actor {
        CatalogActor::Admin => NewSubCategory::global(user.hub_id, parent.id, input.entry.name),
        CatalogActor::Store(store) => {
            NewSubCategory::store_scoped(user.hub_id, parent.id, store.id, input.entry.name)
        }
    };

    if let Some(image) = &input.entry.image {
        save_media(media, image)?;
        new_subcategory = new_subcategory.with_image(image.path.clone());
    }

    repo.create_subcategory(&new_subcategory)
        .map_err(ServiceError::from)
}

fn editable_subcategory<R>(
    repo: &R,
    user: &AuthenticatedUser,
    actor: &CatalogActor,
    slug: &str,
) -> ServiceResult<SubCategory>
where
    R: SubCategoryReader + ?Sized,
{
    match repo
        .get_subcategory_by_slug(slug, user.hub_id)
        .map_err(ServiceError::from)?
    {
        Some(subcategory) if actor.owns(subcategory.store_id) => Ok(subcategory),
        _ => Err(ServiceError::NotFound),
    }
}

/// Renames a subcategory, moves it under another visible category and
/// optionally replaces its image.
pub fn modify_subcategory<R>(
    repo: &R,
    media: &MediaStorage,
    user: &AuthenticatedUser,
    slug: &str,
    form: SubCategoryForm,
) -> ServiceResult<SubCategory>
where
    R: StoreReader + CategoryReader + SubCategoryReader + SubCategoryWriter + ?Sized,
{
    let actor = catalog_actor(repo, user)?;
    let subcategory = editable_subcategory(repo, user, &actor, slug)?;

    let input = form
        .into_input()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let parent = parent_category(repo, user, &actor, input.category_id)?;

    if let Some(image) = &input.entry.image {
        save_media(media, image)?;
    }

    let update = UpdateSubCategory::new(
        parent.id,
        input.entry.name,
        input.entry.image.map(|image| image.path),
    );

    repo.update_subcategory(subcategory.id, user.hub_id, &update)
        .map_err(ServiceError::from)
}

pub fn remove_subcategory<R>(repo: &R, user: &AuthenticatedUser, slug: &str) -> ServiceResult<()>
where
    R: StoreReader + SubCategoryReader + SubCategoryWriter + ?Sized,
{
    let actor = catalog_actor(repo, user)?;
    let subcategory = editable_subcategory(repo, user, &actor, slug)?;

    repo.delete_subcategory(subcategory.id, user.hub_id)
        .map_err(ServiceError::from)
}

pub fn load_pending_subcategories<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<Vec<SubCategory>>
where
    R: SubCategoryReader + ?Sized,
{
    if !check_role(ADMIN_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let (_total, subcategories) = repo
        .list_subcategories(SubCategoryListQuery::new(user.hub_id).pending_only())
        .map_err(ServiceError::from)?;
    Ok(subcategories)
}

pub fn review_subcategory<R>(
    repo: &R,
    user: &AuthenticatedUser,
    slug: &str,
    form: ReviewForm,
) -> ServiceResult<SubCategory>
where
    R: SubCategoryReader + SubCategoryWriter + ?Sized,
{
    if !check_role(ADMIN_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let action = form
        .into_action()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let subcategory = repo
        .get_subcategory_by_slug(slug, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    if subcategory.is_global {
        return Err(ServiceError::Form(format!(
            "Subcategory `{}` is already global.",
            subcategory.name
        )));
    }

    match action {
        ReviewAction::Approve => repo.approve_subcategory(subcategory.id, user.hub_id),
        ReviewAction::Reject => repo.reject_subcategory(subcategory.id, user.hub_id),
    }
    .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use actix_multipart::form::text::Text;

    use super::*;
    use crate::STORE_OWNER_ROLE;
    use crate::repository::mock::MockMarketplace;
    use crate::services::test_support::{
        fixed_datetime, sample_category, sample_store, user_with_roles,
    };

    fn sample_subcategory(id: i32, store_id: Option<i32>) -> SubCategory {
        SubCategory {
            id,
            hub_id: 9,
            category_id: 1,
            store_id,
            name: "Headsets".into(),
            slug: "headsets".into(),
            image: None,
            is_global: store_id.is_none(),
            is_approved: store_id.is_none(),
            is_active: true,
            created_at: fixed_datetime(),
            updated_at: fixed_datetime(),
        }
    }

    fn form(category_id: i32) -> SubCategoryForm {
        SubCategoryForm {
            name: Text("Headsets".to_string()),
            category_id: Text(category_id),
            image: None,
        }
    }

    fn owner_repo() -> MockMarketplace {
        let mut repo = MockMarketplace::new();
        repo.expect_find_owner_store()
            .returning(|_, _| Ok(Some(sample_store(3))));
        repo
    }

    #[test]
    fn subcategory_under_foreign_category_is_rejected() {
        let mut repo = owner_repo();
        repo.expect_get_category_by_id()
            .returning(|id, _| Ok(Some(sample_category(id, Some(8)))));
        repo.expect_create_subcategory().never();

        let media = MediaStorage::new("unused");
        let user = user_with_roles(&[STORE_OWNER_ROLE]);

        let result = create_subcategory(&repo, &media, &user, form(5));

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn store_owner_creates_scoped_subcategory_under_global_category() {
        let mut repo = owner_repo();
        repo.expect_get_category_by_id()
            .returning(|id, _| Ok(Some(sample_category(id, None))));
        repo.expect_create_subcategory()
            .times(1)
            .withf(|new_subcategory| {
                assert_eq!(new_subcategory.category_id, 5);
                assert_eq!(new_subcategory.store_id, Some(3));
                assert!(!new_subcategory.is_approved);
                true
            })
            .returning(|_| Ok(sample_subcategory(1, Some(3))));

        let media = MediaStorage::new("unused");
        let user = user_with_roles(&[STORE_OWNER_ROLE]);

        create_subcategory(&repo, &media, &user, form(5)).expect("created");
    }

    #[test]
    fn store_owner_cannot_delete_foreign_subcategory() {
        let mut repo = owner_repo();
        repo.expect_get_subcategory_by_slug()
            .returning(|_, _| Ok(Some(sample_subcategory(2, Some(8)))));
        repo.expect_delete_subcategory().never();

        let user = user_with_roles(&[STORE_OWNER_ROLE]);

        assert!(matches!(
            remove_subcategory(&repo, &user, "headsets"),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn approve_promotes_store_subcategory() {
        let mut repo = MockMarketplace::new();
        repo.expect_get_subcategory_by_slug()
            .returning(|_, _| Ok(Some(sample_subcategory(2, Some(3)))));
        repo.expect_approve_subcategory()
            .times(1)
            .returning(|id, _| Ok(sample_subcategory(id, None)));

        let user = user_with_roles(&[ADMIN_ROLE]);
        let subcategory = review_subcategory(
            &repo,
            &user,
            "headsets",
            ReviewForm {
                action: "approve".into(),
            },
        )
        .expect("approved");

        assert!(subcategory.is_global);
        assert_eq!(subcategory.store_id, None);
    }
}
