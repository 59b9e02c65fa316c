use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;

use crate::ADMIN_ROLE;
use crate::domain::category::{Category, CategoryListQuery, NewCategory, UpdateCategory};
use crate::forms::categories::{CategoryForm, ReviewAction, ReviewForm};
use crate::media::MediaStorage;
use crate::repository::{CategoryReader, CategoryWriter, StoreReader};
use crate::services::{
    CatalogActor, ServiceError, ServiceResult, catalog_actor, save_media,
};

/// Loads the categories the user may work with: every category of the hub
/// for admins, active global and own categories for store owners.
pub fn load_categories<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Category>>
where
    R: StoreReader + CategoryReader + ?Sized,
{
    let query = match catalog_actor(repo, user)? {
        CatalogActor::Admin => CategoryListQuery::new(user.hub_id),
        CatalogActor::Store(store) => CategoryListQuery::new(user.hub_id).visible_to(store.id),
    };

    let (_total, categories) = repo.list_categories(query).map_err(ServiceError::from)?;
    Ok(categories)
}

/// Creates a global category for admins or a store-scoped one waiting for
/// approval for store owners.
pub fn create_category<R>(
    repo: &R,
    media: &MediaStorage,
    user: &AuthenticatedUser,
    form: CategoryForm,
) -> ServiceResult<Category>
where
    R: StoreReader + CategoryWriter + ?Sized,
{
    let actor = catalog_actor(repo, user)?;

    let input = form
        .into_input()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let mut new_category = match &actor {
        CatalogActor::Admin => NewCategory::global(user.hub_id, input.name),
        CatalogActor::Store(store) => {
            NewCategory::store_scoped(user.hub_id, store.id, input.name)
        }
    };

    if let Some(image) = &input.image {
        save_media(media, image)?;
        new_category = new_category.with_image(image.path.clone());
    }

    repo.create_category(&new_category)
        .map_err(ServiceError::from)
}

/// Category addressed by slug that the actor is allowed to change.
fn editable_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    actor: &CatalogActor,
    slug: &str,
) -> ServiceResult<Category>
where
    R: CategoryReader + ?Sized,
{
    match repo
        .get_category_by_slug(slug, user.hub_id)
        .map_err(ServiceError::from)?
    {
        Some(category) if actor.owns(category.store_id) => Ok(category),
        _ => Err(ServiceError::NotFound),
    }
}

/// Renames a category and optionally replaces its image.
pub fn modify_category<R>(
    repo: &R,
    media: &MediaStorage,
    user: &AuthenticatedUser,
    slug: &str,
    form: CategoryForm,
) -> ServiceResult<Category>
where
    R: StoreReader + CategoryReader + CategoryWriter + ?Sized,
{
    let actor = catalog_actor(repo, user)?;
    let category = editable_category(repo, user, &actor, slug)?;

    let input = form
        .into_input()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if let Some(image) = &input.image {
        save_media(media, image)?;
    }

    let update = UpdateCategory::new(input.name, input.image.map(|image| image.path));

    repo.update_category(category.id, user.hub_id, &update)
        .map_err(ServiceError::from)
}

pub fn remove_category<R>(repo: &R, user: &AuthenticatedUser, slug: &str) -> ServiceResult<()>
where
    R: StoreReader + CategoryReader + CategoryWriter + ?Sized,
{
    let actor = catalog_actor(repo, user)?;
    let category = editable_category(repo, user, &actor, slug)?;

    repo.delete_category(category.id, user.hub_id)
        .map_err(ServiceError::from)
}

/// Store-scoped categories waiting for an admin decision.
pub fn load_pending_categories<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Category>>
where
    R: CategoryReader + ?Sized,
{
    if !check_role(ADMIN_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let (_total, categories) = repo
        .list_categories(CategoryListQuery::new(user.hub_id).pending_only())
        .map_err(ServiceError::from)?;
    Ok(categories)
}

/// Approves a store-scoped category, making it global, or deactivates it.
pub fn review_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    slug: &str,
    form: ReviewForm,
) -> ServiceResult<Category>
where
    R: CategoryReader + CategoryWriter + ?Sized,
{
    if !check_role(ADMIN_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let action = form
        .into_action()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let category = repo
        .get_category_by_slug(slug, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    if category.is_global {
        return Err(ServiceError::Form(format!(
            "Category `{}` is already global.",
            category.name
        )));
    }

    match action {
        ReviewAction::Approve => repo.approve_category(category.id, user.hub_id),
        ReviewAction::Reject => repo.reject_category(category.id, user.hub_id),
    }
    .map_err(ServiceError::from)
}
