use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Serialize;

use crate::domain::storefront::{
    CategoryCount, StorefrontProduct, StorefrontQuery, SubCategoryCount, TOP_CATEGORIES,
    TOP_SUBCATEGORIES,
};
use crate::forms::storefront::CatalogFilterForm;
use crate::repository::{CategoryReader, StorefrontReader};
use crate::services::{ServiceError, ServiceResult};

/// Data required to render the customer catalog.
#[derive(Debug, Serialize)]
pub struct StorefrontPage {
    pub categories: Vec<CategoryCount>,
    pub subcategories: Vec<SubCategoryCount>,
    pub new_arrivals: Vec<StorefrontProduct>,
    pub best_prices: Vec<StorefrontProduct>,
    /// Slugs of the categories the product sections are limited to.
    pub selected: Vec<String>,
}

/// Loads the catalog customers browse: popular categories and subcategories,
/// the newest products and the cheapest in-stock products of verified stores.
///
/// The product sections follow the category filter. Slugs that match no
/// active category are dropped; when none match, the sections are empty.
pub fn load_storefront<R>(
    repo: &R,
    user: &AuthenticatedUser,
    filter: CatalogFilterForm,
) -> ServiceResult<StorefrontPage>
where
    R: CategoryReader + StorefrontReader + ?Sized,
{
    let categories = repo
        .list_category_counts(user.hub_id, TOP_CATEGORIES)
        .map_err(ServiceError::from)?;
    let subcategories = repo
        .list_subcategory_counts(user.hub_id, TOP_SUBCATEGORIES)
        .map_err(ServiceError::from)?;

    let slugs = filter.slugs();
    let mut selected = Vec::new();
    let mut category_ids = Vec::new();
    for slug in &slugs {
        if let Some(category) = repo
            .get_category_by_slug(slug, user.hub_id)
            .map_err(ServiceError::from)?
            .filter(|category| category.is_active)
        {
            category_ids.push(category.id);
            selected.push(category.slug);
        }
    }

    let filter_matches_nothing = !slugs.is_empty() && category_ids.is_empty();
    let (new_arrivals, best_prices) = if filter_matches_nothing {
        (Vec::new(), Vec::new())
    } else {
        let query = StorefrontQuery::new(user.hub_id).categories(category_ids);
        (
            repo.list_new_arrivals(&query).map_err(ServiceError::from)?,
            repo.list_best_prices(&query).map_err(ServiceError::from)?,
        )
    };

    Ok(StorefrontPage {
        categories,
        subcategories,
        new_arrivals,
        best_prices,
        selected,
    })
}
