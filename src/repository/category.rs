use chrono::Local;
use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::category::{
    CatalogVisibility, Category as DomainCategory, CategoryListQuery,
    NewCategory as DomainNewCategory, UpdateCategory as DomainUpdateCategory,
};
use crate::domain::slug::{next_free_slug, slugify};
use crate::models::category::{
    Category as DbCategory, NewCategory as DbNewCategory, UpdateCategory as DbUpdateCategory,
};
use crate::repository::{CategoryReader, CategoryWriter, DieselRepository};

impl CategoryReader for DieselRepository {
    fn get_category_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::id.eq(id))
            .filter(categories::hub_id.eq(hub_id))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        Ok(category.map(DomainCategory::from))
    }

    fn get_category_by_slug(
        &self,
        slug: &str,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::slug.eq(slug))
            .filter(categories::hub_id.eq(hub_id))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        Ok(category.map(DomainCategory::from))
    }

    fn list_categories(
        &self,
        query: CategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainCategory>)> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let build = || {
            let mut items = categories::table
                .filter(categories::hub_id.eq(query.hub_id))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let CatalogVisibility::Store(store_id) = query.visibility {
                items = items.filter(categories::is_active.eq(true)).filter(
                    categories::is_global
                        .eq(true)
                        .or(categories::store_id.eq(store_id)),
                );
            }

            if query.pending_only {
                items = items
                    .filter(categories::is_active.eq(true))
                    .filter(categories::is_approved.eq(false))
                    .filter(categories::store_id.is_not_null());
            }

            if let Some(term) = query.search.as_ref() {
                items = items.filter(categories::name.like(format!("%{}%", term)));
            }

            items
        };

        let total = build().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = build().order((categories::name.asc(), categories::id.asc()));

        if let Some(pagination) = &query.pagination {
            let page = pagination.page.max(1);
            let per_page = pagination.per_page as i64;
            let offset = ((page - 1) * pagination.per_page) as i64;
            items = items.offset(offset).limit(per_page);
        }

        let categories = items
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(DomainCategory::from)
            .collect();

        Ok((total, categories))
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(
        &self,
        new_category: &DomainNewCategory,
    ) -> RepositoryResult<DomainCategory> {
        let mut conn = self.conn()?;
        insert_category(&mut conn, new_category)
    }

    fn update_category(
        &self,
        category_id: i32,
        hub_id: i32,
        updates: &DomainUpdateCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let target = categories::table
            .filter(categories::id.eq(category_id))
            .filter(categories::hub_id.eq(hub_id));

        let updated = diesel::update(target)
            .set(&DbUpdateCategory::from(updates))
            .get_result::<DbCategory>(&mut conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn delete_category(&self, category_id: i32, hub_id: i32) -> RepositoryResult<()> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            categories::table
                .filter(categories::id.eq(category_id))
                .filter(categories::hub_id.eq(hub_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn approve_category(&self, category_id: i32, hub_id: i32) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let target = categories::table
            .filter(categories::id.eq(category_id))
            .filter(categories::hub_id.eq(hub_id));

        let approved = diesel::update(target)
            .set((
                categories::is_approved.eq(true),
                categories::is_global.eq(true),
                categories::is_active.eq(true),
                categories::store_id.eq(None::<i32>),
                categories::updated_at.eq(Local::now().naive_utc()),
            ))
            .get_result::<DbCategory>(&mut conn)
            .optional()?;

        approved.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn reject_category(&self, category_id: i32, hub_id: i32) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let target = categories::table
            .filter(categories::id.eq(category_id))
            .filter(categories::hub_id.eq(hub_id));

        let rejected = diesel::update(target)
            .set((
                categories::is_active.eq(false),
                categories::updated_at.eq(Local::now().naive_utc()),
            ))
            .get_result::<DbCategory>(&mut conn)
            .optional()?;

        rejected.map(Into::into).ok_or(RepositoryError::NotFound)
    }
}

/// Insert a category under the first free slug derived from its name.
pub(crate) fn insert_category(
    conn: &mut SqliteConnection,
    new_category: &DomainNewCategory,
) -> RepositoryResult<DomainCategory> {
    use crate::schema::categories;

    let base = slugify(&new_category.name, "category");
    let slug = next_free_slug(&base, |candidate| {
        let taken = select(exists(
            categories::table.filter(categories::slug.eq(candidate)),
        ))
        .get_result::<bool>(&mut *conn)?;
        Ok::<bool, RepositoryError>(taken)
    })?;

    let created = diesel::insert_into(categories::table)
        .values(&DbNewCategory::new(new_category, &slug))
        .get_result::<DbCategory>(conn)?;

    Ok(created.into())
}
