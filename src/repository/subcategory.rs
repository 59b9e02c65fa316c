use chrono::Local;
use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::category::CatalogVisibility;
use crate::domain::slug::{next_free_slug, slugify};
use crate::domain::subcategory::{
    NewSubCategory as DomainNewSubCategory, SubCategory as DomainSubCategory,
    SubCategoryListQuery, UpdateSubCategory as DomainUpdateSubCategory,
};
use crate::models::subcategory::{
    NewSubCategory as DbNewSubCategory, SubCategory as DbSubCategory,
    UpdateSubCategory as DbUpdateSubCategory,
};
use crate::repository::{DieselRepository, SubCategoryReader, SubCategoryWriter};

impl SubCategoryReader for DieselRepository {
    fn get_subcategory_by_id(
        &self,
        id: i32,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainSubCategory>> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let subcategory = subcategories::table
            .filter(subcategories::id.eq(id))
            .filter(subcategories::hub_id.eq(hub_id))
            .first::<DbSubCategory>(&mut conn)
            .optional()?;

        Ok(subcategory.map(DomainSubCategory::from))
    }

    fn get_subcategory_by_slug(
        &self,
        slug: &str,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainSubCategory>> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let subcategory = subcategories::table
            .filter(subcategories::slug.eq(slug))
            .filter(subcategories::hub_id.eq(hub_id))
            .first::<DbSubCategory>(&mut conn)
            .optional()?;

        Ok(subcategory.map(DomainSubCategory::from))
    }

    fn list_subcategories(
        &self,
        query: SubCategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainSubCategory>)> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let build = || {
            let mut items = subcategories::table
                .filter(subcategories::hub_id.eq(query.hub_id))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let CatalogVisibility::Store(store_id) = query.visibility {
                items = items.filter(subcategories::is_active.eq(true)).filter(
                    subcategories::is_global
                        .eq(true)
                        .or(subcategories::store_id.eq(store_id)),
                );
            }

            if let Some(category_id) = query.category_id {
                items = items.filter(subcategories::category_id.eq(category_id));
            }

            if query.pending_only {
                items = items
                    .filter(subcategories::is_active.eq(true))
                    .filter(subcategories::is_approved.eq(false))
                    .filter(subcategories::store_id.is_not_null());
            }

            items
        };

        let total = build().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = build().order((
            subcategories::category_id.asc(),
            subcategories::name.asc(),
        ));

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            items = items.offset(offset).limit(pagination.per_page as i64);
        }

        let subcategories = items
            .load::<DbSubCategory>(&mut conn)?
            .into_iter()
            .map(DomainSubCategory::from)
            .collect();

        Ok((total, subcategories))
    }
}

impl SubCategoryWriter for DieselRepository {
    fn create_subcategory(
        &self,
        new_subcategory: &DomainNewSubCategory,
    ) -> RepositoryResult<DomainSubCategory> {
        let mut conn = self.conn()?;
        insert_subcategory(&mut conn, new_subcategory)
    }

    fn update_subcategory(
        &self,
        subcategory_id: i32,
        hub_id: i32,
        updates: &DomainUpdateSubCategory,
    ) -> RepositoryResult<DomainSubCategory> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let target = subcategories::table
            .filter(subcategories::id.eq(subcategory_id))
            .filter(subcategories::hub_id.eq(hub_id));

        let updated = diesel::update(target)
            .set(&DbUpdateSubCategory::from(updates))
            .get_result::<DbSubCategory>(&mut conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn delete_subcategory(&self, subcategory_id: i32, hub_id: i32) -> RepositoryResult<()> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            subcategories::table
                .filter(subcategories::id.eq(subcategory_id))
                .filter(subcategories::hub_id.eq(hub_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn approve_subcategory(
        &self,
        subcategory_id: i32,
        hub_id: i32,
    ) -> RepositoryResult<DomainSubCategory> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let target = subcategories::table
            .filter(subcategories::id.eq(subcategory_id))
            .filter(subcategories::hub_id.eq(hub_id));

        let approved = diesel::update(target)
            .set((
                subcategories::is_approved.eq(true),
                subcategories::is_global.eq(true),
                subcategories::is_active.eq(true),
                subcategories::store_id.eq(None::<i32>),
                subcategories::updated_at.eq(Local::now().naive_utc()),
            ))
            .get_result::<DbSubCategory>(&mut conn)
            .optional()?;

        approved.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn reject_subcategory(
        &self,
        subcategory_id: i32,
        hub_id: i32,
    ) -> RepositoryResult<DomainSubCategory> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let target = subcategories::table
            .filter(subcategories::id.eq(subcategory_id))
            .filter(subcategories::hub_id.eq(hub_id));

        let rejected = diesel::update(target)
            .set((
                subcategories::is_active.eq(false),
                subcategories::updated_at.eq(Local::now().naive_utc()),
            ))
            .get_result::<DbSubCategory>(&mut conn)
            .optional()?;

        rejected.map(Into::into).ok_or(RepositoryError::NotFound)
    }
}

/// Insert a subcategory under the first free slug derived from its name.
pub(crate) fn insert_subcategory(
    conn: &mut SqliteConnection,
    new_subcategory: &DomainNewSubCategory,
) -> RepositoryResult<DomainSubCategory> {
    use crate::schema::subcategories;

    let base = slugify(&new_subcategory.name, "subcategory");
    let slug = next_free_slug(&base, |candidate| {
        let taken = select(exists(
            subcategories::table.filter(subcategories::slug.eq(candidate)),
        ))
        .get_result::<bool>(&mut *conn)?;
        Ok::<bool, RepositoryError>(taken)
    })?;

    let created = diesel::insert_into(subcategories::table)
        .values(&DbNewSubCategory::new(new_subcategory, &slug))
        .get_result::<DbSubCategory>(conn)?;

    Ok(created.into())
}
