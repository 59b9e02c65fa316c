use std::collections::HashMap;

use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::store::{
    NewStore as DomainNewStore, NewStoreVerification as DomainNewStoreVerification,
    ReviewStatus, Store as DomainStore, StoreListQuery, StoreVerification as DomainStoreVerification,
    StoreWithVerification, UpdateStore as DomainUpdateStore, VerificationDecision,
    VerificationStatus,
};
use crate::models::store::{
    NewStore as DbNewStore, NewStoreVerification as DbNewStoreVerification, Store as DbStore,
    StoreVerification as DbStoreVerification, UpdateStore as DbUpdateStore,
};
use crate::repository::{DieselRepository, StoreReader, StoreWriter};

impl StoreReader for DieselRepository {
    fn get_store_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<DomainStore>> {
        use crate::schema::stores;

        let mut conn = self.conn()?;

        let store = stores::table
            .filter(stores::id.eq(id))
            .filter(stores::hub_id.eq(hub_id))
            .first::<DbStore>(&mut conn)
            .optional()?;

        Ok(store.map(DomainStore::from))
    }

    fn list_stores(&self, query: StoreListQuery) -> RepositoryResult<(usize, Vec<DomainStore>)> {
        use crate::schema::stores;

        let mut conn = self.conn()?;

        let build = || {
            let mut items = stores::table
                .filter(stores::hub_id.eq(query.hub_id))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(email) = query.owner_email.as_ref() {
                items = items.filter(stores::owner_email.eq(email.clone()));
            }

            if query.public_only {
                let verified: &'static str = VerificationStatus::Verified.into();
                items = items
                    .filter(stores::is_active.eq(true))
                    .filter(stores::verification_status.eq(verified));
            }

            if let Some(term) = query.search.as_ref() {
                let pattern = format!("%{}%", term);
                items = items.filter(
                    stores::name
                        .like(pattern.clone())
                        .or(stores::address.like(pattern)),
                );
            }

            items
        };

        let total = build().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = build().order(stores::name.asc());

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let stores = items
            .load::<DbStore>(&mut conn)?
            .into_iter()
            .map(DomainStore::from)
            .collect();

        Ok((total, stores))
    }

    fn find_owner_store(
        &self,
        hub_id: i32,
        owner_email: &str,
    ) -> RepositoryResult<Option<DomainStore>> {
        use crate::schema::stores;

        let mut conn = self.conn()?;

        let store = stores::table
            .filter(stores::hub_id.eq(hub_id))
            .filter(stores::owner_email.eq(owner_email.to_lowercase()))
            .order(stores::id.asc())
            .first::<DbStore>(&mut conn)
            .optional()?;

        Ok(store.map(DomainStore::from))
    }

    fn get_verification(
        &self,
        store_id: i32,
    ) -> RepositoryResult<Option<DomainStoreVerification>> {
        use crate::schema::store_verifications;

        let mut conn = self.conn()?;

        let verification = store_verifications::table
            .filter(store_verifications::store_id.eq(store_id))
            .first::<DbStoreVerification>(&mut conn)
            .optional()?;

        Ok(verification.map(DomainStoreVerification::from))
    }

    fn list_verification_queue(
        &self,
        hub_id: i32,
    ) -> RepositoryResult<Vec<StoreWithVerification>> {
        use crate::schema::{store_verifications, stores};

        let mut conn = self.conn()?;

        let db_stores = stores::table
            .filter(stores::hub_id.eq(hub_id))
            .order((stores::created_at.desc(), stores::id.desc()))
            .load::<DbStore>(&mut conn)?;

        let store_ids: Vec<i32> = db_stores.iter().map(|store| store.id).collect();
        let mut verifications: HashMap<i32, DomainStoreVerification> = store_verifications::table
            .filter(store_verifications::store_id.eq_any(&store_ids))
            .load::<DbStoreVerification>(&mut conn)?
            .into_iter()
            .map(|row| (row.store_id, row.into()))
            .collect();

        Ok(db_stores
            .into_iter()
            .map(|store| {
                let verification = verifications.remove(&store.id);
                StoreWithVerification {
                    store: store.into(),
                    verification,
                }
            })
            .collect())
    }
}

impl StoreWriter for DieselRepository {
    fn create_store(&self, new_store: &DomainNewStore) -> RepositoryResult<DomainStore> {
        use crate::schema::stores;

        let mut conn = self.conn()?;

        let created = diesel::insert_into(stores::table)
            .values(&DbNewStore::from(new_store))
            .get_result::<DbStore>(&mut conn)?;

        Ok(created.into())
    }

    fn update_store(
        &self,
        store_id: i32,
        hub_id: i32,
        updates: &DomainUpdateStore,
    ) -> RepositoryResult<DomainStore> {
        use crate::schema::stores;

        let mut conn = self.conn()?;

        let target = stores::table
            .filter(stores::id.eq(store_id))
            .filter(stores::hub_id.eq(hub_id));

        let updated = diesel::update(target)
            .set(&DbUpdateStore::from(updates))
            .get_result::<DbStore>(&mut conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn delete_store(&self, store_id: i32, hub_id: i32) -> RepositoryResult<()> {
        use crate::schema::stores;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            stores::table
                .filter(stores::id.eq(store_id))
                .filter(stores::hub_id.eq(hub_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn submit_verification(
        &self,
        documents: &DomainNewStoreVerification,
    ) -> RepositoryResult<DomainStoreVerification> {
        use crate::schema::{store_verifications, stores};

        let mut conn = self.conn()?;
        let pending: &'static str = VerificationStatus::Pending.into();

        conn.transaction::<DomainStoreVerification, RepositoryError, _>(|conn| {
            let row = DbNewStoreVerification::from(documents);

            let saved = diesel::insert_into(store_verifications::table)
                .values(&row)
                .on_conflict(store_verifications::store_id)
                .do_update()
                .set(&row)
                .get_result::<DbStoreVerification>(conn)?;

            let touched = diesel::update(stores::table.filter(stores::id.eq(documents.store_id)))
                .set((
                    stores::verification_status.eq(pending),
                    stores::is_active.eq(false),
                    stores::updated_at.eq(row.updated_at),
                ))
                .execute(conn)?;

            if touched == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(saved.into())
        })
    }

    fn review_verification(
        &self,
        store_id: i32,
        decision: &VerificationDecision,
    ) -> RepositoryResult<DomainStoreVerification> {
        use crate::schema::{store_verifications, stores};

        let mut conn = self.conn()?;

        let (review_status, store_status): (&'static str, &'static str) = if decision.approve {
            (ReviewStatus::Approved.into(), VerificationStatus::Verified.into())
        } else {
            (ReviewStatus::Rejected.into(), VerificationStatus::Rejected.into())
        };

        conn.transaction::<DomainStoreVerification, RepositoryError, _>(|conn| {
            let reviewed = diesel::update(
                store_verifications::table.filter(store_verifications::store_id.eq(store_id)),
            )
            .set((
                store_verifications::status.eq(review_status),
                store_verifications::remarks.eq(decision.remarks.as_str()),
                store_verifications::verified_by.eq(Some(decision.reviewer_email.as_str())),
                store_verifications::verified_at.eq(Some(decision.decided_at)),
                store_verifications::updated_at.eq(decision.decided_at),
            ))
            .get_result::<DbStoreVerification>(conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

            diesel::update(stores::table.filter(stores::id.eq(store_id)))
                .set((
                    stores::verification_status.eq(store_status),
                    stores::is_active.eq(decision.approve),
                    stores::updated_at.eq(decision.decided_at),
                ))
                .execute(conn)?;

            Ok(reviewed.into())
        })
    }
}
