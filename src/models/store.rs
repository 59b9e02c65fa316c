use chrono::{NaiveDateTime, NaiveTime};
use diesel::prelude::*;

use crate::domain::store::{
    NewStore as DomainNewStore, NewStoreVerification as DomainNewStoreVerification,
    Store as DomainStore, StoreVerification as DomainStoreVerification,
    UpdateStore as DomainUpdateStore,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::stores)]
pub struct Store {
    pub id: i32,
    pub hub_id: i32,
    pub owner_email: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub verification_status: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::stores)]
pub struct NewStore<'a> {
    pub hub_id: i32,
    pub owner_email: &'a str,
    pub name: &'a str,
    pub address: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::stores)]
pub struct UpdateStore<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Store))]
#[diesel(table_name = crate::schema::store_verifications)]
pub struct StoreVerification {
    pub id: i32,
    pub store_id: i32,
    pub owner_id_proof: String,
    pub business_license: String,
    pub gst_certificate: Option<String>,
    pub status: String,
    pub remarks: String,
    pub verified_by: Option<String>,
    pub verified_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::store_verifications)]
#[diesel(treat_none_as_null = true)]
pub struct NewStoreVerification<'a> {
    pub store_id: i32,
    pub owner_id_proof: &'a str,
    pub business_license: &'a str,
    pub gst_certificate: Option<&'a str>,
    pub status: &'a str,
    pub remarks: &'a str,
    pub verified_by: Option<&'a str>,
    pub verified_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl From<Store> for DomainStore {
    fn from(value: Store) -> Self {
        Self {
            id: value.id,
            hub_id: value.hub_id,
            owner_email: value.owner_email,
            name: value.name,
            address: value.address,
            latitude: value.latitude,
            longitude: value.longitude,
            opening_time: value.opening_time,
            closing_time: value.closing_time,
            verification_status: value.verification_status.as_str().into(),
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewStore> for NewStore<'a> {
    fn from(value: &'a DomainNewStore) -> Self {
        Self {
            hub_id: value.hub_id,
            owner_email: value.owner_email.as_str(),
            name: value.name.as_str(),
            address: value.address.as_str(),
            latitude: value.latitude,
            longitude: value.longitude,
            opening_time: value.opening_time,
            closing_time: value.closing_time,
        }
    }
}

impl<'a> From<&'a DomainUpdateStore> for UpdateStore<'a> {
    fn from(value: &'a DomainUpdateStore) -> Self {
        Self {
            name: value.name.as_str(),
            address: value.address.as_str(),
            latitude: value.latitude,
            longitude: value.longitude,
            opening_time: value.opening_time,
            closing_time: value.closing_time,
            updated_at: value.updated_at,
        }
    }
}

impl From<StoreVerification> for DomainStoreVerification {
    fn from(value: StoreVerification) -> Self {
        Self {
            id: value.id,
            store_id: value.store_id,
            owner_id_proof: value.owner_id_proof,
            business_license: value.business_license,
            gst_certificate: value.gst_certificate,
            status: value.status.as_str().into(),
            remarks: value.remarks,
            verified_by: value.verified_by,
            verified_at: value.verified_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewStoreVerification> for NewStoreVerification<'a> {
    /// A fresh submission always resets the review state.
    fn from(value: &'a DomainNewStoreVerification) -> Self {
        Self {
            store_id: value.store_id,
            owner_id_proof: value.owner_id_proof.as_str(),
            business_license: value.business_license.as_str(),
            gst_certificate: value.gst_certificate.as_deref(),
            status: "pending",
            remarks: "",
            verified_by: None,
            verified_at: None,
            updated_at: chrono::Local::now().naive_utc(),
        }
    }
}
