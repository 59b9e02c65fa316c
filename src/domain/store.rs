use chrono::{NaiveDateTime, NaiveTime};
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// KYC state of a store as seen by customers and admins.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Documents are missing or waiting for an admin.
    #[default]
    Pending,
    /// An admin approved the documents; the store may be listed.
    Verified,
    /// An admin rejected the documents.
    Rejected,
    /// The store was taken down after verification.
    Suspended,
}

impl From<&str> for VerificationStatus {
    fn from(value: &str) -> Self {
        match value {
            "verified" => Self::Verified,
            "rejected" => Self::Rejected,
            "suspended" => Self::Suspended,
            _ => Self::Pending,
        }
    }
}

impl From<VerificationStatus> for &'static str {
    fn from(value: VerificationStatus) -> Self {
        match value {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
            VerificationStatus::Suspended => "suspended",
        }
    }
}

/// Outcome of an admin review of the submitted KYC documents.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl From<&str> for ReviewStatus {
    fn from(value: &str) -> Self {
        match value {
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }
}

impl From<ReviewStatus> for &'static str {
    fn from(value: ReviewStatus) -> Self {
        match value {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

/// Domain representation of a physical store offering pickup orders.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Store {
    /// Unique identifier of the store.
    pub id: i32,
    /// Owning hub identifier.
    pub hub_id: i32,
    /// E-mail of the store owner as issued by the auth service.
    pub owner_email: String,
    /// Display name of the store.
    pub name: String,
    /// Postal address used for pickups.
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    /// Current KYC state.
    pub verification_status: VerificationStatus,
    /// Whether customers can see the store.
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Store {
    /// Stores are listed to customers only after a successful verification.
    pub fn is_public(&self) -> bool {
        self.is_active && self.verification_status == VerificationStatus::Verified
    }
}

/// Payload required to insert a new store.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub hub_id: i32,
    pub owner_email: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
}

impl NewStore {
    /// Build a store payload; the owner e-mail is normalized to lower case.
    pub fn new(
        hub_id: i32,
        owner_email: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            hub_id,
            owner_email: owner_email.into().to_lowercase(),
            name: name.into(),
            address: address.into(),
            latitude: 0.0,
            longitude: 0.0,
            opening_time: NaiveTime::MIN,
            closing_time: NaiveTime::MIN,
        }
    }

    /// Attach the geographic location of the store.
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Attach the daily pickup window.
    pub fn with_hours(mut self, opening_time: NaiveTime, closing_time: NaiveTime) -> Self {
        self.opening_time = opening_time;
        self.closing_time = closing_time;
        self
    }
}

/// Patch data applied when the owner edits a store.
#[derive(Debug, Clone)]
pub struct UpdateStore {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub updated_at: NaiveDateTime,
}

/// KYC documents submitted by a store owner.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoreVerification {
    pub id: i32,
    pub store_id: i32,
    /// Media path of the owner identity proof.
    pub owner_id_proof: String,
    /// Media path of the business license.
    pub business_license: String,
    /// Media path of the optional GST certificate.
    pub gst_certificate: Option<String>,
    pub status: ReviewStatus,
    /// Free-form comment left by the reviewing admin.
    pub remarks: String,
    /// E-mail of the admin who reviewed the documents.
    pub verified_by: Option<String>,
    pub verified_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Documents uploaded for a store, replacing any previous submission.
#[derive(Debug, Clone)]
pub struct NewStoreVerification {
    pub store_id: i32,
    pub owner_id_proof: String,
    pub business_license: String,
    pub gst_certificate: Option<String>,
}

/// Decision taken by an admin on a pending verification.
#[derive(Debug, Clone)]
pub struct VerificationDecision {
    pub approve: bool,
    pub remarks: String,
    pub reviewer_email: String,
    pub decided_at: NaiveDateTime,
}

impl VerificationDecision {
    pub fn new(approve: bool, remarks: impl Into<String>, reviewer_email: impl Into<String>) -> Self {
        Self {
            approve,
            remarks: remarks.into(),
            reviewer_email: reviewer_email.into(),
            decided_at: chrono::Local::now().naive_utc(),
        }
    }
}

/// Store row paired with its verification record for the admin queue.
#[derive(Debug, Serialize, Clone)]
pub struct StoreWithVerification {
    pub store: Store,
    pub verification: Option<StoreVerification>,
}

/// Query definition used to list stores of a hub.
#[derive(Debug, Clone)]
pub struct StoreListQuery {
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Restrict the list to stores of one owner.
    pub owner_email: Option<String>,
    /// Restrict the list to active and verified stores.
    pub public_only: bool,
    /// Optional case-insensitive search applied to the name and address.
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl StoreListQuery {
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            owner_email: None,
            public_only: false,
            search: None,
            pagination: None,
        }
    }

    /// Only return stores owned by `email`.
    pub fn owner(mut self, email: impl Into<String>) -> Self {
        self.owner_email = Some(email.into().to_lowercase());
        self
    }

    /// Only return stores customers may see.
    pub fn public_only(mut self) -> Self {
        self.public_only = true;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
