use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use chrono::{Local, NaiveTime};
use pushkind_common::routes::empty_string_as_none;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::store::{NewStore, NewStoreVerification, UpdateStore, VerificationDecision};
use crate::forms::{read_upload, sanitize_inline_text, sanitize_multiline_text};
use crate::media::{MediaError, StoredFile, prepare_document};

/// Maximum length allowed for a store name.
const NAME_MAX_LEN: usize = 128;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Maximum length allowed for a street address.
const ADDRESS_MAX_LEN: usize = 512;
const ADDRESS_MAX_LEN_VALIDATOR: u64 = ADDRESS_MAX_LEN as u64;

/// Result type returned by the store form helpers.
pub type StoreFormResult<T> = Result<T, StoreFormError>;

/// Errors that can occur while processing store forms.
#[derive(Debug, Error)]
pub enum StoreFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("store name cannot be empty")]
    EmptyName,
    #[error("store address cannot be empty")]
    EmptyAddress,
    #[error("latitude must be between -90 and 90")]
    InvalidLatitude,
    #[error("longitude must be between -180 and 180")]
    InvalidLongitude,
    #[error("invalid time `{0}`, expected HH:MM")]
    InvalidTime(String),
    #[error("closing time must be after opening time")]
    InvalidHours,
    #[error("{0} is required")]
    MissingDocument(&'static str),
    #[error("invalid document: {0}")]
    Document(#[from] MediaError),
    #[error("failed to read the uploaded document: {0}")]
    Io(#[from] std::io::Error),
}

/// Form payload of the add and edit store forms.
#[derive(Debug, Deserialize, Validate)]
pub struct StoreForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    #[validate(length(min = 1, max = ADDRESS_MAX_LEN_VALIDATOR))]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// `HH:MM`
    pub opening_time: String,
    /// `HH:MM`
    pub closing_time: String,
}

struct StoreFields {
    name: String,
    address: String,
    opening_time: NaiveTime,
    closing_time: NaiveTime,
}

impl StoreForm {
    fn sanitized(&self) -> StoreFormResult<StoreFields> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(StoreFormError::EmptyName);
        }

        let address = sanitize_multiline_text(&self.address);
        if address.is_empty() {
            return Err(StoreFormError::EmptyAddress);
        }

        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(StoreFormError::InvalidLatitude);
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(StoreFormError::InvalidLongitude);
        }

        let opening_time = parse_time(&self.opening_time)?;
        let closing_time = parse_time(&self.closing_time)?;
        if closing_time <= opening_time {
            return Err(StoreFormError::InvalidHours);
        }

        Ok(StoreFields {
            name,
            address,
            opening_time,
            closing_time,
        })
    }

    pub fn into_new_store(self, hub_id: i32, owner_email: &str) -> StoreFormResult<NewStore> {
        let fields = self.sanitized()?;

        Ok(NewStore::new(hub_id, owner_email, fields.name, fields.address)
            .with_location(self.latitude, self.longitude)
            .with_hours(fields.opening_time, fields.closing_time))
    }

    pub fn into_update_store(self) -> StoreFormResult<UpdateStore> {
        let fields = self.sanitized()?;

        Ok(UpdateStore {
            name: fields.name,
            address: fields.address,
            latitude: self.latitude,
            longitude: self.longitude,
            opening_time: fields.opening_time,
            closing_time: fields.closing_time,
            updated_at: Local::now().naive_utc(),
        })
    }
}

fn parse_time(raw: &str) -> StoreFormResult<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| StoreFormError::InvalidTime(trimmed.to_string()))
}

/// KYC documents uploaded by a store owner.
#[derive(MultipartForm)]
pub struct VerificationForm {
    #[multipart(limit = "10MB")]
    pub owner_id_proof: TempFile,
    #[multipart(limit = "10MB")]
    pub business_license: TempFile,
    #[multipart(limit = "10MB")]
    pub gst_certificate: Option<TempFile>,
}

/// Uploaded documents ready to be written to media storage.
#[derive(Debug)]
pub struct VerificationDocuments {
    pub owner_id_proof: StoredFile,
    pub business_license: StoredFile,
    pub gst_certificate: Option<StoredFile>,
}

impl VerificationDocuments {
    pub fn files(&self) -> impl Iterator<Item = &StoredFile> {
        [Some(&self.owner_id_proof), Some(&self.business_license)]
            .into_iter()
            .chain(std::iter::once(self.gst_certificate.as_ref()))
            .flatten()
    }

    pub fn to_new_verification(&self, store_id: i32) -> NewStoreVerification {
        NewStoreVerification {
            store_id,
            owner_id_proof: self.owner_id_proof.path.clone(),
            business_license: self.business_license.path.clone(),
            gst_certificate: self.gst_certificate.as_ref().map(|file| file.path.clone()),
        }
    }
}

impl VerificationForm {
    /// Read the uploads and name them under `kyc/<store_id>`.
    pub fn into_documents(self, store_id: i32) -> StoreFormResult<VerificationDocuments> {
        let folder = format!("kyc/{store_id}");
        let VerificationForm {
            owner_id_proof,
            business_license,
            gst_certificate,
        } = self;

        let owner_id_proof = document(&folder, Some(owner_id_proof))?
            .ok_or(StoreFormError::MissingDocument("owner ID proof"))?;
        let business_license = document(&folder, Some(business_license))?
            .ok_or(StoreFormError::MissingDocument("business license"))?;
        let gst_certificate = document(&folder, gst_certificate)?;

        Ok(VerificationDocuments {
            owner_id_proof,
            business_license,
            gst_certificate,
        })
    }
}

fn document(folder: &str, upload: Option<TempFile>) -> StoreFormResult<Option<StoredFile>> {
    let Some(mut upload) = upload else {
        return Ok(None);
    };

    let file_name = upload.file_name.clone();
    match read_upload(&mut upload)? {
        Some(bytes) => Ok(Some(prepare_document(folder, file_name.as_deref(), bytes)?)),
        None => Ok(None),
    }
}

/// Admin decision on a store verification.
#[derive(Debug, Deserialize)]
pub struct VerifyStoreForm {
    pub action: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub remarks: Option<String>,
}

impl VerifyStoreForm {
    /// Anything other than `approve` rejects the verification.
    pub fn into_decision(self, reviewer_email: &str) -> VerificationDecision {
        let approve = self.action.trim().eq_ignore_ascii_case("approve");
        let remarks = self
            .remarks
            .as_deref()
            .map(sanitize_multiline_text)
            .unwrap_or_default();
        VerificationDecision::new(approve, remarks, reviewer_email)
    }
}
