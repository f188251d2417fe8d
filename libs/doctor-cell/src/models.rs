use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::{Address, TreatmentCategory};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: Address,
    #[serde(default)]
    pub specializations: BTreeSet<TreatmentCategory>,
}

/// Field-level doctor update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    pub specializations: Option<BTreeSet<TreatmentCategory>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSpecializationRequest {
    pub category: TreatmentCategory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorSearchQuery {
    pub name: String,
}

/// Raw query for the slot endpoint; the date is parsed by the handler so an
/// unparsable value is reported as an invalid date rather than a bad request.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub date: NaiveDate,
    pub available_slots: Vec<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvailabilityError {
    #[error("{date} falls on a {weekday:?}; appointments are only booked Monday to Friday")]
    Weekend { date: NaiveDate, weekday: Weekday },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    UnparsableDate(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor {0} not found")]
    NotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("A doctor named {0} with the same email and phone number already exists")]
    DuplicateIdentity(String),

    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error("Record store failure: {0}")]
    Store(#[from] StoreError),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        AppError::InvalidDate(err.to_string())
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound(_) => AppError::NotFound(err.to_string()),
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::DuplicateIdentity(_) => AppError::Conflict(err.to_string()),
            DoctorError::Availability(inner) => inner.into(),
            DoctorError::Store(StoreError::Conflict(msg)) => AppError::Conflict(msg),
            DoctorError::Store(inner) => AppError::Database(inner.to_string()),
        }
    }
}
